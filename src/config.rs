//! Configuration types for agents, training runs and evaluation.
//!
//! Every config is plain serde data so a whole run can be described in one
//! JSON file (see [`RunConfig`]); builder methods cover programmatic use.

use std::{fs::File, path::Path};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    pipeline::opponents::OpponentKind,
    q_learning::{policy::TieBreak, q_table::TableKind},
};

/// Which value update the learning agent applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum UpdateRule {
    /// One-step TD update right after each own move
    #[default]
    TemporalDifference,
    /// Backward pass over the episode's own moves once the game ends
    MonteCarlo,
}

/// How epsilon shrinks from `epsilon_start` to `epsilon_min`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum DecaySchedule {
    /// Constant factor `(min / start)^(1 / horizon)` per episode
    #[default]
    Multiplicative,
    /// Constant step `(start - min) / horizon` per episode
    Linear,
}

/// Decides whether the learner opens a given training episode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StarterSchedule {
    /// Learner opens every even-numbered episode
    #[default]
    Alternate,
    /// Learner opens the first half of `horizon` episodes, then never
    HalfSplit { horizon: usize },
    /// Fair coin per episode
    Random,
}

impl StarterSchedule {
    /// Whether the learner moves first in episode `episode` (0-based)
    pub fn learner_starts<R: Rng + ?Sized>(&self, episode: usize, rng: &mut R) -> bool {
        match *self {
            StarterSchedule::Alternate => episode.is_multiple_of(2),
            StarterSchedule::HalfSplit { horizon } => episode < horizon / 2,
            StarterSchedule::Random => rng.random_bool(0.5),
        }
    }
}

fn check_unit(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(Error::InvalidConfiguration {
            message: format!("{name} must lie in [0, 1], got {value}"),
        })
    }
}

/// Hyperparameters of a [`crate::q_learning::QLearningAgent`].
///
/// # Examples
///
/// ```
/// use ttt_qlearn::config::{AgentConfig, UpdateRule};
/// use ttt_qlearn::q_learning::TableKind;
///
/// let config = AgentConfig::new()
///     .with_alpha(0.05)
///     .with_draw_reward(0.9)
///     .with_update_rule(UpdateRule::TemporalDifference)
///     .with_table(TableKind::Dense)
///     .with_seed(42);
/// config.validate()?;
/// # Ok::<(), ttt_qlearn::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Learning rate, in (0, 1]
    pub alpha: f64,
    /// Discount factor, in [0, 1)
    pub gamma: f64,
    /// Reward for a drawn game, in [0, 1)
    pub draw_reward: f64,
    pub update_rule: UpdateRule,
    pub table: TableKind,
    pub tie_break: TieBreak,
    /// Random seed for reproducibility
    pub seed: Option<u64>,
}

impl AgentConfig {
    pub fn new() -> Self {
        Self {
            alpha: 0.2,
            gamma: 0.95,
            draw_reward: 0.9,
            update_rule: UpdateRule::default(),
            table: TableKind::default(),
            tie_break: TieBreak::default(),
            seed: None,
        }
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_gamma(mut self, gamma: f64) -> Self {
        self.gamma = gamma;
        self
    }

    pub fn with_draw_reward(mut self, draw_reward: f64) -> Self {
        self.draw_reward = draw_reward;
        self
    }

    pub fn with_update_rule(mut self, rule: UpdateRule) -> Self {
        self.update_rule = rule;
        self
    }

    pub fn with_table(mut self, table: TableKind) -> Self {
        self.table = table;
        self
    }

    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    /// Set the random seed for deterministic behavior.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Reject non-finite or out-of-range hyperparameters.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] naming the offending field.
    pub fn validate(&self) -> Result<()> {
        if !(self.alpha.is_finite() && self.alpha > 0.0 && self.alpha <= 1.0) {
            return Err(Error::InvalidConfiguration {
                message: format!("alpha must lie in (0, 1], got {}", self.alpha),
            });
        }
        if !(self.gamma.is_finite() && (0.0..1.0).contains(&self.gamma)) {
            return Err(Error::InvalidConfiguration {
                message: format!("gamma must lie in [0, 1), got {}", self.gamma),
            });
        }
        if !(self.draw_reward.is_finite() && (0.0..1.0).contains(&self.draw_reward)) {
            return Err(Error::InvalidConfiguration {
                message: format!("draw_reward must lie in [0, 1), got {}", self.draw_reward),
            });
        }
        Ok(())
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Exploration schedule and episode bookkeeping for a training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub epsilon_start: f64,
    pub epsilon_min: f64,
    /// Episodes over which epsilon travels from start to min
    pub decay_horizon: usize,
    pub decay: DecaySchedule,
    pub starter: StarterSchedule,
    /// Episodes between progress log lines; 0 disables them
    pub progress_interval: usize,
    pub seed: Option<u64>,
}

impl TrainingConfig {
    pub fn new() -> Self {
        Self {
            epsilon_start: 1.0,
            epsilon_min: 0.01,
            decay_horizon: 1_000_000,
            decay: DecaySchedule::default(),
            starter: StarterSchedule::default(),
            progress_interval: 100_000,
            seed: None,
        }
    }

    pub fn with_epsilon(mut self, start: f64, min: f64) -> Self {
        self.epsilon_start = start;
        self.epsilon_min = min;
        self
    }

    pub fn with_decay(mut self, decay: DecaySchedule, horizon: usize) -> Self {
        self.decay = decay;
        self.decay_horizon = horizon;
        self
    }

    pub fn with_starter(mut self, starter: StarterSchedule) -> Self {
        self.starter = starter;
        self
    }

    pub fn with_progress_interval(mut self, interval: usize) -> Self {
        self.progress_interval = interval;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Per-episode decay parameter, computed once per run.
    ///
    /// A factor for [`DecaySchedule::Multiplicative`], a step for
    /// [`DecaySchedule::Linear`]. A degenerate schedule (start at or below
    /// the floor) leaves epsilon where it is.
    pub fn decay_step(&self) -> f64 {
        let horizon = self.decay_horizon.max(1) as f64;
        let degenerate = self.epsilon_start <= self.epsilon_min;
        match self.decay {
            DecaySchedule::Multiplicative if degenerate => 1.0,
            DecaySchedule::Multiplicative => {
                (self.epsilon_min / self.epsilon_start).powf(1.0 / horizon)
            }
            DecaySchedule::Linear if degenerate => 0.0,
            DecaySchedule::Linear => (self.epsilon_start - self.epsilon_min) / horizon,
        }
    }

    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] for epsilons outside `[0, 1]`,
    /// a floor above the start, or a multiplicative schedule that would have
    /// to reach a floor of zero.
    pub fn validate(&self) -> Result<()> {
        check_unit("epsilon_start", self.epsilon_start)?;
        check_unit("epsilon_min", self.epsilon_min)?;
        if self.epsilon_min > self.epsilon_start {
            return Err(Error::InvalidConfiguration {
                message: format!(
                    "epsilon_min ({}) exceeds epsilon_start ({})",
                    self.epsilon_min, self.epsilon_start
                ),
            });
        }
        if self.decay == DecaySchedule::Multiplicative
            && self.epsilon_min == 0.0
            && self.epsilon_start > 0.0
        {
            return Err(Error::InvalidConfiguration {
                message: "multiplicative decay needs epsilon_min > 0".to_string(),
            });
        }
        if self.decay_horizon == 0 {
            return Err(Error::InvalidConfiguration {
                message: "decay_horizon must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Settings for the paired evaluation harness
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    /// Number of (learner-first, learner-second) game pairs
    pub pairs: usize,
    /// Exploration rate held during evaluation games
    pub eval_epsilon: f64,
    pub seed: Option<u64>,
}

impl EvaluationConfig {
    pub fn new() -> Self {
        Self {
            pairs: 1000,
            eval_epsilon: 0.01,
            seed: None,
        }
    }

    pub fn with_pairs(mut self, pairs: usize) -> Self {
        self.pairs = pairs;
        self
    }

    pub fn with_eval_epsilon(mut self, epsilon: f64) -> Self {
        self.eval_epsilon = epsilon;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if `eval_epsilon` is outside `[0, 1]`.
    pub fn validate(&self) -> Result<()> {
        check_unit("eval_epsilon", self.eval_epsilon)
    }
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Complete description of a training or evaluation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RunConfig {
    pub agent: AgentConfig,
    pub training: TrainingConfig,
    pub evaluation: EvaluationConfig,
    pub opponent: OpponentKind,
}

impl RunConfig {
    /// Validate all sections
    ///
    /// # Errors
    ///
    /// Returns the first [`Error::InvalidConfiguration`] found.
    pub fn validate(&self) -> Result<()> {
        self.agent.validate()?;
        self.training.validate()?;
        self.evaluation.validate()
    }

    /// Load a run description from a JSON file.
    ///
    /// Missing fields fall back to their defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| Error::Io {
            operation: format!("open config {}", path.display()),
            source,
        })?;
        let config: RunConfig = serde_json::from_reader(file)?;
        config.validate()?;
        Ok(config)
    }

    /// Save this run description as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }
}

/// Named hyperparameter sets matching the three reference trainers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Preset {
    /// Dense TD learner trained against a random mover, alternating starts
    #[default]
    RandomTd,
    /// Dense TD learner trained against the heuristic, learner opens the first half
    HeuristicTd,
    /// Sparse Monte-Carlo learner trained against a random mover, random starts
    MonteCarlo,
}

impl Preset {
    pub fn agent_config(self) -> AgentConfig {
        match self {
            Preset::RandomTd => AgentConfig::new()
                .with_alpha(0.2)
                .with_gamma(0.95)
                .with_draw_reward(0.0)
                .with_update_rule(UpdateRule::TemporalDifference)
                .with_table(TableKind::Dense),
            Preset::HeuristicTd => AgentConfig::new()
                .with_alpha(0.05)
                .with_gamma(0.95)
                .with_draw_reward(0.9)
                .with_update_rule(UpdateRule::TemporalDifference)
                .with_table(TableKind::Dense),
            Preset::MonteCarlo => AgentConfig::new()
                .with_alpha(0.1)
                .with_gamma(0.9)
                .with_draw_reward(0.0)
                .with_update_rule(UpdateRule::MonteCarlo)
                .with_table(TableKind::Sparse),
        }
    }

    pub fn training_config(self) -> TrainingConfig {
        let horizon = 1_000_000;
        let base = TrainingConfig::new()
            .with_epsilon(1.0, 0.01)
            .with_decay(DecaySchedule::Multiplicative, horizon);
        match self {
            Preset::RandomTd => base.with_starter(StarterSchedule::Alternate),
            Preset::HeuristicTd => base.with_starter(StarterSchedule::HalfSplit { horizon }),
            Preset::MonteCarlo => base.with_starter(StarterSchedule::Random),
        }
    }

    /// Opponent the preset trains and evaluates against
    pub fn opponent(self) -> OpponentKind {
        match self {
            Preset::RandomTd | Preset::MonteCarlo => OpponentKind::Random,
            Preset::HeuristicTd => OpponentKind::Heuristic,
        }
    }

    pub fn run_config(self) -> RunConfig {
        RunConfig {
            agent: self.agent_config(),
            training: self.training_config(),
            evaluation: EvaluationConfig::new(),
            opponent: self.opponent(),
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn presets_are_valid() {
        for preset in [Preset::RandomTd, Preset::HeuristicTd, Preset::MonteCarlo] {
            preset.run_config().validate().unwrap();
        }
        assert_eq!(Preset::MonteCarlo.agent_config().table, TableKind::Sparse);
        assert_eq!(Preset::HeuristicTd.agent_config().alpha, 0.05);
    }

    #[test]
    fn presets_carry_their_draw_rewards() {
        assert_eq!(Preset::RandomTd.agent_config().draw_reward, 0.0);
        assert_eq!(Preset::HeuristicTd.agent_config().draw_reward, 0.9);
        assert_eq!(Preset::MonteCarlo.agent_config().draw_reward, 0.0);
    }

    #[test]
    fn agent_config_rejects_out_of_range() {
        assert!(AgentConfig::new().with_alpha(0.0).validate().is_err());
        assert!(AgentConfig::new().with_alpha(f64::NAN).validate().is_err());
        assert!(AgentConfig::new().with_gamma(1.0).validate().is_err());
        assert!(AgentConfig::new().with_draw_reward(1.0).validate().is_err());
        assert!(AgentConfig::new().with_draw_reward(-0.1).validate().is_err());
        assert!(AgentConfig::new().with_alpha(1.0).with_gamma(0.0).validate().is_ok());
    }

    #[test]
    fn training_config_rejects_bad_epsilons() {
        assert!(TrainingConfig::new().with_epsilon(1.5, 0.1).validate().is_err());
        assert!(TrainingConfig::new().with_epsilon(0.1, 0.5).validate().is_err());
        assert!(TrainingConfig::new().with_epsilon(1.0, 0.0).validate().is_err());
        assert!(
            TrainingConfig::new()
                .with_epsilon(1.0, 0.0)
                .with_decay(DecaySchedule::Linear, 10)
                .validate()
                .is_ok()
        );
    }

    #[test]
    fn multiplicative_step_reaches_floor_at_horizon() {
        let config = TrainingConfig::new()
            .with_epsilon(1.0, 0.01)
            .with_decay(DecaySchedule::Multiplicative, 1000);
        let step = config.decay_step();
        let end = step.powi(1000);
        assert!((end - 0.01).abs() < 1e-9);
    }

    #[test]
    fn linear_step_and_degenerate_schedules() {
        let config = TrainingConfig::new()
            .with_epsilon(0.5, 0.1)
            .with_decay(DecaySchedule::Linear, 4);
        assert!((config.decay_step() - 0.1).abs() < 1e-12);

        let flat = TrainingConfig::new().with_epsilon(0.2, 0.2);
        assert_eq!(flat.decay_step(), 1.0);
    }

    #[test]
    fn starter_schedules() {
        let mut rng = StdRng::seed_from_u64(0);
        let alternate = StarterSchedule::Alternate;
        assert!(alternate.learner_starts(0, &mut rng));
        assert!(!alternate.learner_starts(1, &mut rng));

        let split = StarterSchedule::HalfSplit { horizon: 10 };
        assert!(split.learner_starts(4, &mut rng));
        assert!(!split.learner_starts(5, &mut rng));

        let random = StarterSchedule::Random;
        let firsts = (0..1000)
            .filter(|&i| random.learner_starts(i, &mut rng))
            .count();
        assert!((350..650).contains(&firsts));
    }

    #[test]
    fn run_config_json_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("run.json");
        std::fs::write(
            &path,
            r#"{"agent": {"alpha": 0.5, "update_rule": "monte_carlo"}, "opponent": "heuristic"}"#,
        )
        .unwrap();

        let config = RunConfig::load(&path).unwrap();
        assert_eq!(config.agent.alpha, 0.5);
        assert_eq!(config.agent.update_rule, UpdateRule::MonteCarlo);
        assert_eq!(config.agent.gamma, 0.95);
        assert_eq!(config.opponent, OpponentKind::Heuristic);
        assert_eq!(config.evaluation.pairs, 1000);
    }

    #[test]
    fn run_config_roundtrips_through_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("preset.json");
        let config = Preset::HeuristicTd.run_config();
        config.save(&path).unwrap();
        assert_eq!(RunConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn invalid_json_config_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, r#"{"agent": {"alpha": 2.0}}"#).unwrap();
        assert!(matches!(
            RunConfig::load(&path),
            Err(Error::InvalidConfiguration { .. })
        ));
    }
}
