//! Tabular Q-learning agent
//!
//! The agent owns its value table, exploration state and random source. It
//! learns through the [`Agent`] hooks: a one-step TD update after each of
//! its own moves, or a Monte-Carlo backward pass when the episode ends.

use std::path::Path;

use log::{debug, info, warn};
use rand::{SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    config::{AgentConfig, DecaySchedule, UpdateRule},
    encoding::StateKey,
    ports::{Agent, KnowledgeRepository},
    q_learning::{knowledge::Knowledge, policy::EpsilonGreedy, q_table::QTable},
    tictactoe::{BoardState, GameStatus, Perspective, Player},
};

fn build_rng(seed: Option<u64>) -> StdRng {
    if let Some(seed) = seed {
        StdRng::seed_from_u64(seed)
    } else {
        StdRng::from_rng(&mut rand::rng())
    }
}

/// Exploration rate together with the schedule bounds it moves between
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Exploration {
    pub current: f64,
    pub start: f64,
    pub floor: f64,
}

impl Exploration {
    pub fn new(start: f64, floor: f64) -> Self {
        Self {
            current: start,
            start,
            floor,
        }
    }

    /// Return to the starting rate
    pub fn reset(&mut self) {
        self.current = self.start;
    }

    /// Apply one episode of decay; no-op once at or below the floor
    pub fn decay(&mut self, schedule: DecaySchedule, step: f64) {
        if self.current <= self.floor {
            return;
        }
        let next = match schedule {
            DecaySchedule::Multiplicative => self.current * step,
            DecaySchedule::Linear => self.current - step,
        };
        self.current = next.max(self.floor);
    }
}

impl Default for Exploration {
    fn default() -> Self {
        Self::new(1.0, 0.01)
    }
}

/// Result of trying to restore saved knowledge
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// Table and epsilon were replaced by the stored snapshot
    Restored,
    /// Nothing usable was stored; the agent keeps its current table
    Fresh { reason: String },
}

impl LoadOutcome {
    pub fn is_restored(&self) -> bool {
        matches!(self, LoadOutcome::Restored)
    }
}

/// Q-learning agent with an ε-greedy behaviour policy
#[derive(Debug, Clone)]
pub struct QLearningAgent {
    name: String,
    config: AgentConfig,
    table: QTable,
    policy: EpsilonGreedy,
    exploration: Exploration,
    trajectory: Vec<(StateKey, usize)>,
    role: Player,
    rng: StdRng,
}

impl QLearningAgent {
    /// Create an agent with a zeroed table of the configured layout.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if the hyperparameters are out
    /// of range.
    pub fn new(config: AgentConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            name: "q-learner".to_string(),
            table: QTable::new(config.table),
            policy: EpsilonGreedy::new(config.tie_break),
            exploration: Exploration::default(),
            trajectory: Vec::with_capacity(5),
            role: Player::X,
            rng: build_rng(config.seed),
            config,
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn table(&self) -> &QTable {
        &self.table
    }

    pub fn epsilon(&self) -> f64 {
        self.exploration.current
    }

    pub fn exploration(&self) -> Exploration {
        self.exploration
    }

    /// Own moves recorded so far in the current episode
    pub fn trajectory(&self) -> &[(StateKey, usize)] {
        &self.trajectory
    }

    /// Install new schedule bounds and jump to the starting rate
    pub fn reset_exploration(&mut self, start: f64, floor: f64) {
        self.exploration = Exploration::new(start, floor);
    }

    /// One episode worth of epsilon decay
    pub fn decay_exploration(&mut self, schedule: DecaySchedule, step: f64) {
        self.exploration.decay(schedule, step);
    }

    /// Run `f` with epsilon temporarily set to `epsilon`.
    ///
    /// The previous rate is restored afterwards, whatever `f` returns.
    pub fn with_epsilon<T>(&mut self, epsilon: f64, f: impl FnOnce(&mut Self) -> T) -> T {
        let saved = self.exploration.current;
        self.exploration.current = epsilon.clamp(0.0, 1.0);
        let result = f(self);
        self.exploration.current = saved;
        result
    }

    /// Greedy choice for `board`, ignoring exploration
    pub fn best_action(&mut self, board: &BoardState) -> Result<usize> {
        self.policy.select(&self.table, board, 0.0, &mut self.rng)
    }

    /// Snapshot of the table and current epsilon
    pub fn knowledge(&self) -> Knowledge {
        Knowledge::new(self.table.clone(), self.exploration.current)
    }

    /// Adopt a snapshot; its epsilon becomes the current rate
    pub fn restore(&mut self, knowledge: Knowledge) {
        if knowledge.table.kind() != self.config.table {
            debug!(
                "{}: stored table is {:?}, configured {:?}; keeping stored layout",
                self.name,
                knowledge.table.kind(),
                self.config.table
            );
        }
        self.table = knowledge.table;
        self.exploration.current = knowledge.epsilon.clamp(0.0, 1.0);
    }

    /// Try to restore knowledge from `path`.
    ///
    /// Never fails: a missing or unreadable file leaves the table untouched
    /// and is reported as [`LoadOutcome::Fresh`].
    pub fn load_knowledge(&mut self, repo: &dyn KnowledgeRepository, path: &Path) -> LoadOutcome {
        match repo.load(path) {
            Ok(knowledge) => {
                self.restore(knowledge);
                info!(
                    "{}: restored knowledge from {} ({} visited states, epsilon {:.4})",
                    self.name,
                    path.display(),
                    self.table.visited_states(),
                    self.exploration.current
                );
                LoadOutcome::Restored
            }
            Err(err @ Error::KnowledgeNotFound { .. }) => {
                info!("{}: {err}; starting fresh", self.name);
                LoadOutcome::Fresh {
                    reason: err.to_string(),
                }
            }
            Err(err) => {
                warn!("{}: {err}; starting fresh", self.name);
                LoadOutcome::Fresh {
                    reason: err.to_string(),
                }
            }
        }
    }

    /// Persist the table and current epsilon to `path`.
    ///
    /// # Errors
    ///
    /// Surfaces [`Error::KnowledgeSaveFailed`]; the in-memory table is kept.
    pub fn save_knowledge(&self, repo: &dyn KnowledgeRepository, path: &Path) -> Result<()> {
        repo.save(&self.knowledge(), path)?;
        info!(
            "{}: saved knowledge to {} ({} visited states)",
            self.name,
            path.display(),
            self.table.visited_states()
        );
        Ok(())
    }

    /// Reward seen right after an own move that produced `after`
    fn step_reward(&self, after: &BoardState) -> f64 {
        match after.status() {
            GameStatus::Won(winner) if winner == self.role => 1.0,
            GameStatus::Won(_) => -1.0,
            GameStatus::Draw => self.config.draw_reward,
            GameStatus::InProgress => 0.0,
        }
    }

    fn terminal_reward(&self, result: Perspective) -> f64 {
        match result {
            Perspective::Win => 1.0,
            Perspective::Loss => -1.0,
            Perspective::Draw => self.config.draw_reward,
        }
    }
}

impl Agent for QLearningAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn begin_episode(&mut self, role: Player) {
        self.role = role;
        self.trajectory.clear();
    }

    fn select_move(&mut self, board: &BoardState) -> Result<usize> {
        self.policy
            .select(&self.table, board, self.exploration.current, &mut self.rng)
    }

    fn record_own_move(
        &mut self,
        before: &BoardState,
        position: usize,
        after: &BoardState,
    ) -> Result<()> {
        let state = StateKey::encode(before);
        self.trajectory.push((state, position));

        if self.config.update_rule == UpdateRule::TemporalDifference {
            let reward = self.step_reward(after);
            let next_legal = after.legal_moves();
            let next = if after.is_terminal() {
                None
            } else {
                Some((StateKey::encode(after), next_legal.as_slice()))
            };
            self.table.td_update(
                state,
                position,
                reward,
                next,
                self.config.alpha,
                self.config.gamma,
            );
        }
        Ok(())
    }

    fn finish_episode(&mut self, result: Perspective) -> Result<()> {
        if self.config.update_rule == UpdateRule::MonteCarlo {
            let reward = self.terminal_reward(result);
            self.table.monte_carlo_update(
                &self.trajectory,
                reward,
                self.config.alpha,
                self.config.gamma,
            );
        }
        self.trajectory.clear();
        Ok(())
    }

    fn set_rng_seed(&mut self, seed: u64) -> Result<()> {
        self.rng = StdRng::seed_from_u64(seed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{adapters::InMemoryRepository, q_learning::q_table::TableKind};

    fn td_agent() -> QLearningAgent {
        QLearningAgent::new(
            AgentConfig::new()
                .with_alpha(0.5)
                .with_gamma(0.9)
                .with_draw_reward(0.9)
                .with_table(TableKind::Sparse)
                .with_seed(7),
        )
        .unwrap()
    }

    #[test]
    fn rejects_invalid_config() {
        assert!(QLearningAgent::new(AgentConfig::new().with_alpha(2.0)).is_err());
    }

    #[test]
    fn td_update_on_winning_move() {
        let mut agent = td_agent();
        agent.begin_episode(Player::X);

        let before = BoardState::from_string("XX.OO....").unwrap();
        let after = before.make_move(2).unwrap();
        agent.record_own_move(&before, 2, &after).unwrap();

        let key = StateKey::encode(&before);
        assert!((agent.table().get(key, 2) - 0.5).abs() < 1e-12);
        assert_eq!(agent.trajectory(), &[(key, 2)]);
    }

    #[test]
    fn td_update_uses_configured_draw_reward() {
        let mut agent = td_agent();
        agent.begin_episode(Player::X);

        let before = BoardState::from_string("XOX/XOO/OX.").unwrap();
        let after = before.make_move(8).unwrap();
        assert!(after.is_draw());
        agent.record_own_move(&before, 8, &after).unwrap();

        let key = StateKey::encode(&before);
        assert!((agent.table().get(key, 8) - 0.45).abs() < 1e-12);
    }

    #[test]
    fn monte_carlo_agent_updates_only_at_episode_end() {
        let config = AgentConfig::new()
            .with_alpha(1.0)
            .with_gamma(0.9)
            .with_draw_reward(0.0)
            .with_update_rule(UpdateRule::MonteCarlo)
            .with_table(TableKind::Sparse);
        let mut agent = QLearningAgent::new(config).unwrap();
        agent.begin_episode(Player::X);

        let s0 = BoardState::new();
        let s0_after = s0.make_move(4).unwrap();
        agent.record_own_move(&s0, 4, &s0_after).unwrap();
        let s1 = s0_after.make_move(0).unwrap();
        let s1_after = s1.make_move(8).unwrap();
        agent.record_own_move(&s1, 8, &s1_after).unwrap();
        assert!(agent.table().is_blank());

        agent.finish_episode(Perspective::Win).unwrap();
        assert!((agent.table().get(StateKey::encode(&s1), 8) - 1.0).abs() < 1e-12);
        assert!((agent.table().get(StateKey::encode(&s0), 4) - 0.9).abs() < 1e-12);
        assert!(agent.trajectory().is_empty());
    }

    #[test]
    fn with_epsilon_restores_previous_rate() {
        let mut agent = td_agent();
        agent.reset_exploration(0.8, 0.1);

        let inside = agent.with_epsilon(0.01, |agent| agent.epsilon());
        assert_eq!(inside, 0.01);
        assert_eq!(agent.epsilon(), 0.8);
    }

    #[test]
    fn exploration_decay_stops_at_floor() {
        let mut exploration = Exploration::new(0.5, 0.1);
        for _ in 0..100 {
            exploration.decay(DecaySchedule::Multiplicative, 0.5);
        }
        assert_eq!(exploration.current, 0.1);

        exploration.reset();
        exploration.decay(DecaySchedule::Linear, 0.15);
        assert!((exploration.current - 0.35).abs() < 1e-12);
    }

    #[test]
    fn missing_knowledge_starts_fresh() {
        let repo = InMemoryRepository::new();
        let mut agent = td_agent();

        let outcome = agent.load_knowledge(&repo, Path::new("absent"));
        assert!(!outcome.is_restored());
        assert!(agent.table().is_blank());
    }

    #[test]
    fn knowledge_roundtrip_restores_epsilon() {
        let repo = InMemoryRepository::new();
        let mut agent = td_agent();
        agent.reset_exploration(0.3, 0.01);
        let before = BoardState::from_string("XX.OO....").unwrap();
        let key = StateKey::encode(&before);
        agent.begin_episode(Player::X);
        let after = before.make_move(2).unwrap();
        agent.record_own_move(&before, 2, &after).unwrap();
        agent.save_knowledge(&repo, Path::new("k")).unwrap();

        let mut fresh = td_agent();
        assert!(fresh.load_knowledge(&repo, Path::new("k")).is_restored());
        assert_eq!(fresh.epsilon(), 0.3);
        assert_eq!(fresh.table().get(key, 2), 0.5);
        assert_eq!(fresh.best_action(&before).unwrap(), 2);
    }
}
