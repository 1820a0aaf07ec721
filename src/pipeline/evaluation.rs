//! Paired evaluation of a learner against a fixed opponent

use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use super::episode::{EpisodeReport, EpisodeSimulator};
use crate::{
    Result,
    config::EvaluationConfig,
    ports::Agent,
    q_learning::QLearningAgent,
    tictactoe::Perspective,
};

/// Wins, draws and losses from the learner's side
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideTally {
    pub games: usize,
    pub wins: usize,
    pub draws: usize,
    pub losses: usize,
}

impl SideTally {
    fn record(&mut self, result: Perspective) {
        self.games += 1;
        match result {
            Perspective::Win => self.wins += 1,
            Perspective::Draw => self.draws += 1,
            Perspective::Loss => self.losses += 1,
        }
    }
}

/// Summary of an evaluation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub learner: String,
    pub opponent: String,
    pub games: usize,
    pub wins: usize,
    pub draws: usize,
    pub losses: usize,
    /// Games decided by a malformed move
    pub forfeits: usize,
    pub win_rate: f64,
    pub draw_rate: f64,
    pub loss_rate: f64,
    /// Games where the learner opened (played X)
    pub learner_first: SideTally,
    /// Games where the opponent opened
    pub learner_second: SideTally,
}

impl EvaluationResult {
    fn from_reports(learner: &str, opponent: &str, reports: &[EpisodeReport]) -> Self {
        let mut first = SideTally::default();
        let mut second = SideTally::default();
        for report in reports {
            if report.learner_started() {
                first.record(report.result());
            } else {
                second.record(report.result());
            }
        }

        let games = reports.len();
        let wins = first.wins + second.wins;
        let draws = first.draws + second.draws;
        let losses = first.losses + second.losses;
        let rate = |count: usize| {
            if games > 0 {
                count as f64 / games as f64
            } else {
                0.0
            }
        };

        Self {
            learner: learner.to_string(),
            opponent: opponent.to_string(),
            games,
            wins,
            draws,
            losses,
            forfeits: reports.iter().filter(|r| r.forfeited_by.is_some()).count(),
            win_rate: rate(wins),
            draw_rate: rate(draws),
            loss_rate: rate(losses),
            learner_first: first,
            learner_second: second,
        }
    }

    /// Save result to JSON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }
}

/// Play `pairs` × (learner first, learner second) games without learning.
///
/// A malformed move forfeits that game for the side that made it.
pub fn play_pairs(
    learner: &mut dyn Agent,
    opponent: &mut dyn Agent,
    pairs: usize,
) -> Result<EvaluationResult> {
    let simulator = EpisodeSimulator::evaluation();
    let mut reports = Vec::with_capacity(pairs * 2);
    for _ in 0..pairs {
        reports.push(simulator.play(learner, opponent, true)?);
        reports.push(simulator.play(learner, opponent, false)?);
    }
    Ok(EvaluationResult::from_reports(
        learner.name(),
        opponent.name(),
        &reports,
    ))
}

/// Evaluation harness for a trained agent
#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    config: EvaluationConfig,
}

impl Evaluator {
    pub fn new(config: EvaluationConfig) -> Self {
        Self { config }
    }

    /// Run the paired evaluation at `eval_epsilon`.
    ///
    /// The agent's exploration rate is restored afterwards and its table is
    /// left untouched.
    pub fn run(
        &self,
        agent: &mut QLearningAgent,
        opponent: &mut dyn Agent,
    ) -> Result<EvaluationResult> {
        self.config.validate()?;
        if let Some(seed) = self.config.seed {
            agent.set_rng_seed(seed)?;
            opponent.set_rng_seed(seed.wrapping_add(1))?;
        }

        let pairs = self.config.pairs;
        let result = agent.with_epsilon(self.config.eval_epsilon, |agent| {
            play_pairs(agent, opponent, pairs)
        })?;

        info!(
            "{} vs {}: {} games, W {} D {} L {}",
            result.learner, result.opponent, result.games, result.wins, result.draws, result.losses
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::AgentConfig,
        pipeline::opponents::{HeuristicAgent, RandomAgent},
    };

    #[test]
    fn plays_both_sides_equally() {
        let mut agent = QLearningAgent::new(AgentConfig::new().with_seed(4)).unwrap();
        let mut opponent = RandomAgent::with_seed("random", 5);

        let result = Evaluator::new(EvaluationConfig::new().with_pairs(25))
            .run(&mut agent, &mut opponent)
            .unwrap();

        assert_eq!(result.games, 50);
        assert_eq!(result.learner_first.games, 25);
        assert_eq!(result.learner_second.games, 25);
        assert_eq!(result.wins + result.draws + result.losses, 50);
        assert_eq!(result.forfeits, 0);
    }

    #[test]
    fn evaluation_leaves_agent_untouched() {
        let mut agent = QLearningAgent::new(AgentConfig::new().with_seed(4)).unwrap();
        agent.reset_exploration(0.7, 0.1);
        let mut opponent = HeuristicAgent::with_seed("heuristic", 6);

        Evaluator::new(EvaluationConfig::new().with_pairs(10))
            .run(&mut agent, &mut opponent)
            .unwrap();

        assert_eq!(agent.epsilon(), 0.7);
        assert!(agent.table().is_blank());
    }

    #[test]
    fn paired_games_between_fixed_agents_all_finish() {
        let mut a = HeuristicAgent::with_seed("a", 1);
        let mut b = HeuristicAgent::with_seed("b", 2);

        let result = play_pairs(&mut a, &mut b, 20).unwrap();
        assert_eq!(result.games, 40);
        assert_eq!(result.learner, "a");
        assert_eq!(result.opponent, "b");
    }

    #[test]
    fn zero_pairs_yield_empty_result() {
        let mut a = RandomAgent::with_seed("a", 1);
        let mut b = RandomAgent::with_seed("b", 2);

        let result = play_pairs(&mut a, &mut b, 0).unwrap();
        assert_eq!(result.games, 0);
        assert_eq!(result.win_rate, 0.0);
    }
}
