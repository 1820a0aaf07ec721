//! Training loop for the Q-learning agent

use std::time::Instant;

use log::{info, warn};
use rand::{SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use super::{episode::EpisodeSimulator, stop::StopCondition};
use crate::{
    Result,
    config::TrainingConfig,
    ports::{Agent, Observer},
    q_learning::QLearningAgent,
    tictactoe::Perspective,
};

/// Result of a training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    /// Episodes started, including aborted ones
    pub episodes: usize,

    /// Episodes discarded after a malformed move or similar local error
    pub aborted: usize,

    pub wins: usize,
    pub draws: usize,
    pub losses: usize,

    /// Win rate over completed episodes
    pub win_rate: f64,
    pub draw_rate: f64,
    pub loss_rate: f64,

    /// Exploration rate when the run ended
    pub final_epsilon: f64,

    /// Number of states with a non-zero value after the run
    pub visited_states: usize,

    pub elapsed_secs: f64,
}

impl TrainingReport {
    pub fn completed(&self) -> usize {
        self.wins + self.draws + self.losses
    }

    /// Save report to JSON file
    pub fn save<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Load report from JSON file
    pub fn load<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let report = serde_json::from_reader(file)?;
        Ok(report)
    }
}

#[derive(Debug, Default)]
struct Tally {
    episodes: usize,
    aborted: usize,
    wins: usize,
    draws: usize,
    losses: usize,
}

impl Tally {
    fn record(&mut self, result: Perspective) {
        match result {
            Perspective::Win => self.wins += 1,
            Perspective::Draw => self.draws += 1,
            Perspective::Loss => self.losses += 1,
        }
    }

    fn rate(&self, count: usize) -> f64 {
        let completed = self.wins + self.draws + self.losses;
        if completed > 0 {
            count as f64 / completed as f64
        } else {
            0.0
        }
    }
}

/// Runs episodes until a stop condition fires, decaying epsilon per episode
pub struct Trainer {
    config: TrainingConfig,
    observers: Vec<Box<dyn Observer>>,
}

impl Trainer {
    pub fn new(config: TrainingConfig) -> Self {
        Self {
            config,
            observers: Vec::new(),
        }
    }

    /// Add an observer to the trainer
    pub fn with_observer(mut self, observer: Box<dyn Observer>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Train `agent` against `opponent` until `stop` fires.
    ///
    /// Epsilon is reset to `epsilon_start` first; every run starts its own
    /// exploration schedule even when the table was restored from disk.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid configuration or a failure that is not
    /// local to one episode. Malformed moves and `NoLegalMove` only abort the
    /// episode they occur in.
    pub fn train(
        &mut self,
        agent: &mut QLearningAgent,
        opponent: &mut dyn Agent,
        stop: &mut dyn StopCondition,
    ) -> Result<TrainingReport> {
        self.config.validate()?;
        let mut rng = self.seed_pair(agent, opponent)?;

        agent.reset_exploration(self.config.epsilon_start, self.config.epsilon_min);
        let step = self.config.decay_step();
        let simulator = EpisodeSimulator::training();
        let started = Instant::now();
        let mut tally = Tally::default();

        info!(
            "training {} against {} (epsilon {} -> {} over {} episodes, {:?} decay)",
            agent.name(),
            opponent.name(),
            self.config.epsilon_start,
            self.config.epsilon_min,
            self.config.decay_horizon,
            self.config.decay
        );

        let planned = stop.planned_episodes();
        for observer in &mut self.observers {
            observer.on_training_start(planned)?;
        }

        while !stop.should_stop() {
            let episode = tally.episodes;
            tally.episodes += 1;
            let learner_starts = self.config.starter.learner_starts(episode, &mut rng);
            let epsilon = agent.epsilon();

            match simulator.play(agent, opponent, learner_starts) {
                Ok(report) => {
                    tally.record(report.result());
                    for observer in &mut self.observers {
                        observer.on_episode_end(episode, &report, epsilon)?;
                    }
                }
                Err(err) if err.is_episode_local() => {
                    warn!("episode {episode} aborted: {err}");
                    tally.aborted += 1;
                    for observer in &mut self.observers {
                        observer.on_episode_aborted(episode, &err)?;
                    }
                }
                Err(err) => return Err(err),
            }

            agent.decay_exploration(self.config.decay, step);

            let interval = self.config.progress_interval;
            if interval > 0 && tally.episodes.is_multiple_of(interval) {
                info!(
                    "episode {}: W {} D {} L {} aborted {}, epsilon {:.4}",
                    tally.episodes,
                    tally.wins,
                    tally.draws,
                    tally.losses,
                    tally.aborted,
                    agent.epsilon()
                );
            }
        }

        let report = TrainingReport {
            episodes: tally.episodes,
            aborted: tally.aborted,
            wins: tally.wins,
            draws: tally.draws,
            losses: tally.losses,
            win_rate: tally.rate(tally.wins),
            draw_rate: tally.rate(tally.draws),
            loss_rate: tally.rate(tally.losses),
            final_epsilon: agent.epsilon(),
            visited_states: agent.table().visited_states(),
            elapsed_secs: started.elapsed().as_secs_f64(),
        };

        for observer in &mut self.observers {
            observer.on_training_end(&report)?;
        }

        info!(
            "training finished: {} episodes in {:.1}s ({} aborted), {} states visited",
            report.episodes, report.elapsed_secs, report.aborted, report.visited_states
        );
        Ok(report)
    }

    /// Seed both participants and return the trainer's own random source
    fn seed_pair(&self, agent: &mut QLearningAgent, opponent: &mut dyn Agent) -> Result<StdRng> {
        match self.config.seed {
            Some(seed) => {
                agent.set_rng_seed(seed)?;
                opponent.set_rng_seed(seed.wrapping_add(1))?;
                Ok(StdRng::seed_from_u64(seed.wrapping_add(2)))
            }
            None => Ok(StdRng::from_rng(&mut rand::rng())),
        }
    }
}
