//! Stop conditions polled by the training loop between episodes

use std::time::{Duration, Instant};

/// Decides when a training run ends.
///
/// The trainer polls `should_stop` once before every episode, so a run can
/// overshoot its budget by at most one episode. Any `FnMut() -> bool`
/// closure is a stop condition.
pub trait StopCondition {
    fn should_stop(&mut self) -> bool;

    /// Number of episodes the run will play, when known in advance
    fn planned_episodes(&self) -> Option<usize> {
        None
    }
}

impl<F: FnMut() -> bool> StopCondition for F {
    fn should_stop(&mut self) -> bool {
        self()
    }
}

/// Stop after a fixed number of episodes
#[derive(Debug, Clone)]
pub struct StopAfterIterations {
    limit: usize,
    polled: usize,
}

impl StopAfterIterations {
    pub fn new(limit: usize) -> Self {
        Self { limit, polled: 0 }
    }
}

impl StopCondition for StopAfterIterations {
    fn should_stop(&mut self) -> bool {
        if self.polled >= self.limit {
            return true;
        }
        self.polled += 1;
        false
    }

    fn planned_episodes(&self) -> Option<usize> {
        Some(self.limit)
    }
}

/// Stop once a wall-clock budget has elapsed
///
/// The clock starts at the first poll, not at construction.
#[derive(Debug, Clone)]
pub struct StopAfterDuration {
    budget: Duration,
    started: Option<Instant>,
}

impl StopAfterDuration {
    pub fn new(budget: Duration) -> Self {
        Self {
            budget,
            started: None,
        }
    }

    pub fn from_secs(secs: u64) -> Self {
        Self::new(Duration::from_secs(secs))
    }
}

impl StopCondition for StopAfterDuration {
    fn should_stop(&mut self) -> bool {
        let started = *self.started.get_or_insert_with(Instant::now);
        started.elapsed() >= self.budget
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iterations_allow_exactly_the_limit() {
        let mut stop = StopAfterIterations::new(3);
        let allowed = std::iter::from_fn(|| (!stop.should_stop()).then_some(()))
            .take(10)
            .count();
        assert_eq!(allowed, 3);
        assert!(stop.should_stop());
    }

    #[test]
    fn zero_iterations_stop_immediately() {
        let mut stop = StopAfterIterations::new(0);
        assert!(stop.should_stop());
        assert_eq!(stop.planned_episodes(), Some(0));
    }

    #[test]
    fn zero_duration_stops_on_first_poll() {
        let mut stop = StopAfterDuration::new(Duration::ZERO);
        assert!(stop.should_stop());
        assert_eq!(stop.planned_episodes(), None);
    }

    #[test]
    fn long_duration_keeps_running() {
        let mut stop = StopAfterDuration::from_secs(3600);
        assert!(!stop.should_stop());
        assert!(!stop.should_stop());
    }

    #[test]
    fn closures_are_stop_conditions() {
        let mut calls = 0;
        let mut stop = || {
            calls += 1;
            calls > 2
        };
        assert!(!StopCondition::should_stop(&mut stop));
        assert!(!StopCondition::should_stop(&mut stop));
        assert!(StopCondition::should_stop(&mut stop));
    }
}
