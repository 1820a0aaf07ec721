//! Train command - Train a Q-learning agent and persist its knowledge

use std::{fs::File, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use log::warn;
use serde::Serialize;
use serde_json::to_writer_pretty;

use super::{ensure_parent_dir, json_output_path, resolve_run_config};
use crate::{
    adapters::MsgPackRepository,
    cli::output::{print_evaluation, print_kv, print_section, print_training_report},
    config::{Preset, RunConfig, StarterSchedule},
    pipeline::{
        EvaluationResult, Evaluator, OpponentKind, ProgressObserver, StopAfterDuration,
        StopAfterIterations, StopCondition, Trainer, TrainingReport,
    },
    ports::Agent,
    q_learning::{QLearningAgent, TableKind},
};

#[derive(Debug, Serialize)]
struct TrainingSummaryFile<'a> {
    knowledge: String,
    restored: bool,
    config: &'a RunConfig,
    before: Option<EvaluationResult>,
    training: TrainingReport,
    after: Option<EvaluationResult>,
}

#[derive(Parser, Debug)]
#[command(about = "Train a Q-learning agent", allow_negative_numbers = true)]
pub struct TrainArgs {
    /// Hyperparameter preset
    #[arg(long, value_enum, default_value_t = Preset::RandomTd)]
    pub preset: Preset,

    /// JSON run configuration, replaces the preset
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Knowledge file to resume from and save to
    #[arg(long, short = 'k', default_value = "qtable.msgpack")]
    pub knowledge: PathBuf,

    /// Opponent to train against
    #[arg(long, short = 'o', value_enum)]
    pub opponent: Option<OpponentKind>,

    /// Number of training episodes (also sets the decay horizon)
    #[arg(long, short = 'g', conflicts_with = "seconds")]
    pub games: Option<usize>,

    /// Wall-clock training budget in seconds
    #[arg(long, short = 's')]
    pub seconds: Option<u64>,

    /// Evaluation pairs before and after training (0 skips evaluation)
    #[arg(long)]
    pub pairs: Option<usize>,

    /// Q-table layout for a fresh agent
    #[arg(long, value_enum)]
    pub table: Option<TableKind>,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// Optional path for writing a summary JSON file
    #[arg(long)]
    pub summary: Option<PathBuf>,

    /// Disable the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

impl TrainArgs {
    /// Resolve the run configuration with command-line overrides applied
    pub fn run_config(&self) -> Result<RunConfig> {
        let mut config = resolve_run_config(self.preset, self.config.as_deref())?;

        if let Some(opponent) = self.opponent {
            config.opponent = opponent;
        }
        if let Some(games) = self.games {
            config.training.decay_horizon = games;
            if let StarterSchedule::HalfSplit { horizon } = &mut config.training.starter {
                *horizon = games;
            }
        }
        if let Some(pairs) = self.pairs {
            config.evaluation.pairs = pairs;
        }
        if let Some(table) = self.table {
            config.agent.table = table;
        }
        if let Some(seed) = self.seed {
            config.agent.seed = Some(seed);
            config.training.seed = Some(seed);
            config.evaluation.seed = Some(seed.wrapping_add(1000));
        }

        config.validate().context("invalid run configuration")?;
        Ok(config)
    }

    fn stop_condition(&self, config: &RunConfig) -> Box<dyn StopCondition> {
        match (self.games, self.seconds) {
            (None, Some(seconds)) => Box::new(StopAfterDuration::from_secs(seconds)),
            (Some(games), _) => Box::new(StopAfterIterations::new(games)),
            (None, None) => Box::new(StopAfterIterations::new(config.training.decay_horizon)),
        }
    }
}

pub fn execute(args: TrainArgs) -> Result<()> {
    let config = args.run_config()?;
    let repository = MsgPackRepository::new();

    let mut agent = QLearningAgent::new(config.agent.clone())
        .context("failed to create agent")?
        .with_name("q-learner");
    let restored = agent
        .load_knowledge(&repository, &args.knowledge)
        .is_restored();
    let mut opponent = config
        .opponent
        .build(config.training.seed.map(|seed| seed.wrapping_add(1)));

    print_section("Q-learning training");
    print_kv("Knowledge", &args.knowledge.display().to_string());
    print_kv("Restored", if restored { "yes" } else { "no, starting fresh" });
    print_kv("Opponent", opponent.name());
    print_kv("Update rule", &format!("{:?}", config.agent.update_rule));

    let evaluator = Evaluator::new(config.evaluation.clone());
    let evaluate = config.evaluation.pairs > 0;

    let before = if evaluate {
        let result = evaluator
            .run(&mut agent, opponent.as_mut())
            .context("evaluation before training failed")?;
        print_evaluation("Before training", &result);
        Some(result)
    } else {
        None
    };

    let mut trainer = Trainer::new(config.training.clone());
    if !args.no_progress {
        trainer = trainer.with_observer(Box::new(ProgressObserver::new()));
    }
    let mut stop = args.stop_condition(&config);
    let report = trainer
        .train(&mut agent, opponent.as_mut(), stop.as_mut())
        .context("training failed")?;
    print_training_report(&report);

    let after = if evaluate {
        let result = evaluator
            .run(&mut agent, opponent.as_mut())
            .context("evaluation after training failed")?;
        print_evaluation("After training", &result);
        Some(result)
    } else {
        None
    };

    // The run still counts as successful when the table cannot be written.
    if let Err(err) = agent.save_knowledge(&repository, &args.knowledge) {
        warn!("knowledge was not saved: {err}");
    }

    if let Some(raw) = &args.summary {
        let path = json_output_path(raw, "training_summary.json");
        let summary = TrainingSummaryFile {
            knowledge: args.knowledge.display().to_string(),
            restored,
            config: &config,
            before,
            training: report,
            after,
        };
        ensure_parent_dir(&path)?;
        let file = File::create(&path)
            .with_context(|| format!("failed to create summary file {}", path.display()))?;
        to_writer_pretty(file, &summary)
            .with_context(|| format!("failed to write summary to {}", path.display()))?;
        println!("\nSummary written to {}", path.display());
    }

    Ok(())
}
