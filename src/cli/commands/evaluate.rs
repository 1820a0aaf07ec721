//! Evaluate command - Play a stored agent against a fixed opponent

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;

use super::{ensure_parent_dir, json_output_path, resolve_run_config};
use crate::{
    adapters::MsgPackRepository,
    cli::output::{print_evaluation, print_kv, print_section},
    config::{Preset, RunConfig},
    pipeline::{Evaluator, OpponentKind},
    q_learning::{LoadOutcome, QLearningAgent},
};

#[derive(Parser, Debug)]
#[command(about = "Evaluate a trained agent")]
pub struct EvaluateArgs {
    /// Knowledge file of the agent to evaluate
    #[arg(long, short = 'k', default_value = "qtable.msgpack")]
    pub knowledge: PathBuf,

    /// Opponent to evaluate against
    #[arg(long, short = 'o', value_enum)]
    pub opponent: Option<OpponentKind>,

    /// Hyperparameter preset the agent was trained with
    #[arg(long, value_enum, default_value_t = Preset::RandomTd)]
    pub preset: Preset,

    /// JSON run configuration, replaces the preset
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Number of game pairs (each pair plays both sides)
    #[arg(long, short = 'p')]
    pub pairs: Option<usize>,

    /// Exploration rate during evaluation
    #[arg(long)]
    pub epsilon: Option<f64>,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// Evaluate an untrained agent when the knowledge file cannot be read
    #[arg(long)]
    pub allow_fresh: bool,

    /// Export the result as JSON
    #[arg(long)]
    pub export: Option<PathBuf>,
}

impl EvaluateArgs {
    /// Resolve the run configuration with command-line overrides applied
    pub fn run_config(&self) -> Result<RunConfig> {
        let mut config = resolve_run_config(self.preset, self.config.as_deref())?;
        if let Some(opponent) = self.opponent {
            config.opponent = opponent;
        }
        if let Some(pairs) = self.pairs {
            config.evaluation.pairs = pairs;
        }
        if let Some(epsilon) = self.epsilon {
            config.evaluation.eval_epsilon = epsilon;
        }
        if let Some(seed) = self.seed {
            config.agent.seed = Some(seed);
            config.evaluation.seed = Some(seed);
        }
        config.validate().context("invalid run configuration")?;
        Ok(config)
    }
}

pub fn execute(args: EvaluateArgs) -> Result<()> {
    let config = args.run_config()?;
    let repository = MsgPackRepository::new();

    let mut agent = QLearningAgent::new(config.agent.clone())
        .context("failed to create agent")?
        .with_name("q-learner");
    if let LoadOutcome::Fresh { reason } = agent.load_knowledge(&repository, &args.knowledge)
        && !args.allow_fresh
    {
        bail!(
            "cannot evaluate {}: {reason} (pass --allow-fresh to evaluate an untrained agent)",
            args.knowledge.display()
        );
    }

    let mut opponent = config
        .opponent
        .build(config.evaluation.seed.map(|seed| seed.wrapping_add(1)));
    let result = Evaluator::new(config.evaluation.clone())
        .run(&mut agent, opponent.as_mut())
        .context("evaluation failed")?;

    print_section("Q-learning evaluation");
    print_kv("Knowledge", &args.knowledge.display().to_string());
    print_kv("Epsilon", &format!("{:.3}", config.evaluation.eval_epsilon));
    print_evaluation("Result", &result);

    if let Some(raw) = &args.export {
        let path = json_output_path(raw, "evaluation.json");
        ensure_parent_dir(&path)?;
        result
            .save(&path)
            .with_context(|| format!("failed to export evaluation to {}", path.display()))?;
        println!("\nEvaluation exported to {}", path.display());
    }

    Ok(())
}
