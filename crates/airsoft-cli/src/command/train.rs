use std::path::PathBuf;

use airsoft_training::selfplay::{PhaseSummary, SelfPlayTrainer, TrainingConfig};
use anyhow::Context;
use chrono::Utc;

use crate::{command::EnvArg, model::policy_model::PolicyModel, util, util::Output};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    #[clap(flatten)]
    env: EnvArg,
    /// Training configuration JSON file
    #[arg(long)]
    training_config: Option<PathBuf>,
    /// Number of self-play phases
    #[arg(long, default_value_t = 50)]
    phases: u64,
    /// Individuals per generation
    #[arg(long)]
    population: Option<usize>,
    /// Episodes each individual plays per phase
    #[arg(long)]
    episodes: Option<usize>,
    /// Seed for the genetic algorithm and opponent draws
    #[arg(long)]
    training_seed: Option<u64>,
    /// Name stored in the saved model
    #[arg(long, default_value = "self-play")]
    name: String,
    /// Output file path for the trained model
    #[arg(long)]
    output: Option<PathBuf>,
    /// Output file path for per-phase summaries
    #[arg(long)]
    summary: Option<PathBuf>,
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    let env = arg.env.load()?;
    let mut config: TrainingConfig = match &arg.training_config {
        Some(path) => util::read_json_file("training config", path)?,
        None => TrainingConfig::default(),
    };
    if let Some(population) = arg.population {
        config.population_size = population;
    }
    if let Some(episodes) = arg.episodes {
        config.episodes_per_individual = episodes;
    }
    if let Some(seed) = arg.training_seed {
        config.seed = seed;
    }
    anyhow::ensure!(arg.phases > 0, "at least one phase is required");
    anyhow::ensure!(config.population_size > 0, "population must not be empty");
    anyhow::ensure!(config.pool_capacity > 0, "pool capacity must be positive");
    anyhow::ensure!(
        (0.0..=1.0).contains(&config.latest_probability),
        "latest_probability must be within [0, 1]"
    );

    let convention = env.convention;
    tracing::info!(
        %convention,
        phases = arg.phases,
        population = config.population_size,
        episodes = config.episodes_per_individual,
        "starting self-play training"
    );

    let mut trainer = SelfPlayTrainer::new(env, config);
    let mut summaries: Vec<PhaseSummary> = Vec::new();
    for _ in 0..arg.phases {
        let summary = trainer
            .run_phase()
            .with_context(|| format!("Phase {} failed", trainer.phases_completed()))?;
        summaries.push(summary);
    }

    let last = summaries.last().context("no phase was run")?;
    let champion = trainer.champion().context("training produced no policy")?;
    let model = PolicyModel {
        name: arg.name.clone(),
        trained_at: Utc::now(),
        convention,
        phases: trainer.phases_completed(),
        final_fitness: last.best_fitness,
        policy: champion.clone(),
    };

    if let Some(path) = &arg.summary {
        Output::save_json(&summaries, Some(path.clone()))?;
    }
    Output::save_json(&model, arg.output.clone())?;

    eprintln!();
    eprintln!("Model saved successfully");
    if let Some(path) = &arg.output {
        eprintln!("  Path: {}", path.display());
    }
    eprintln!("  Name: {}", model.name);
    eprintln!("  Trained at: {}", model.trained_at);
    eprintln!("  Convention: {}", model.convention);
    eprintln!("  Final fitness: {:.3}", model.final_fitness);
    eprintln!("  Weights: {}", model.policy.weights().len());

    Ok(())
}
