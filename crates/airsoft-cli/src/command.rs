use std::path::PathBuf;

use airsoft_env::config::{Convention, EnvConfig};
use clap::{Parser, Subcommand};

use self::{duel::DuelArg, inspect::InspectArg, train::TrainArg};
use crate::util;

mod duel;
mod inspect;
mod train;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Train a policy by self-play with a genetic algorithm
    Train(#[clap(flatten)] TrainArg),
    /// Play episodes between two policies and report the outcome
    Duel(#[clap(flatten)] DuelArg),
    /// Print the initial observation of an environment configuration
    Inspect(#[clap(flatten)] InspectArg),
}

/// Environment options shared by every subcommand.
///
/// Flags override the values loaded from `--env-config`.
#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct EnvArg {
    /// Environment configuration JSON file
    #[arg(long)]
    env_config: Option<PathBuf>,
    /// Control convention (Simple or Asymmetric)
    #[arg(long)]
    convention: Option<Convention>,
    /// Arena map text file
    #[arg(long)]
    map: Option<PathBuf>,
    /// Environment seed
    #[arg(long)]
    seed: Option<u64>,
    /// Steps allowed before an episode times out
    #[arg(long)]
    iteration_cap: Option<usize>,
}

impl EnvArg {
    pub(crate) fn load(&self) -> anyhow::Result<EnvConfig> {
        let mut config: EnvConfig = match &self.env_config {
            Some(path) => util::read_json_file("environment config", path)?,
            None => EnvConfig::default(),
        };
        if let Some(convention) = self.convention {
            config.convention = convention;
        }
        if let Some(path) = &self.map {
            config.map = util::read_map_file(path)?;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(cap) = self.iteration_cap {
            config.iteration_cap = cap;
        }
        Ok(config)
    }
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Train(arg) => train::run(&arg)?,
        Mode::Duel(arg) => duel::run(&arg)?,
        Mode::Inspect(arg) => inspect::run(&arg)?,
    }
    Ok(())
}
