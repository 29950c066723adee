use std::{
    path::PathBuf,
    sync::{Arc, Mutex, PoisonError},
};

use airsoft_env::{
    action::ActionVector,
    observation::Observation,
    policy::{Opponent, Policy, random_action},
};
use airsoft_training::{evaluation::EpisodeEvaluator, stats::DescriptiveStats};
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::Serialize;

use crate::{command::EnvArg, util, util::Output};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct DuelArg {
    #[clap(flatten)]
    env: EnvArg,
    /// Model controlling the agent (random policy if omitted)
    #[arg(long)]
    agent: Option<PathBuf>,
    /// Model controlling the opponent (random policy if omitted)
    #[arg(long)]
    opponent: Option<PathBuf>,
    /// Number of episodes to play
    #[arg(long, default_value_t = 10)]
    episodes: usize,
    /// Output file path for the report
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct DuelReport {
    agent: String,
    opponent: String,
    episodes: usize,
    wins: usize,
    losses: usize,
    timeouts: usize,
    mean_return: f32,
    returns: Option<DescriptiveStats>,
}

/// Standard-normal actions for the agent seat, from its own seeded stream.
#[derive(Debug)]
struct RandomPolicy {
    rng: Mutex<Pcg32>,
}

impl Policy for RandomPolicy {
    fn predict(&self, _observation: &Observation) -> ActionVector {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        random_action(&mut *rng)
    }
}

pub(crate) fn run(arg: &DuelArg) -> anyhow::Result<()> {
    let env = arg.env.load()?;

    let (agent_name, agent): (String, Box<dyn Policy>) = match &arg.agent {
        Some(path) => {
            let model = util::read_policy_model_file(path)?;
            model.check_convention(env.convention)?;
            (model.name, Box::new(model.policy))
        }
        None => (
            "random".to_owned(),
            Box::new(RandomPolicy {
                rng: Mutex::new(Pcg32::seed_from_u64(env.seed ^ 0x5eed)),
            }),
        ),
    };
    let (opponent_name, opponent) = match &arg.opponent {
        Some(path) => {
            let model = util::read_policy_model_file(path)?;
            model.check_convention(env.convention)?;
            (model.name, Opponent::Policy(Arc::new(model.policy)))
        }
        None => ("random".to_owned(), Opponent::Random),
    };

    tracing::info!(
        agent = %agent_name,
        opponent = %opponent_name,
        episodes = arg.episodes,
        "starting duel"
    );
    let evaluator = EpisodeEvaluator::new(env, opponent, arg.episodes);
    let record = evaluator.play(agent.as_ref())?;

    let report = DuelReport {
        agent: agent_name,
        opponent: opponent_name,
        episodes: record.episodes(),
        wins: record.wins,
        losses: record.losses,
        timeouts: record.timeouts,
        mean_return: record.mean_return(),
        returns: record.return_stats(),
    };
    Output::save_json(&report, arg.output.clone())?;

    Ok(())
}
