use std::path::PathBuf;

use airsoft_env::{
    config::Convention,
    controller::{TurnController, TurnOrder},
    observation::Observation,
};
use serde::Serialize;

use crate::{command::EnvArg, util::Output};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct InspectArg {
    #[clap(flatten)]
    env: EnvArg,
    /// Let the opponent move first (seat 1 for the agent)
    #[arg(long)]
    opponent_first: bool,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct InspectReport {
    convention: Convention,
    agent_seat: usize,
    observation_size: usize,
    observation: Observation,
}

pub(crate) fn run(arg: &InspectArg) -> anyhow::Result<()> {
    let env = arg.env.load()?;
    let mut controller = TurnController::new(env.build_arena(), &env);
    let order = if arg.opponent_first {
        TurnOrder::OpponentFirst
    } else {
        TurnOrder::AgentFirst
    };
    let (observation, _info) = controller.reset_with_order(order);

    let report = InspectReport {
        convention: controller.convention(),
        agent_seat: controller.agent_seat(),
        observation_size: observation.len(),
        observation,
    };
    Output::save_json(&report, arg.output.clone())?;

    Ok(())
}
