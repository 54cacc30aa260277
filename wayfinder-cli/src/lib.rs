//! Command-line interface for replaying recorded drives offline.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

mod error;
mod output;
mod replay;

pub use error::CliError;

use replay::ReplayArgs;

const ARG_ROUTE: &str = "route";
const ARG_TRACE: &str = "trace";
const ARG_ALTERNATIVES: &str = "alternatives";
const ARG_OUTPUT: &str = "output";
const ARG_MAXIMUM_DISTANCE_OFF_ROUTE: &str = "maximum-distance-off-route";
const ARG_ARRIVAL_THRESHOLD: &str = "arrival-threshold";
const ARG_REFRESH_INTERVAL_SECS: &str = "refresh-interval-secs";
const ARG_POLYLINE_PRECISION: &str = "polyline-precision";
const ENV_ROUTE: &str = "WAYFINDER_CMDS_REPLAY_ROUTE_PATH";
const ENV_TRACE: &str = "WAYFINDER_CMDS_REPLAY_TRACE";

/// Run the CLI with the current process arguments and environment.
///
/// # Errors
///
/// Returns [`CliError`] when arguments are invalid, inputs cannot be loaded
/// or the replay fails.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse()?;
    match cli.command {
        Command::Replay(args) => replay::run_replay(args),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "wayfinder",
    about = "Offline tools for the Wayfinder navigation engine",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Replay a recorded position trace against a route.
    Replay(ReplayArgs),
}

#[cfg(test)]
mod tests;
