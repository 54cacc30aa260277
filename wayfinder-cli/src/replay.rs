//! Replay command implementation for the Wayfinder CLI.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use log::{info, warn};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use wayfinder_core::geometry::POLYLINE_PRECISION;
use wayfinder_core::milestone::{MilestoneEngine, default_milestones};
use wayfinder_core::{NavigationConfig, Route};
use wayfinder_data::{FileRouteFetcher, load_routes, load_trace};
use wayfinder_session::{EventStream, NavigationEvent, NavigationSession};

use crate::output::write_event;
use crate::{
    ARG_ALTERNATIVES, ARG_ARRIVAL_THRESHOLD, ARG_MAXIMUM_DISTANCE_OFF_ROUTE, ARG_OUTPUT,
    ARG_POLYLINE_PRECISION, ARG_REFRESH_INTERVAL_SECS, ARG_ROUTE, ARG_TRACE, CliError, ENV_ROUTE,
    ENV_TRACE,
};

/// CLI arguments for the `replay` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Run a navigation session over a recorded position trace. \
                 Each fix is fed to the session in order and every event it \
                 emits is printed as one JSON object per line. Reroutes are \
                 answered from an optional file of recorded alternatives.",
    about = "Replay a recorded trace against a route"
)]
#[ortho_config(prefix = "WAYFINDER")]
pub(crate) struct ReplayArgs {
    /// Path to a Directions response whose first route is followed.
    #[arg(value_name = "route.json")]
    #[serde(default)]
    pub(crate) route_path: Option<Utf8PathBuf>,
    /// Path to the JSON position trace.
    #[arg(long = ARG_TRACE, value_name = "path")]
    #[serde(default)]
    pub(crate) trace: Option<Utf8PathBuf>,
    /// Directions response offered as reroute candidates.
    #[arg(long = ARG_ALTERNATIVES, value_name = "path")]
    #[serde(default)]
    pub(crate) alternatives: Option<Utf8PathBuf>,
    /// Write events to this file instead of stdout.
    #[arg(long = ARG_OUTPUT, value_name = "path")]
    #[serde(default)]
    pub(crate) output: Option<Utf8PathBuf>,
    /// Distance in metres beyond which the user is off route.
    #[arg(long = ARG_MAXIMUM_DISTANCE_OFF_ROUTE, value_name = "metres")]
    #[serde(default)]
    pub(crate) maximum_distance_off_route: Option<f64>,
    /// Distance in metres from the destination that counts as arrival.
    #[arg(long = ARG_ARRIVAL_THRESHOLD, value_name = "metres")]
    #[serde(default)]
    pub(crate) arrival_threshold: Option<f64>,
    /// Seconds between route refreshes; 0 disables refreshing.
    #[arg(long = ARG_REFRESH_INTERVAL_SECS, value_name = "seconds")]
    #[serde(default)]
    pub(crate) refresh_interval_secs: Option<u64>,
    /// Decimal places used by the polyline geometry (default 6).
    #[arg(long = ARG_POLYLINE_PRECISION, value_name = "digits")]
    #[serde(default)]
    pub(crate) polyline_precision: Option<u8>,
}

impl ReplayArgs {
    pub(crate) fn into_config(self) -> Result<ReplayConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        ReplayConfig::try_from(merged)
    }
}

/// Resolved `replay` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ReplayConfig {
    pub(crate) route_path: Utf8PathBuf,
    pub(crate) trace_path: Utf8PathBuf,
    pub(crate) alternatives: Option<Utf8PathBuf>,
    pub(crate) output: Option<Utf8PathBuf>,
    pub(crate) navigation: NavigationConfig,
    pub(crate) polyline_precision: u8,
}

impl ReplayConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        Self::require_existing(&self.route_path, ARG_ROUTE)?;
        Self::require_existing(&self.trace_path, ARG_TRACE)?;
        if let Some(alternatives) = &self.alternatives {
            Self::require_existing(alternatives, ARG_ALTERNATIVES)?;
        }
        Ok(())
    }

    fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
        match wayfinder_fs::is_file(path) {
            Ok(true) => Ok(()),
            Ok(false) => Err(CliError::SourcePathNotFile {
                field,
                path: path.to_path_buf(),
            }),
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                Err(CliError::MissingSourceFile {
                    field,
                    path: path.to_path_buf(),
                })
            }
            Err(source) => Err(CliError::InspectSourcePath {
                field,
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

impl TryFrom<ReplayArgs> for ReplayConfig {
    type Error = CliError;

    fn try_from(args: ReplayArgs) -> Result<Self, Self::Error> {
        let route_path = args.route_path.ok_or(CliError::MissingArgument {
            field: ARG_ROUTE,
            env: ENV_ROUTE,
        })?;
        let trace_path = args.trace.ok_or(CliError::MissingArgument {
            field: ARG_TRACE,
            env: ENV_TRACE,
        })?;

        let defaults = NavigationConfig::default();
        let navigation = NavigationConfig {
            maximum_distance_off_route: args
                .maximum_distance_off_route
                .unwrap_or(defaults.maximum_distance_off_route),
            arrival_threshold: args.arrival_threshold.unwrap_or(defaults.arrival_threshold),
            refresh_interval: args
                .refresh_interval_secs
                .map_or(defaults.refresh_interval, Duration::from_secs),
            ..defaults
        };
        navigation.validate()?;

        Ok(Self {
            route_path,
            trace_path,
            alternatives: args.alternatives,
            output: args.output,
            navigation,
            polyline_precision: args.polyline_precision.unwrap_or(POLYLINE_PRECISION),
        })
    }
}

pub(crate) fn run_replay(args: ReplayArgs) -> Result<(), CliError> {
    let config = resolve_replay_config(args)?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .map_err(CliError::Runtime)?;
    match &config.output {
        Some(path) => {
            let mut buffer = Vec::new();
            runtime.block_on(replay(&config, &mut buffer))?;
            wayfinder_fs::write_file(path, &buffer).map_err(|source| CliError::WriteOutputFile {
                path: path.clone(),
                source,
            })
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            runtime.block_on(replay(&config, &mut stdout))
        }
    }
}

fn resolve_replay_config(args: ReplayArgs) -> Result<ReplayConfig, CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    Ok(config)
}

/// Feed every fix of the trace to a fresh session and write its events.
///
/// Each fix is sent only after the previous one has produced its progress
/// event, so no fix is coalesced away. After a fix that takes the user off
/// route the reroute outcome is awaited before moving on.
pub(crate) async fn replay(config: &ReplayConfig, writer: &mut dyn Write) -> Result<(), CliError> {
    let route = load_route(&config.route_path, config.polyline_precision)?;
    let trace = load_trace(&config.trace_path)?;
    let fetcher = match &config.alternatives {
        Some(path) => FileRouteFetcher::load(path, config.polyline_precision)?,
        None => FileRouteFetcher::default(),
    };
    info!(
        "replaying {} fixes along {} with {} alternatives",
        trace.len(),
        route.leg_summary(),
        fetcher.routes().len()
    );

    let milestones = MilestoneEngine::new(default_milestones(&config.navigation));
    let (session, mut events) = NavigationSession::start(
        route,
        config.navigation.clone(),
        milestones,
        Arc::new(fetcher),
    )?;
    let settle = config.navigation.reroute_timeout;

    for position in trace {
        if session.update_location(position).is_err() {
            break;
        }
        match forward_tick(&mut events, writer).await? {
            Some(true) => forward_reroute(&mut events, writer, settle).await?,
            Some(false) => {}
            None => break,
        }
    }

    session.shutdown().await?;
    while let Some(event) = events.recv().await {
        write_event(writer, &event)?;
    }
    Ok(())
}

fn load_route(path: &Utf8Path, precision: u8) -> Result<Route, CliError> {
    load_routes(path, precision)?
        .into_iter()
        .next()
        .ok_or_else(|| CliError::EmptyRouteFile {
            path: path.to_path_buf(),
        })
}

/// Forward events up to and including the next progress update.
///
/// Returns whether the tick took the user off route, or `None` once the
/// stream has closed.
async fn forward_tick(
    events: &mut EventStream,
    writer: &mut dyn Write,
) -> Result<Option<bool>, CliError> {
    let mut off_route = false;
    while let Some(event) = events.recv().await {
        write_event(writer, &event)?;
        match event {
            NavigationEvent::UserOffRoute { .. } => off_route = true,
            NavigationEvent::ProgressChange { .. } => return Ok(Some(off_route)),
            _ => {}
        }
    }
    Ok(None)
}

async fn forward_reroute(
    events: &mut EventStream,
    writer: &mut dyn Write,
    settle: Duration,
) -> Result<(), CliError> {
    let outcome = tokio::time::timeout(settle, async {
        while let Some(event) = events.recv().await {
            write_event(writer, &event)?;
            if matches!(
                event,
                NavigationEvent::RerouteAlong { .. } | NavigationEvent::FailedReroute { .. }
            ) {
                break;
            }
        }
        Ok::<(), CliError>(())
    })
    .await;
    match outcome {
        Ok(result) => result,
        Err(_) => {
            warn!("no reroute outcome within {} s", settle.as_secs());
            Ok(())
        }
    }
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<ReplayConfig, CliError> {
    let merged = ReplayArgs::merge_from_layers(layers).map_err(CliError::from)?;
    ReplayConfig::try_from(merged)
}
