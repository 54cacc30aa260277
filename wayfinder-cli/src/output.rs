//! JSON line records written for each navigation event.

use std::io::Write;
use std::time::Duration;

use serde::Serialize;
use wayfinder_core::{GeoPosition, RouteProgress};
use wayfinder_session::NavigationEvent;

use crate::CliError;

/// Flat, serializable view of a [`NavigationEvent`].
#[derive(Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub(crate) enum EventRecord<'a> {
    ProgressChange {
        timestamp_ms: u64,
        longitude: f64,
        latitude: f64,
        snapped: [f64; 2],
        leg_index: usize,
        step_index: usize,
        step_distance_remaining: f64,
        distance_remaining: f64,
        duration_remaining_secs: f64,
        fraction_traveled: f64,
    },
    Milestone {
        milestone_id: u32,
        instruction: &'a str,
        leg_index: usize,
        step_index: usize,
    },
    UserOffRoute {
        timestamp_ms: u64,
        longitude: f64,
        latitude: f64,
    },
    RerouteAlong {
        summary: String,
        distance: f64,
        destination: [f64; 2],
    },
    FailedReroute {
        message: &'a str,
    },
}

impl<'a> From<&'a NavigationEvent> for EventRecord<'a> {
    fn from(event: &'a NavigationEvent) -> Self {
        match event {
            NavigationEvent::ProgressChange { location, progress } => {
                progress_record(location, progress)
            }
            NavigationEvent::Milestone {
                progress,
                instruction,
                milestone_id,
            } => Self::Milestone {
                milestone_id: *milestone_id,
                instruction,
                leg_index: progress.leg_index(),
                step_index: progress.step_index(),
            },
            NavigationEvent::UserOffRoute { location } => Self::UserOffRoute {
                timestamp_ms: millis(location.timestamp),
                longitude: location.longitude(),
                latitude: location.latitude(),
            },
            NavigationEvent::RerouteAlong { route, destination } => Self::RerouteAlong {
                summary: route.leg_summary(),
                distance: route.distance(),
                destination: [destination.x(), destination.y()],
            },
            NavigationEvent::FailedReroute { message } => Self::FailedReroute { message },
        }
    }
}

fn progress_record<'a>(location: &GeoPosition, progress: &RouteProgress) -> EventRecord<'a> {
    let snapped = progress.snapped_position();
    EventRecord::ProgressChange {
        timestamp_ms: millis(location.timestamp),
        longitude: location.longitude(),
        latitude: location.latitude(),
        snapped: [snapped.x(), snapped.y()],
        leg_index: progress.leg_index(),
        step_index: progress.step_index(),
        step_distance_remaining: progress.step_distance_remaining(),
        distance_remaining: progress.distance_remaining(),
        duration_remaining_secs: progress.duration_remaining().as_secs_f64(),
        fraction_traveled: progress.fraction_traveled(),
    }
}

fn millis(timestamp: Duration) -> u64 {
    u64::try_from(timestamp.as_millis()).unwrap_or(u64::MAX)
}

/// Write `event` as one line of JSON.
pub(crate) fn write_event(writer: &mut dyn Write, event: &NavigationEvent) -> Result<(), CliError> {
    serde_json::to_writer(&mut *writer, &EventRecord::from(event))
        .map_err(CliError::SerializeEvent)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)
}
