//! Test helpers for writing replay inputs to disk.

use camino::{Utf8Path, Utf8PathBuf};
use geo::Point;
use std::fs;
use std::time::Duration;
use tempfile::TempDir;
use wayfinder_core::GeoPosition;
use wayfinder_core::test_support::route_with_summaries;
use wayfinder_data::test_support::{directions_json, elm_street_route, trace_json};

use crate::replay::ReplayArgs;

pub(super) fn write_utf8(path: &Utf8Path, contents: &str) {
    fs::write(path, contents).expect("write fixture");
}

/// A fix moving north along "Main St".
pub(super) fn on_route_fix(secs: u64) -> GeoPosition {
    GeoPosition::new(Point::new(0.0, 0.0002), Duration::from_secs(secs))
        .with_speed(10.0)
        .with_bearing(0.0)
}

/// A fix roughly 220 m west of "Main St" and clear of "Elm St".
pub(super) fn off_route_fix(secs: u64) -> GeoPosition {
    GeoPosition::new(Point::new(-0.002, 0.0005), Duration::from_secs(secs))
        .with_speed(10.0)
        .with_bearing(0.0)
}

pub(super) struct ReplayFiles {
    _dir: TempDir,
    pub(super) root: Utf8PathBuf,
    pub(super) route: Utf8PathBuf,
    pub(super) trace: Utf8PathBuf,
    pub(super) alternatives: Utf8PathBuf,
}

impl ReplayFiles {
    pub(super) fn new(fixes: &[GeoPosition]) -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        let route = root.join("route.json");
        let trace = root.join("trace.json");
        let alternatives = root.join("alternatives.json");
        write_utf8(&route, &directions_json(&[elm_street_route()]));
        write_utf8(&trace, &trace_json(fixes));
        write_utf8(
            &alternatives,
            &directions_json(&[
                route_with_summaries(&["Pine St", "Cedar St"]),
                route_with_summaries(&["Main St, Elm St", "Oak St"]),
            ]),
        );
        Self {
            _dir: dir,
            root,
            route,
            trace,
            alternatives,
        }
    }

    pub(super) fn args(&self) -> ReplayArgs {
        ReplayArgs {
            route_path: Some(self.route.clone()),
            trace: Some(self.trace.clone()),
            ..ReplayArgs::default()
        }
    }
}

/// Parse JSON lines and return the `event` tag of each.
pub(super) fn event_kinds(output: &[u8]) -> Vec<String> {
    parse_lines(output)
        .iter()
        .map(|line| line["event"].as_str().expect("event tag").to_owned())
        .collect()
}

pub(super) fn parse_lines(output: &[u8]) -> Vec<serde_json::Value> {
    std::str::from_utf8(output)
        .expect("utf-8 output")
        .lines()
        .map(|line| serde_json::from_str(line).expect("json line"))
        .collect()
}
