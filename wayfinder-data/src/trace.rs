//! Recorded position traces.
//!
//! A trace is a JSON array of fixes:
//!
//! ```json
//! [{"longitude": 0.0, "latitude": 0.0005, "bearing": 0.0, "speed": 10.0,
//!   "accuracy": 5.0, "timestamp_ms": 1000}]
//! ```
//!
//! `bearing`, `speed` and `accuracy` default to zero when omitted.

use std::io;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use geo::Point;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use wayfinder_core::GeoPosition;

/// Errors raised while reading a trace.
#[derive(Debug, Error)]
pub enum TraceError {
    /// The file could not be read.
    #[error("failed to read trace from {path}")]
    Io {
        /// File that was being read.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The document was not a trace.
    #[error("malformed trace")]
    Json(#[from] serde_json::Error),
    /// A fix carried an impossible value.
    #[error("fix {index} is invalid: {reason}")]
    InvalidFix {
        /// Position of the fix in the trace.
        index: usize,
        /// What was wrong with it.
        reason: &'static str,
    },
}

/// One recorded fix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TraceFix {
    /// Longitude in degrees.
    pub longitude: f64,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Course over ground in degrees.
    #[serde(default)]
    pub bearing: f64,
    /// Ground speed in metres per second.
    #[serde(default)]
    pub speed: f64,
    /// Horizontal accuracy radius in metres.
    #[serde(default)]
    pub accuracy: f64,
    /// Milliseconds since the start of the recording.
    pub timestamp_ms: u64,
}

impl TraceFix {
    fn check(&self) -> Result<(), &'static str> {
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err("longitude out of range");
        }
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err("latitude out of range");
        }
        if !self.bearing.is_finite() {
            return Err("bearing is not finite");
        }
        if !(self.speed.is_finite() && self.speed >= 0.0) {
            return Err("speed must be finite and non-negative");
        }
        if !(self.accuracy.is_finite() && self.accuracy >= 0.0) {
            return Err("accuracy must be finite and non-negative");
        }
        Ok(())
    }
}

impl From<TraceFix> for GeoPosition {
    fn from(fix: TraceFix) -> Self {
        Self::new(
            Point::new(fix.longitude, fix.latitude),
            Duration::from_millis(fix.timestamp_ms),
        )
        .with_bearing(fix.bearing)
        .with_speed(fix.speed)
        .with_accuracy(fix.accuracy)
    }
}

/// Parse a trace document into positions, in recorded order.
///
/// # Errors
///
/// Returns [`TraceError::Json`] for malformed input and
/// [`TraceError::InvalidFix`] for out-of-range values or timestamps that go
/// backwards.
pub fn parse_trace(json: &str) -> Result<Vec<GeoPosition>, TraceError> {
    let fixes: Vec<TraceFix> = serde_json::from_str(json)?;
    let mut previous = 0;
    fixes
        .into_iter()
        .enumerate()
        .map(|(index, fix)| {
            fix.check()
                .map_err(|reason| TraceError::InvalidFix { index, reason })?;
            if fix.timestamp_ms < previous {
                return Err(TraceError::InvalidFix {
                    index,
                    reason: "timestamp earlier than the previous fix",
                });
            }
            previous = fix.timestamp_ms;
            Ok(fix.into())
        })
        .collect()
}

/// Read and parse a trace file.
///
/// # Errors
///
/// Returns [`TraceError::Io`] when the file cannot be read, otherwise as
/// [`parse_trace`].
pub fn load_trace(path: &Utf8Path) -> Result<Vec<GeoPosition>, TraceError> {
    let json = wayfinder_fs::read_to_string(path).map_err(|source| TraceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_trace(&json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn optional_fields_default_to_zero() {
        let positions =
            parse_trace(r#"[{"longitude": 1.5, "latitude": 2.5, "timestamp_ms": 1500}]"#)
                .expect("valid trace");
        let position = positions[0];
        assert_eq!(position.point, Point::new(1.5, 2.5));
        assert_eq!(position.timestamp, Duration::from_millis(1500));
        assert_eq!(position.speed, 0.0);
        assert_eq!(position.accuracy, 0.0);
    }

    #[rstest]
    fn fields_map_onto_positions() {
        let json = r#"[{"longitude": 0.0, "latitude": 0.0005, "bearing": 90.0,
            "speed": 10.0, "accuracy": 5.0, "timestamp_ms": 1000}]"#;
        let position = parse_trace(json).expect("valid trace")[0];
        assert_eq!(position.bearing, 90.0);
        assert_eq!(position.speed, 10.0);
        assert_eq!(position.accuracy, 5.0);
    }

    #[rstest]
    #[case(r#"[{"longitude": 181.0, "latitude": 0.0, "timestamp_ms": 0}]"#, "longitude out of range")]
    #[case(r#"[{"longitude": 0.0, "latitude": -91.0, "timestamp_ms": 0}]"#, "latitude out of range")]
    #[case(
        r#"[{"longitude": 0.0, "latitude": 0.0, "speed": -1.0, "timestamp_ms": 0}]"#,
        "speed must be finite and non-negative"
    )]
    #[case(
        r#"[{"longitude": 0.0, "latitude": 0.0, "accuracy": -3.0, "timestamp_ms": 0}]"#,
        "accuracy must be finite and non-negative"
    )]
    fn impossible_fixes_are_rejected(#[case] json: &str, #[case] expected: &str) {
        let err = parse_trace(json).expect_err("invalid fix");
        assert!(matches!(
            err,
            TraceError::InvalidFix { index: 0, reason } if reason == expected
        ));
    }

    #[rstest]
    fn timestamps_must_not_go_backwards() {
        let json = r#"[{"longitude": 0.0, "latitude": 0.0, "timestamp_ms": 2000},
            {"longitude": 0.0, "latitude": 0.0, "timestamp_ms": 1000}]"#;
        let err = parse_trace(json).expect_err("out of order");
        assert!(matches!(err, TraceError::InvalidFix { index: 1, .. }));
    }

    #[rstest]
    fn empty_traces_are_allowed() {
        assert!(parse_trace("[]").expect("empty").is_empty());
    }
}
