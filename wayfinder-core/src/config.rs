//! Tunables for snapping, off-route detection and rerouting.

use std::time::Duration;

use thiserror::Error;

/// Default radius in metres around a maneuver within which a step may advance.
pub const DEFAULT_MANEUVER_ZONE_RADIUS: f64 = 40.0;
/// Default tolerance in degrees between heading and the next step's bearing.
pub const DEFAULT_MAX_TURN_COMPLETION_OFFSET: f64 = 30.0;
/// Default maximum correction in degrees applied to a reported bearing.
pub const DEFAULT_MAX_MANIPULATED_COURSE_ANGLE: f64 = 25.0;
/// Default look-ahead used for dead reckoning.
pub const DEFAULT_DEAD_RECKONING_INTERVAL: Duration = Duration::from_secs(1);
/// Default ceiling in metres on the off-route radius.
pub const DEFAULT_MAXIMUM_DISTANCE_OFF_ROUTE: f64 = 50.0;
/// Default minimum spacing between off-route reports.
pub const DEFAULT_REROUTE_DEBOUNCE: Duration = Duration::from_secs(3);
/// Default period between background route refreshes.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(300);
/// Default distance in metres at which the destination counts as reached.
pub const DEFAULT_ARRIVAL_THRESHOLD: f64 = 25.0;
/// Default age after which an in-flight reroute may be replaced.
pub const DEFAULT_REROUTE_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors returned by [`NavigationConfig::validate`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A distance was negative or not finite.
    #[error("{field} must be a finite, non-negative distance, got {value}")]
    InvalidDistance {
        /// Name of the offending setting.
        field: &'static str,
        /// Value that was supplied.
        value: f64,
    },
    /// An angle fell outside `0..=180` degrees.
    #[error("{field} must be between 0 and 180 degrees, got {value}")]
    InvalidAngle {
        /// Name of the offending setting.
        field: &'static str,
        /// Value that was supplied.
        value: f64,
    },
}

/// Navigation tunables.
///
/// A zero [`NavigationConfig::refresh_interval`] disables periodic refreshes.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use wayfinder_core::NavigationConfig;
///
/// let config = NavigationConfig::default()
///     .with_maximum_distance_off_route(75.0)
///     .with_refresh_interval(Duration::ZERO);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.maneuver_zone_radius, 40.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct NavigationConfig {
    /// Radius in metres around a maneuver within which a step may advance.
    pub maneuver_zone_radius: f64,
    /// Tolerance in degrees between heading and the next step's bearing.
    pub max_turn_completion_offset: f64,
    /// Maximum correction in degrees applied to a reported bearing.
    pub max_manipulated_course_angle: f64,
    /// Look-ahead used for dead reckoning.
    pub dead_reckoning_interval: Duration,
    /// Ceiling in metres on the off-route radius.
    pub maximum_distance_off_route: f64,
    /// Minimum spacing between off-route reports.
    pub reroute_debounce: Duration,
    /// Period between background route refreshes.
    pub refresh_interval: Duration,
    /// Distance in metres at which the destination counts as reached.
    pub arrival_threshold: f64,
    /// Age after which an in-flight reroute may be replaced.
    pub reroute_timeout: Duration,
    /// Report snapped rather than raw positions while on route.
    pub snap_to_route: bool,
    /// Run the off-route detector.
    pub enable_off_route_detection: bool,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            maneuver_zone_radius: DEFAULT_MANEUVER_ZONE_RADIUS,
            max_turn_completion_offset: DEFAULT_MAX_TURN_COMPLETION_OFFSET,
            max_manipulated_course_angle: DEFAULT_MAX_MANIPULATED_COURSE_ANGLE,
            dead_reckoning_interval: DEFAULT_DEAD_RECKONING_INTERVAL,
            maximum_distance_off_route: DEFAULT_MAXIMUM_DISTANCE_OFF_ROUTE,
            reroute_debounce: DEFAULT_REROUTE_DEBOUNCE,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            arrival_threshold: DEFAULT_ARRIVAL_THRESHOLD,
            reroute_timeout: DEFAULT_REROUTE_TIMEOUT,
            snap_to_route: true,
            enable_off_route_detection: true,
        }
    }
}

impl NavigationConfig {
    /// Set the maneuver zone radius.
    #[must_use]
    pub fn with_maneuver_zone_radius(mut self, meters: f64) -> Self {
        self.maneuver_zone_radius = meters;
        self
    }

    /// Set the turn completion tolerance.
    #[must_use]
    pub fn with_max_turn_completion_offset(mut self, degrees: f64) -> Self {
        self.max_turn_completion_offset = degrees;
        self
    }

    /// Set the maximum bearing correction.
    #[must_use]
    pub fn with_max_manipulated_course_angle(mut self, degrees: f64) -> Self {
        self.max_manipulated_course_angle = degrees;
        self
    }

    /// Set the dead-reckoning look-ahead.
    #[must_use]
    pub fn with_dead_reckoning_interval(mut self, interval: Duration) -> Self {
        self.dead_reckoning_interval = interval;
        self
    }

    /// Set the off-route radius ceiling.
    #[must_use]
    pub fn with_maximum_distance_off_route(mut self, meters: f64) -> Self {
        self.maximum_distance_off_route = meters;
        self
    }

    /// Set the off-route report spacing.
    #[must_use]
    pub fn with_reroute_debounce(mut self, debounce: Duration) -> Self {
        self.reroute_debounce = debounce;
        self
    }

    /// Set the refresh period; zero disables refreshes.
    #[must_use]
    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    /// Set the arrival threshold.
    #[must_use]
    pub fn with_arrival_threshold(mut self, meters: f64) -> Self {
        self.arrival_threshold = meters;
        self
    }

    /// Set the in-flight reroute timeout.
    #[must_use]
    pub fn with_reroute_timeout(mut self, timeout: Duration) -> Self {
        self.reroute_timeout = timeout;
        self
    }

    /// Toggle reporting of snapped positions.
    #[must_use]
    pub fn with_snap_to_route(mut self, enabled: bool) -> Self {
        self.snap_to_route = enabled;
        self
    }

    /// Toggle the off-route detector.
    #[must_use]
    pub fn with_off_route_detection(mut self, enabled: bool) -> Self {
        self.enable_off_route_detection = enabled;
        self
    }

    /// Check that every distance and angle is usable.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("maneuver_zone_radius", self.maneuver_zone_radius),
            ("maximum_distance_off_route", self.maximum_distance_off_route),
            ("arrival_threshold", self.arrival_threshold),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidDistance { field, value });
            }
        }
        for (field, value) in [
            ("max_turn_completion_offset", self.max_turn_completion_offset),
            (
                "max_manipulated_course_angle",
                self.max_manipulated_course_angle,
            ),
        ] {
            if !(0.0..=180.0).contains(&value) {
                return Err(ConfigError::InvalidAngle { field, value });
            }
        }
        Ok(())
    }
}
