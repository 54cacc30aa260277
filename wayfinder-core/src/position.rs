//! Location fixes reported by a positioning source.

use std::time::Duration;

use geo::Point;

/// A single location fix.
///
/// `bearing` is in degrees clockwise from north, `speed` in metres per second
/// and `accuracy` is the horizontal accuracy radius in metres. `timestamp` is
/// measured from an arbitrary monotonic epoch chosen by the source.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoPosition {
    /// Longitude/latitude of the fix.
    pub point: Point<f64>,
    /// Heading in degrees.
    pub bearing: f64,
    /// Ground speed in metres per second.
    pub speed: f64,
    /// Horizontal accuracy in metres.
    pub accuracy: f64,
    /// Time of the fix.
    pub timestamp: Duration,
}

impl GeoPosition {
    /// Build a stationary fix with perfect accuracy.
    ///
    /// ```
    /// use std::time::Duration;
    /// use geo::Point;
    /// use wayfinder_core::GeoPosition;
    ///
    /// let fix = GeoPosition::new(Point::new(13.4, 52.5), Duration::from_secs(1))
    ///     .with_speed(8.0)
    ///     .with_bearing(90.0);
    /// assert_eq!(fix.longitude(), 13.4);
    /// assert!(fix.is_moving());
    /// ```
    pub fn new(point: Point<f64>, timestamp: Duration) -> Self {
        Self {
            point,
            bearing: 0.0,
            speed: 0.0,
            accuracy: 0.0,
            timestamp,
        }
    }

    /// Replace the position.
    #[must_use]
    pub fn with_point(mut self, point: Point<f64>) -> Self {
        self.point = point;
        self
    }

    /// Replace the heading.
    #[must_use]
    pub fn with_bearing(mut self, bearing: f64) -> Self {
        self.bearing = bearing;
        self
    }

    /// Replace the speed.
    #[must_use]
    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = speed;
        self
    }

    /// Replace the accuracy radius.
    #[must_use]
    pub fn with_accuracy(mut self, accuracy: f64) -> Self {
        self.accuracy = accuracy;
        self
    }

    /// Longitude in degrees.
    pub fn longitude(&self) -> f64 {
        self.point.x()
    }

    /// Latitude in degrees.
    pub fn latitude(&self) -> f64 {
        self.point.y()
    }

    /// Whether the fix reports a usable, positive speed.
    ///
    /// Bearings from stationary fixes are unreliable, so dead reckoning and
    /// heading-based decisions are skipped when this is false.
    pub fn is_moving(&self) -> bool {
        self.speed.is_finite() && self.speed > 0.0
    }
}
