//! Off-route detection.
//!
//! [`OffRoute`] decides, per fix, whether the user has left the route.
//! [`OffRouteState`] turns that level signal into an edge-triggered,
//! debounced report.

use std::time::Duration;

use log::debug;

use crate::config::NavigationConfig;
use crate::geometry::{destination, distance, project_onto_line};
use crate::position::GeoPosition;
use crate::progress::RouteProgress;

/// Strategy for deciding whether a fix is off the route.
pub trait OffRoute: Send + Sync {
    /// Return `true` when `position` should be treated as off-route.
    fn is_user_off_route(
        &self,
        position: &GeoPosition,
        progress: &RouteProgress,
        config: &NavigationConfig,
    ) -> bool;
}

/// Dead-reckoning off-route detector.
///
/// The fix is projected forward by one [`NavigationConfig::dead_reckoning_interval`]
/// at its reported speed and bearing. The user is off-route when that future
/// point lies further than [`off_route_radius`] from the snapped position and
/// is not within the same radius of the upcoming step.
#[derive(Debug, Default, Clone, Copy)]
pub struct OffRouteDetector;

impl OffRoute for OffRouteDetector {
    fn is_user_off_route(
        &self,
        position: &GeoPosition,
        progress: &RouteProgress,
        config: &NavigationConfig,
    ) -> bool {
        if !config.enable_off_route_detection {
            return false;
        }
        if !position.is_moving() {
            return false;
        }
        let lookahead = position.speed * config.dead_reckoning_interval.as_secs_f64();
        let future = destination(position.point, position.bearing, lookahead);
        let radius = off_route_radius(position, progress, config);
        let offset = distance(future, progress.snapped_position());
        if offset <= radius {
            return false;
        }
        if let Some(upcoming) = progress.upcoming_step() {
            if let Ok(projection) = project_onto_line(future, &upcoming.geometry) {
                if projection.distance_from_line <= radius {
                    debug!("fix is near the upcoming step, treating as on-route");
                    return false;
                }
            }
        }
        debug!("projected fix is {offset:.1} m from the route, radius {radius:.1} m");
        true
    }
}

/// Radius in metres beyond which a projected fix counts as off-route.
///
/// The radius grows with fix accuracy and the distance left on the step and
/// is capped at [`NavigationConfig::maximum_distance_off_route`].
#[must_use]
pub fn off_route_radius(
    position: &GeoPosition,
    progress: &RouteProgress,
    config: &NavigationConfig,
) -> f64 {
    let accuracy = position.accuracy.max(0.0);
    config
        .maximum_distance_off_route
        .min(accuracy + progress.step_distance_remaining())
}

/// Edge-triggered, debounced off-route flag.
///
/// A report fires on the first off-route fix after being on route, provided
/// no report fired within the debounce window. Returning on route re-arms it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffRouteState {
    off_route: bool,
    armed: bool,
    last_report: Option<Duration>,
}

impl Default for OffRouteState {
    fn default() -> Self {
        Self {
            off_route: false,
            armed: true,
            last_report: None,
        }
    }
}

impl OffRouteState {
    /// Create an armed state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the detector result for the fix taken at `timestamp`.
    ///
    /// Returns `true` when an off-route report should be emitted.
    pub fn update(&mut self, off_route: bool, timestamp: Duration, debounce: Duration) -> bool {
        self.off_route = off_route;
        if !off_route {
            self.armed = true;
            return false;
        }
        if !self.armed {
            return false;
        }
        let debounced = self
            .last_report
            .is_some_and(|last| timestamp.saturating_sub(last) < debounce);
        if debounced {
            return false;
        }
        self.armed = false;
        self.last_report = Some(timestamp);
        true
    }

    /// Whether the latest fix was off-route.
    pub fn is_off_route(&self) -> bool {
        self.off_route
    }

    /// Clear the flag after a new route is adopted.
    ///
    /// The debounce window keeps running from the last report.
    pub fn reset(&mut self) {
        self.off_route = false;
        self.armed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{single_step_route, two_step_route};
    use crate::{Route, Snap, SnapToRoute};
    use geo::Point;
    use rstest::rstest;
    use std::sync::Arc;

    fn progress_for(route: Route, leg: usize, step: usize, fix: &GeoPosition) -> RouteProgress {
        let projection = SnapToRoute.snap(fix, &route, leg, step).expect("projection");
        RouteProgress::compute(Arc::new(route), leg, step, projection.point).expect("progress")
    }

    fn fix(lon: f64, lat: f64) -> GeoPosition {
        GeoPosition::new(Point::new(lon, lat), Duration::ZERO)
            .with_speed(10.0)
            .with_bearing(0.0)
    }

    #[rstest]
    fn on_the_line_is_on_route() {
        let position = fix(0.0, 0.0005);
        let progress = progress_for(single_step_route(), 0, 0, &position);
        assert!(!OffRouteDetector.is_user_off_route(&position, &progress, &NavigationConfig::default()));
    }

    #[rstest]
    fn far_from_the_line_is_off_route() {
        let position = fix(0.001, 0.0005);
        let progress = progress_for(single_step_route(), 0, 0, &position);
        assert!(OffRouteDetector.is_user_off_route(&position, &progress, &NavigationConfig::default()));
    }

    #[rstest]
    fn stationary_fix_is_never_off_route() {
        let position = fix(0.001, 0.0005).with_speed(0.0);
        let progress = progress_for(single_step_route(), 0, 0, &position);
        assert!(!OffRouteDetector.is_user_off_route(&position, &progress, &NavigationConfig::default()));
    }

    #[rstest]
    fn disabled_detection_is_never_off_route() {
        let position = fix(0.001, 0.0005);
        let progress = progress_for(single_step_route(), 0, 0, &position);
        let config = NavigationConfig::default().with_off_route_detection(false);
        assert!(!OffRouteDetector.is_user_off_route(&position, &progress, &config));
    }

    #[rstest]
    fn cutting_the_corner_onto_upcoming_step_is_on_route() {
        // Already heading east along the second step while still matched to the first.
        let position = fix(0.0004, 0.001).with_bearing(90.0).with_accuracy(10.0);
        let progress = progress_for(two_step_route(), 0, 0, &position);
        assert!(progress.step_distance_remaining() < 1e-6);
        assert!(!OffRouteDetector.is_user_off_route(&position, &progress, &NavigationConfig::default()));
    }

    #[rstest]
    #[case(0.0, 20.0)]
    #[case(10.0, 30.0)]
    #[case(100.0, 50.0)]
    fn radius_grows_with_accuracy_up_to_cap(#[case] accuracy: f64, #[case] expected: f64) {
        let position = fix(0.0, 0.0).with_accuracy(accuracy);
        let route = single_step_route();
        let end = route.destination();
        let twenty_short = crate::geometry::destination(end, 180.0, 20.0);
        let progress = RouteProgress::compute(Arc::new(route), 0, 0, twenty_short).expect("progress");
        let radius = off_route_radius(&position, &progress, &NavigationConfig::default());
        assert!((radius - expected).abs() < 1e-3, "got {radius}");
    }

    #[rstest]
    fn report_is_edge_triggered() {
        let debounce = Duration::from_secs(3);
        let mut state = OffRouteState::new();
        assert!(state.update(true, Duration::from_secs(1), debounce));
        assert!(!state.update(true, Duration::from_secs(10), debounce));
        assert!(state.is_off_route());
        assert!(!state.update(false, Duration::from_secs(11), debounce));
        assert!(!state.is_off_route());
        assert!(state.update(true, Duration::from_secs(12), debounce));
    }

    #[rstest]
    fn report_is_debounced() {
        let debounce = Duration::from_secs(3);
        let mut state = OffRouteState::new();
        assert!(state.update(true, Duration::from_secs(1), debounce));
        assert!(!state.update(false, Duration::from_secs(2), debounce));
        assert!(!state.update(true, Duration::from_secs(3), debounce));
        assert!(!state.update(false, Duration::from_secs(4), debounce));
        assert!(state.update(true, Duration::from_secs(5), debounce));
    }
}
