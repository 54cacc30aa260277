//! Snapping raw fixes onto the active step.
//!
//! The [`Snap`] trait lets callers swap in a different map-matching strategy;
//! [`SnapToRoute`] is the default.

use crate::config::NavigationConfig;
use crate::geometry::{
    GeometryError, Projection, along, angle_difference, bearing, distance, project_onto_line, wrap,
};
use crate::position::GeoPosition;
use crate::progress::RouteProgress;
use crate::route::Route;

/// Strategy for matching a fix to the route.
pub trait Snap: Send + Sync {
    /// Project `position` onto the geometry of the given step.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError`] when the step does not exist or has no
    /// coordinates.
    fn snap(
        &self,
        position: &GeoPosition,
        route: &Route,
        leg_index: usize,
        step_index: usize,
    ) -> Result<Projection, GeometryError>;

    /// Bearing to report for `position`, given the progress it produced.
    fn snapped_bearing(
        &self,
        position: &GeoPosition,
        progress: &RouteProgress,
        config: &NavigationConfig,
    ) -> f64;
}

/// Projects onto the current step and nudges the bearing toward the route.
///
/// The bearing correction samples the route one and two dead-reckoning
/// distances ahead of the snapped point and averages the relative angles.
/// The corrected bearing is used only when it differs from the raw bearing by
/// no more than [`NavigationConfig::max_manipulated_course_angle`] and the
/// average relative angle is within
/// [`NavigationConfig::max_turn_completion_offset`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SnapToRoute;

impl Snap for SnapToRoute {
    fn snap(
        &self,
        position: &GeoPosition,
        route: &Route,
        leg_index: usize,
        step_index: usize,
    ) -> Result<Projection, GeometryError> {
        let step = route.step(leg_index, step_index)?;
        project_onto_line(position.point, &step.geometry)
    }

    fn snapped_bearing(
        &self,
        position: &GeoPosition,
        progress: &RouteProgress,
        config: &NavigationConfig,
    ) -> f64 {
        if !position.is_moving() || progress.distance_remaining() <= 0.0 {
            return position.bearing;
        }
        let route = progress.route();
        let line = route.step_path();
        let path_length = route.step_path_length();
        let Ok(traveled) = route.step_path_offset(
            progress.leg_index(),
            progress.step_index(),
            progress.step_distance_remaining(),
        ) else {
            return position.bearing;
        };
        let mut buffer = position.speed * config.dead_reckoning_interval.as_secs_f64();
        if traveled + buffer > path_length {
            buffer = (path_length - traveled) / 2.0;
        }
        let (Ok(near), Ok(far)) = (
            along(line, traveled + buffer),
            along(line, traveled + 2.0 * buffer),
        ) else {
            return position.bearing;
        };
        let snapped = progress.snapped_position();
        if distance(snapped, near) <= f64::EPSILON || distance(snapped, far) <= f64::EPSILON {
            return position.bearing;
        }

        let raw = wrap(position.bearing, -180.0, 180.0);
        let relative = |target| wrap(wrap(bearing(snapped, target), -180.0, 180.0) - raw, -180.0, 180.0);
        let average = (relative(near) + relative(far)) / 2.0;
        let corrected = wrap(raw + average, 0.0, 360.0);

        if angle_difference(corrected, position.bearing) > config.max_manipulated_course_angle {
            return position.bearing;
        }
        if average.abs() <= config.max_turn_completion_offset {
            corrected
        } else {
            position.bearing
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::Leg;
    use crate::test_support::{single_step_route, two_step_route};
    use geo::Point;
    use rstest::{fixture, rstest};
    use std::sync::Arc;
    use std::time::Duration;

    #[fixture]
    fn route() -> Arc<Route> {
        Arc::new(single_step_route())
    }

    fn progress_at(route: &Arc<Route>, position: &GeoPosition) -> RouteProgress {
        let projection = SnapToRoute
            .snap(position, route, 0, 0)
            .expect("projection");
        RouteProgress::compute(Arc::clone(route), 0, 0, projection.point).expect("progress")
    }

    #[rstest]
    fn snaps_onto_step_geometry(route: Arc<Route>) {
        let fix = GeoPosition::new(Point::new(0.0001, 0.001), Duration::ZERO);
        let projection = SnapToRoute.snap(&fix, &route, 0, 0).expect("projection");
        assert!(projection.point.x().abs() < 1e-12);
        assert!((projection.point.y() - 0.001).abs() < 1e-9);
    }

    #[rstest]
    fn rejects_unknown_step(route: Arc<Route>) {
        let fix = GeoPosition::new(Point::new(0.0, 0.0), Duration::ZERO);
        assert!(SnapToRoute.snap(&fix, &route, 0, 1).is_err());
    }

    #[rstest]
    fn pulls_slightly_skewed_bearing_onto_route(route: Arc<Route>) {
        let fix = GeoPosition::new(Point::new(0.00001, 0.0005), Duration::ZERO)
            .with_speed(10.0)
            .with_bearing(10.0);
        let progress = progress_at(&route, &fix);
        let snapped = SnapToRoute.snapped_bearing(&fix, &progress, &NavigationConfig::default());
        assert!(angle_difference(snapped, 0.0) < 1e-6, "got {snapped}");
    }

    #[rstest]
    fn keeps_bearing_beyond_correction_limit(route: Arc<Route>) {
        let fix = GeoPosition::new(Point::new(0.0, 0.0005), Duration::ZERO)
            .with_speed(10.0)
            .with_bearing(60.0);
        let progress = progress_at(&route, &fix);
        let snapped = SnapToRoute.snapped_bearing(&fix, &progress, &NavigationConfig::default());
        assert_eq!(snapped, 60.0);
    }

    #[rstest]
    fn stationary_fix_keeps_raw_bearing(route: Arc<Route>) {
        let fix = GeoPosition::new(Point::new(0.0, 0.0005), Duration::ZERO).with_bearing(12.0);
        let progress = progress_at(&route, &fix);
        let snapped = SnapToRoute.snapped_bearing(&fix, &progress, &NavigationConfig::default());
        assert_eq!(snapped, 12.0);
    }

    #[rstest]
    fn look_ahead_follows_geometry_when_distances_disagree() {
        let mut steps = two_step_route().legs()[0].steps.clone();
        for step in &mut steps {
            step.distance *= 3.0;
        }
        let route = Arc::new(Route::from_legs(vec![Leg::new("Main St, Elm St", steps)]).expect("route"));
        let fix = GeoPosition::new(Point::new(0.00001, 0.0007), Duration::ZERO)
            .with_speed(10.0)
            .with_bearing(10.0);
        let progress = progress_at(&route, &fix);
        let snapped = SnapToRoute.snapped_bearing(&fix, &progress, &NavigationConfig::default());
        assert!(angle_difference(snapped, 0.0) < 1e-6, "got {snapped}");
    }
}
