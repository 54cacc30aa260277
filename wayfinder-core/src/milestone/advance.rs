//! Step and leg advancement rules.

use log::debug;

use crate::config::NavigationConfig;
use crate::geometry::angle_difference;
use crate::position::GeoPosition;
use crate::progress::RouteProgress;
use crate::route::ManeuverType;

/// Metres left on a leg below which the next leg begins.
pub const LEG_COMPLETION_DISTANCE: f64 = 5.0;

/// Step lengths in metres at or below which a step counts as a point.
const ZERO_LENGTH_STEP: f64 = 0.5;

/// Where the user should move to, if anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Move to the given step of the current leg.
    Step(usize),
    /// Move to the first step of the given leg.
    Leg(usize),
}

/// Decide whether progress should move past the current step.
///
/// A step completes when the user is inside the maneuver zone heading along
/// the upcoming step, or when a point-like arrival step is within the arrival
/// threshold. A leg completes when its last step is finished and further legs
/// remain.
pub fn next_position(
    position: &GeoPosition,
    progress: &RouteProgress,
    config: &NavigationConfig,
) -> Option<Advance> {
    let remaining = progress.step_distance_remaining();
    if let Some(upcoming) = progress.upcoming_step() {
        let heading_matches = position.is_moving()
            && angle_difference(position.bearing, upcoming.maneuver.bearing_after)
                <= config.max_turn_completion_offset;
        if heading_matches && remaining <= config.maneuver_zone_radius {
            debug!(
                "completed step {} of leg {} with {remaining:.1} m to spare",
                progress.step_index(),
                progress.leg_index()
            );
            return Some(Advance::Step(progress.step_index() + 1));
        }
        let point_like_arrival = upcoming.maneuver.kind == ManeuverType::Arrive
            && upcoming.distance <= ZERO_LENGTH_STEP;
        if point_like_arrival && remaining <= config.arrival_threshold {
            return Some(Advance::Step(progress.step_index() + 1));
        }
        return None;
    }
    if !progress.is_last_leg() && progress.leg_distance_remaining() < LEG_COMPLETION_DISTANCE {
        debug!("completed leg {}", progress.leg_index());
        return Some(Advance::Leg(progress.leg_index() + 1));
    }
    None
}
