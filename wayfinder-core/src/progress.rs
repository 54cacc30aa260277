//! Snapshot of where the user is along a route.

use std::sync::Arc;
use std::time::Duration;

use geo::Point;

use crate::geometry::{GeometryError, LengthUnit, line_slice, path_length};
use crate::route::{Leg, Route, Step};

/// Immutable progress snapshot produced once per processed location.
///
/// Indices are validated on construction, so the accessors that return the
/// current leg and step cannot fail.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use std::time::Duration;
/// use geo::{Coord, LineString, Point};
/// use wayfinder_core::{Leg, Maneuver, ManeuverType, Route, RouteProgress, Step};
///
/// let step = Step::from_geometry(
///     "Main St",
///     Maneuver::new(ManeuverType::Depart, Point::new(0.0, 0.0), 0.0),
///     LineString::new(vec![Coord { x: 0.0, y: 0.0 }, Coord { x: 0.0, y: 0.002 }]),
///     Duration::from_secs(20),
/// );
/// let route = Arc::new(Route::from_legs(vec![Leg::new("Main St", vec![step])])?);
/// let progress = RouteProgress::compute(route, 0, 0, Point::new(0.0, 0.001))?;
/// assert!((progress.fraction_traveled() - 0.5).abs() < 1e-6);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RouteProgress {
    route: Arc<Route>,
    leg_index: usize,
    step_index: usize,
    snapped_position: Point<f64>,
    step_distance_remaining: f64,
    leg_distance_remaining: f64,
    distance_remaining: f64,
    fraction_traveled: f64,
}

impl RouteProgress {
    /// Compute progress for a position already snapped onto the given step.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::IndexOutOfRange`] when the leg or step does
    /// not exist.
    pub fn compute(
        route: Arc<Route>,
        leg_index: usize,
        step_index: usize,
        snapped_position: Point<f64>,
    ) -> Result<Self, GeometryError> {
        let leg = route.leg(leg_index)?;
        let step = route.step(leg_index, step_index)?;
        let step_end = step
            .geometry
            .0
            .last()
            .copied()
            .map(Point::from)
            .ok_or(GeometryError::EmptyGeometry)?;
        let remaining = line_slice(snapped_position, step_end, &step.geometry)?;
        let step_distance_remaining = path_length(&remaining, LengthUnit::Meters);
        let leg_distance_remaining = step_distance_remaining
            + leg
                .steps
                .iter()
                .skip(step_index + 1)
                .map(|s| s.distance)
                .sum::<f64>();
        let distance_remaining = leg_distance_remaining
            + route
                .legs()
                .iter()
                .skip(leg_index + 1)
                .map(|l| l.distance)
                .sum::<f64>();
        let fraction_traveled = fraction(distance_remaining, route.distance());

        Ok(Self {
            route,
            leg_index,
            step_index,
            snapped_position,
            step_distance_remaining,
            leg_distance_remaining,
            distance_remaining,
            fraction_traveled,
        })
    }

    /// Route this snapshot refers to.
    pub fn route(&self) -> &Arc<Route> {
        &self.route
    }

    /// Index of the current leg.
    pub fn leg_index(&self) -> usize {
        self.leg_index
    }

    /// Index of the current step within its leg.
    pub fn step_index(&self) -> usize {
        self.step_index
    }

    /// Position projected onto the current step.
    pub fn snapped_position(&self) -> Point<f64> {
        self.snapped_position
    }

    /// Metres from the snapped position to the end of the current step.
    pub fn step_distance_remaining(&self) -> f64 {
        self.step_distance_remaining
    }

    /// Metres from the snapped position to the end of the current leg.
    pub fn leg_distance_remaining(&self) -> f64 {
        self.leg_distance_remaining
    }

    /// Metres from the snapped position to the destination.
    pub fn distance_remaining(&self) -> f64 {
        self.distance_remaining
    }

    /// Share of the route completed, in `[0, 1]`.
    ///
    /// A route of zero length counts as complete.
    pub fn fraction_traveled(&self) -> f64 {
        self.fraction_traveled
    }

    /// Metres travelled since the start of the route.
    pub fn distance_traveled(&self) -> f64 {
        (self.route.distance() - self.distance_remaining).max(0.0)
    }

    /// Expected time to the destination.
    pub fn duration_remaining(&self) -> Duration {
        scale(self.route.duration(), 1.0 - self.fraction_traveled)
    }

    /// The leg being travelled.
    pub fn current_leg(&self) -> &Leg {
        &self.route.legs()[self.leg_index]
    }

    /// The step being travelled.
    pub fn current_step(&self) -> &Step {
        &self.current_leg().steps[self.step_index]
    }

    /// The step after the current one within the same leg.
    pub fn upcoming_step(&self) -> Option<&Step> {
        self.current_leg().steps.get(self.step_index + 1)
    }

    /// Where the next maneuver takes place.
    ///
    /// Falls back to the first maneuver of the next leg, then to the end of
    /// the current step.
    pub fn next_maneuver_location(&self) -> Point<f64> {
        if let Some(step) = self.upcoming_step() {
            return step.maneuver.location;
        }
        if let Some(step) = self
            .route
            .legs()
            .get(self.leg_index + 1)
            .and_then(|leg| leg.steps.first())
        {
            return step.maneuver.location;
        }
        self.current_step()
            .geometry
            .0
            .last()
            .copied()
            .map_or(self.snapped_position, Point::from)
    }

    /// Metres travelled along the current step.
    pub fn step_distance_traveled(&self) -> f64 {
        (self.current_step().distance - self.step_distance_remaining).max(0.0)
    }

    /// Share of the current step completed, in `[0, 1]`.
    pub fn step_fraction_traveled(&self) -> f64 {
        fraction(self.step_distance_remaining, self.current_step().distance)
    }

    /// Expected time to the end of the current step.
    pub fn step_duration_remaining(&self) -> Duration {
        scale(
            self.current_step().duration,
            1.0 - self.step_fraction_traveled(),
        )
    }

    /// Share of the current leg completed, in `[0, 1]`.
    pub fn leg_fraction_traveled(&self) -> f64 {
        fraction(self.leg_distance_remaining, self.current_leg().distance)
    }

    /// Expected time to the end of the current leg.
    pub fn leg_duration_remaining(&self) -> Duration {
        scale(
            self.current_leg().duration,
            1.0 - self.leg_fraction_traveled(),
        )
    }

    /// Number of waypoints still to reach, including the destination.
    pub fn remaining_waypoints(&self) -> usize {
        self.route.legs().len() - self.leg_index
    }

    /// Whether the current step is the first of its leg.
    pub fn is_first_step(&self) -> bool {
        self.step_index == 0
    }

    /// Whether the current step is the last of its leg.
    pub fn is_last_step(&self) -> bool {
        self.step_index + 1 == self.current_leg().steps.len()
    }

    /// Whether the current leg is the first of the route.
    pub fn is_first_leg(&self) -> bool {
        self.leg_index == 0
    }

    /// Whether the current leg is the last of the route.
    pub fn is_last_leg(&self) -> bool {
        self.leg_index + 1 == self.route.legs().len()
    }
}

fn fraction(remaining: f64, total: f64) -> f64 {
    if total > 0.0 {
        (1.0 - remaining / total).clamp(0.0, 1.0)
    } else {
        1.0
    }
}

fn scale(duration: Duration, factor: f64) -> Duration {
    if factor.is_finite() {
        duration.mul_f64(factor.clamp(0.0, 1.0))
    } else {
        Duration::ZERO
    }
}
