//! Route hierarchy: a [`Route`] owns [`Leg`]s, which own [`Step`]s, each of
//! which begins with a [`Maneuver`].

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use geo::{LineString, Point};
use thiserror::Error;

use crate::geometry::{GeometryError, IndexKind, LengthUnit, path_length};

/// Separator used when joining leg summaries into a route signature.
pub const LEG_SUMMARY_SEPARATOR: &str = ";";

/// Kind of action a driver performs at the start of a step.
///
/// Unknown kinds are preserved verbatim in [`ManeuverType::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(from = "String", into = "String")
)]
pub enum ManeuverType {
    /// Leave the origin or a waypoint.
    Depart,
    /// Reach a waypoint or the destination.
    Arrive,
    /// Turn at an intersection.
    Turn,
    /// Continue on the same road.
    Continue,
    /// The road changes name without a turn.
    NewName,
    /// Merge onto another road.
    Merge,
    /// Take an entry ramp.
    OnRamp,
    /// Take an exit ramp.
    OffRamp,
    /// Keep to one side at a fork.
    Fork,
    /// Turn at the end of a road.
    EndOfRoad,
    /// Traverse a roundabout.
    Roundabout,
    /// Traverse a large named rotary.
    Rotary,
    /// Turn at a small roundabout treated as an intersection.
    RoundaboutTurn,
    /// Informational change with no turn.
    Notification,
    /// Any other maneuver name.
    Other(String),
}

impl ManeuverType {
    /// Return the wire name used by Directions-style services.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Depart => "depart",
            Self::Arrive => "arrive",
            Self::Turn => "turn",
            Self::Continue => "continue",
            Self::NewName => "new name",
            Self::Merge => "merge",
            Self::OnRamp => "on ramp",
            Self::OffRamp => "off ramp",
            Self::Fork => "fork",
            Self::EndOfRoad => "end of road",
            Self::Roundabout => "roundabout",
            Self::Rotary => "rotary",
            Self::RoundaboutTurn => "roundabout turn",
            Self::Notification => "notification",
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for ManeuverType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ManeuverType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "depart" => Self::Depart,
            "arrive" => Self::Arrive,
            "turn" => Self::Turn,
            "continue" => Self::Continue,
            "new name" => Self::NewName,
            "merge" => Self::Merge,
            "on ramp" => Self::OnRamp,
            "off ramp" => Self::OffRamp,
            "fork" => Self::Fork,
            "end of road" => Self::EndOfRoad,
            "roundabout" => Self::Roundabout,
            "rotary" => Self::Rotary,
            "roundabout turn" => Self::RoundaboutTurn,
            "notification" => Self::Notification,
            other => Self::Other(other.to_owned()),
        })
    }
}

impl From<String> for ManeuverType {
    fn from(value: String) -> Self {
        match value.parse() {
            Ok(kind) => kind,
            Err(never) => match never {},
        }
    }
}

impl From<ManeuverType> for String {
    fn from(value: ManeuverType) -> Self {
        match value {
            ManeuverType::Other(name) => name,
            known => known.as_str().to_owned(),
        }
    }
}

/// The action at the start of a [`Step`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Maneuver {
    /// Kind of maneuver.
    pub kind: ManeuverType,
    /// Direction qualifier such as `left` or `slight right`.
    pub modifier: Option<String>,
    /// Where the maneuver takes place.
    pub location: Point<f64>,
    /// Heading in degrees before the maneuver.
    pub bearing_before: f64,
    /// Heading in degrees after the maneuver.
    pub bearing_after: f64,
    /// Pre-rendered instruction text, if the route service supplied one.
    pub instruction: Option<String>,
}

impl Maneuver {
    /// Build a maneuver with no modifier or instruction text.
    pub fn new(kind: ManeuverType, location: Point<f64>, bearing_after: f64) -> Self {
        Self {
            kind,
            modifier: None,
            location,
            bearing_before: 0.0,
            bearing_after,
            instruction: None,
        }
    }

    /// Attach a direction modifier.
    #[must_use]
    pub fn with_modifier(mut self, modifier: impl Into<String>) -> Self {
        self.modifier = Some(modifier.into());
        self
    }

    /// Set the heading before the maneuver.
    #[must_use]
    pub fn with_bearing_before(mut self, bearing_before: f64) -> Self {
        self.bearing_before = bearing_before;
        self
    }

    /// Attach pre-rendered instruction text.
    #[must_use]
    pub fn with_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.instruction = Some(instruction.into());
        self
    }
}

/// A stretch of road ending at the next maneuver.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Step {
    /// Road name, possibly empty.
    pub name: String,
    /// Path of the step from its maneuver to the next.
    pub geometry: LineString<f64>,
    /// Length in metres.
    pub distance: f64,
    /// Expected travel time.
    pub duration: Duration,
    /// Maneuver that begins the step.
    pub maneuver: Maneuver,
}

impl Step {
    /// Build a step whose distance is measured from `geometry`.
    pub fn from_geometry(
        name: impl Into<String>,
        maneuver: Maneuver,
        geometry: LineString<f64>,
        duration: Duration,
    ) -> Self {
        let distance = path_length(&geometry, LengthUnit::Meters);
        Self {
            name: name.into(),
            geometry,
            distance,
            duration,
            maneuver,
        }
    }
}

/// Portion of a route between two consecutive waypoints.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Leg {
    /// Human-readable summary, typically the principal road names.
    pub summary: String,
    /// Steps in travel order.
    pub steps: Vec<Step>,
    /// Length in metres.
    pub distance: f64,
    /// Expected travel time.
    pub duration: Duration,
}

impl Leg {
    /// Build a leg whose distance and duration are the sums of its steps.
    pub fn new(summary: impl Into<String>, steps: Vec<Step>) -> Self {
        let distance = steps.iter().map(|s| s.distance).sum();
        let duration = steps.iter().map(|s| s.duration).sum();
        Self {
            summary: summary.into(),
            steps,
            distance,
            duration,
        }
    }
}

/// Errors returned by [`Route::new`].
#[derive(Debug, Error, PartialEq)]
pub enum RouteError {
    /// The route had no legs.
    #[error("route must contain at least one leg")]
    NoLegs,
    /// A leg had no steps.
    #[error("leg {leg_index} must contain at least one step")]
    EmptyLeg {
        /// Index of the offending leg.
        leg_index: usize,
    },
    /// A step had no coordinates.
    #[error("step {step_index} of leg {leg_index} has no geometry")]
    EmptyStepGeometry {
        /// Index of the leg containing the step.
        leg_index: usize,
        /// Index of the step within its leg.
        step_index: usize,
    },
    /// A distance was negative or not finite.
    #[error("{field} must be finite and non-negative, got {value}")]
    InvalidDistance {
        /// Name of the offending measure.
        field: &'static str,
        /// Value that was supplied.
        value: f64,
    },
}

/// An immutable, validated route.
///
/// Every route has at least one leg, every leg at least one step and every
/// step at least one coordinate.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use geo::{Coord, LineString, Point};
/// use wayfinder_core::{Leg, Maneuver, ManeuverType, Route, Step};
///
/// let geometry = LineString::new(vec![Coord { x: 0.0, y: 0.0 }, Coord { x: 0.0, y: 0.001 }]);
/// let step = Step::from_geometry(
///     "Main St",
///     Maneuver::new(ManeuverType::Depart, Point::new(0.0, 0.0), 0.0),
///     geometry,
///     Duration::from_secs(10),
/// );
/// let route = Route::from_legs(vec![Leg::new("Main St", vec![step])])?;
/// assert_eq!(route.legs().len(), 1);
/// assert_eq!(route.destination(), Point::new(0.0, 0.001));
/// # Ok::<(), wayfinder_core::RouteError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Route {
    legs: Vec<Leg>,
    distance: f64,
    duration: Duration,
    geometry: LineString<f64>,
    #[cfg_attr(feature = "serde", serde(skip))]
    step_path: LineString<f64>,
    /// Metres along `step_path` at which each step ends, per leg.
    #[cfg_attr(feature = "serde", serde(skip))]
    step_ends: Vec<Vec<f64>>,
}

impl Route {
    /// Validate and construct a route.
    ///
    /// When `geometry` is empty the overview line is assembled from the step
    /// geometries.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError`] when the hierarchy is empty at any level or a
    /// distance is negative or not finite.
    pub fn new(
        legs: Vec<Leg>,
        distance: f64,
        duration: Duration,
        geometry: LineString<f64>,
    ) -> Result<Self, RouteError> {
        if legs.is_empty() {
            return Err(RouteError::NoLegs);
        }
        check_distance("route distance", distance)?;
        for (leg_index, leg) in legs.iter().enumerate() {
            if leg.steps.is_empty() {
                return Err(RouteError::EmptyLeg { leg_index });
            }
            check_distance("leg distance", leg.distance)?;
            for (step_index, step) in leg.steps.iter().enumerate() {
                if step.geometry.0.is_empty() {
                    return Err(RouteError::EmptyStepGeometry {
                        leg_index,
                        step_index,
                    });
                }
                check_distance("step distance", step.distance)?;
            }
        }
        let step_path = concatenate_steps(&legs);
        let step_ends = step_end_offsets(&legs);
        let geometry = if geometry.0.is_empty() {
            step_path.clone()
        } else {
            geometry
        };
        Ok(Self {
            legs,
            distance,
            duration,
            geometry,
            step_path,
            step_ends,
        })
    }

    /// Build a route whose totals and overview geometry derive from `legs`.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError`] under the same conditions as [`Route::new`].
    pub fn from_legs(legs: Vec<Leg>) -> Result<Self, RouteError> {
        let distance = legs.iter().map(|l| l.distance).sum();
        let duration = legs.iter().map(|l| l.duration).sum();
        Self::new(legs, distance, duration, LineString::new(Vec::new()))
    }

    /// Legs in travel order.
    pub fn legs(&self) -> &[Leg] {
        &self.legs
    }

    /// Total length in metres.
    pub fn distance(&self) -> f64 {
        self.distance
    }

    /// Total expected travel time.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Overview line of the whole route.
    pub fn geometry(&self) -> &LineString<f64> {
        &self.geometry
    }

    /// Step geometries joined end to end.
    ///
    /// Unlike [`Route::geometry`] this is always measured from the steps, so
    /// offsets along it agree with per-step remaining distances.
    pub fn step_path(&self) -> &LineString<f64> {
        &self.step_path
    }

    /// Length of [`Route::step_path`] in metres.
    pub fn step_path_length(&self) -> f64 {
        self.step_ends
            .last()
            .and_then(|ends| ends.last())
            .copied()
            .unwrap_or(0.0)
    }

    /// Metres along [`Route::step_path`] for a point on the given step with
    /// `step_remaining` metres of that step's geometry still ahead.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::IndexOutOfRange`] for an unknown leg or step.
    pub fn step_path_offset(
        &self,
        leg_index: usize,
        step_index: usize,
        step_remaining: f64,
    ) -> Result<f64, GeometryError> {
        let step_end = self
            .step_ends
            .get(leg_index)
            .and_then(|ends| ends.get(step_index))
            .copied();
        match step_end {
            Some(end) => Ok((end - step_remaining).max(0.0)),
            None => self.step(leg_index, step_index).map(|_| 0.0),
        }
    }

    /// Look up a leg.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::IndexOutOfRange`] for an unknown leg.
    pub fn leg(&self, leg_index: usize) -> Result<&Leg, GeometryError> {
        self.legs
            .get(leg_index)
            .ok_or(GeometryError::IndexOutOfRange {
                kind: IndexKind::Leg,
                index: leg_index,
                len: self.legs.len(),
            })
    }

    /// Look up a step.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::IndexOutOfRange`] for an unknown leg or step.
    pub fn step(&self, leg_index: usize, step_index: usize) -> Result<&Step, GeometryError> {
        let leg = self.leg(leg_index)?;
        leg.steps
            .get(step_index)
            .ok_or(GeometryError::IndexOutOfRange {
                kind: IndexKind::Step,
                index: step_index,
                len: leg.steps.len(),
            })
    }

    /// Final coordinate of the route.
    pub fn destination(&self) -> Point<f64> {
        // Validation guarantees a non-empty final step.
        self.legs
            .last()
            .and_then(|leg| leg.steps.last())
            .and_then(|step| step.geometry.0.last())
            .copied()
            .map_or_else(|| Point::new(0.0, 0.0), Point::from)
    }

    /// Leg summaries joined with [`LEG_SUMMARY_SEPARATOR`].
    ///
    /// Used as the route signature when comparing reroute candidates.
    pub fn leg_summary(&self) -> String {
        self.legs
            .iter()
            .map(|leg| leg.summary.as_str())
            .collect::<Vec<_>>()
            .join(LEG_SUMMARY_SEPARATOR)
    }
}

fn check_distance(field: &'static str, value: f64) -> Result<(), RouteError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(RouteError::InvalidDistance { field, value })
    }
}

fn concatenate_steps(legs: &[Leg]) -> LineString<f64> {
    let mut coords = Vec::new();
    for step in legs.iter().flat_map(|leg| &leg.steps) {
        for coord in &step.geometry.0 {
            if coords.last() != Some(coord) {
                coords.push(*coord);
            }
        }
    }
    LineString::new(coords)
}

fn step_end_offsets(legs: &[Leg]) -> Vec<Vec<f64>> {
    let mut traveled = 0.0;
    legs.iter()
        .map(|leg| {
            leg.steps
                .iter()
                .map(|step| {
                    traveled += path_length(&step.geometry, LengthUnit::Meters);
                    traveled
                })
                .collect()
        })
        .collect()
}
