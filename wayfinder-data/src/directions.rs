//! Directions service response types.
//!
//! The shape mirrors the OSRM route service: a status `code`, an optional
//! `message` and a list of `routes`, each broken into `legs` and `steps`
//! with polyline-encoded geometry.
//!
//! See: <http://project-osrm.org/docs/v5.24.0/api/#route-service>

use std::io;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use geo::{LineString, Point};
use serde::Deserialize;
use thiserror::Error;
use wayfinder_core::geometry::decode_polyline;
use wayfinder_core::{GeometryError, Leg, Maneuver, ManeuverType, Route, RouteError, Step};

/// Errors raised while reading a Directions response.
#[derive(Debug, Error)]
pub enum DirectionsError {
    /// The file could not be read.
    #[error("failed to read routes from {path}")]
    Io {
        /// File that was being read.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The document was not a Directions response.
    #[error("malformed directions response")]
    Json(#[from] serde_json::Error),
    /// The service reported a failure.
    #[error("routing service returned {code}: {message}")]
    Service {
        /// Status code from the response.
        code: String,
        /// Message accompanying the code, empty when absent.
        message: String,
    },
    /// A polyline could not be decoded.
    #[error("route {route_index} has malformed geometry")]
    Geometry {
        /// Index of the offending route in the response.
        route_index: usize,
        /// Decoder failure.
        #[source]
        source: GeometryError,
    },
    /// The decoded route failed validation.
    #[error("route {route_index} is not a valid route")]
    Route {
        /// Index of the offending route in the response.
        route_index: usize,
        /// Validation failure.
        #[source]
        source: RouteError,
    },
    /// A duration was negative or not finite.
    #[error("route {route_index} has invalid duration {seconds}")]
    InvalidDuration {
        /// Index of the offending route in the response.
        route_index: usize,
        /// Value that was supplied, in seconds.
        seconds: f64,
    },
}

/// Route service response.
#[derive(Debug, Deserialize)]
pub struct DirectionsResponse {
    /// Status code, `"Ok"` on success.
    pub code: String,
    /// Optional error message when `code` is not `"Ok"`.
    #[serde(default)]
    pub message: Option<String>,
    /// Candidate routes, best first.
    #[serde(default)]
    pub routes: Vec<DirectionsRoute>,
}

/// One candidate route.
#[derive(Debug, Deserialize)]
pub struct DirectionsRoute {
    /// Length in metres.
    pub distance: f64,
    /// Expected travel time in seconds.
    pub duration: f64,
    /// Encoded overview line; rebuilt from the steps when absent.
    #[serde(default)]
    pub geometry: Option<String>,
    /// Legs between consecutive waypoints.
    pub legs: Vec<DirectionsLeg>,
}

/// Portion of a route between two waypoints.
#[derive(Debug, Deserialize)]
pub struct DirectionsLeg {
    /// Principal road names.
    #[serde(default)]
    pub summary: String,
    /// Length in metres.
    pub distance: f64,
    /// Expected travel time in seconds.
    pub duration: f64,
    /// Steps in travel order.
    pub steps: Vec<DirectionsStep>,
}

/// A single maneuver and the road that follows it.
#[derive(Debug, Deserialize)]
pub struct DirectionsStep {
    /// Road name.
    #[serde(default)]
    pub name: String,
    /// Length in metres.
    pub distance: f64,
    /// Expected travel time in seconds.
    pub duration: f64,
    /// Encoded polyline.
    pub geometry: String,
    /// Maneuver beginning the step.
    pub maneuver: DirectionsManeuver,
}

/// Maneuver description.
#[derive(Debug, Deserialize)]
pub struct DirectionsManeuver {
    /// Maneuver type such as `"turn"` or `"arrive"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Direction qualifier such as `"left"`.
    #[serde(default)]
    pub modifier: Option<String>,
    /// `[longitude, latitude]` of the maneuver.
    pub location: [f64; 2],
    /// Heading before the maneuver, in degrees.
    #[serde(default)]
    pub bearing_before: f64,
    /// Heading after the maneuver, in degrees.
    #[serde(default)]
    pub bearing_after: f64,
    /// Service-provided instruction text.
    #[serde(default)]
    pub instruction: Option<String>,
}

impl DirectionsResponse {
    /// Check if the response indicates success.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.code == "Ok"
    }

    /// Convert every candidate into a validated [`Route`].
    ///
    /// # Errors
    ///
    /// Returns [`DirectionsError::Service`] for a non-`Ok` response and a
    /// per-route error when geometry or timings are invalid.
    pub fn into_routes(self, precision: u8) -> Result<Vec<Route>, DirectionsError> {
        if !self.is_ok() {
            return Err(DirectionsError::Service {
                code: self.code,
                message: self.message.unwrap_or_default(),
            });
        }
        self.routes
            .into_iter()
            .enumerate()
            .map(|(route_index, route)| RouteDecoder { route_index, precision }.route(route))
            .collect()
    }
}

struct RouteDecoder {
    route_index: usize,
    precision: u8,
}

impl RouteDecoder {
    fn route(&self, route: DirectionsRoute) -> Result<Route, DirectionsError> {
        let geometry = match route.geometry.as_deref() {
            Some(encoded) => self.line(encoded)?,
            None => LineString::new(Vec::new()),
        };
        let legs = route
            .legs
            .into_iter()
            .map(|leg| self.leg(leg))
            .collect::<Result<Vec<_>, _>>()?;
        let duration = self.seconds(route.duration)?;
        Route::new(legs, route.distance, duration, geometry).map_err(|source| {
            DirectionsError::Route {
                route_index: self.route_index,
                source,
            }
        })
    }

    fn leg(&self, leg: DirectionsLeg) -> Result<Leg, DirectionsError> {
        let steps = leg
            .steps
            .into_iter()
            .map(|step| self.step(step))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Leg {
            summary: leg.summary,
            steps,
            distance: leg.distance,
            duration: self.seconds(leg.duration)?,
        })
    }

    fn step(&self, step: DirectionsStep) -> Result<Step, DirectionsError> {
        let [longitude, latitude] = step.maneuver.location;
        let mut maneuver = Maneuver::new(
            ManeuverType::from(step.maneuver.kind),
            Point::new(longitude, latitude),
            step.maneuver.bearing_after,
        )
        .with_bearing_before(step.maneuver.bearing_before);
        if let Some(modifier) = step.maneuver.modifier {
            maneuver = maneuver.with_modifier(modifier);
        }
        if let Some(instruction) = step.maneuver.instruction {
            maneuver = maneuver.with_instruction(instruction);
        }
        Ok(Step {
            name: step.name,
            geometry: self.line(&step.geometry)?,
            distance: step.distance,
            duration: self.seconds(step.duration)?,
            maneuver,
        })
    }

    fn line(&self, encoded: &str) -> Result<LineString<f64>, DirectionsError> {
        decode_polyline(encoded, self.precision).map_err(|source| DirectionsError::Geometry {
            route_index: self.route_index,
            source,
        })
    }

    fn seconds(&self, seconds: f64) -> Result<Duration, DirectionsError> {
        Duration::try_from_secs_f64(seconds).map_err(|_| DirectionsError::InvalidDuration {
            route_index: self.route_index,
            seconds,
        })
    }
}

/// Parse a Directions response document into routes.
///
/// # Errors
///
/// Returns [`DirectionsError`] when the JSON is malformed or a route fails to
/// decode.
pub fn parse_routes(json: &str, precision: u8) -> Result<Vec<Route>, DirectionsError> {
    serde_json::from_str::<DirectionsResponse>(json)?.into_routes(precision)
}

/// Read and parse a Directions response file.
///
/// # Errors
///
/// Returns [`DirectionsError::Io`] when the file cannot be read, otherwise as
/// [`parse_routes`].
pub fn load_routes(path: &Utf8Path, precision: u8) -> Result<Vec<Route>, DirectionsError> {
    let json = wayfinder_fs::read_to_string(path).map_err(|source| DirectionsError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_routes(&json, precision)
}
