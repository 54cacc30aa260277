//! Core turn-by-turn navigation engine.
//!
//! Location fixes flow through a [`RouteProcessor`], which snaps them onto
//! the active [`Route`], measures [`RouteProgress`], advances through steps
//! and legs, detects when the user has left the route and evaluates
//! milestones. Everything here is synchronous and deterministic; the
//! background session that drives it lives in `wayfinder-session`.
//!
//! Constructors validate their input and return `Result` so malformed
//! routes are rejected before navigation starts.

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod config;
pub mod geometry;
pub mod milestone;
pub mod off_route;
pub mod position;
pub mod processor;
pub mod progress;
pub mod route;
pub mod route_fetch;
pub mod snap;
#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;

pub use config::{ConfigError, NavigationConfig};
pub use geometry::GeometryError;
pub use milestone::{Milestone, MilestoneEngine, MilestoneEvent, Trigger, TriggerProperty};
pub use off_route::{OffRoute, OffRouteDetector, OffRouteState};
pub use position::GeoPosition;
pub use processor::{RouteProcessor, TickOutcome};
pub use progress::RouteProgress;
pub use route::{Leg, Maneuver, ManeuverType, Route, RouteError, Step};
pub use route_fetch::{RouteFetchError, RouteFetcher, RouteRequest};
pub use snap::{Snap, SnapToRoute};
