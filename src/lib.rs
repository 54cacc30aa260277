//! Facade crate for the Wayfinder turn-by-turn navigation engine.
//!
//! This crate re-exports the core navigation types and exposes the background
//! session and the file adapters behind feature flags.

#![forbid(unsafe_code)]

pub use wayfinder_core::{
    GeoPosition, GeometryError, Leg, Maneuver, ManeuverType, Milestone, MilestoneEngine,
    MilestoneEvent, NavigationConfig, Route, RouteError, RouteFetchError, RouteFetcher,
    RouteProcessor, RouteProgress, RouteRequest, Step, TickOutcome, Trigger, TriggerProperty,
};

/// Geometry helpers shared by every stage of the pipeline.
pub use wayfinder_core::geometry;

/// The standard milestone set and trigger building blocks.
pub use wayfinder_core::milestone;

#[cfg(feature = "session")]
pub use wayfinder_session::{
    EventStream, NavigationEvent, NavigationListener, NavigationSession, SessionError,
};

#[cfg(feature = "data")]
pub use wayfinder_data::{
    DirectionsError, FileRouteFetcher, TraceError, load_routes, load_trace, parse_routes,
    parse_trace,
};
