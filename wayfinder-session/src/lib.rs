//! Background navigation session for the wayfinder engine.
//!
//! A [`NavigationSession`] drives a
//! [`RouteProcessor`](wayfinder_core::RouteProcessor) from a single worker
//! task. Location fixes are coalesced, reroutes run one at a time through a
//! [`RerouteCoordinator`](reroute::RerouteCoordinator), and results are
//! published in order on an [`EventStream`].

pub mod error;
pub mod reroute;
pub mod session;

pub use error::SessionError;
pub use reroute::{RerouteReason, damerau_levenshtein, select_route};
pub use session::{EventStream, NavigationEvent, NavigationListener, NavigationSession};
