//! Reroute coordination: single-flight fetching and candidate selection.

mod coordinator;
mod similarity;

pub use coordinator::{RerouteCoordinator, RerouteReason, RerouteResponse};
pub use similarity::{damerau_levenshtein, select_route};
