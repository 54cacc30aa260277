//! Adapters that turn recorded routing data into navigation inputs.
//!
//! Route files follow the Directions service response shape with polyline
//! geometry; trace files are JSON arrays of position fixes. Nothing here
//! touches the network: [`FileRouteFetcher`] answers reroute requests from
//! routes loaded ahead of time.

pub mod directions;
mod fetcher;
pub mod trace;

pub use directions::{DirectionsError, DirectionsResponse, load_routes, parse_routes};
pub use fetcher::FileRouteFetcher;
pub use trace::{TraceError, TraceFix, load_trace, parse_trace};

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
