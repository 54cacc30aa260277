use thiserror::Error;

/// Errors from [`crate::route_fetch::RouteFetcher::fetch_routes`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteFetchError {
    /// The service found no route between the requested points.
    #[error("no route found")]
    NoRoute,
    /// The service could not be reached.
    #[error("network error: {message}")]
    Network {
        /// Transport-level description.
        message: String,
    },
    /// The service did not answer in time.
    #[error("route request timed out after {timeout_secs} s")]
    Timeout {
        /// Seconds waited before giving up.
        timeout_secs: u64,
    },
    /// The service answered with an error.
    #[error("routing service error {code}: {message}")]
    Service {
        /// Service-specific error code.
        code: String,
        /// Human-readable detail.
        message: String,
    },
}
