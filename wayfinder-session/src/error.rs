//! Errors raised by a navigation session.

use thiserror::Error;
use wayfinder_core::{ConfigError, GeometryError};

/// Errors returned by [`crate::NavigationSession`].
#[derive(Debug, Error)]
pub enum SessionError {
    /// The navigation settings were rejected.
    #[error("invalid navigation settings: {0}")]
    Config(#[from] ConfigError),
    /// The session was started outside a Tokio runtime.
    #[error("a navigation session must be started inside a Tokio runtime")]
    NoRuntime,
    /// The worker has stopped.
    #[error("the navigation session has stopped")]
    Closed,
    /// The route could not be measured; the route is malformed.
    #[error("route geometry could not be measured: {0}")]
    Geometry(#[from] GeometryError),
    /// The worker task panicked or was aborted.
    #[error("navigation worker terminated abnormally: {0}")]
    Worker(String),
}
