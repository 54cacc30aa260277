//! Error types emitted by the Wayfinder CLI.
//!
//! Keep this error type reasonably small, as every CLI helper returns
//! `Result<_, CliError>`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use thiserror::Error;
use wayfinder_core::ConfigError;
use wayfinder_data::{DirectionsError, TraceError};
use wayfinder_session::SessionError;

/// Errors emitted by the Wayfinder CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        /// Flag name.
        field: &'static str,
        /// Environment variable name.
        env: &'static str,
    },
    /// A referenced input path does not exist.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        /// Flag name.
        field: &'static str,
        /// Path that was given.
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        /// Flag name.
        field: &'static str,
        /// Path that was given.
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        /// Flag name.
        field: &'static str,
        /// Path that was given.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// Navigation settings failed validation.
    #[error("invalid navigation settings: {0}")]
    InvalidSettings(#[from] ConfigError),
    /// A route or alternatives file could not be loaded.
    #[error(transparent)]
    LoadRoutes(#[from] DirectionsError),
    /// The route file decoded to no routes.
    #[error("route file {path:?} contains no routes")]
    EmptyRouteFile {
        /// Path of the route file.
        path: Utf8PathBuf,
    },
    /// The trace could not be loaded.
    #[error(transparent)]
    LoadTrace(#[from] TraceError),
    /// Building the async runtime failed.
    #[error("failed to start runtime: {0}")]
    Runtime(#[source] std::io::Error),
    /// The navigation session failed.
    #[error("navigation session failed: {0}")]
    Session(#[from] SessionError),
    /// Serializing an event failed.
    #[error("failed to serialize event: {0}")]
    SerializeEvent(#[source] serde_json::Error),
    /// Writing replay output failed.
    #[error("failed to write replay output: {0}")]
    WriteOutput(#[source] std::io::Error),
    /// Writing replay output to a file failed.
    #[error("failed to write replay output to {path:?}: {source}")]
    WriteOutputFile {
        /// Destination file.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
}
