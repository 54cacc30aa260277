//! A [`RouteFetcher`] backed by routes recorded ahead of time.

use async_trait::async_trait;
use camino::Utf8Path;
use log::debug;
use wayfinder_core::{Route, RouteFetchError, RouteFetcher, RouteRequest};

use crate::directions::{DirectionsError, load_routes};

/// Answers every request with the same candidate routes.
///
/// Used to replay a recorded drive offline: the candidates are whatever the
/// routing service returned when the drive was recorded.
#[derive(Debug, Clone, Default)]
pub struct FileRouteFetcher {
    routes: Vec<Route>,
}

impl FileRouteFetcher {
    /// Serve `routes` to every request.
    #[must_use]
    pub const fn new(routes: Vec<Route>) -> Self {
        Self { routes }
    }

    /// Load candidates from a Directions response file.
    ///
    /// # Errors
    ///
    /// Returns [`DirectionsError`] when the file cannot be read or decoded.
    pub fn load(path: &Utf8Path, precision: u8) -> Result<Self, DirectionsError> {
        load_routes(path, precision).map(Self::new)
    }

    /// Candidates served to each request.
    #[must_use]
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }
}

#[async_trait]
impl RouteFetcher for FileRouteFetcher {
    async fn fetch_routes(&self, request: &RouteRequest) -> Result<Vec<Route>, RouteFetchError> {
        debug!(
            "serving {} recorded routes from ({:.6}, {:.6})",
            self.routes.len(),
            request.origin.x(),
            request.origin.y()
        );
        if self.routes.is_empty() {
            return Err(RouteFetchError::NoRoute);
        }
        Ok(self.routes.clone())
    }
}
