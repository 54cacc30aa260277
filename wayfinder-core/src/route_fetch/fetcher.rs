//! Route fetcher trait and request type.

use std::sync::Arc;

use async_trait::async_trait;
use geo::Point;

use crate::progress::RouteProgress;
use crate::route::Route;

use super::error::RouteFetchError;

/// Parameters for a reroute or refresh request.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteRequest {
    /// Where the new route should start.
    pub origin: Point<f64>,
    /// Current heading, when known, so the service can avoid U-turns.
    pub bearing: Option<f64>,
    /// Progress on the route being replaced, if any.
    pub progress: Option<RouteProgress>,
}

impl RouteRequest {
    /// Request a route from `origin` with no heading or prior progress.
    pub fn from_origin(origin: Point<f64>) -> Self {
        Self {
            origin,
            bearing: None,
            progress: None,
        }
    }

    /// Remaining waypoints the new route must visit, ending at the
    /// destination.
    ///
    /// Empty when there is no prior progress.
    pub fn remaining_waypoints(&self) -> Vec<Point<f64>> {
        let Some(progress) = &self.progress else {
            return Vec::new();
        };
        progress
            .route()
            .legs()
            .iter()
            .skip(progress.leg_index())
            .filter_map(|leg| leg.steps.last())
            .filter_map(|step| step.geometry.0.last().copied().map(Point::from))
            .collect()
    }
}

/// Source of candidate routes.
///
/// Implementations are called from a background task; they must not block
/// the executor.
///
/// # Examples
///
/// ```
/// use async_trait::async_trait;
/// use wayfinder_core::{Route, RouteFetchError, RouteFetcher, RouteRequest};
///
/// struct NoRoutes;
///
/// #[async_trait]
/// impl RouteFetcher for NoRoutes {
///     async fn fetch_routes(&self, _request: &RouteRequest) -> Result<Vec<Route>, RouteFetchError> {
///         Err(RouteFetchError::NoRoute)
///     }
/// }
/// ```
#[async_trait]
pub trait RouteFetcher: Send + Sync {
    /// Return candidate routes, best first.
    async fn fetch_routes(&self, request: &RouteRequest) -> Result<Vec<Route>, RouteFetchError>;
}

#[async_trait]
impl<T> RouteFetcher for Arc<T>
where
    T: RouteFetcher + ?Sized,
{
    async fn fetch_routes(&self, request: &RouteRequest) -> Result<Vec<Route>, RouteFetchError> {
        (**self).fetch_routes(request).await
    }
}
