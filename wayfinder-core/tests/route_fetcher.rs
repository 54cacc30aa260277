//! Tests for `RouteRequest` and the stub fetchers.

use std::sync::Arc;

use geo::Point;
use rstest::rstest;
use wayfinder_core::test_support::{StubRouteFetcher, single_step_route, two_leg_route};
use wayfinder_core::{RouteFetchError, RouteFetcher, RouteProgress, RouteRequest};

#[rstest]
fn request_without_progress_has_no_waypoints() {
    let request = RouteRequest::from_origin(Point::new(0.0, 0.0));
    assert!(request.remaining_waypoints().is_empty());
}

#[rstest]
#[case(0, vec![Point::new(0.001, 0.001), Point::new(0.001, 0.002)])]
#[case(1, vec![Point::new(0.001, 0.002)])]
fn remaining_waypoints_skip_completed_legs(#[case] leg: usize, #[case] expected: Vec<Point<f64>>) {
    let route = Arc::new(two_leg_route());
    let progress = RouteProgress::compute(route, leg, 0, Point::new(0.0, 0.0)).expect("progress");
    let request = RouteRequest {
        origin: Point::new(0.0, 0.0),
        bearing: Some(10.0),
        progress: Some(progress),
    };
    assert_eq!(request.remaining_waypoints(), expected);
}

#[tokio::test]
async fn stub_returns_configured_routes() {
    let fetcher = Arc::new(StubRouteFetcher::with_routes(vec![single_step_route()]));
    let request = RouteRequest::from_origin(Point::new(0.0, 0.0));
    let routes = fetcher.fetch_routes(&request).await.expect("routes");
    assert_eq!(routes.len(), 1);
    assert_eq!(fetcher.calls(), 1);
}

#[tokio::test]
async fn stub_returns_configured_error() {
    let fetcher = StubRouteFetcher::with_error(RouteFetchError::Timeout { timeout_secs: 5 });
    let request = RouteRequest::from_origin(Point::new(0.0, 0.0));
    let err = fetcher.fetch_routes(&request).await.expect_err("error");
    assert_eq!(err.to_string(), "route request timed out after 5 s");
}
