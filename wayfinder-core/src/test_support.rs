//! Fixture routes and stub fetchers used by unit and behaviour tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use geo::{Coord, LineString, Point};

use crate::geometry::bearing;
use crate::{Leg, Maneuver, ManeuverType, Route, RouteFetchError, RouteFetcher, RouteRequest, Step};

/// Build a coordinate from longitude and latitude.
pub fn coord(lon: f64, lat: f64) -> Coord<f64> {
    Coord { x: lon, y: lat }
}

/// A straight step from `from` to `to` travelled at 10 m/s.
pub fn straight_step(name: &str, kind: ManeuverType, from: Coord<f64>, to: Coord<f64>) -> Step {
    let heading = if from == to {
        0.0
    } else {
        bearing(Point::from(from), Point::from(to))
    };
    let mut step = Step::from_geometry(
        name,
        Maneuver::new(kind, Point::from(from), heading),
        LineString::new(vec![from, to]),
        Duration::ZERO,
    );
    step.duration = Duration::from_secs((step.distance / 10.0).round() as u64);
    step
}

fn turn(mut step: Step, modifier: &str) -> Step {
    step.maneuver.modifier = Some(modifier.to_owned());
    step
}

/// One leg, one step: "Main St" heading north for roughly 222 m.
pub fn single_step_route() -> Route {
    let step = straight_step("Main St", ManeuverType::Depart, coord(0.0, 0.0), coord(0.0, 0.002));
    build(vec![Leg::new("Main St", vec![step])])
}

fn main_then_elm() -> Leg {
    Leg::new(
        "Main St, Elm St",
        vec![
            straight_step("Main St", ManeuverType::Depart, coord(0.0, 0.0), coord(0.0, 0.001)),
            turn(
                straight_step("Elm St", ManeuverType::Turn, coord(0.0, 0.001), coord(0.001, 0.001)),
                "right",
            ),
        ],
    )
}

/// One leg: north on "Main St", then right onto "Elm St" heading east.
pub fn two_step_route() -> Route {
    build(vec![main_then_elm()])
}

/// [`two_step_route`] followed by a second leg north on "Oak St".
pub fn two_leg_route() -> Route {
    let oak = Leg::new(
        "Oak St",
        vec![straight_step(
            "Oak St",
            ManeuverType::Depart,
            coord(0.001, 0.001),
            coord(0.001, 0.002),
        )],
    );
    build(vec![main_then_elm(), oak])
}

/// North on "Main St" followed by a point-like arrival step.
pub fn arrival_route() -> Route {
    let end = coord(0.0, 0.002);
    build(vec![Leg::new(
        "Main St",
        vec![
            straight_step("Main St", ManeuverType::Depart, coord(0.0, 0.0), end),
            straight_step("", ManeuverType::Arrive, end, end),
        ],
    )])
}

/// A route with one northbound leg per entry of `summaries`.
pub fn route_with_summaries(summaries: &[&str]) -> Route {
    let legs = summaries
        .iter()
        .enumerate()
        .map(|(i, summary)| {
            let start = i as f64 * 0.001;
            Leg::new(
                *summary,
                vec![straight_step(
                    summary,
                    ManeuverType::Depart,
                    coord(0.0, start),
                    coord(0.0, start + 0.001),
                )],
            )
        })
        .collect();
    build(legs)
}

fn build(legs: Vec<Leg>) -> Route {
    match Route::from_legs(legs) {
        Ok(route) => route,
        Err(err) => panic!("fixture route is invalid: {err}"),
    }
}

/// `RouteFetcher` returning a fixed result and counting calls.
#[derive(Debug)]
pub struct StubRouteFetcher {
    result: Result<Vec<Route>, RouteFetchError>,
    calls: AtomicUsize,
}

impl StubRouteFetcher {
    /// Answer every request with `routes`.
    pub fn with_routes(routes: Vec<Route>) -> Self {
        Self {
            result: Ok(routes),
            calls: AtomicUsize::new(0),
        }
    }

    /// Fail every request with `error`.
    pub fn with_error(error: RouteFetchError) -> Self {
        Self {
            result: Err(error),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of requests received.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RouteFetcher for StubRouteFetcher {
    async fn fetch_routes(&self, _request: &RouteRequest) -> Result<Vec<Route>, RouteFetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}

/// `RouteFetcher` whose requests never complete.
#[derive(Debug, Default)]
pub struct PendingRouteFetcher {
    calls: AtomicUsize,
}

impl PendingRouteFetcher {
    /// Number of requests received.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RouteFetcher for PendingRouteFetcher {
    async fn fetch_routes(&self, _request: &RouteRequest) -> Result<Vec<Route>, RouteFetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        std::future::pending().await
    }
}
