//! Tests for the background navigation session.

use std::sync::Arc;
use std::time::Duration;

use geo::Point;
use rstest::rstest;
use wayfinder_core::milestone::{DEPARTURE_MILESTONE, MilestoneEngine, default_milestones};
use wayfinder_core::test_support::{
    PendingRouteFetcher, StubRouteFetcher, route_with_summaries, single_step_route,
};
use wayfinder_core::{
    GeoPosition, NavigationConfig, Route, RouteFetchError, RouteFetcher, RouteProgress,
};
use wayfinder_session::{
    EventStream, NavigationEvent, NavigationListener, NavigationSession, SessionError,
};

const WAIT: Duration = Duration::from_secs(30);

fn start(
    route: Route,
    config: NavigationConfig,
    fetcher: Arc<dyn RouteFetcher>,
) -> (NavigationSession, EventStream) {
    let milestones = MilestoneEngine::new(default_milestones(&config));
    NavigationSession::start(route, config, milestones, fetcher).expect("session starts")
}

fn on_route(secs: u64) -> GeoPosition {
    GeoPosition::new(Point::new(0.0, 0.0005), Duration::from_secs(secs))
        .with_speed(10.0)
        .with_bearing(0.0)
}

fn off_route(secs: u64) -> GeoPosition {
    GeoPosition::new(Point::new(0.001, 0.0005), Duration::from_secs(secs))
        .with_speed(10.0)
        .with_bearing(0.0)
}

async fn events_until(
    events: &mut EventStream,
    done: impl Fn(&NavigationEvent) -> bool,
) -> Vec<NavigationEvent> {
    let mut seen = Vec::new();
    tokio::time::timeout(WAIT, async {
        while let Some(event) = events.recv().await {
            let finished = done(&event);
            seen.push(event);
            if finished {
                return;
            }
        }
        panic!("event stream closed early");
    })
    .await
    .expect("expected event arrived");
    seen
}

fn is_progress(event: &NavigationEvent) -> bool {
    matches!(event, NavigationEvent::ProgressChange { .. })
}

async fn drain(events: &mut EventStream) -> Vec<NavigationEvent> {
    let mut rest = Vec::new();
    while let Some(event) = events.recv().await {
        rest.push(event);
    }
    rest
}

#[tokio::test(start_paused = true)]
async fn off_route_precedes_milestones_and_progress() {
    let fetcher = Arc::new(StubRouteFetcher::with_routes(Vec::new()));
    let (session, mut events) = start(single_step_route(), NavigationConfig::default(), fetcher);

    session.update_location(off_route(1)).expect("session running");
    let seen = events_until(&mut events, is_progress).await;

    assert!(matches!(seen[0], NavigationEvent::UserOffRoute { .. }));
    assert!(matches!(
        seen[1],
        NavigationEvent::Milestone { milestone_id, .. } if milestone_id == DEPARTURE_MILESTONE
    ));
    assert!(is_progress(&seen[2]));
    assert_eq!(seen.len(), 3);
}

#[tokio::test(start_paused = true)]
async fn failed_reroute_is_reported_while_off_route() {
    let fetcher = Arc::new(StubRouteFetcher::with_routes(Vec::new()));
    let (session, mut events) = start(single_step_route(), NavigationConfig::default(), fetcher);

    session.update_location(off_route(1)).expect("session running");
    let seen = events_until(&mut events, |e| {
        matches!(e, NavigationEvent::FailedReroute { .. })
    })
    .await;

    assert!(matches!(
        seen.last(),
        Some(NavigationEvent::FailedReroute { message }) if message == "no route found"
    ));
    session.shutdown().await.expect("clean shutdown");
}

#[tokio::test(start_paused = true)]
async fn reroute_adopts_the_most_similar_candidate() {
    let fetcher = Arc::new(StubRouteFetcher::with_routes(vec![
        route_with_summaries(&["Pine St", "Cedar St"]),
        route_with_summaries(&["Main St", "Oak St"]),
    ]));
    let (session, mut events) = start(
        route_with_summaries(&["Main St", "Elm St"]),
        NavigationConfig::default(),
        fetcher,
    );

    session.update_location(off_route(1)).expect("session running");
    let seen = events_until(&mut events, |e| {
        matches!(e, NavigationEvent::RerouteAlong { .. })
    })
    .await;

    let Some(NavigationEvent::RerouteAlong { route, destination }) = seen.last() else {
        panic!("expected a reroute");
    };
    assert_eq!(route.leg_summary(), "Main St;Oak St");
    assert_eq!(*destination, route.destination());
}

#[tokio::test(start_paused = true)]
async fn failed_refresh_is_swallowed() {
    let fetcher = Arc::new(StubRouteFetcher::with_error(RouteFetchError::Network {
        message: "offline".into(),
    }));
    let config = NavigationConfig::default().with_refresh_interval(Duration::from_secs(1));
    let (session, mut events) = start(
        single_step_route(),
        config,
        Arc::clone(&fetcher) as Arc<dyn RouteFetcher>,
    );

    session.update_location(on_route(1)).expect("session running");
    events_until(&mut events, is_progress).await;
    tokio::time::sleep(Duration::from_millis(1_500)).await;
    assert_eq!(fetcher.calls(), 1);

    session.shutdown().await.expect("clean shutdown");
    let rest = drain(&mut events).await;
    assert!(
        rest.iter()
            .all(|e| !matches!(e, NavigationEvent::FailedReroute { .. })),
        "unexpected events {rest:?}"
    );
}

#[tokio::test(start_paused = true)]
async fn reroute_requests_are_single_flight_until_timeout() {
    let fetcher = Arc::new(PendingRouteFetcher::default());
    let (session, mut events) = start(
        single_step_route(),
        NavigationConfig::default(),
        Arc::clone(&fetcher) as Arc<dyn RouteFetcher>,
    );

    session.update_location(on_route(1)).expect("session running");
    events_until(&mut events, is_progress).await;

    session.request_reroute().expect("session running");
    session.request_reroute().expect("session running");
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(fetcher.calls(), 1);

    tokio::time::sleep(Duration::from_secs(6)).await;
    session.request_reroute().expect("session running");
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(fetcher.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn reroute_without_a_location_is_skipped() {
    let fetcher = Arc::new(PendingRouteFetcher::default());
    let (session, _events) = start(
        single_step_route(),
        NavigationConfig::default(),
        Arc::clone(&fetcher) as Arc<dyn RouteFetcher>,
    );

    session.request_reroute().expect("session running");
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(fetcher.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn pending_locations_are_coalesced() {
    let fetcher = Arc::new(StubRouteFetcher::with_routes(Vec::new()));
    let (session, mut events) = start(single_step_route(), NavigationConfig::default(), fetcher);

    let latest = GeoPosition::new(Point::new(0.0, 0.0015), Duration::from_secs(3));
    session.update_location(on_route(1)).expect("session running");
    session.update_location(on_route(2)).expect("session running");
    session.update_location(latest).expect("session running");

    let seen = events_until(&mut events, is_progress).await;
    let Some(NavigationEvent::ProgressChange { location, .. }) = seen.last() else {
        panic!("expected progress");
    };
    assert_eq!(location.timestamp, Duration::from_secs(3));

    session.shutdown().await.expect("clean shutdown");
    assert!(drain(&mut events).await.iter().all(|e| !is_progress(e)));
}

#[tokio::test(start_paused = true)]
async fn dropping_the_session_ends_the_stream() {
    let fetcher = Arc::new(StubRouteFetcher::with_routes(Vec::new()));
    let (session, mut events) = start(single_step_route(), NavigationConfig::default(), fetcher);
    assert!(session.is_running());
    drop(session);
    let next = tokio::time::timeout(WAIT, events.recv()).await.expect("stream ends");
    assert!(next.is_none());
}

#[derive(Default)]
struct Recorder {
    progress: usize,
    milestones: Vec<u32>,
}

impl NavigationListener for Recorder {
    fn on_progress_change(&mut self, _location: &GeoPosition, _progress: &RouteProgress) {
        self.progress += 1;
    }

    fn on_milestone_event(&mut self, _progress: &RouteProgress, _instruction: &str, milestone_id: u32) {
        self.milestones.push(milestone_id);
    }
}

#[tokio::test(start_paused = true)]
async fn listeners_receive_dispatched_events() {
    let fetcher = Arc::new(StubRouteFetcher::with_routes(Vec::new()));
    let (session, mut events) = start(single_step_route(), NavigationConfig::default(), fetcher);
    session.update_location(on_route(1)).expect("session running");
    let seen = events_until(&mut events, is_progress).await;
    session.shutdown().await.expect("clean shutdown");

    let mut recorder = Recorder::default();
    for event in &seen {
        event.dispatch(&mut recorder);
    }
    events.dispatch_to(&mut recorder).await;
    assert_eq!(recorder.progress, 1);
    assert_eq!(recorder.milestones, [DEPARTURE_MILESTONE]);
}

#[rstest]
fn starting_outside_a_runtime_fails() {
    let config = NavigationConfig::default();
    let result = NavigationSession::start(
        single_step_route(),
        config,
        MilestoneEngine::default(),
        Arc::new(StubRouteFetcher::with_routes(Vec::new())),
    );
    assert!(matches!(result, Err(SessionError::NoRuntime)));
}

#[rstest]
fn invalid_settings_are_rejected() {
    let config = NavigationConfig::default().with_arrival_threshold(-5.0);
    let result = NavigationSession::start(
        single_step_route(),
        config,
        MilestoneEngine::default(),
        Arc::new(StubRouteFetcher::with_routes(Vec::new())),
    );
    assert!(matches!(result, Err(SessionError::Config(_))));
}
