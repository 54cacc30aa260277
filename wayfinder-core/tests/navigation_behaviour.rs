//! Behavioural tests for following a route with `RouteProcessor`.

use std::cell::RefCell;
use std::time::Duration;

use geo::Point;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use wayfinder_core::geometry::destination;
use wayfinder_core::milestone::{ARRIVAL_MILESTONE, MilestoneEngine, default_milestones};
use wayfinder_core::test_support::route_with_summaries;
use wayfinder_core::{GeoPosition, NavigationConfig, RouteProcessor, TickOutcome};

#[fixture]
fn processor() -> RefCell<Option<RouteProcessor>> {
    RefCell::new(None)
}

#[fixture]
fn outcomes() -> RefCell<Vec<TickOutcome>> {
    RefCell::new(Vec::new())
}

fn feed(
    processor: &RefCell<Option<RouteProcessor>>,
    outcomes: &RefCell<Vec<TickOutcome>>,
    fix: GeoPosition,
) {
    let mut guard = processor.borrow_mut();
    let processor = guard.as_mut().expect("route configured");
    let outcome = processor.process(&fix).expect("route is well formed");
    outcomes.borrow_mut().push(outcome);
}

fn last(outcomes: &RefCell<Vec<TickOutcome>>) -> TickOutcome {
    outcomes.borrow().last().cloned().expect("a fix was processed")
}

#[given("a straight northbound step of about 111 metres")]
fn given_straight_step(#[from(processor)] processor: &RefCell<Option<RouteProcessor>>) {
    let config = NavigationConfig::default().with_maximum_distance_off_route(50.0);
    let milestones = MilestoneEngine::new(default_milestones(&config));
    *processor.borrow_mut() = Some(RouteProcessor::new(
        route_with_summaries(&["Main St"]),
        config,
        milestones,
    ));
}

#[when("a stationary fix arrives at the start of the step")]
fn when_stationary_at_start(
    #[from(processor)] processor: &RefCell<Option<RouteProcessor>>,
    #[from(outcomes)] outcomes: &RefCell<Vec<TickOutcome>>,
) {
    let fix = GeoPosition::new(Point::new(0.0, 0.0), Duration::from_secs(1));
    feed(processor, outcomes, fix);
}

#[when("a moving fix arrives 80 metres east of the line with 5 metres accuracy")]
fn when_far_east(
    #[from(processor)] processor: &RefCell<Option<RouteProcessor>>,
    #[from(outcomes)] outcomes: &RefCell<Vec<TickOutcome>>,
) {
    let point = destination(Point::new(0.0, 0.0005), 90.0, 80.0);
    let fix = GeoPosition::new(point, Duration::from_secs(1))
        .with_speed(10.0)
        .with_bearing(0.0)
        .with_accuracy(5.0);
    feed(processor, outcomes, fix);
}

#[when("fixes arrive 30, 20 and 15 metres before the destination")]
fn when_approaching_destination(
    #[from(processor)] processor: &RefCell<Option<RouteProcessor>>,
    #[from(outcomes)] outcomes: &RefCell<Vec<TickOutcome>>,
) {
    let end = Point::new(0.0, 0.001);
    for (secs, metres) in [(1, 30.0), (2, 20.0), (3, 15.0)] {
        let fix = GeoPosition::new(destination(end, 180.0, metres), Duration::from_secs(secs))
            .with_speed(5.0)
            .with_bearing(0.0);
        feed(processor, outcomes, fix);
    }
}

#[then("the user is on route")]
fn then_on_route(#[from(outcomes)] outcomes: &RefCell<Vec<TickOutcome>>) {
    let outcome = last(outcomes);
    assert!(!outcome.user_off_route);
    assert!(!outcome.off_route_started);
}

#[then("about 111 metres remain on the step")]
fn then_step_remaining(#[from(outcomes)] outcomes: &RefCell<Vec<TickOutcome>>) {
    let remaining = last(outcomes).progress.step_distance_remaining();
    assert!((remaining - 111.19).abs() <= 111.19 * 0.01, "got {remaining}");
}

#[then("the user is off route")]
fn then_off_route(#[from(outcomes)] outcomes: &RefCell<Vec<TickOutcome>>) {
    let outcome = last(outcomes);
    assert!(outcome.user_off_route);
    assert_eq!(
        outcome.location.point,
        destination(Point::new(0.0, 0.0005), 90.0, 80.0)
    );
}

#[then("the off-route episode is reported")]
fn then_reported(#[from(outcomes)] outcomes: &RefCell<Vec<TickOutcome>>) {
    assert!(last(outcomes).off_route_started);
}

#[then("the arrival milestone fires only for the 20 metre fix")]
fn then_arrival_once(#[from(outcomes)] outcomes: &RefCell<Vec<TickOutcome>>) {
    let fired: Vec<bool> = outcomes
        .borrow()
        .iter()
        .map(|o| o.milestones.iter().any(|m| m.milestone_id == ARRIVAL_MILESTONE))
        .collect();
    assert_eq!(fired, [false, true, false]);
}

#[scenario(path = "tests/features/navigation.feature", index = 0)]
fn stationary_at_start(
    processor: RefCell<Option<RouteProcessor>>,
    outcomes: RefCell<Vec<TickOutcome>>,
) {
    let _ = (processor, outcomes);
}

#[scenario(path = "tests/features/navigation.feature", index = 1)]
fn drifting_away(processor: RefCell<Option<RouteProcessor>>, outcomes: RefCell<Vec<TickOutcome>>) {
    let _ = (processor, outcomes);
}

#[scenario(path = "tests/features/navigation.feature", index = 2)]
fn arriving(processor: RefCell<Option<RouteProcessor>>, outcomes: RefCell<Vec<TickOutcome>>) {
    let _ = (processor, outcomes);
}
