//! Builders for Directions and trace documents used in tests.

use serde_json::{Value, json};
use wayfinder_core::geometry::{POLYLINE_PRECISION, encode_polyline};
use wayfinder_core::{GeoPosition, Leg, Route, Step};

/// North on "Main St", then right onto "Elm St".
pub fn elm_street_route() -> Route {
    wayfinder_core::test_support::two_step_route()
}

/// Serialise `routes` as a successful Directions response with polyline6
/// step geometry and no overview line.
pub fn directions_json(routes: &[Route]) -> String {
    let routes: Vec<Value> = routes.iter().map(route_json).collect();
    json!({ "code": "Ok", "routes": routes }).to_string()
}

fn route_json(route: &Route) -> Value {
    let legs: Vec<Value> = route.legs().iter().map(leg_json).collect();
    json!({
        "distance": route.distance(),
        "duration": route.duration().as_secs_f64(),
        "legs": legs,
    })
}

fn leg_json(leg: &Leg) -> Value {
    let steps: Vec<Value> = leg.steps.iter().map(step_json).collect();
    json!({
        "summary": leg.summary,
        "distance": leg.distance,
        "duration": leg.duration.as_secs_f64(),
        "steps": steps,
    })
}

fn step_json(step: &Step) -> Value {
    let maneuver = &step.maneuver;
    json!({
        "name": step.name,
        "distance": step.distance,
        "duration": step.duration.as_secs_f64(),
        "geometry": encode_polyline(&step.geometry, POLYLINE_PRECISION),
        "maneuver": {
            "type": maneuver.kind.as_str(),
            "modifier": maneuver.modifier,
            "location": [maneuver.location.x(), maneuver.location.y()],
            "bearing_before": maneuver.bearing_before,
            "bearing_after": maneuver.bearing_after,
            "instruction": maneuver.instruction,
        },
    })
}

/// Serialise `positions` as a trace document.
pub fn trace_json(positions: &[GeoPosition]) -> String {
    let fixes: Vec<Value> = positions
        .iter()
        .map(|p| {
            json!({
                "longitude": p.longitude(),
                "latitude": p.latitude(),
                "bearing": p.bearing,
                "speed": p.speed,
                "accuracy": p.accuracy,
                "timestamp_ms": u64::try_from(p.timestamp.as_millis()).unwrap_or(u64::MAX),
            })
        })
        .collect();
    Value::Array(fixes).to_string()
}
