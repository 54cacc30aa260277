//! Instruction text builders attached to milestones.

use crate::progress::RouteProgress;
use crate::route::{Maneuver, ManeuverType, Step};

/// Distance in metres under which an instruction is given without a lead-in.
pub const IMMEDIATE_DISTANCE: f64 = 15.0;

/// Builds the text carried by a milestone event.
///
/// Closures taking a [`RouteProgress`] implement this trait.
pub trait Instruction: Send + Sync {
    /// Render the instruction for `progress`.
    fn build(&self, progress: &RouteProgress) -> String;
}

impl<F> Instruction for F
where
    F: Fn(&RouteProgress) -> String + Send + Sync,
{
    fn build(&self, progress: &RouteProgress) -> String {
        self(progress)
    }
}

/// Announces the next maneuver, prefixed with the distance to it.
///
/// Service-supplied instruction text is preferred over generated text.
#[derive(Debug, Default, Clone, Copy)]
pub struct ManeuverInstruction;

impl Instruction for ManeuverInstruction {
    fn build(&self, progress: &RouteProgress) -> String {
        let text = match progress.upcoming_step() {
            Some(step) => step_text(step),
            None if progress.is_last_leg() => "arrive at your destination".to_owned(),
            None => "arrive at your waypoint".to_owned(),
        };
        let remaining = progress.step_distance_remaining();
        if remaining < IMMEDIATE_DISTANCE {
            capitalise(&text)
        } else {
            format!("In {}, {}", format_distance(remaining), lower_first(&text))
        }
    }
}

/// Announces arrival at the end of the current leg.
#[derive(Debug, Default, Clone, Copy)]
pub struct ArrivalInstruction;

impl Instruction for ArrivalInstruction {
    fn build(&self, progress: &RouteProgress) -> String {
        if progress.is_last_leg() {
            "You have arrived at your destination".to_owned()
        } else {
            format!(
                "You have arrived at waypoint {}",
                progress.leg_index() + 1
            )
        }
    }
}

fn step_text(step: &Step) -> String {
    step.maneuver
        .instruction
        .clone()
        .unwrap_or_else(|| describe_maneuver(&step.maneuver, &step.name))
}

/// Generate instruction text for `maneuver` onto the road `name`.
///
/// ```
/// use geo::Point;
/// use wayfinder_core::{Maneuver, ManeuverType};
/// use wayfinder_core::milestone::describe_maneuver;
///
/// let turn = Maneuver::new(ManeuverType::Turn, Point::new(0.0, 0.0), 90.0).with_modifier("right");
/// assert_eq!(describe_maneuver(&turn, "Elm St"), "Turn right onto Elm St");
/// ```
pub fn describe_maneuver(maneuver: &Maneuver, name: &str) -> String {
    let modifier = maneuver.modifier.as_deref();
    let direction = modifier.map_or_else(String::new, |m| format!(" {m}"));
    let action = match &maneuver.kind {
        ManeuverType::Depart => "Head out".to_owned(),
        ManeuverType::Arrive => return "Arrive at your destination".to_owned(),
        ManeuverType::Turn | ManeuverType::EndOfRoad if modifier == Some("uturn") => {
            "Make a U-turn".to_owned()
        }
        ManeuverType::Turn => format!("Turn{direction}"),
        ManeuverType::EndOfRoad => format!("At the end of the road, turn{direction}"),
        ManeuverType::Continue | ManeuverType::NewName | ManeuverType::Notification => {
            "Continue".to_owned()
        }
        ManeuverType::Merge => format!("Merge{direction}"),
        ManeuverType::OnRamp => format!("Take the ramp{direction}"),
        ManeuverType::OffRamp => format!("Take the exit{direction}"),
        ManeuverType::Fork => format!("Keep{direction} at the fork"),
        ManeuverType::Roundabout | ManeuverType::Rotary | ManeuverType::RoundaboutTurn => {
            "Enter the roundabout".to_owned()
        }
        ManeuverType::Other(_) => "Continue".to_owned(),
    };
    if name.is_empty() {
        action
    } else {
        format!("{action} onto {name}")
    }
}

/// Render a distance for speech: tens of metres below a kilometre, then
/// kilometres to one decimal place.
pub fn format_distance(meters: f64) -> String {
    if meters < 1_000.0 {
        format!("{} m", ((meters / 10.0).round() * 10.0).max(10.0))
    } else {
        format!("{:.1} km", meters / 1_000.0)
    }
}

fn capitalise(text: &str) -> String {
    let mut chars = text.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

fn lower_first(text: &str) -> String {
    let mut chars = text.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_lowercase().chain(chars).collect()
    })
}
