//! Milestones: trigger expressions evaluated once per processed location,
//! each carrying an instruction to announce when it fires.
//!
//! [`default_milestones`] supplies departure, new-step, approach and arrival
//! announcements.

mod advance;
mod engine;
mod instruction;
mod trigger;

pub use advance::{Advance, LEG_COMPLETION_DISTANCE, next_position};
pub use engine::{Milestone, MilestoneEngine, MilestoneEvent};
pub use instruction::{
    ArrivalInstruction, IMMEDIATE_DISTANCE, Instruction, ManeuverInstruction, describe_maneuver,
    format_distance,
};
pub use trigger::{Comparison, Trigger, TriggerProperty, TriggerValue};

use crate::config::NavigationConfig;

/// Identifier of the departure milestone.
pub const DEPARTURE_MILESTONE: u32 = 1;
/// Identifier of the new-step milestone.
pub const NEW_STEP_MILESTONE: u32 = 2;
/// Identifier of the approaching-maneuver milestone.
pub const APPROACHING_MILESTONE: u32 = 3;
/// Identifier of the arrival milestone.
pub const ARRIVAL_MILESTONE: u32 = 4;

/// Distance in metres at which the approaching announcement is made.
pub const APPROACHING_DISTANCE: f64 = 200.0;

/// Standard milestone set.
///
/// Departure fires on the first snapshot of a route, new-step on every later
/// step change, approaching when the next maneuver comes within
/// [`APPROACHING_DISTANCE`] and arrival once per leg on the last step of the
/// last leg within [`NavigationConfig::arrival_threshold`].
pub fn default_milestones(config: &NavigationConfig) -> Vec<Milestone> {
    let first_snapshot_of_route = Trigger::all([
        Trigger::eq(TriggerProperty::NewStep, true),
        Trigger::eq(TriggerProperty::FirstLeg, true),
        Trigger::eq(TriggerProperty::FirstStep, true),
    ]);
    vec![
        Milestone::new(
            DEPARTURE_MILESTONE,
            first_snapshot_of_route.clone(),
            ManeuverInstruction,
        ),
        Milestone::new(
            NEW_STEP_MILESTONE,
            Trigger::all([
                Trigger::eq(TriggerProperty::NewStep, true),
                Trigger::not(first_snapshot_of_route),
            ]),
            ManeuverInstruction,
        ),
        Milestone::new(
            APPROACHING_MILESTONE,
            Trigger::all([
                Trigger::lte(TriggerProperty::StepDistanceRemaining, APPROACHING_DISTANCE),
                Trigger::gt(
                    TriggerProperty::PreviousStepDistanceRemaining,
                    APPROACHING_DISTANCE,
                ),
            ]),
            ManeuverInstruction,
        ),
        Milestone::new(
            ARRIVAL_MILESTONE,
            Trigger::all([
                Trigger::eq(TriggerProperty::LastLeg, true),
                Trigger::eq(TriggerProperty::LastStep, true),
                Trigger::lte(TriggerProperty::StepDistanceRemaining, config.arrival_threshold),
            ]),
            ArrivalInstruction,
        )
        .once_per_leg(),
    ]
}
