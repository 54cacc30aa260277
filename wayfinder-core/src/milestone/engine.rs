//! Milestone registry and evaluation.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::progress::RouteProgress;

use super::instruction::Instruction;
use super::trigger::Trigger;

/// A trigger paired with the instruction it announces.
#[derive(Clone)]
pub struct Milestone {
    id: u32,
    trigger: Trigger,
    instruction: Arc<dyn Instruction>,
    once_per_leg: bool,
}

impl Milestone {
    /// Create a milestone that fires on every snapshot its trigger matches.
    pub fn new(id: u32, trigger: Trigger, instruction: impl Instruction + 'static) -> Self {
        Self {
            id,
            trigger,
            instruction: Arc::new(instruction),
            once_per_leg: false,
        }
    }

    /// Fire at most once per leg until the engine is reset.
    #[must_use]
    pub fn once_per_leg(mut self) -> Self {
        self.once_per_leg = true;
        self
    }

    /// Caller-chosen identifier.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Trigger expression.
    pub fn trigger(&self) -> &Trigger {
        &self.trigger
    }

    /// Whether the milestone fires at most once per leg.
    pub fn is_once_per_leg(&self) -> bool {
        self.once_per_leg
    }
}

impl fmt::Debug for Milestone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Milestone")
            .field("id", &self.id)
            .field("trigger", &self.trigger)
            .field("once_per_leg", &self.once_per_leg)
            .finish_non_exhaustive()
    }
}

/// A milestone that fired, with its rendered instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MilestoneEvent {
    /// Identifier of the milestone.
    pub milestone_id: u32,
    /// Rendered instruction text.
    pub instruction: String,
}

/// Evaluates registered milestones against each progress snapshot.
///
/// Milestones fire in registration order.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use geo::Point;
/// use wayfinder_core::RouteProgress;
/// use wayfinder_core::milestone::{Milestone, MilestoneEngine, Trigger, TriggerProperty};
/// use wayfinder_core::test_support::single_step_route;
///
/// let mut engine = MilestoneEngine::new(vec![Milestone::new(
///     7,
///     Trigger::eq(TriggerProperty::NewStep, true),
///     |_: &RouteProgress| "Go".to_owned(),
/// )]);
/// let progress = RouteProgress::compute(Arc::new(single_step_route()), 0, 0, Point::new(0.0, 0.0))?;
/// let fired = engine.evaluate(None, &progress);
/// assert_eq!(fired[0].milestone_id, 7);
/// assert!(engine.evaluate(Some(&progress), &progress).is_empty());
/// # Ok::<(), wayfinder_core::geometry::GeometryError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct MilestoneEngine {
    milestones: Vec<Milestone>,
    fired: HashSet<(u32, usize)>,
}

impl MilestoneEngine {
    /// Create an engine with `milestones`.
    pub fn new(milestones: Vec<Milestone>) -> Self {
        Self {
            milestones,
            fired: HashSet::new(),
        }
    }

    /// Append a milestone.
    pub fn register(&mut self, milestone: Milestone) {
        self.milestones.push(milestone);
    }

    /// Registered milestones in evaluation order.
    pub fn milestones(&self) -> &[Milestone] {
        &self.milestones
    }

    /// Return the events for every milestone whose trigger matches.
    pub fn evaluate(
        &mut self,
        previous: Option<&RouteProgress>,
        current: &RouteProgress,
    ) -> Vec<MilestoneEvent> {
        let mut events = Vec::new();
        for milestone in &self.milestones {
            let key = (milestone.id, current.leg_index());
            if milestone.once_per_leg && self.fired.contains(&key) {
                continue;
            }
            if !milestone.trigger.evaluate(previous, current) {
                continue;
            }
            if milestone.once_per_leg {
                self.fired.insert(key);
            }
            events.push(MilestoneEvent {
                milestone_id: milestone.id,
                instruction: milestone.instruction.build(current),
            });
        }
        events
    }

    /// Forget which once-per-leg milestones have fired.
    pub fn reset(&mut self) {
        self.fired.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::milestone::TriggerProperty;
    use crate::test_support::single_step_route;
    use geo::Point;
    use rstest::rstest;

    fn progress(lat: f64) -> RouteProgress {
        RouteProgress::compute(Arc::new(single_step_route()), 0, 0, Point::new(0.0, lat))
            .expect("progress")
    }

    fn near_end() -> Milestone {
        Milestone::new(
            1,
            Trigger::lte(TriggerProperty::StepDistanceRemaining, 100.0),
            |_: &RouteProgress| "near".to_owned(),
        )
    }

    #[rstest]
    fn repeating_milestone_fires_each_time() {
        let mut engine = MilestoneEngine::new(vec![near_end()]);
        let a = progress(0.0015);
        let b = progress(0.0016);
        assert_eq!(engine.evaluate(None, &a).len(), 1);
        assert_eq!(engine.evaluate(Some(&a), &b).len(), 1);
    }

    #[rstest]
    fn once_per_leg_milestone_fires_once_until_reset() {
        let mut engine = MilestoneEngine::new(vec![near_end().once_per_leg()]);
        let a = progress(0.0015);
        let b = progress(0.0016);
        assert_eq!(engine.evaluate(None, &a).len(), 1);
        assert!(engine.evaluate(Some(&a), &b).is_empty());
        engine.reset();
        assert_eq!(engine.evaluate(Some(&a), &b).len(), 1);
    }

    #[rstest]
    fn fires_in_registration_order() {
        let mut engine = MilestoneEngine::default();
        engine.register(Milestone::new(
            9,
            Trigger::All(Vec::new()),
            |_: &RouteProgress| "nine".to_owned(),
        ));
        engine.register(Milestone::new(
            2,
            Trigger::All(Vec::new()),
            |_: &RouteProgress| "two".to_owned(),
        ));
        let ids: Vec<u32> = engine
            .evaluate(None, &progress(0.0))
            .into_iter()
            .map(|e| e.milestone_id)
            .collect();
        assert_eq!(ids, [9, 2]);
        assert_eq!(engine.milestones().len(), 2);
    }
}
