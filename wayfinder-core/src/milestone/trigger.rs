//! Declarative trigger expressions evaluated against progress snapshots.

use crate::progress::RouteProgress;

/// A value a [`TriggerProperty`] can take.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(untagged)
)]
pub enum TriggerValue {
    /// A numeric reading, in metres, seconds or an index.
    Number(f64),
    /// A boolean reading.
    Bool(bool),
}

impl From<f64> for TriggerValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for TriggerValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// A quantity read from the current, and possibly previous, snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum TriggerProperty {
    /// Metres left on the current step.
    StepDistanceRemaining,
    /// Seconds left on the current step.
    StepDurationRemaining,
    /// Length in metres of the current step.
    StepDistanceTotal,
    /// Length in metres of the upcoming step; absent on a leg's last step.
    NextStepDistance,
    /// Whether the current step is the first of its leg.
    FirstStep,
    /// Whether the current step is the last of its leg.
    LastStep,
    /// Whether the current leg is the first of the route.
    FirstLeg,
    /// Whether the current leg is the last of the route.
    LastLeg,
    /// Whether the step changed since the previous snapshot.
    NewStep,
    /// Index of the current leg.
    LegIndex,
    /// Index of the current step.
    StepIndex,
    /// Metres left on the current leg.
    LegDistanceRemaining,
    /// Metres left on the route.
    DistanceRemaining,
    /// Metres that were left on the current step at the previous snapshot;
    /// absent when the previous snapshot was on another step.
    PreviousStepDistanceRemaining,
}

impl TriggerProperty {
    /// Read this property, or `None` when it has no value.
    pub fn read(self, previous: Option<&RouteProgress>, current: &RouteProgress) -> Option<TriggerValue> {
        let value: TriggerValue = match self {
            Self::StepDistanceRemaining => current.step_distance_remaining().into(),
            Self::StepDurationRemaining => current.step_duration_remaining().as_secs_f64().into(),
            Self::StepDistanceTotal => current.current_step().distance.into(),
            Self::NextStepDistance => current.upcoming_step()?.distance.into(),
            Self::FirstStep => current.is_first_step().into(),
            Self::LastStep => current.is_last_step().into(),
            Self::FirstLeg => current.is_first_leg().into(),
            Self::LastLeg => current.is_last_leg().into(),
            Self::NewStep => previous.is_none_or(|prev| !same_step(prev, current)).into(),
            Self::LegIndex => index_value(current.leg_index()),
            Self::StepIndex => index_value(current.step_index()),
            Self::LegDistanceRemaining => current.leg_distance_remaining().into(),
            Self::DistanceRemaining => current.distance_remaining().into(),
            Self::PreviousStepDistanceRemaining => previous
                .filter(|prev| same_step(prev, current))?
                .step_distance_remaining()
                .into(),
        };
        match value {
            TriggerValue::Number(n) if !n.is_finite() => None,
            other => Some(other),
        }
    }
}

fn same_step(a: &RouteProgress, b: &RouteProgress) -> bool {
    a.leg_index() == b.leg_index() && a.step_index() == b.step_index()
}

fn index_value(index: usize) -> TriggerValue {
    // Route indices stay far below 2^53.
    TriggerValue::Number(index as f64)
}

/// Comparison operator for [`Trigger::Compare`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum Comparison {
    /// Equal.
    Eq,
    /// Not equal.
    Neq,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Gte,
    /// Less than.
    Lt,
    /// Less than or equal.
    Lte,
}

impl Comparison {
    /// Apply the operator; mismatched kinds and ordering on booleans are false.
    pub fn apply(self, lhs: TriggerValue, rhs: TriggerValue) -> bool {
        match (lhs, rhs) {
            (TriggerValue::Number(a), TriggerValue::Number(b)) => match self {
                Self::Eq => a == b,
                Self::Neq => a != b,
                Self::Gt => a > b,
                Self::Gte => a >= b,
                Self::Lt => a < b,
                Self::Lte => a <= b,
            },
            (TriggerValue::Bool(a), TriggerValue::Bool(b)) => match self {
                Self::Eq => a == b,
                Self::Neq => a != b,
                Self::Gt | Self::Gte | Self::Lt | Self::Lte => false,
            },
            _ => false,
        }
    }
}

/// A trigger expression.
///
/// `All` of nothing is true and `Any` of nothing is false. A comparison whose
/// property has no value is false.
///
/// # Examples
///
/// ```
/// use wayfinder_core::milestone::{Trigger, TriggerProperty};
///
/// let arrival = Trigger::all([
///     Trigger::eq(TriggerProperty::LastLeg, true),
///     Trigger::eq(TriggerProperty::LastStep, true),
///     Trigger::lte(TriggerProperty::StepDistanceRemaining, 25.0),
/// ]);
/// assert!(matches!(arrival, Trigger::All(ref children) if children.len() == 3));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum Trigger {
    /// True when every child is true.
    All(Vec<Trigger>),
    /// True when any child is true.
    Any(Vec<Trigger>),
    /// Negation of the child.
    Not(Box<Trigger>),
    /// Compare a property against a constant.
    Compare {
        /// Property to read.
        property: TriggerProperty,
        /// Operator to apply.
        op: Comparison,
        /// Right-hand side.
        value: TriggerValue,
    },
}

impl Trigger {
    /// Conjunction of `children`.
    pub fn all(children: impl IntoIterator<Item = Trigger>) -> Self {
        Self::All(children.into_iter().collect())
    }

    /// Disjunction of `children`.
    pub fn any(children: impl IntoIterator<Item = Trigger>) -> Self {
        Self::Any(children.into_iter().collect())
    }

    /// Negation of `child`.
    pub fn not(child: Trigger) -> Self {
        Self::Not(Box::new(child))
    }

    /// Compare `property` against `value` using `op`.
    pub fn compare(property: TriggerProperty, op: Comparison, value: impl Into<TriggerValue>) -> Self {
        Self::Compare {
            property,
            op,
            value: value.into(),
        }
    }

    /// `property == value`.
    pub fn eq(property: TriggerProperty, value: impl Into<TriggerValue>) -> Self {
        Self::compare(property, Comparison::Eq, value)
    }

    /// `property != value`.
    pub fn neq(property: TriggerProperty, value: impl Into<TriggerValue>) -> Self {
        Self::compare(property, Comparison::Neq, value)
    }

    /// `property > value`.
    pub fn gt(property: TriggerProperty, value: impl Into<TriggerValue>) -> Self {
        Self::compare(property, Comparison::Gt, value)
    }

    /// `property >= value`.
    pub fn gte(property: TriggerProperty, value: impl Into<TriggerValue>) -> Self {
        Self::compare(property, Comparison::Gte, value)
    }

    /// `property < value`.
    pub fn lt(property: TriggerProperty, value: impl Into<TriggerValue>) -> Self {
        Self::compare(property, Comparison::Lt, value)
    }

    /// `property <= value`.
    pub fn lte(property: TriggerProperty, value: impl Into<TriggerValue>) -> Self {
        Self::compare(property, Comparison::Lte, value)
    }

    /// Evaluate against the current snapshot and the one before it.
    pub fn evaluate(&self, previous: Option<&RouteProgress>, current: &RouteProgress) -> bool {
        match self {
            Self::All(children) => children.iter().all(|c| c.evaluate(previous, current)),
            Self::Any(children) => children.iter().any(|c| c.evaluate(previous, current)),
            Self::Not(child) => !child.evaluate(previous, current),
            Self::Compare {
                property,
                op,
                value,
            } => property
                .read(previous, current)
                .is_some_and(|lhs| op.apply(lhs, *value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::two_step_route;
    use geo::Point;
    use rstest::{fixture, rstest};
    use std::sync::Arc;

    #[fixture]
    fn first_step() -> RouteProgress {
        RouteProgress::compute(Arc::new(two_step_route()), 0, 0, Point::new(0.0, 0.0005))
            .expect("progress")
    }

    #[fixture]
    fn last_step() -> RouteProgress {
        RouteProgress::compute(Arc::new(two_step_route()), 0, 1, Point::new(0.0005, 0.001))
            .expect("progress")
    }

    #[rstest]
    #[case(Comparison::Lt, 2.0, 1.0, false)]
    #[case(Comparison::Gte, 2.0, 2.0, true)]
    #[case(Comparison::Neq, 2.0, 1.0, true)]
    #[case(Comparison::Lte, 3.0, 2.0, false)]
    fn compares_numbers(#[case] op: Comparison, #[case] lhs: f64, #[case] rhs: f64, #[case] expected: bool) {
        assert_eq!(op.apply(lhs.into(), rhs.into()), expected);
    }

    #[rstest]
    fn mismatched_kinds_are_false() {
        assert!(!Comparison::Eq.apply(1.0.into(), true.into()));
        assert!(!Comparison::Neq.apply(1.0.into(), true.into()));
        assert!(!Comparison::Gt.apply(true.into(), false.into()));
    }

    #[rstest]
    fn empty_combinators() {
        let progress = first_step();
        assert!(Trigger::All(Vec::new()).evaluate(None, &progress));
        assert!(!Trigger::Any(Vec::new()).evaluate(None, &progress));
    }

    #[rstest]
    fn missing_property_is_false(last_step: RouteProgress) {
        let trigger = Trigger::gte(TriggerProperty::NextStepDistance, 0.0);
        assert!(!trigger.evaluate(None, &last_step));
        assert!(Trigger::not(trigger).evaluate(None, &last_step));
    }

    #[rstest]
    fn new_step_tracks_index_changes(first_step: RouteProgress, last_step: RouteProgress) {
        let new_step = Trigger::eq(TriggerProperty::NewStep, true);
        assert!(new_step.evaluate(None, &first_step));
        assert!(!new_step.evaluate(Some(&first_step), &first_step));
        assert!(new_step.evaluate(Some(&first_step), &last_step));
    }

    #[rstest]
    fn previous_step_distance_requires_same_step(first_step: RouteProgress, last_step: RouteProgress) {
        let property = TriggerProperty::PreviousStepDistanceRemaining;
        assert_eq!(property.read(Some(&first_step), &last_step), None);
        assert_eq!(
            property.read(Some(&first_step), &first_step),
            Some(TriggerValue::Number(first_step.step_distance_remaining()))
        );
    }

    #[rstest]
    fn nested_tree(first_step: RouteProgress) {
        let trigger = Trigger::any([
            Trigger::eq(TriggerProperty::LastStep, true),
            Trigger::all([
                Trigger::eq(TriggerProperty::FirstLeg, true),
                Trigger::eq(TriggerProperty::StepIndex, 0.0),
                Trigger::not(Trigger::gt(TriggerProperty::StepDistanceRemaining, 1_000.0)),
            ]),
        ]);
        assert!(trigger.evaluate(None, &first_step));
    }
}
