//! Per-location pipeline: snap, measure progress, advance, detect
//! off-route, correct the bearing and evaluate milestones.

use std::sync::Arc;

use log::{debug, info};

use crate::config::NavigationConfig;
use crate::geometry::GeometryError;
use crate::milestone::{Advance, MilestoneEngine, MilestoneEvent, next_position};
use crate::off_route::{OffRoute, OffRouteDetector, OffRouteState};
use crate::position::GeoPosition;
use crate::progress::RouteProgress;
use crate::route::Route;
use crate::snap::{Snap, SnapToRoute};

/// Everything produced by processing one location.
#[derive(Debug, Clone, PartialEq)]
pub struct TickOutcome {
    /// Position to display: snapped while on route when snapping is enabled.
    pub location: GeoPosition,
    /// Progress snapshot for this location.
    pub progress: RouteProgress,
    /// Whether the user is currently off-route.
    pub user_off_route: bool,
    /// Whether this location begins a new off-route episode.
    pub off_route_started: bool,
    /// Milestones that fired, in registration order.
    pub milestones: Vec<MilestoneEvent>,
}

/// Stateful route follower.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use geo::Point;
/// use wayfinder_core::{GeoPosition, NavigationConfig, RouteProcessor};
/// use wayfinder_core::milestone::{MilestoneEngine, default_milestones};
/// use wayfinder_core::test_support::single_step_route;
///
/// let config = NavigationConfig::default();
/// let milestones = MilestoneEngine::new(default_milestones(&config));
/// let mut processor = RouteProcessor::new(single_step_route(), config, milestones);
/// let fix = GeoPosition::new(Point::new(0.0, 0.001), Duration::from_secs(1)).with_speed(5.0);
/// let outcome = processor.process(&fix)?;
/// assert!(!outcome.user_off_route);
/// assert!(outcome.progress.fraction_traveled() > 0.4);
/// # Ok::<(), wayfinder_core::geometry::GeometryError>(())
/// ```
pub struct RouteProcessor {
    route: Arc<Route>,
    config: NavigationConfig,
    leg_index: usize,
    step_index: usize,
    previous: Option<RouteProgress>,
    off_route: OffRouteState,
    milestones: MilestoneEngine,
    snapper: Box<dyn Snap>,
    detector: Box<dyn OffRoute>,
}

impl RouteProcessor {
    /// Create a processor using [`SnapToRoute`] and [`OffRouteDetector`].
    pub fn new(route: impl Into<Arc<Route>>, config: NavigationConfig, milestones: MilestoneEngine) -> Self {
        Self::with_strategies(
            route,
            config,
            milestones,
            Box::new(SnapToRoute),
            Box::new(OffRouteDetector),
        )
    }

    /// Create a processor with custom snapping and off-route strategies.
    pub fn with_strategies(
        route: impl Into<Arc<Route>>,
        config: NavigationConfig,
        milestones: MilestoneEngine,
        snapper: Box<dyn Snap>,
        detector: Box<dyn OffRoute>,
    ) -> Self {
        Self {
            route: route.into(),
            config,
            leg_index: 0,
            step_index: 0,
            previous: None,
            off_route: OffRouteState::new(),
            milestones,
            snapper,
            detector,
        }
    }

    /// Process one location.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError`] when the route cannot be measured at the
    /// current indices; the processor state is left unchanged.
    pub fn process(&mut self, position: &GeoPosition) -> Result<TickOutcome, GeometryError> {
        let mut progress = self.locate(position, self.leg_index, self.step_index)?;
        if let Some(advance) = next_position(position, &progress, &self.config) {
            let (leg_index, step_index) = match advance {
                Advance::Step(step) => (self.leg_index, step),
                Advance::Leg(leg) => (leg, 0),
            };
            progress = self.locate(position, leg_index, step_index)?;
            debug!("advanced to leg {leg_index} step {step_index}");
            self.leg_index = leg_index;
            self.step_index = step_index;
        }

        let user_off_route = self
            .detector
            .is_user_off_route(position, &progress, &self.config);
        let location = if self.config.snap_to_route && !user_off_route {
            let bearing = self
                .snapper
                .snapped_bearing(position, &progress, &self.config);
            position
                .with_point(progress.snapped_position())
                .with_bearing(bearing)
        } else {
            *position
        };
        let off_route_started =
            self.off_route
                .update(user_off_route, position.timestamp, self.config.reroute_debounce);
        if off_route_started {
            info!(
                "user left the route at {:.6},{:.6}",
                position.latitude(),
                position.longitude()
            );
        }
        let milestones = self.milestones.evaluate(self.previous.as_ref(), &progress);
        self.previous = Some(progress.clone());

        Ok(TickOutcome {
            location,
            progress,
            user_off_route,
            off_route_started,
            milestones,
        })
    }

    /// Adopt a new route, restarting from its first step.
    pub fn replace_route(&mut self, route: impl Into<Arc<Route>>) {
        self.route = route.into();
        self.leg_index = 0;
        self.step_index = 0;
        self.previous = None;
        self.off_route.reset();
        self.milestones.reset();
    }

    /// Route being followed.
    pub fn route(&self) -> &Arc<Route> {
        &self.route
    }

    /// Active settings.
    pub fn config(&self) -> &NavigationConfig {
        &self.config
    }

    /// Current leg index.
    pub fn leg_index(&self) -> usize {
        self.leg_index
    }

    /// Current step index.
    pub fn step_index(&self) -> usize {
        self.step_index
    }

    /// Snapshot produced by the most recent location, if any.
    pub fn last_progress(&self) -> Option<&RouteProgress> {
        self.previous.as_ref()
    }

    /// Whether the most recent location was off-route.
    pub fn is_off_route(&self) -> bool {
        self.off_route.is_off_route()
    }

    fn locate(
        &self,
        position: &GeoPosition,
        leg_index: usize,
        step_index: usize,
    ) -> Result<RouteProgress, GeometryError> {
        let projection = self
            .snapper
            .snap(position, &self.route, leg_index, step_index)?;
        RouteProgress::compute(Arc::clone(&self.route), leg_index, step_index, projection.point)
    }
}
