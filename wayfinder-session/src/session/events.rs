//! Events published by a navigation session.

use std::sync::Arc;

use geo::Point;
use tokio::sync::mpsc::UnboundedReceiver;
use wayfinder_core::{GeoPosition, Route, RouteProgress};

/// Something the presentation layer should react to.
///
/// For a single location the order is: [`NavigationEvent::UserOffRoute`],
/// then each [`NavigationEvent::Milestone`], then
/// [`NavigationEvent::ProgressChange`].
#[derive(Debug, Clone, PartialEq)]
pub enum NavigationEvent {
    /// A location was processed.
    ProgressChange {
        /// Position to display.
        location: GeoPosition,
        /// Progress after the location.
        progress: RouteProgress,
    },
    /// A milestone fired.
    Milestone {
        /// Progress that fired it.
        progress: RouteProgress,
        /// Rendered instruction text.
        instruction: String,
        /// Identifier of the milestone.
        milestone_id: u32,
    },
    /// The user left the route.
    UserOffRoute {
        /// Raw location that was off-route.
        location: GeoPosition,
    },
    /// A new route was adopted.
    RerouteAlong {
        /// The adopted route.
        route: Arc<Route>,
        /// Its destination.
        destination: Point<f64>,
    },
    /// A reroute failed while the user was off-route.
    FailedReroute {
        /// Description of the failure.
        message: String,
    },
}

impl NavigationEvent {
    /// Invoke the matching callback on `listener`.
    pub fn dispatch(&self, listener: &mut dyn NavigationListener) {
        match self {
            Self::ProgressChange { location, progress } => {
                listener.on_progress_change(location, progress);
            }
            Self::Milestone {
                progress,
                instruction,
                milestone_id,
            } => listener.on_milestone_event(progress, instruction, *milestone_id),
            Self::UserOffRoute { location } => listener.on_user_off_route(location),
            Self::RerouteAlong { route, destination } => {
                listener.on_reroute_along(route, *destination);
            }
            Self::FailedReroute { message } => listener.on_failed_reroute(message),
        }
    }
}

/// Callback-style consumer of [`NavigationEvent`]s.
///
/// Every method has an empty default so listeners implement only what they
/// need.
pub trait NavigationListener: Send {
    /// A location was processed.
    fn on_progress_change(&mut self, location: &GeoPosition, progress: &RouteProgress) {
        let _ = (location, progress);
    }

    /// A milestone fired.
    fn on_milestone_event(&mut self, progress: &RouteProgress, instruction: &str, milestone_id: u32) {
        let _ = (progress, instruction, milestone_id);
    }

    /// The user left the route.
    fn on_user_off_route(&mut self, location: &GeoPosition) {
        let _ = location;
    }

    /// A new route was adopted.
    fn on_reroute_along(&mut self, route: &Arc<Route>, destination: Point<f64>) {
        let _ = (route, destination);
    }

    /// A reroute failed while off-route.
    fn on_failed_reroute(&mut self, message: &str) {
        let _ = message;
    }
}

/// Receiving end of a session's events.
///
/// The stream ends once the session has stopped and every pending event has
/// been received.
#[derive(Debug)]
pub struct EventStream {
    receiver: UnboundedReceiver<NavigationEvent>,
}

impl EventStream {
    pub(crate) const fn new(receiver: UnboundedReceiver<NavigationEvent>) -> Self {
        Self { receiver }
    }

    /// Wait for the next event.
    pub async fn recv(&mut self) -> Option<NavigationEvent> {
        self.receiver.recv().await
    }

    /// Take the next event if one is ready.
    pub fn try_recv(&mut self) -> Option<NavigationEvent> {
        self.receiver.try_recv().ok()
    }

    /// Forward every event to `listener` until the session stops.
    pub async fn dispatch_to(mut self, listener: &mut dyn NavigationListener) {
        while let Some(event) = self.receiver.recv().await {
            event.dispatch(listener);
        }
    }
}
