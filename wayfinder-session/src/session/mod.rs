//! The navigation session: a handle feeding a background worker.
//!
//! [`NavigationSession::start`] spawns one worker task that owns the
//! [`RouteProcessor`](wayfinder_core::RouteProcessor) and the reroute
//! coordinator. Locations are coalesced so only the most recent unprocessed
//! fix is handled. Events come back, in order, on the returned
//! [`EventStream`].

mod events;
mod worker;

use std::sync::Arc;

use log::debug;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use wayfinder_core::{GeoPosition, MilestoneEngine, NavigationConfig, Route, RouteFetcher, RouteProcessor};

use crate::error::SessionError;
use crate::reroute::RerouteCoordinator;

pub use events::{EventStream, NavigationEvent, NavigationListener};
use worker::{Command, Inputs, Worker};

/// Handle to a running navigation session.
///
/// Dropping the handle cancels the worker and any in-flight reroute.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use std::time::Duration;
/// use geo::Point;
/// use wayfinder_core::{GeoPosition, NavigationConfig};
/// use wayfinder_core::milestone::{MilestoneEngine, default_milestones};
/// use wayfinder_core::test_support::{StubRouteFetcher, single_step_route};
/// use wayfinder_session::{NavigationEvent, NavigationSession};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = NavigationConfig::default();
/// let milestones = MilestoneEngine::new(default_milestones(&config));
/// let fetcher = Arc::new(StubRouteFetcher::with_routes(Vec::new()));
/// let (session, mut events) =
///     NavigationSession::start(single_step_route(), config, milestones, fetcher)?;
///
/// session.update_location(GeoPosition::new(Point::new(0.0, 0.001), Duration::from_secs(1)))?;
/// while let Some(event) = events.recv().await {
///     if let NavigationEvent::ProgressChange { progress, .. } = event {
///         assert!(progress.fraction_traveled() > 0.4);
///         break;
///     }
/// }
/// session.shutdown().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct NavigationSession {
    locations: watch::Sender<Option<GeoPosition>>,
    commands: mpsc::UnboundedSender<Command>,
    cancel: CancellationToken,
    worker: Option<JoinHandle<Result<(), SessionError>>>,
}

impl NavigationSession {
    /// Validate `config` and spawn the worker on the current Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Config`] for invalid settings and
    /// [`SessionError::NoRuntime`] outside a Tokio runtime.
    pub fn start(
        route: Route,
        config: NavigationConfig,
        milestones: MilestoneEngine,
        fetcher: Arc<dyn RouteFetcher>,
    ) -> Result<(Self, EventStream), SessionError> {
        config.validate()?;
        let runtime = Handle::try_current().map_err(|_| SessionError::NoRuntime)?;

        let coordinator = RerouteCoordinator::new(fetcher, config.reroute_timeout);
        let processor = RouteProcessor::new(route, config, milestones);
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (locations_tx, locations_rx) = watch::channel(None);
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        let worker = Worker::new(processor, coordinator, events_tx);
        let inputs = Inputs {
            locations: locations_rx,
            commands: commands_rx,
            cancel: cancel.clone(),
        };
        let handle = runtime.spawn(worker.run(inputs));
        debug!("navigation session started");

        Ok((
            Self {
                locations: locations_tx,
                commands: commands_tx,
                cancel,
                worker: Some(handle),
            },
            EventStream::new(events_rx),
        ))
    }

    /// Submit a location fix.
    ///
    /// If the worker is busy, an earlier unprocessed fix is replaced.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Closed`] once the worker has stopped.
    pub fn update_location(&self, position: GeoPosition) -> Result<(), SessionError> {
        if self.locations.is_closed() {
            return Err(SessionError::Closed);
        }
        self.locations.send_replace(Some(position));
        Ok(())
    }

    /// Ask for a new route from the latest location.
    ///
    /// Ignored while another reroute is in flight.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Closed`] once the worker has stopped.
    pub fn request_reroute(&self) -> Result<(), SessionError> {
        self.commands
            .send(Command::Reroute)
            .map_err(|_| SessionError::Closed)
    }

    /// Whether the worker is still running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.worker
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Stop the worker and wait for it to finish.
    ///
    /// # Errors
    ///
    /// Returns the error that stopped the worker early, or
    /// [`SessionError::Worker`] if it panicked.
    pub async fn shutdown(mut self) -> Result<(), SessionError> {
        self.cancel.cancel();
        match self.worker.take() {
            Some(handle) => handle
                .await
                .map_err(|err| SessionError::Worker(err.to_string()))?,
            None => Ok(()),
        }
    }
}

impl Drop for NavigationSession {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
