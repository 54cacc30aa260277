//! The background task that owns all mutable navigation state.

use std::sync::Arc;

use log::{error, info, warn};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::watch;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use wayfinder_core::{GeoPosition, RouteFetchError, RouteProcessor, RouteRequest};

use crate::error::SessionError;
use crate::reroute::{RerouteCoordinator, RerouteReason, RerouteResponse, select_route};

use super::events::NavigationEvent;

/// Requests sent from the session handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Command {
    Reroute,
}

pub(crate) struct Worker {
    processor: RouteProcessor,
    coordinator: RerouteCoordinator,
    events: UnboundedSender<NavigationEvent>,
    last_position: Option<GeoPosition>,
}

pub(crate) struct Inputs {
    pub(crate) locations: watch::Receiver<Option<GeoPosition>>,
    pub(crate) commands: UnboundedReceiver<Command>,
    pub(crate) cancel: CancellationToken,
}

impl Worker {
    pub(crate) const fn new(
        processor: RouteProcessor,
        coordinator: RerouteCoordinator,
        events: UnboundedSender<NavigationEvent>,
    ) -> Self {
        Self {
            processor,
            coordinator,
            events,
            last_position: None,
        }
    }

    /// Drain inputs until cancelled or the session handle goes away.
    #[expect(
        clippy::integer_division_remainder_used,
        reason = "tokio::select! computes its branch start with a remainder"
    )]
    pub(crate) async fn run(mut self, inputs: Inputs) -> Result<(), SessionError> {
        let Inputs {
            mut locations,
            mut commands,
            cancel,
        } = inputs;
        let (responses_tx, mut responses_rx) = mpsc::unbounded_channel();
        let mut refresh = refresh_timer(&self.processor);

        let result = loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break Ok(()),
                Some(response) = responses_rx.recv() => self.on_response(response),
                command = commands.recv() => match command {
                    Some(Command::Reroute) => self.reroute(RerouteReason::Requested, &responses_tx),
                    None => break Ok(()),
                },
                changed = locations.changed() => {
                    if changed.is_err() {
                        break Ok(());
                    }
                    let latest = *locations.borrow_and_update();
                    if let Some(position) = latest {
                        if let Err(err) = self.tick(position, &responses_tx) {
                            error!("stopping navigation: {err}");
                            break Err(err);
                        }
                    }
                },
                () = next_refresh(&mut refresh) => {
                    self.reroute(RerouteReason::Refresh, &responses_tx);
                },
            }
        };
        self.coordinator.cancel();
        result
    }

    fn tick(
        &mut self,
        position: GeoPosition,
        responses: &UnboundedSender<RerouteResponse>,
    ) -> Result<(), SessionError> {
        self.last_position = Some(position);
        let outcome = self.processor.process(&position)?;
        if outcome.off_route_started {
            self.emit(NavigationEvent::UserOffRoute { location: position });
        }
        for milestone in outcome.milestones {
            self.emit(NavigationEvent::Milestone {
                progress: outcome.progress.clone(),
                instruction: milestone.instruction,
                milestone_id: milestone.milestone_id,
            });
        }
        self.emit(NavigationEvent::ProgressChange {
            location: outcome.location,
            progress: outcome.progress,
        });
        if outcome.off_route_started {
            self.reroute(RerouteReason::OffRoute, responses);
        }
        Ok(())
    }

    fn reroute(&mut self, reason: RerouteReason, responses: &UnboundedSender<RerouteResponse>) {
        let Some(position) = self.last_position else {
            info!("no location yet, skipping {reason} reroute");
            return;
        };
        let request = RouteRequest {
            origin: position.point,
            bearing: position.is_moving().then_some(position.bearing),
            progress: self.processor.last_progress().cloned(),
        };
        if self.coordinator.request(reason, request, responses) {
            info!("requested {reason} reroute");
        }
    }

    fn on_response(&mut self, response: RerouteResponse) {
        let Some(accepted) = self.coordinator.complete(response) else {
            return;
        };
        let reason = accepted.reason;
        let selected = accepted.result.and_then(|routes| {
            select_route(Some(self.processor.route().as_ref()), routes).ok_or(RouteFetchError::NoRoute)
        });
        match selected {
            Ok(candidate) => {
                self.processor.replace_route(candidate);
                let adopted = Arc::clone(self.processor.route());
                let destination = adopted.destination();
                info!("adopted new route after {reason} reroute");
                self.emit(NavigationEvent::RerouteAlong {
                    route: adopted,
                    destination,
                });
            }
            Err(err) if self.processor.is_off_route() => {
                warn!("{reason} reroute failed: {err}");
                self.emit(NavigationEvent::FailedReroute {
                    message: err.to_string(),
                });
            }
            Err(err) => warn!("discarding failed {reason} reroute: {err}"),
        }
    }

    fn emit(&self, event: NavigationEvent) {
        if self.events.send(event).is_err() {
            info!("event stream dropped, discarding navigation event");
        }
    }
}

fn refresh_timer(processor: &RouteProcessor) -> Option<Interval> {
    let period = processor.config().refresh_interval;
    if period.is_zero() {
        return None;
    }
    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    Some(interval)
}

async fn next_refresh(refresh: &mut Option<Interval>) {
    match refresh {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}
