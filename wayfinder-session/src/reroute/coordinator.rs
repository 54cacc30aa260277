//! Single-flight reroute requests.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use wayfinder_core::{Route, RouteFetchError, RouteFetcher, RouteRequest};

/// Why a reroute was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RerouteReason {
    /// The user left the route.
    OffRoute,
    /// The periodic refresh timer fired.
    Refresh,
    /// The caller asked explicitly.
    Requested,
}

impl RerouteReason {
    /// Return a short lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OffRoute => "off-route",
            Self::Refresh => "refresh",
            Self::Requested => "requested",
        }
    }
}

impl fmt::Display for RerouteReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a fetch, tagged with the request that produced it.
#[derive(Debug)]
pub struct RerouteResponse {
    /// Sequence number of the originating request.
    pub generation: u64,
    /// Why the request was made.
    pub reason: RerouteReason,
    /// Candidates returned by the fetcher.
    pub result: Result<Vec<Route>, RouteFetchError>,
}

#[derive(Debug)]
struct InFlight {
    generation: u64,
    started: Instant,
    handle: JoinHandle<()>,
}

/// Runs at most one route fetch at a time.
///
/// A request made while another is in flight is ignored. Once a request has
/// been outstanding for the timeout it no longer counts as in flight: its
/// fetch is cut off, its response is discarded, and the next request starts a
/// fresh fetch.
pub struct RerouteCoordinator {
    fetcher: Arc<dyn RouteFetcher>,
    timeout: Duration,
    generation: u64,
    in_flight: Option<InFlight>,
}

impl RerouteCoordinator {
    /// Create a coordinator that replaces requests older than `timeout`.
    #[must_use]
    pub fn new(fetcher: Arc<dyn RouteFetcher>, timeout: Duration) -> Self {
        Self {
            fetcher,
            timeout,
            generation: 0,
            in_flight: None,
        }
    }

    /// Start a fetch for `request`, delivering the response to `responses`.
    ///
    /// Must be called from within a Tokio runtime. Returns `false` when the
    /// request was ignored because another is in flight.
    pub fn request(
        &mut self,
        reason: RerouteReason,
        request: RouteRequest,
        responses: &UnboundedSender<RerouteResponse>,
    ) -> bool {
        if let Some(current) = self.in_flight.take() {
            if !self.has_expired(&current) {
                debug!(
                    "ignoring {reason} reroute while request {} is in flight",
                    current.generation
                );
                self.in_flight = Some(current);
                return false;
            }
            warn!(
                "reroute request {} exceeded {:?}, replacing it",
                current.generation, self.timeout
            );
            current.handle.abort();
        }

        self.generation += 1;
        let generation = self.generation;
        let fetcher = Arc::clone(&self.fetcher);
        let responder = responses.clone();
        let timeout = self.timeout;
        let handle = tokio::spawn(async move {
            let result = tokio::time::timeout(timeout, fetcher.fetch_routes(&request))
                .await
                .unwrap_or_else(|_| {
                    Err(RouteFetchError::Timeout {
                        timeout_secs: timeout.as_secs(),
                    })
                });
            let response = RerouteResponse {
                generation,
                reason,
                result,
            };
            if responder.send(response).is_err() {
                debug!("session closed before reroute request {generation} completed");
            }
        });
        debug!("started {reason} reroute request {generation}");
        self.in_flight = Some(InFlight {
            generation,
            started: Instant::now(),
            handle,
        });
        true
    }

    /// Accept `response` if it answers the current request in time.
    ///
    /// Returns `None` for responses to requests that were replaced or that
    /// arrived once the timeout had passed. A late response still clears the
    /// in-flight request it belongs to.
    pub fn complete(&mut self, response: RerouteResponse) -> Option<RerouteResponse> {
        let answered = self
            .in_flight
            .take_if(|pending| pending.generation == response.generation);
        let Some(current) = answered else {
            debug!("discarding stale reroute response {}", response.generation);
            return None;
        };
        if self.has_expired(&current) {
            warn!(
                "discarding reroute response {} received after {:?}",
                response.generation, self.timeout
            );
            return None;
        }
        Some(response)
    }

    /// Whether a request is outstanding and still within the timeout.
    #[must_use]
    pub fn is_in_flight(&self) -> bool {
        self.in_flight
            .as_ref()
            .is_some_and(|current| !self.has_expired(current))
    }

    fn has_expired(&self, current: &InFlight) -> bool {
        current.started.elapsed() >= self.timeout
    }

    /// Abort any outstanding request.
    pub fn cancel(&mut self) {
        if let Some(current) = self.in_flight.take() {
            current.handle.abort();
        }
    }
}

impl fmt::Debug for RerouteCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RerouteCoordinator")
            .field("timeout", &self.timeout)
            .field("generation", &self.generation)
            .field("in_flight", &self.in_flight)
            .finish_non_exhaustive()
    }
}

impl Drop for RerouteCoordinator {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use geo::Point;
    use tokio::sync::mpsc;
    use wayfinder_core::test_support::{PendingRouteFetcher, StubRouteFetcher, single_step_route};

    fn request() -> RouteRequest {
        RouteRequest::from_origin(Point::new(0.0, 0.0))
    }

    /// Answers with a single route after `delay`.
    #[derive(Debug)]
    struct DelayedRouteFetcher {
        delay: Duration,
    }

    #[async_trait]
    impl RouteFetcher for DelayedRouteFetcher {
        async fn fetch_routes(&self, _request: &RouteRequest) -> Result<Vec<Route>, RouteFetchError> {
            tokio::time::sleep(self.delay).await;
            Ok(vec![single_step_route()])
        }
    }

    #[tokio::test(start_paused = true)]
    async fn second_request_is_ignored_while_in_flight() {
        let fetcher = Arc::new(PendingRouteFetcher::default());
        let mut coordinator =
            RerouteCoordinator::new(Arc::clone(&fetcher) as Arc<dyn RouteFetcher>, Duration::from_secs(5));
        let (tx, _rx) = mpsc::unbounded_channel();

        assert!(coordinator.request(RerouteReason::OffRoute, request(), &tx));
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(!coordinator.request(RerouteReason::Requested, request(), &tx));
        assert_eq!(fetcher.calls(), 1);
        assert!(coordinator.is_in_flight());
    }

    #[tokio::test(start_paused = true)]
    async fn stale_request_is_replaced_after_timeout() {
        let fetcher = Arc::new(PendingRouteFetcher::default());
        let mut coordinator =
            RerouteCoordinator::new(Arc::clone(&fetcher) as Arc<dyn RouteFetcher>, Duration::from_secs(5));
        let (tx, _rx) = mpsc::unbounded_channel();

        assert!(coordinator.request(RerouteReason::OffRoute, request(), &tx));
        tokio::time::sleep(Duration::from_secs(6)).await;
        assert!(coordinator.request(RerouteReason::Requested, request(), &tx));
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn response_clears_in_flight_and_stale_ones_are_dropped() {
        let fetcher: Arc<dyn RouteFetcher> =
            Arc::new(StubRouteFetcher::with_routes(vec![single_step_route()]));
        let mut coordinator = RerouteCoordinator::new(fetcher, Duration::from_secs(5));
        let (tx, mut rx) = mpsc::unbounded_channel();

        assert!(coordinator.request(RerouteReason::Refresh, request(), &tx));
        let response = rx.recv().await.expect("response");
        assert_eq!(response.reason, RerouteReason::Refresh);
        let accepted = coordinator.complete(response).expect("current response");
        assert_eq!(accepted.result.map(|routes| routes.len()), Ok(1));
        assert!(!coordinator.is_in_flight());

        let stale = RerouteResponse {
            generation: 99,
            reason: RerouteReason::Refresh,
            result: Err(RouteFetchError::NoRoute),
        };
        assert!(coordinator.complete(stale).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn in_flight_flag_clears_once_the_timeout_passes() {
        let fetcher: Arc<dyn RouteFetcher> = Arc::new(PendingRouteFetcher::default());
        let mut coordinator = RerouteCoordinator::new(fetcher, Duration::from_secs(5));
        let (tx, _rx) = mpsc::unbounded_channel();

        assert!(coordinator.request(RerouteReason::OffRoute, request(), &tx));
        tokio::time::sleep(Duration::from_secs(4)).await;
        assert!(coordinator.is_in_flight());
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(!coordinator.is_in_flight());
    }

    #[tokio::test(start_paused = true)]
    async fn response_slower_than_the_timeout_is_dropped() {
        let fetcher: Arc<dyn RouteFetcher> = Arc::new(DelayedRouteFetcher {
            delay: Duration::from_secs(8),
        });
        let mut coordinator = RerouteCoordinator::new(fetcher, Duration::from_secs(5));
        let (tx, mut rx) = mpsc::unbounded_channel();

        assert!(coordinator.request(RerouteReason::OffRoute, request(), &tx));
        let response = rx.recv().await.expect("response");
        assert_eq!(
            response.result.as_ref().map(Vec::len),
            Err(&RouteFetchError::Timeout { timeout_secs: 5 })
        );
        assert!(coordinator.complete(response).is_none());
        assert!(!coordinator.is_in_flight());

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(rx.try_recv().is_err(), "the slow fetch must not answer later");
    }

    #[tokio::test(start_paused = true)]
    async fn late_response_to_the_current_request_is_dropped() {
        let fetcher: Arc<dyn RouteFetcher> =
            Arc::new(StubRouteFetcher::with_routes(vec![single_step_route()]));
        let mut coordinator = RerouteCoordinator::new(fetcher, Duration::from_secs(5));
        let (tx, mut rx) = mpsc::unbounded_channel();

        assert!(coordinator.request(RerouteReason::Refresh, request(), &tx));
        let response = rx.recv().await.expect("response");
        tokio::time::sleep(Duration::from_secs(6)).await;
        assert!(coordinator.complete(response).is_none());
        assert!(!coordinator.is_in_flight());
    }
}
