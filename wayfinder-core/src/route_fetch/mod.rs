//! Fetch replacement routes.
//!
//! The [`RouteFetcher`] trait abstracts the routing service. Callers describe
//! where the user is with a [`RouteRequest`] and receive candidate routes,
//! best first.

mod error;
mod fetcher;

pub use error::RouteFetchError;
pub use fetcher::{RouteFetcher, RouteRequest};
