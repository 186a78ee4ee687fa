//! HTTP adapter for the event registration API.
//!
//! Every request carries the current bearer token when one exists. A `401`
//! is never retried here: it comes back as [`ApiError::Unauthenticated`] and
//! the caller decides how to reset the session.

mod client;
mod envelope;
mod error;
mod events;
mod identity;
mod reports;
mod reservations;

pub use client::{ApiClient, TokenSource};
pub use envelope::{EventList, Pagination};
pub use error::ApiError;
pub use identity::{AuthPayload, decode_auth_response};
