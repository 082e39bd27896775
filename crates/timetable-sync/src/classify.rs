//! Mapping of transport results onto outcomes.
//!
//! Only 404 and 401 are told apart. Every other status, server errors
//! included, counts as a successful authentication: the server answered, and
//! it did not say the calendar is missing or the credentials are wrong.

use reqwest::StatusCode;
use tracing::debug;

use timetable_core::Credentials;

use crate::error::SyncResult;
use crate::outcome::Outcome;

/// Classifies the result of dispatching a request made with `credentials`.
pub fn classify(result: SyncResult<StatusCode>, credentials: Credentials) -> Outcome {
    let outcome = match result {
        Err(err) => Outcome::TransportError(err),
        Ok(StatusCode::NOT_FOUND) => Outcome::NotFound,
        Ok(StatusCode::UNAUTHORIZED) => Outcome::Unauthorized,
        Ok(_) => Outcome::Success(credentials),
    };
    debug!(outcome = %outcome.kind(), "Classified response");
    outcome
}
