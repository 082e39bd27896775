//! Authentication outcomes.

use std::fmt;

use timetable_core::Credentials;

use crate::error::SyncError;

/// The payload-free kind of an [`Outcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutcomeKind {
    /// The server accepted the request.
    Success,
    /// No stored account exists. Never produced by the authentication task.
    NoAccount,
    /// The calendar does not exist (404).
    NotFound,
    /// The credentials were rejected (401) or network access is not allowed.
    Unauthorized,
    /// The request could not be completed.
    TransportError,
}

impl OutcomeKind {
    /// Returns a stable snake_case name for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::NoAccount => "no_account",
            Self::NotFound => "not_found",
            Self::Unauthorized => "unauthorized",
            Self::TransportError => "transport_error",
        }
    }

    /// Returns the numeric result code historically reported for this kind.
    pub fn legacy_code(&self) -> u16 {
        match self {
            Self::Success => 100,
            Self::NoAccount => 200,
            Self::NotFound => 300,
            Self::Unauthorized => 400,
            Self::TransportError => 500,
        }
    }
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The result of one authentication attempt.
#[derive(Debug)]
pub enum Outcome {
    /// Carries the credentials that were accepted.
    Success(Credentials),
    NoAccount,
    NotFound,
    Unauthorized,
    /// Carries the failure that prevented the request from completing.
    TransportError(SyncError),
}

impl Outcome {
    /// Returns the kind of this outcome.
    pub fn kind(&self) -> OutcomeKind {
        match self {
            Self::Success(_) => OutcomeKind::Success,
            Self::NoAccount => OutcomeKind::NoAccount,
            Self::NotFound => OutcomeKind::NotFound,
            Self::Unauthorized => OutcomeKind::Unauthorized,
            Self::TransportError(_) => OutcomeKind::TransportError,
        }
    }

    /// Returns true for [`Outcome::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Returns the accepted credentials on success.
    pub fn credentials(&self) -> Option<&Credentials> {
        match self {
            Self::Success(creds) => Some(creds),
            _ => None,
        }
    }

    /// Returns the transport failure, if any.
    pub fn error(&self) -> Option<&SyncError> {
        match self {
            Self::TransportError(err) => Some(err),
            _ => None,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TransportError(err) => write!(f, "{}: {}", self.kind(), err),
            other => write!(f, "{}", other.kind()),
        }
    }
}
