//! Calendar feed authentication.
//!
//! Checks a username and password against a calendar server by requesting
//! the user's calendar feed once and looking at the status code.
//!
//! ```text
//! AuthenticationTask ──build_request()──▶ HttpRequest
//!         │                                   │
//!         │                                   ▼ Transport::execute()
//!         │                              StatusCode / SyncError
//!         │                                   │
//!         │                                   ▼ classify()
//!         └──────── deliver() ◀───────────  Outcome
//!                     │
//!                     ▼
//!          AuthenticationListener
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use timetable_sync::{AuthenticationTask, ListenerHandle, ReqwestTransport};
//!
//! let task = AuthenticationTask::new(Arc::new(ReqwestTransport::with_defaults()?));
//! let handle = ListenerHandle::new(listener);
//! task.run(credentials, config, &handle).await;
//! ```

pub mod auth;
pub mod classify;
pub mod error;
pub mod outcome;
pub mod request;
pub mod task;
pub mod transport;

pub use auth::{basic_auth, decode_basic_auth};
pub use classify::classify;
pub use error::{SyncError, SyncErrorCode, SyncResult};
pub use outcome::{Outcome, OutcomeKind};
pub use request::{HttpRequest, build_request, calendar_address};
pub use task::{
    AuthenticationListener, AuthenticationTask, ListenerHandle, NetworkAccess, NetworkPermission,
    PendingAuthentication, TaskState,
};
pub use transport::{BoxFuture, ReqwestTransport, Transport, TransportConfig};

pub use reqwest::StatusCode;
