//! The authentication task.
//!
//! One call to [`AuthenticationTask::authenticate`] walks through
//! `Idle → Started → Dispatching → Completed`:
//!
//! - the listener's start callback runs on the calling task, before any I/O
//! - the request is built and dispatched on a spawned Tokio task
//! - the result comes back through [`PendingAuthentication::deliver`], which
//!   the caller awaits on its own task, so the result callback runs there too
//!
//! The listener is reached through a [`ListenerHandle`]. Once its owner
//! invalidates it, the result is dropped instead of delivered.

use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use timetable_core::{Credentials, SyncRequestConfig};

use crate::classify::classify;
use crate::error::SyncError;
use crate::outcome::Outcome;
use crate::request::build_request;
use crate::transport::Transport;

/// Receives the progress of an authentication attempt.
pub trait AuthenticationListener: Send + Sync {
    /// Called once, before any network activity.
    fn on_authentication_task_started(&self);

    /// Called at most once with the final outcome.
    fn on_authentication_result(&self, outcome: Outcome);
}

/// Answers whether this process may use the network.
pub trait NetworkPermission: Send + Sync {
    fn has_network_access(&self) -> bool;
}

/// A fixed answer to [`NetworkPermission`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NetworkAccess {
    #[default]
    Granted,
    Denied,
}

impl NetworkPermission for NetworkAccess {
    fn has_network_access(&self) -> bool {
        matches!(self, Self::Granted)
    }
}

/// A revocable reference to a listener.
///
/// Clones share the same slot: invalidating one invalidates all of them.
#[derive(Clone)]
pub struct ListenerHandle {
    slot: Arc<RwLock<Option<Arc<dyn AuthenticationListener>>>>,
}

impl ListenerHandle {
    /// Wraps a listener.
    pub fn new<L: AuthenticationListener + 'static>(listener: Arc<L>) -> Self {
        let listener: Arc<dyn AuthenticationListener> = listener;
        Self {
            slot: Arc::new(RwLock::new(Some(listener))),
        }
    }

    /// Detaches the listener. Pending results will be dropped.
    pub fn invalidate(&self) {
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        *slot = None;
    }

    /// Returns true while the listener is attached.
    pub fn is_valid(&self) -> bool {
        self.get().is_some()
    }

    fn get(&self) -> Option<Arc<dyn AuthenticationListener>> {
        let slot = self.slot.read().unwrap_or_else(PoisonError::into_inner);
        (*slot).clone()
    }
}

impl std::fmt::Debug for ListenerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerHandle")
            .field("valid", &self.is_valid())
            .finish()
    }
}

/// Lifecycle of one authentication attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Idle,
    Started,
    Dispatching,
    Completed,
}

/// Runs authentication attempts against a transport.
///
/// Attempts share nothing but the transport, so any number may run at once.
#[derive(Clone)]
pub struct AuthenticationTask {
    transport: Arc<dyn Transport>,
    permission: Arc<dyn NetworkPermission>,
}

impl AuthenticationTask {
    /// Creates a task that dispatches through `transport`, with network
    /// access granted.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            permission: Arc::new(NetworkAccess::Granted),
        }
    }

    /// Replaces the network permission check.
    pub fn with_permission(mut self, permission: Arc<dyn NetworkPermission>) -> Self {
        self.permission = permission;
        self
    }

    /// Starts an authentication attempt.
    ///
    /// Fires the start callback synchronously, then spawns the request on
    /// the current Tokio runtime. Outside a runtime the attempt completes
    /// immediately with a transport error.
    pub fn authenticate(
        &self,
        credentials: Credentials,
        config: SyncRequestConfig,
        listener: &ListenerHandle,
    ) -> PendingAuthentication {
        let (state_tx, _) = watch::channel(TaskState::Idle);
        let state_tx = Arc::new(state_tx);

        info!(
            username = %credentials.username(),
            server = %config.base_server_url,
            calendar = %config.calendar_name,
            "Starting authentication"
        );

        state_tx.send_replace(TaskState::Started);
        if let Some(l) = listener.get() {
            l.on_authentication_task_started();
        }

        let work = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => Work::Running(runtime.spawn(perform(
                self.transport.clone(),
                self.permission.clone(),
                credentials,
                config,
                state_tx.clone(),
            ))),
            Err(e) => {
                warn!(error = %e, "No async runtime available");
                Work::Ready(Outcome::TransportError(
                    SyncError::internal("no async runtime to run the request").with_source(e),
                ))
            }
        };

        PendingAuthentication {
            work,
            listener: listener.clone(),
            state_tx,
        }
    }

    /// Starts an attempt and delivers its result on the current task.
    ///
    /// Returns true if the listener received the result.
    pub async fn run(
        &self,
        credentials: Credentials,
        config: SyncRequestConfig,
        listener: &ListenerHandle,
    ) -> bool {
        self.authenticate(credentials, config, listener)
            .deliver()
            .await
    }
}

enum Work {
    Running(JoinHandle<Outcome>),
    Ready(Outcome),
}

/// An attempt whose result has not been delivered yet.
///
/// Dropping it drops the result; the request itself still runs to
/// completion in the background.
#[must_use = "the result is only delivered by awaiting `deliver`"]
pub struct PendingAuthentication {
    work: Work,
    listener: ListenerHandle,
    state_tx: Arc<watch::Sender<TaskState>>,
}

impl PendingAuthentication {
    /// Returns the current state of the attempt.
    pub fn state(&self) -> TaskState {
        *self.state_tx.borrow()
    }

    /// Returns a receiver that observes state changes, including completion.
    pub fn subscribe(&self) -> watch::Receiver<TaskState> {
        self.state_tx.subscribe()
    }

    /// Waits for the outcome and hands it to the listener if still attached.
    ///
    /// Returns true if the listener received the result.
    pub async fn deliver(self) -> bool {
        let outcome = match self.work {
            Work::Ready(outcome) => outcome,
            Work::Running(handle) => handle
                .await
                .unwrap_or_else(|e| Outcome::TransportError(SyncError::from(e))),
        };
        self.state_tx.send_replace(TaskState::Completed);

        info!(outcome = %outcome.kind(), "Authentication completed");

        match self.listener.get() {
            Some(l) => {
                l.on_authentication_result(outcome);
                true
            }
            None => {
                debug!("Listener detached, dropping result");
                false
            }
        }
    }
}

/// The part of an attempt that runs off the caller's task.
async fn perform(
    transport: Arc<dyn Transport>,
    permission: Arc<dyn NetworkPermission>,
    credentials: Credentials,
    config: SyncRequestConfig,
    state_tx: Arc<watch::Sender<TaskState>>,
) -> Outcome {
    if !permission.has_network_access() {
        warn!("Network access not permitted, skipping request");
        return Outcome::Unauthorized;
    }

    let request = build_request(&config, &credentials);

    state_tx.send_replace(TaskState::Dispatching);
    debug!(transport = transport.name(), "Dispatching request");

    let result = transport.execute(request).await;
    if let Err(ref e) = result {
        warn!(error = %e, "Request failed");
    }
    classify(result, credentials)
}
