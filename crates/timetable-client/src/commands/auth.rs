//! `timetable auth`: check credentials against the calendar server.

use std::sync::{Arc, Mutex};

use serde_json::{Value, json};
use tracing::debug;

use timetable_sync::{
    AuthenticationListener, AuthenticationTask, ListenerHandle, Outcome, OutcomeKind,
    ReqwestTransport,
};

use crate::cli::AuthArgs;
use crate::config::ClientConfig;
use crate::error::ClientResult;

/// Prints progress to stderr and keeps the rendered outcome.
struct TerminalListener {
    json: bool,
    target: String,
    result: Mutex<Option<(OutcomeKind, String)>>,
}

impl TerminalListener {
    fn new(json: bool, target: String) -> Self {
        Self {
            json,
            target,
            result: Mutex::new(None),
        }
    }

    fn take(&self) -> Option<(OutcomeKind, String)> {
        self.result.lock().ok().and_then(|mut r| r.take())
    }
}

impl AuthenticationListener for TerminalListener {
    fn on_authentication_task_started(&self) {
        if !self.json {
            eprintln!("Authenticating against {}...", self.target);
        }
    }

    fn on_authentication_result(&self, outcome: Outcome) {
        let rendered = render(&outcome, self.json);
        if let Ok(mut slot) = self.result.lock() {
            *slot = Some((outcome.kind(), rendered));
        }
    }
}

/// Runs the authentication check and prints its outcome.
///
/// Returns the outcome kind so the caller can pick an exit code.
pub async fn run(args: AuthArgs, config: &ClientConfig) -> ClientResult<OutcomeKind> {
    let mut request = config.request_config();
    if let Some(server) = args.server {
        request.base_server_url = server;
    }
    if let Some(calendar) = args.calendar {
        request.calendar_name = calendar;
    }

    let Some(credentials) =
        config.resolve_credentials(args.username.as_deref(), args.password.as_deref())?
    else {
        debug!("No stored account");
        let outcome = Outcome::NoAccount;
        println!("{}", render(&outcome, args.json));
        return Ok(outcome.kind());
    };

    let transport = ReqwestTransport::new(&config.network.transport_config())?;
    let task = AuthenticationTask::new(Arc::new(transport))
        .with_permission(Arc::new(config.network.access()));

    let target = format!("{}/home/{}", request.base_server_url, credentials.username());
    let listener = Arc::new(TerminalListener::new(args.json, target));
    let handle = ListenerHandle::new(listener.clone());

    task.run(credentials, request, &handle).await;

    match listener.take() {
        Some((kind, rendered)) => {
            println!("{}", rendered);
            Ok(kind)
        }
        None => Ok(OutcomeKind::TransportError),
    }
}

/// Renders an outcome as a line of text or a JSON document.
pub fn render(outcome: &Outcome, json: bool) -> String {
    if json {
        render_json(outcome).to_string()
    } else {
        render_text(outcome)
    }
}

/// Human readable outcome.
pub fn render_text(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Success(creds) => format!("Authenticated as {}.", creds.username()),
        Outcome::NoAccount => {
            "No account configured. Set [account] in the config file or pass --username and --password."
                .to_string()
        }
        Outcome::NotFound => {
            "Calendar not found. Check the server address and calendar name.".to_string()
        }
        Outcome::Unauthorized => "Access denied. Check your username and password.".to_string(),
        Outcome::TransportError(err) => format!("Could not reach the server: {}", err),
    }
}

/// Machine readable outcome.
pub fn render_json(outcome: &Outcome) -> Value {
    let kind = outcome.kind();
    let username = outcome.credentials().map(|c| c.username());
    let error = outcome
        .error()
        .map(|e| json!({ "kind": e.code().as_str(), "message": e.message() }));
    json!({
        "outcome": kind.as_str(),
        "code": kind.legacy_code(),
        "username": username,
        "error": error,
    })
}
