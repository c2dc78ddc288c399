//! Session relay pipeline: workflow signals → session event log.
//!
//! Data flow:
//! ```text
//! workflow status     → status event
//! workflow prompt     → prompt registry + "asked" prompt event
//! workflow failure    → error event, terminal error, relay stops
//! workflow completion → domain / dashboard_login_token / ca_cert events,
//!                       done event, relay stops
//! ```
//!
//! Every signal travels through one FIFO channel, so a status sent before a
//! prompt is always logged before that prompt.

use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use hoist_core::{Event, EventKind};

use crate::session::Session;
use crate::workflow::Completion;

use super::types::{PromptRequest, RelayState, WorkflowSignal};

/// Failure recorded when the workflow goes away without a terminal signal.
pub const EXITED_WITHOUT_COMPLETION: &str = "workflow exited without reporting completion";

/// Adapter from one workflow's signal stream to its session.
pub struct Relay {
    session: Arc<Session>,
    state: RelayState,
}

impl Relay {
    pub const fn new(session: Arc<Session>) -> Self {
        Self {
            session,
            state: RelayState::Running,
        }
    }

    /// Consume signals until the workflow completes or fails.
    pub async fn run(mut self, mut signals: mpsc::UnboundedReceiver<WorkflowSignal>) -> RelayState {
        while let Some(signal) = signals.recv().await {
            self.handle(signal).await;
            if self.state.is_terminal() {
                debug!(session_id = %self.session.id(), state = ?self.state, "Relay stopped");
                return self.state;
            }
        }

        warn!(session_id = %self.session.id(), "Workflow signal channel closed early");
        self.fail(EXITED_WITHOUT_COMPLETION).await;
        self.state
    }

    async fn handle(&mut self, signal: WorkflowSignal) {
        match signal {
            WorkflowSignal::Status(description) => {
                info!(session_id = %self.session.id(), "{description}");
                if let Err(e) = self.session.emit(Event::status(description)).await {
                    warn!(session_id = %self.session.id(), error = %e, "Dropped status");
                }
            }
            WorkflowSignal::Prompt(request) => self.open_prompt(request).await,
            WorkflowSignal::Failed(message) => self.fail(&message).await,
            WorkflowSignal::Completed(completion) => self.complete(completion).await,
        }
    }

    async fn open_prompt(&self, request: PromptRequest) {
        let PromptRequest {
            kind,
            message,
            reply,
        } = request;
        // On failure the reply sender is dropped and the workflow sees the prompt abandoned.
        if let Err(e) = self.session.open_prompt(kind, &message, reply).await {
            warn!(session_id = %self.session.id(), error = %e, "Could not open prompt");
        }
    }

    async fn fail(&mut self, message: &str) {
        info!(session_id = %self.session.id(), error = message, "Install failed");
        if let Err(e) = self.session.fail(message).await {
            warn!(session_id = %self.session.id(), error = %e, "Failure after termination");
        }
        self.state = RelayState::Errored;
    }

    async fn complete(&mut self, completion: Completion) {
        info!(session_id = %self.session.id(), "Stack install complete");

        for event in completion_events(completion) {
            debug!(session_id = %self.session.id(), kind = %event.kind, "Sending completion detail");
            if let Err(e) = self.session.emit(event).await {
                warn!(session_id = %self.session.id(), error = %e, "Dropped completion detail");
            }
        }
        if let Err(e) = self.session.finish().await {
            warn!(session_id = %self.session.id(), error = %e, "Completion after termination");
        }
        self.state = RelayState::Done;
    }
}

/// Informational events disclosed at success, in emission order.
fn completion_events(completion: Completion) -> Vec<Event> {
    let Completion {
        domain,
        dashboard_login_token,
        ca_cert,
    } = completion;

    let mut events = Vec::new();
    if let Some(domain) = domain.filter(|d| !d.is_empty()) {
        events.push(Event::info(EventKind::Domain, domain));
    }
    if let Some(token) = dashboard_login_token.filter(|t| !t.is_empty()) {
        events.push(Event::info(EventKind::DashboardLoginToken, token));
    }
    if let Some(cert) = ca_cert.filter(|c| !c.is_empty()) {
        events.push(Event::info(EventKind::CaCert, URL_SAFE.encode(cert)));
    }
    events
}
