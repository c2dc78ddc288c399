//! Owner of the installer's single session slot.

use std::sync::Arc;

use tokio::sync::{RwLock, mpsc};
use tracing::{info, warn};

use hoist_core::{Prompt, PromptAnswer};

use crate::prompt::{AnswerError, random_id};
use crate::relay::Relay;
use crate::workflow::{self, Workflow, WorkflowContext};

use super::state::Session;
use super::types::SessionError;

/// Holds at most one session for the lifetime of the process.
///
/// The slot is never cleared: once an install has started, later starts are
/// rejected even after it terminates.
#[derive(Default)]
pub struct SessionManager {
    current: RwLock<Option<Arc<Session>>>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the session and launch the workflow and its relay.
    pub async fn start(&self, workflow: Box<dyn Workflow>) -> Result<Arc<Session>, SessionError> {
        let mut current = self.current.write().await;
        if let Some(active) = current.as_ref() {
            warn!(session_id = %active.id(), "Rejected second install");
            return Err(SessionError::Conflict {
                active: active.id().to_string(),
            });
        }

        let session = Arc::new(Session::new(random_id()));
        let (signals_tx, signals_rx) = mpsc::unbounded_channel();

        tokio::spawn(Relay::new(Arc::clone(&session)).run(signals_rx));
        workflow::spawn(
            workflow,
            WorkflowContext::new(session.id().to_string(), signals_tx),
        );

        info!(session_id = %session.id(), "Install started");
        *current = Some(Arc::clone(&session));
        Ok(session)
    }

    /// The session with this id, if it is the current one.
    pub async fn get(&self, session_id: &str) -> Result<Arc<Session>, SessionError> {
        self.current
            .read()
            .await
            .as_ref()
            .filter(|s| s.id() == session_id)
            .cloned()
            .ok_or_else(|| SessionError::NotFound {
                session_id: session_id.to_string(),
            })
    }

    pub async fn current(&self) -> Option<Arc<Session>> {
        self.current.read().await.clone()
    }

    /// Answer a prompt of the current session.
    pub async fn resolve_prompt(
        &self,
        prompt_id: &str,
        answer: PromptAnswer,
    ) -> Result<Prompt, AnswerError> {
        let session = self
            .current()
            .await
            .ok_or_else(|| AnswerError::not_found(prompt_id))?;
        session.resolve_prompt(prompt_id, answer).await
    }
}
