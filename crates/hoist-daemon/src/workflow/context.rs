//! Handle given to a running workflow.

use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use hoist_core::{PromptKind, PromptReply};

use crate::prompt::PromptError;
use crate::relay::{PromptRequest, WorkflowSignal};

/// What a workflow may do while running: report progress and ask questions.
#[derive(Debug, Clone)]
pub struct WorkflowContext {
    session_id: String,
    signals: mpsc::UnboundedSender<WorkflowSignal>,
}

impl WorkflowContext {
    pub const fn new(session_id: String, signals: mpsc::UnboundedSender<WorkflowSignal>) -> Self {
        Self {
            session_id,
            signals,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub(crate) fn signals(&self) -> mpsc::UnboundedSender<WorkflowSignal> {
        self.signals.clone()
    }

    /// Report progress. Never blocks.
    pub fn status(&self, description: impl Into<String>) {
        if self
            .signals
            .send(WorkflowSignal::Status(description.into()))
            .is_err()
        {
            debug!(session_id = %self.session_id, "Status after relay stopped");
        }
    }

    /// Ask a question and suspend until an observer answers it.
    pub async fn ask(
        &self,
        kind: PromptKind,
        message: impl Into<String>,
    ) -> Result<PromptReply, PromptError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        let message = message.into();
        self.signals
            .send(WorkflowSignal::Prompt(PromptRequest {
                kind,
                message: message.clone(),
                reply: reply_tx,
            }))
            .map_err(|_| PromptError::Closed)?;

        debug!(session_id = %self.session_id, question = %message, "Waiting for prompt answer");
        reply_rx
            .await
            .map_err(|_| PromptError::Abandoned { message })
    }

    /// Ask a yes/no question.
    pub async fn ask_yes_no(&self, message: impl Into<String>) -> Result<bool, PromptError> {
        let message = message.into();
        let reply = self.ask(PromptKind::YesNo, message.clone()).await?;
        reply
            .as_bool()
            .ok_or(PromptError::ReplyMismatch { message })
    }

    /// Ask for free-text input.
    pub async fn ask_text(&self, message: impl Into<String>) -> Result<String, PromptError> {
        let message = message.into();
        let reply = self.ask(PromptKind::Input, message.clone()).await?;
        reply
            .into_text()
            .ok_or(PromptError::ReplyMismatch { message })
    }
}
