//! Relay module types.

use tokio::sync::oneshot;

use hoist_core::{PromptKind, PromptReply};

use crate::workflow::Completion;

/// Raw signal from the workflow to its relay.
#[derive(Debug)]
pub enum WorkflowSignal {
    /// Progress notification.
    Status(String),
    /// Question for a human; the reply goes back through `reply`.
    Prompt(PromptRequest),
    /// Unrecoverable failure. Terminal.
    Failed(String),
    /// Normal completion with success-only disclosures. Terminal.
    Completed(Completion),
}

/// A prompt the workflow is suspended on.
#[derive(Debug)]
pub struct PromptRequest {
    pub kind: PromptKind,
    pub message: String,
    pub reply: oneshot::Sender<PromptReply>,
}

/// Relay lifecycle: `Running` moves to exactly one of the terminal states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayState {
    Running,
    Done,
    Errored,
}

impl RelayState {
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Running)
    }
}
