//! Prompt handshake types.

/// Errors seen by the workflow while it waits on a prompt.
#[derive(Debug, thiserror::Error)]
pub enum PromptError {
    #[error("session no longer accepts prompts")]
    Closed,

    #[error("prompt {message:?} was dropped before it was answered")]
    Abandoned { message: String },

    #[error("prompt {message:?} received a reply of the wrong kind")]
    ReplyMismatch { message: String },
}

/// Errors seen by an observer answering a prompt.
#[derive(Debug, thiserror::Error)]
pub enum AnswerError {
    /// Unknown, already answered, or no longer awaited.
    #[error("prompt not found: {prompt_id}")]
    NotFound { prompt_id: String },
}

impl AnswerError {
    pub(crate) fn not_found(prompt_id: &str) -> Self {
        Self::NotFound {
            prompt_id: prompt_id.to_string(),
        }
    }
}
