//! Prompt registry and the workflow/observer answer handshake.
//!
//! The workflow registers a prompt and suspends on a oneshot receiver; an
//! observer's answer removes the entry and completes the oneshot.

mod registry;
mod types;

pub(crate) use registry::random_id;
pub use registry::{PendingPrompt, PromptRegistry};
pub use types::{AnswerError, PromptError};
