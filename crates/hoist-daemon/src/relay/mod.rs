//! Relay module: bridges the provisioning workflow with the session event log.
//!
//! This is the "glue" that connects:
//! - the workflow's signal channel (status, prompts, failure, completion)
//! - the session (event log, prompt registry, terminal state)

mod pipeline;
mod types;

pub use pipeline::{EXITED_WITHOUT_COMPLETION, Relay};
pub use types::*;
