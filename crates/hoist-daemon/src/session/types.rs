//! Session types.

use std::sync::Arc;

use serde::Serialize;

use hoist_core::{Event, EventKind};

/// Terminal state of a session. Once entered, never left.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Terminal {
    Done,
    Failed(String),
}

/// Coarse lifecycle state reported to observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Running,
    Done,
    Errored,
}

impl From<Option<&Terminal>> for SessionState {
    fn from(terminal: Option<&Terminal>) -> Self {
        match terminal {
            None => Self::Running,
            Some(Terminal::Done) => Self::Done,
            Some(Terminal::Failed(_)) => Self::Errored,
        }
    }
}

/// One unit handed to an observer by its subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Event(Arc<Event>),
    /// The workflow failed; carries the failure message.
    Failed(String),
    Done,
}

impl From<Terminal> for Delivery {
    fn from(terminal: Terminal) -> Self {
        match terminal {
            Terminal::Done => Self::Done,
            Terminal::Failed(message) => Self::Failed(message),
        }
    }
}

/// Session statistics.
#[derive(Debug, Clone, Serialize)]
pub struct SessionStats {
    pub id: String,
    pub state: SessionState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub event_count: usize,
    pub subscribers: usize,
    pub pending_prompts: usize,
}

/// Event log errors.
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("Event log is sealed; dropped {kind} event")]
    Sealed { kind: EventKind },
}

/// Session manager errors.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("install already started (session {active})")]
    Conflict { active: String },

    #[error("Session not found: {session_id}")]
    NotFound { session_id: String },
}
