//! `Hoist` Core Library
//!
//! Shared functionality for `Hoist` components:
//! - Event and prompt wire types streamed to installer observers
//! - Configuration resolution and hierarchy
//! - Tracing initialisation
//! - Common error types

pub mod config;
pub mod error;
pub mod event;
pub mod tracing_init;

pub use config::Config;
pub use error::{Error, Result};
pub use event::{Event, EventKind, Prompt, PromptAnswer, PromptKind, PromptReply};
