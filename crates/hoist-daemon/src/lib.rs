//! `Hoist` Installer Daemon Library
//!
//! Event distribution and prompt synchronization for the installer:
//! - Append-only session event log with replaying subscriptions
//! - Prompt registry pairing workflow questions with observer answers
//! - Relay from the workflow's signal channel into the session
//! - HTTP/SSE surface for browser observers

pub mod prompt;
pub mod relay;
pub mod server;
pub mod session;
pub mod workflow;
