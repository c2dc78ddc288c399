//! Install sessions and observer fan-out.
//!
//! A session owns an append-only event log. Every observer gets its own
//! subscription that replays the history and then follows live events until
//! the session terminates.

mod log;
mod manager;
mod state;
mod subscription;
mod types;

pub use log::{EventLog, LogSlice};
pub use manager::SessionManager;
pub use state::Session;
pub use subscription::Subscription;
pub use types::{Delivery, LogError, SessionError, SessionState, SessionStats, Terminal};
