//! Append-only event log for one session.
//!
//! The log is the single source of truth for what observers see. Appends are
//! serialized behind a write lock; readers take cheap snapshots of the
//! `Arc<Event>` entries and never observe a partial append. Sealing the log
//! appends the terminal event and records the terminal state in the same
//! critical section, so a snapshot that contains the terminal state always
//! contains every event logged before it.

use std::sync::Arc;

use tokio::sync::{RwLock, watch};

use hoist_core::Event;

use super::types::{LogError, Terminal};

struct LogState {
    events: Vec<Arc<Event>>,
    terminal: Option<Terminal>,
}

/// Events at and after a given index, plus the terminal state at snapshot time.
#[derive(Debug, Clone)]
pub struct LogSlice {
    pub events: Vec<Arc<Event>>,
    pub terminal: Option<Terminal>,
}

/// Append-only, thread-safe sequence of events.
pub struct EventLog {
    state: RwLock<LogState>,
    /// Current log length, bumped after every append.
    appended: watch::Sender<usize>,
}

impl EventLog {
    pub fn new() -> Self {
        let (appended, _) = watch::channel(0);
        Self {
            state: RwLock::new(LogState {
                events: Vec::new(),
                terminal: None,
            }),
            appended,
        }
    }

    /// Append a non-terminal event, returning its index.
    pub async fn append(&self, event: Event) -> Result<usize, LogError> {
        let mut state = self.state.write().await;
        if state.terminal.is_some() {
            return Err(LogError::Sealed { kind: event.kind });
        }
        Ok(self.push(&mut state, event))
    }

    /// Append the terminal event and close the log to further appends.
    pub async fn seal(&self, event: Event, terminal: Terminal) -> Result<usize, LogError> {
        let mut state = self.state.write().await;
        if state.terminal.is_some() {
            return Err(LogError::Sealed { kind: event.kind });
        }
        state.terminal = Some(terminal);
        Ok(self.push(&mut state, event))
    }

    fn push(&self, state: &mut LogState, event: Event) -> usize {
        let index = state.events.len();
        state.events.push(Arc::new(event));
        // Sent under the write lock so the published length never goes backwards.
        self.appended.send_replace(state.events.len());
        index
    }

    /// Snapshot of every event with index `>= start`.
    pub async fn slice_from(&self, start: usize) -> LogSlice {
        let state = self.state.read().await;
        let events = state.events.get(start..).map(<[_]>::to_vec).unwrap_or_default();
        LogSlice {
            events,
            terminal: state.terminal.clone(),
        }
    }

    pub(crate) async fn len(&self) -> usize {
        self.state.read().await.events.len()
    }

    pub async fn terminal(&self) -> Option<Terminal> {
        self.state.read().await.terminal.clone()
    }

    /// Receiver that changes whenever an event is appended.
    pub fn watch(&self) -> watch::Receiver<usize> {
        self.appended.subscribe()
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use hoist_core::EventKind;

    #[tokio::test]
    async fn append_assigns_sequential_indices() {
        let log = EventLog::new();
        assert_eq!(log.append(Event::status("a")).await.unwrap(), 0);
        assert_eq!(log.append(Event::status("b")).await.unwrap(), 1);
        assert_eq!(log.len().await, 2);
    }

    #[tokio::test]
    async fn slice_from_skips_earlier_events() {
        let log = EventLog::new();
        for step in ["a", "b", "c"] {
            log.append(Event::status(step)).await.unwrap();
        }

        let slice = log.slice_from(1).await;
        let descriptions: Vec<_> = slice
            .events
            .iter()
            .map(|e| e.description.as_deref().unwrap())
            .collect();
        assert_eq!(descriptions, ["b", "c"]);
        assert!(slice.terminal.is_none());
    }

    #[tokio::test]
    async fn slice_past_end_is_empty() {
        let log = EventLog::new();
        log.append(Event::status("a")).await.unwrap();
        assert!(log.slice_from(5).await.events.is_empty());
    }

    #[tokio::test]
    async fn seal_rejects_further_appends() {
        let log = EventLog::new();
        log.append(Event::status("a")).await.unwrap();
        log.seal(Event::done(), Terminal::Done).await.unwrap();

        let err = log.append(Event::status("late")).await.unwrap_err();
        assert!(matches!(err, LogError::Sealed { kind: EventKind::Status }));
        assert!(log.seal(Event::error("again"), Terminal::Failed("again".into())).await.is_err());
        assert_eq!(log.len().await, 2);
        assert_eq!(log.terminal().await, Some(Terminal::Done));
    }

    #[tokio::test]
    async fn watch_tracks_length() {
        let log = EventLog::new();
        let mut rx = log.watch();
        log.append(Event::status("a")).await.unwrap();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), 1);
    }

    #[tokio::test]
    async fn concurrent_appends_keep_every_event() {
        let log = Arc::new(EventLog::new());
        let mut handles = Vec::new();
        for producer in 0..8 {
            let log = Arc::clone(&log);
            handles.push(tokio::spawn(async move {
                for n in 0..50 {
                    log.append(Event::status(format!("{producer}-{n}"))).await.unwrap();
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(log.len().await, 400);
    }
}
