//! Per-observer subscriptions and their delivery workers.
//!
//! Each subscription owns one long-lived worker task. The worker is woken by
//! the log's length watch, copies every event past its cursor into an
//! unbounded per-subscription queue, and finally hands over the terminal
//! signal. A slow observer only grows its own queue; the producer never waits.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use hoist_core::Event;

use super::log::EventLog;
use super::types::{Delivery, Terminal};

/// One observer's view into a session's event log.
///
/// Dropping the subscription detaches it: the worker notices the closed
/// queue and exits.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    events: mpsc::UnboundedReceiver<Arc<Event>>,
    terminal: oneshot::Receiver<Terminal>,
    closed: bool,
}

impl Subscription {
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Next delivery in log order, then the terminal signal, then `None`.
    ///
    /// Cancel-safe: dropping the returned future loses nothing.
    pub async fn next(&mut self) -> Option<Delivery> {
        if self.closed {
            return None;
        }
        tokio::select! {
            biased;
            Some(event) = self.events.recv() => Some(Delivery::Event(event)),
            terminal = &mut self.terminal => {
                self.closed = true;
                terminal.ok().map(Delivery::from)
            }
        }
    }

    pub const fn is_closed(&self) -> bool {
        self.closed
    }
}

/// Worker side of a subscription.
pub(crate) struct DeliveryWorker {
    id: u64,
    log: Arc<EventLog>,
    /// Number of events delivered so far, i.e. the index of the next one.
    cursor: usize,
    events: mpsc::UnboundedSender<Arc<Event>>,
    terminal: oneshot::Sender<Terminal>,
}

/// Create a connected subscription/worker pair starting before the first event.
pub(crate) fn channel(id: u64, log: Arc<EventLog>) -> (Subscription, DeliveryWorker) {
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let (terminal_tx, terminal_rx) = oneshot::channel();
    (
        Subscription {
            id,
            events: events_rx,
            terminal: terminal_rx,
            closed: false,
        },
        DeliveryWorker {
            id,
            log,
            cursor: 0,
            events: events_tx,
            terminal: terminal_tx,
        },
    )
}

impl DeliveryWorker {
    /// Deliver until the terminal signal is handed over or the observer leaves.
    pub(crate) async fn run(mut self) {
        let mut appended = self.log.watch();
        loop {
            // Mark seen before reading so an append racing the snapshot re-wakes us.
            appended.mark_unchanged();

            let slice = self.log.slice_from(self.cursor).await;
            for event in slice.events {
                if self.events.send(event).is_err() {
                    debug!(subscription_id = self.id, "Observer gone during catch-up");
                    return;
                }
                self.cursor += 1;
            }

            if let Some(terminal) = slice.terminal {
                debug!(
                    subscription_id = self.id,
                    delivered = self.cursor,
                    "Delivering terminal signal"
                );
                let _ = self.terminal.send(terminal);
                return;
            }

            tokio::select! {
                changed = appended.changed() => {
                    if changed.is_err() {
                        return;
                    }
                }
                () = self.events.closed() => {
                    debug!(subscription_id = self.id, "Observer disconnected");
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::time::Duration;

    async fn next(sub: &mut Subscription) -> Option<Delivery> {
        tokio::time::timeout(Duration::from_secs(5), sub.next())
            .await
            .expect("delivery timed out")
    }

    fn description(delivery: Option<Delivery>) -> String {
        match delivery {
            Some(Delivery::Event(event)) => event.description.clone().unwrap_or_default(),
            other => panic!("expected event, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn replays_history_then_follows_live_events() {
        let log = Arc::new(EventLog::new());
        log.append(Event::status("one")).await.unwrap();

        let (mut sub, worker) = channel(1, Arc::clone(&log));
        tokio::spawn(worker.run());

        assert_eq!(description(next(&mut sub).await), "one");
        log.append(Event::status("two")).await.unwrap();
        assert_eq!(description(next(&mut sub).await), "two");
    }

    #[tokio::test]
    async fn terminal_signal_follows_terminal_event() {
        let log = Arc::new(EventLog::new());
        let (mut sub, worker) = channel(1, Arc::clone(&log));
        tokio::spawn(worker.run());

        log.append(Event::status("one")).await.unwrap();
        log.seal(Event::done(), Terminal::Done).await.unwrap();

        assert_eq!(description(next(&mut sub).await), "one");
        match next(&mut sub).await {
            Some(Delivery::Event(event)) => assert_eq!(event.kind, hoist_core::EventKind::Done),
            other => panic!("expected done event, got {other:?}"),
        }
        assert_eq!(next(&mut sub).await, Some(Delivery::Done));
        assert_eq!(next(&mut sub).await, None);
        assert!(sub.is_closed());
    }

    #[tokio::test]
    async fn worker_exits_when_observer_drops() {
        let log = Arc::new(EventLog::new());
        let (sub, worker) = channel(1, Arc::clone(&log));
        let handle = tokio::spawn(worker.run());

        drop(sub);
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("worker did not exit")
            .unwrap();
    }
}
