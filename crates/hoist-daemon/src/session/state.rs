//! Session state: one install run with its event log, subscribers and prompts.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{Mutex, RwLock, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use hoist_core::{Event, Prompt, PromptAnswer, PromptKind, PromptReply};

use crate::prompt::{AnswerError, PromptError, PromptRegistry, random_id};

use super::log::EventLog;
use super::subscription::{self, Subscription};
use super::types::{LogError, SessionState, SessionStats, Terminal};

/// One run of the provisioning workflow with its history and observers.
pub struct Session {
    id: String,
    log: Arc<EventLog>,
    /// Delivery workers keyed by subscription id.
    subscriptions: Arc<RwLock<HashMap<u64, JoinHandle<()>>>>,
    next_subscription_id: AtomicU64,
    prompts: PromptRegistry,
    /// Serializes prompt transitions with each other and with termination,
    /// so the registry only holds prompts whose "asked" event is logged and
    /// whose session is still running.
    prompt_gate: Mutex<()>,
}

impl Session {
    pub fn new(id: String) -> Self {
        Self {
            id,
            log: Arc::new(EventLog::new()),
            subscriptions: Arc::new(RwLock::new(HashMap::new())),
            next_subscription_id: AtomicU64::new(1),
            prompts: PromptRegistry::new(),
            prompt_gate: Mutex::new(()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Append a non-terminal event.
    pub async fn emit(&self, event: Event) -> Result<usize, LogError> {
        let kind = event.kind;
        let index = self.log.append(event).await?;
        debug!(session_id = %self.id, %kind, index, "Event appended");
        Ok(index)
    }

    /// Mark the session done and append the `done` event.
    pub async fn finish(&self) -> Result<usize, LogError> {
        let index = self.terminate(Event::done(), Terminal::Done).await?;
        info!(session_id = %self.id, events = index + 1, "Session done");
        Ok(index)
    }

    /// Record the terminal failure and append the `error` event.
    pub async fn fail(&self, message: &str) -> Result<usize, LogError> {
        let index = self
            .terminate(Event::error(message), Terminal::Failed(message.to_string()))
            .await?;
        warn!(session_id = %self.id, error = message, "Session failed");
        Ok(index)
    }

    /// Seal the log and withdraw every open prompt in one step.
    async fn terminate(&self, event: Event, terminal: Terminal) -> Result<usize, LogError> {
        let _gate = self.prompt_gate.lock().await;
        let index = self.log.seal(event, terminal).await?;
        let withdrawn = self.prompts.clear().await;
        if withdrawn > 0 {
            debug!(session_id = %self.id, withdrawn, "Withdrew unanswered prompts");
        }
        Ok(index)
    }

    /// Attach a new observer. The subscription replays the full history,
    /// follows live events, and ends with the terminal signal.
    pub async fn attach(&self) -> Subscription {
        let id = self.next_subscription_id.fetch_add(1, Ordering::Relaxed);
        let (subscription, worker) = subscription::channel(id, Arc::clone(&self.log));

        // Held across the spawn so the worker's own removal cannot precede the insert.
        let mut subscriptions = self.subscriptions.write().await;
        let registry = Arc::clone(&self.subscriptions);
        let session_id = self.id.clone();
        let handle = tokio::spawn(async move {
            worker.run().await;
            registry.write().await.remove(&id);
            debug!(session_id, subscription_id = id, "Subscription closed");
        });
        subscriptions.insert(id, handle);
        drop(subscriptions);

        info!(session_id = %self.id, subscription_id = id, "Observer attached");
        subscription
    }

    /// Log a prompt's "asked" event and start awaiting its answer.
    ///
    /// The responder is completed by [`Session::resolve_prompt`]. Fails with
    /// `Closed` once the session has terminated; the responder is then dropped.
    pub async fn open_prompt(
        &self,
        kind: PromptKind,
        message: &str,
        responder: oneshot::Sender<PromptReply>,
    ) -> Result<Prompt, PromptError> {
        let prompt = Prompt::new(random_id(), kind, message);

        let _gate = self.prompt_gate.lock().await;
        if let Err(e) = self.log.append(Event::prompt(prompt.clone())).await {
            warn!(session_id = %self.id, prompt_id = %prompt.id, error = %e, "Prompt after termination");
            return Err(PromptError::Closed);
        }
        self.prompts.insert(prompt.clone(), responder).await;

        info!(session_id = %self.id, prompt_id = %prompt.id, ?kind, question = message, "Prompt asked");
        Ok(prompt)
    }

    /// Answer a pending prompt exactly once.
    ///
    /// Unknown, already answered, withdrawn or abandoned ids fail with
    /// `NotFound` and change nothing.
    pub async fn resolve_prompt(
        &self,
        prompt_id: &str,
        answer: PromptAnswer,
    ) -> Result<Prompt, AnswerError> {
        let _gate = self.prompt_gate.lock().await;
        let pending = self.prompts.take(prompt_id).await.inspect_err(|_| {
            warn!(session_id = %self.id, prompt_id, "Rejected answer for unknown prompt");
        })?;

        let reply = answer.into_reply(pending.prompt.kind);
        let resolved = pending.prompt.resolved_with(reply.clone());

        // Pending prompts only exist while the log is open.
        if let Err(e) = self.log.append(Event::prompt(resolved.clone())).await {
            warn!(session_id = %self.id, prompt_id, error = %e, "Answered prompt after termination");
        }
        if !pending.respond(reply) {
            debug!(session_id = %self.id, prompt_id, "Workflow stopped waiting for prompt");
        }

        info!(session_id = %self.id, prompt_id, "Prompt answered");
        Ok(resolved)
    }

    /// Snapshot of the full event history.
    pub async fn events(&self) -> Vec<Arc<Event>> {
        self.log.slice_from(0).await.events
    }

    pub async fn terminal(&self) -> Option<Terminal> {
        self.log.terminal().await
    }

    pub async fn is_done(&self) -> bool {
        matches!(self.terminal().await, Some(Terminal::Done))
    }

    pub async fn terminal_error(&self) -> Option<String> {
        match self.terminal().await {
            Some(Terminal::Failed(message)) => Some(message),
            _ => None,
        }
    }

    pub async fn pending_prompts(&self) -> Vec<Prompt> {
        self.prompts.pending().await
    }

    pub async fn subscription_count(&self) -> usize {
        self.subscriptions.read().await.len()
    }

    pub async fn stats(&self) -> SessionStats {
        let terminal = self.terminal().await;
        SessionStats {
            id: self.id.clone(),
            state: SessionState::from(terminal.as_ref()),
            error: match terminal {
                Some(Terminal::Failed(message)) => Some(message),
                _ => None,
            },
            event_count: self.log.len().await,
            subscribers: self.subscription_count().await,
            pending_prompts: self.prompts.count().await,
        }
    }
}
