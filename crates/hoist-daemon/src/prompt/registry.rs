//! Pending prompt registry.
//!
//! Tracks prompts that are awaiting an observer's answer. An entry being
//! present is the sole meaning of "not yet answered": `take` removes it under
//! the write lock, so at most one caller ever gets a given prompt back.
//! Entries whose asker has stopped waiting are treated as gone.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{RwLock, oneshot};
use tracing::debug;

use hoist_core::{Prompt, PromptReply};

use super::types::AnswerError;

/// Number of random bytes in a prompt id (hex-encoded to twice as many chars).
const PROMPT_ID_BYTES: usize = 16;

/// Generate an unguessable hex identifier.
pub(crate) fn random_id() -> String {
    hex::encode(rand::random::<[u8; PROMPT_ID_BYTES]>())
}

/// A prompt awaiting its single answer.
#[derive(Debug)]
pub struct PendingPrompt {
    /// Snapshot as first emitted (unresolved).
    pub prompt: Prompt,
    /// Registration order within the registry.
    seq: u64,
    responder: oneshot::Sender<PromptReply>,
}

impl PendingPrompt {
    /// Hand the reply to the suspended workflow.
    ///
    /// Returns `false` if the workflow is no longer waiting.
    pub fn respond(self, reply: PromptReply) -> bool {
        self.responder.send(reply).is_ok()
    }

    /// The asker dropped its receiver.
    fn is_abandoned(&self) -> bool {
        self.responder.is_closed()
    }
}

/// Registry of pending prompts keyed by prompt id.
#[derive(Clone, Default)]
pub struct PromptRegistry {
    prompts: Arc<RwLock<HashMap<String, PendingPrompt>>>,
    next_seq: Arc<AtomicU64>,
}

impl PromptRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track `prompt` until it is answered.
    pub async fn insert(&self, prompt: Prompt, responder: oneshot::Sender<PromptReply>) {
        let prompt_id = prompt.id.clone();
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        self.prompts.write().await.insert(
            prompt_id.clone(),
            PendingPrompt {
                prompt,
                seq,
                responder,
            },
        );
        debug!(prompt_id, seq, "Registered pending prompt");
    }

    /// Remove and return a pending prompt whose asker is still waiting.
    pub async fn take(&self, prompt_id: &str) -> Result<PendingPrompt, AnswerError> {
        let pending = self.prompts.write().await.remove(prompt_id);
        match pending {
            Some(pending) if pending.is_abandoned() => {
                debug!(prompt_id, "Discarded abandoned prompt");
                Err(AnswerError::not_found(prompt_id))
            }
            Some(pending) => {
                debug!(prompt_id, "Removed pending prompt");
                Ok(pending)
            }
            None => Err(AnswerError::not_found(prompt_id)),
        }
    }

    /// Drop every pending prompt, releasing their askers. Returns how many
    /// were still awaited.
    pub async fn clear(&self) -> usize {
        let drained: Vec<PendingPrompt> =
            self.prompts.write().await.drain().map(|(_, p)| p).collect();
        drained
            .iter().filter(|p| !p.is_abandoned()).count()
    }

    /// All awaited prompts, oldest first.
    pub async fn pending(&self) -> Vec<Prompt> {
        let prompts = self.prompts.read().await;
        let mut pending: Vec<&PendingPrompt> =
            prompts.values().filter(|p| !p.is_abandoned()).collect();
        pending.sort_by_key(|p| p.seq);
        pending.into_iter().map(|p| p.prompt.clone()).collect()
    }

    /// Number of awaited prompts.
    pub async fn count(&self) -> usize {
        self.prompts
            .read()
            .await
            .values()
            .filter(|p| !p.is_abandoned())
            .count()
    }
}
