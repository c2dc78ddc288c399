//! Boundary with the provisioning workflow.
//!
//! A [`Workflow`] is an opaque unit of work: it reports progress and asks
//! questions through its [`WorkflowContext`], and its return value becomes the
//! single terminal signal for the session.

mod context;
mod simulated;

pub use context::WorkflowContext;
pub use simulated::{AwsCredentials, SimulatedStack, StackSpec};

use async_trait::async_trait;
use tracing::debug;

use crate::prompt::PromptError;
use crate::relay::WorkflowSignal;

/// Details the workflow discloses only on success.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Completion {
    pub domain: Option<String>,
    pub dashboard_login_token: Option<String>,
    /// PEM-encoded CA certificate.
    pub ca_cert: Option<String>,
}

/// Unrecoverable workflow failure.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("{0}")]
    Failed(String),

    #[error("install cancelled by user")]
    Cancelled,

    #[error("prompt failed: {0}")]
    Prompt(#[from] PromptError),
}

/// A provisioning run driven by the installer.
#[async_trait]
pub trait Workflow: Send + 'static {
    async fn run(self: Box<Self>, ctx: WorkflowContext) -> Result<Completion, WorkflowError>;
}

/// Run a workflow on its own task and forward its outcome as the terminal signal.
pub(crate) fn spawn(workflow: Box<dyn Workflow>, ctx: WorkflowContext) {
    let signals = ctx.signals();
    let session_id = ctx.session_id().to_string();
    tokio::spawn(async move {
        let signal = match workflow.run(ctx).await {
            Ok(completion) => WorkflowSignal::Completed(completion),
            Err(e) => WorkflowSignal::Failed(e.to_string()),
        };
        if signals.send(signal).is_err() {
            debug!(session_id, "Relay gone before terminal signal");
        }
    });
}
