//! HTTP routes for the installer.
//!
//! ```text
//! POST /install        start the (single) install session
//! GET  /install/{id}   session summary
//! GET  /events/{id}    SSE stream: history replay, then live events
//! POST /prompt/{id}    answer a pending prompt
//! GET  /config         front-end bootstrap data
//! ```

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::sse::{Event as SseEvent, KeepAlive, Sse};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::{Value, json};
use tokio_stream::Stream;
use tower_http::cors::CorsLayer;
use tracing::{debug, info, warn};

use hoist_core::PromptAnswer;
use hoist_core::config::InstallDefaults;

use crate::session::{Delivery, SessionManager, SessionStats};
use crate::workflow::{AwsCredentials, SimulatedStack, StackSpec, Workflow};

use super::error::ApiError;
use super::install::InstallRequest;

/// Builds the workflow for an accepted install request.
pub type WorkflowFactory = Arc<dyn Fn(StackSpec) -> Box<dyn Workflow> + Send + Sync>;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionManager>,
    pub defaults: Arc<InstallDefaults>,
    pub env_credentials: Option<AwsCredentials>,
    pub keepalive: Duration,
    workflow_factory: WorkflowFactory,
}

impl AppState {
    /// State that runs the simulated workflow with the configured step delay.
    pub fn new(defaults: InstallDefaults, env_credentials: Option<AwsCredentials>) -> Self {
        let step_delay = Duration::from_millis(defaults.step_delay_ms);
        Self {
            sessions: Arc::new(SessionManager::new()),
            defaults: Arc::new(defaults),
            env_credentials,
            keepalive: Duration::from_secs(15),
            workflow_factory: Arc::new(move |spec| {
                Box::new(SimulatedStack::new(spec, step_delay)) as Box<dyn Workflow>
            }),
        }
    }

    /// Replace the workflow run for each install.
    #[must_use]
    pub fn with_workflow_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn(StackSpec) -> Box<dyn Workflow> + Send + Sync + 'static,
    {
        self.workflow_factory = Arc::new(factory);
        self
    }

    #[must_use]
    pub const fn with_keepalive(mut self, keepalive: Duration) -> Self {
        self.keepalive = keepalive;
        self
    }
}

#[derive(Debug, Serialize)]
pub struct InstallStarted {
    pub id: String,
}

/// `POST /install`
pub async fn install(
    State(state): State<AppState>,
    payload: Result<Json<InstallRequest>, JsonRejection>,
) -> Result<Json<InstallStarted>, ApiError> {
    let Json(request) = payload?;
    // A running install wins over request validation.
    if state.sessions.current().await.is_some() {
        return Err(ApiError::object_exists("install already started"));
    }
    let spec = request.into_spec(&state.defaults, state.env_credentials.as_ref())?;
    let workflow = (state.workflow_factory)(spec);
    let session = state.sessions.start(workflow).await?;
    Ok(Json(InstallStarted {
        id: session.id().to_string(),
    }))
}

/// `GET /install/{id}`
///
/// Unknown ids resolve to the running install so reloaded pages reconnect.
pub async fn install_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionStats>, ApiError> {
    let session = match state.sessions.get(&id).await {
        Ok(session) => session,
        Err(e) => state.sessions.current().await.ok_or(e)?,
    };
    Ok(Json(session.stats().await))
}

/// `GET /events/{id}`
pub async fn events(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<SseEvent, Infallible>>>, ApiError> {
    let session = state.sessions.get(&id).await?;
    let mut subscription = session.attach().await;
    info!(session_id = %id, subscription_id = subscription.id(), "Streaming events");

    // Dropping the stream drops the subscription, which stops its worker.
    let stream = async_stream::stream! {
        while let Some(delivery) = subscription.next().await {
            match delivery {
                Delivery::Event(event) => {
                    match SseEvent::default().event(event.kind.as_str()).json_data(&*event) {
                        Ok(sse) => yield Ok::<_, Infallible>(sse),
                        Err(e) => warn!(session_id = %id, error = %e, "Failed to encode event"),
                    }
                }
                Delivery::Failed(message) => {
                    debug!(session_id = %id, error = %message, "Closing stream after failure");
                    break;
                }
                Delivery::Done => {
                    debug!(session_id = %id, "Closing stream after completion");
                    break;
                }
            }
        }
    };

    Ok(Sse::new(stream).keep_alive(KeepAlive::new().interval(state.keepalive)))
}

/// `POST /prompt/{id}`
pub async fn prompt(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<PromptAnswer>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(answer) = payload?;
    state.sessions.resolve_prompt(&id, answer).await?;
    Ok(StatusCode::OK)
}

/// `GET /config`
pub async fn config(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "endpoints": {
            "install": "/install",
            "events": "/events/:id",
            "prompt": "/prompt/:id",
        },
        "has_aws_env_credentials": state.env_credentials.is_some(),
    }))
}

/// Build the installer router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/install", post(install))
        .route("/install/{id}", get(install_status))
        .route("/events/{id}", get(events))
        .route("/prompt/{id}", post(prompt))
        .route("/config", get(config))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
