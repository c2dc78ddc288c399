//! HTTP server for the installer.
//!
//! Exposes the session core over JSON endpoints and a Server-Sent Events stream.

mod config;
mod error;
mod install;
pub mod routes;

pub use config::ServerConfig;
pub use error::{ApiError, ErrorCode};
pub use install::InstallRequest;
pub use routes::{AppState, WorkflowFactory, build_router};

use std::future::Future;
use std::net::SocketAddr;

use thiserror::Error;
use tokio::net::TcpListener;
use tracing::info;

/// Server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// HTTP server handle.
pub struct HttpServer {
    config: ServerConfig,
    state: AppState,
}

impl HttpServer {
    pub fn new(config: ServerConfig, state: AppState) -> Self {
        let state = state.with_keepalive(config.keepalive);
        Self { config, state }
    }

    pub const fn addr(&self) -> SocketAddr {
        self.config.addr
    }

    /// Serve until `shutdown` resolves.
    pub async fn serve<F>(self, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(self.config.addr).await?;
        info!(addr = %listener.local_addr()?, "Installer listening");

        axum::serve(listener, build_router(self.state))
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Installer stopped");
        Ok(())
    }
}
