//! Agent HTTP Server
//!
//! Axum-based server with CORS, optional request tracing and graceful shutdown.

use axum::{
    http::{header, Method},
    Router,
};
use std::sync::Arc;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use super::api::{agent_router, AgentState};
use crate::agent::{AgentDescriptor, InMemoryTaskStore, TaskExecutor};
use crate::armory::ToolRegistry;
use crate::config::Config;

/// Shadowblade agent server
pub struct AgentServer {
    config: Config,
    state: Arc<AgentState>,
}

impl AgentServer {
    /// Wire the executor, task store and descriptor from configuration
    pub fn new(config: Config, registry: Arc<ToolRegistry>) -> Self {
        let store = Arc::new(InMemoryTaskStore::new(
            config.task_capacity,
            config.task_ttl_secs,
            config.event_buffer,
        ));
        let executor = TaskExecutor::new(registry, store);
        let descriptor = AgentDescriptor::shadowblade(config.agent_url());

        Self {
            config,
            state: Arc::new(AgentState::new(descriptor, executor)),
        }
    }

    /// Build the router with all routes and middleware
    pub fn build_router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

        let mut router = agent_router(self.state.clone()).layer(cors);

        if self.config.log_requests {
            router = router.layer(TraceLayer::new_for_http());
        }

        router
    }

    /// Start the server and run until shutdown signal
    pub async fn run(self) -> anyhow::Result<()> {
        let addr = self.config.socket_addr();
        let router = self.build_router();

        info!(
            "Starting {} v{} on {}",
            self.state.descriptor.name, self.state.descriptor.version, addr
        );
        if !self.config.is_localhost() {
            warn!("Agent bound to {} - no authentication is performed", addr);
        }
        info!("Agent card at {}.well-known/agent.json", with_slash(&self.state.descriptor.url));

        let listener = tokio::net::TcpListener::bind(addr).await?;

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Agent server shut down gracefully");
        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn state(&self) -> &Arc<AgentState> {
        &self.state
    }
}

fn with_slash(url: &str) -> String {
    if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{}/", url)
    }
}

/// Wait for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
