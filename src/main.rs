//! Wellness Guide - evidence-based mental health chat
//!
//! A Rust backend serving a single-agent conversation per session over HTTP,
//! with live transcript updates via Server-Sent Events.

mod agent;
mod api;
mod config;
mod instructions;
mod llm;
mod runtime;
mod session;
mod state_machine;
mod suggestions;

use agent::{AgentFactory, ModelAgentFactory, UnconfiguredFactory};
use api::{create_router, AppState};
use config::{AgentConfig, ConfigError, ServerConfig};
use instructions::{InstructionSet, Persona};
use runtime::SessionSetup;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wellness_guide=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let server_config = ServerConfig::from_env();
    let instructions = InstructionSet::default();

    // A bad agent config still serves; every session setup reports it
    let factory: Arc<dyn AgentFactory> = match agent_factory(&instructions) {
        Ok(factory) => Arc::new(factory),
        Err(e) => {
            tracing::warn!(error = %e, "Agent configuration rejected, sessions will fail setup");
            Arc::new(UnconfiguredFactory::new(e))
        }
    };

    // Create application state
    let state = AppState::new(
        SessionSetup {
            factory,
            persona: Arc::new(Persona::default()),
            prime_memory: server_config.prime_memory,
        },
        server_config.session_idle,
    );

    // Create router
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let compression = CompressionLayer::new()
        .gzip(true)
        .br(true)
        .deflate(true)
        .zstd(true);

    let app = create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(compression);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], server_config.port));
    tracing::info!("Wellness Guide server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn agent_factory(instructions: &InstructionSet) -> Result<ModelAgentFactory, ConfigError> {
    let config = AgentConfig::from_env()?;
    let factory = ModelAgentFactory::from_config(&config, instructions)?;
    tracing::info!(?config, model = %factory.model_id(), "Agent factory initialized");
    Ok(factory)
}
