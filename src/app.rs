use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::client::EvaluationClient;
use crate::config::Config;
use crate::routes::create_routes;
use crate::session::Sessions;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<Sessions>,
}

impl AppState {
    pub fn new(sessions: Sessions) -> Self {
        Self {
            sessions: Arc::new(sessions),
        }
    }
}

/// Initialize tracing and logging for the application.
///
/// `RUST_LOG` wins over `default_filter` when set.
pub fn init_tracing(default_filter: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Create and configure the Axum application with all routes and middleware
pub fn create_app(config: &Config) -> anyhow::Result<Router> {
    info!("Initializing application router");

    let client = EvaluationClient::new(config).context("Failed to build evaluator client")?;
    info!("Evaluator endpoint: {}", client.evaluate_url());

    let state = AppState::new(Sessions::new(client, config.session_idle()));

    Ok(Router::new()
        .merge(create_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state))
}
