mod routes;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::{config::Config, parsers::ParserOptions, router::NotificationRouter, Result};

/// Shared state for the HTTP handlers.
pub struct AppState {
    pub router: NotificationRouter,
    pub options: ParserOptions,
}

/// HTTP endpoint that SNS topics push notifications to.
pub struct Server {
    state: Arc<AppState>,
}

impl Server {
    pub fn new(config: &Config, router: NotificationRouter) -> Self {
        Self {
            state: Arc::new(AppState {
                router,
                options: config.parser_options.clone(),
            }),
        }
    }

    pub fn build_router(self) -> Router {
        Router::new()
            .route("/health", get(routes::health))
            .route("/metrics", get(routes::metrics))
            .route("/notifications/{provider}", post(routes::receive_notification))
            .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
            .with_state(self.state)
    }

    pub async fn start(self, addr: &str) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!("Listening on {}", listener.local_addr()?);
        axum::serve(listener, self.build_router()).await?;
        Ok(())
    }
}
