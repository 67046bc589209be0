//! Gateway service: router construction and the serve loop.

use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::wire::{decode_event_data, EmitReply, EmitRequest};
use crate::ws;
use axum::extract::{DefaultBodyLimit, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use relay_bus::{EventHub, EventRelay};
use std::sync::Arc;
use tokio::sync::watch;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The hub behind this gateway.
    pub hub: Arc<EventHub>,
    /// Gateway configuration.
    pub config: GatewayConfig,
}

/// The HTTP/WebSocket gateway over one event hub.
pub struct GatewayService {
    config: GatewayConfig,
    hub: Arc<EventHub>,
}

impl GatewayService {
    /// Create a gateway over `hub`.
    ///
    /// # Errors
    ///
    /// [`GatewayError::Config`] if the configuration fails validation.
    pub fn new(config: GatewayConfig, hub: Arc<EventHub>) -> Result<Self, GatewayError> {
        config.validate()?;
        Ok(Self { config, hub })
    }

    /// Build the axum router serving the gateway operations.
    #[must_use]
    pub fn router(&self) -> Router {
        let state = AppState {
            hub: Arc::clone(&self.hub),
            config: self.config.clone(),
        };

        Router::new()
            .route("/v1/events/emit", post(emit_event))
            .route("/v1/events/listen", get(ws::listen_events))
            .route("/health", get(health))
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(CorsLayer::permissive())
                    .layer(DefaultBodyLimit::max(self.config.max_message_size)),
            )
            .with_state(state)
    }

    /// Bind and serve until `shutdown` flips.
    ///
    /// # Errors
    ///
    /// [`GatewayError::Io`] if binding or serving fails.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) -> Result<(), GatewayError> {
        let addr = self.config.addr();
        let router = self.router();

        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!(addr = %addr, "gateway listening");

        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.changed().await;
            })
            .await?;

        info!("gateway stopped");
        Ok(())
    }
}

/// `POST /v1/events/emit`: validate and dispatch one event.
///
/// The reply always carries HTTP 200; failures travel as a non-empty
/// `error` string in the body.
async fn emit_event(State(state): State<AppState>, Json(request): Json<EmitRequest>) -> Json<EmitReply> {
    let payload = match decode_event_data(&request.event_data) {
        Ok(payload) => payload,
        Err(message) => {
            debug!(key = %request.event_key, error = %message, "emit rejected");
            return Json(EmitReply::failure(message));
        }
    };

    match state
        .hub
        .emit(request.service, request.event_key, payload)
        .await
    {
        Ok(receipt) => {
            debug!(
                delivered = receipt.delivered,
                dropped = receipt.dropped,
                "emit dispatched"
            );
            Json(EmitReply::ok())
        }
        Err(err) => Json(EmitReply::failure(err.to_string())),
    }
}

/// `GET /health`: liveness plus hub stats.
async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": crate::VERSION,
        "services": state.hub.service_count(),
        "subscriptions": state.hub.subscription_count(),
        "events_routed": state.hub.events_routed(),
    }))
}
