//! Actuator-toggle HTTP façade.
//!
//! `POST /api/led/{on|off}` runs one relay operation with `LED_ON` or
//! `LED_OFF` and answers:
//! - 200 `{"result": reply}` on success
//! - 400 `{"error": ...}` for any other action, before touching the network
//! - 500 `{"error": "communication error: ..."}` when the relay fails

use crate::relay::CommandRelay;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use mixer_core::LedAction;
use serde_json::json;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;

/// HTTP front for a [`CommandRelay`].
#[derive(Debug, Clone)]
pub struct Facade {
    relay: Arc<CommandRelay>,
}

impl Facade {
    /// Wrap a relay.
    #[must_use]
    pub fn new(relay: CommandRelay) -> Self {
        Self {
            relay: Arc::new(relay),
        }
    }

    /// axum router exposing `/api/led/:action`.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/api/led/:action", post(switch_led))
            .with_state(Arc::clone(&self.relay))
    }

    /// Serve until `shutdown` resolves.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        tracing::info!(
            addr = ?listener.local_addr().ok(),
            responder = %self.relay.target(),
            "actuator façade listening"
        );
        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await
    }
}

async fn switch_led(State(relay): State<Arc<CommandRelay>>, Path(action): Path<String>) -> Response {
    let action = match action.parse::<LedAction>() {
        Ok(action) => action,
        Err(e) => {
            tracing::warn!(%action, "rejected actuator action");
            return (StatusCode::BAD_REQUEST, Json(json!({"error": e.to_string()}))).into_response();
        }
    };

    match relay.send(action.command()).await {
        Ok(result) => {
            tracing::info!(%action, %result, "actuator switched");
            Json(json!({"result": result})).into_response()
        }
        Err(e) => {
            tracing::error!(%action, error = %e, "actuator relay failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": format!("communication error: {e}")})),
            )
                .into_response()
        }
    }
}
