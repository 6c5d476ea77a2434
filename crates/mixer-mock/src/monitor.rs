//! HTTP front of the simulated audio service.
//!
//! Routes:
//! - `GET /api/status`, `GET /api/volume`
//! - `GET|POST /api/threshold`, `GET|POST /api/lockout`, `GET|POST /api/echo_params`
//! - `POST /api/start_echo`
//!
//! POST bodies are parsed leniently (any content type); numbers may also be
//! given as numeric strings.

use crate::device::{DeviceError, EchoUpdate, MockDevice};
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Map, Value};
use tokio::net::TcpListener;

/// Simulated audio monitor service.
#[derive(Debug, Clone, Default)]
pub struct MockMonitor {
    device: MockDevice,
}

impl MockMonitor {
    /// Wrap a device.
    #[must_use]
    pub fn new(device: MockDevice) -> Self {
        Self { device }
    }

    /// Device behind the service.
    #[must_use]
    pub fn device(&self) -> &MockDevice {
        &self.device
    }

    /// axum router for the service.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/api/status", get(get_status))
            .route("/api/volume", get(get_volume))
            .route("/api/threshold", get(get_threshold).post(post_threshold))
            .route("/api/lockout", get(get_lockout).post(post_lockout))
            .route("/api/echo_params", get(get_echo_params).post(post_echo_params))
            .route("/api/start_echo", post(start_echo))
            .with_state(self.device.clone())
    }

    /// Serve until the listener fails.
    pub async fn serve(self, listener: TcpListener) -> std::io::Result<()> {
        tracing::info!(addr = ?listener.local_addr().ok(), "mock audio monitor listening");
        axum::serve(listener, self.router()).await
    }
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({"status": "error", "message": message}))).into_response()
}

fn invalid_value() -> Response {
    error(StatusCode::BAD_REQUEST, "Invalid value")
}

fn parse_body(body: &Bytes) -> Option<Map<String, Value>> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// Read a number the way the service does: JSON numbers or numeric strings.
fn number(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

async fn get_status(State(device): State<MockDevice>) -> Json<Value> {
    Json(device.status())
}

async fn get_volume(State(device): State<MockDevice>) -> Json<Value> {
    Json(device.volume())
}

async fn get_threshold(State(device): State<MockDevice>) -> Json<Value> {
    Json(json!({"threshold_dbfs": device.parameters().threshold_dbfs}))
}

async fn post_threshold(State(device): State<MockDevice>, body: Bytes) -> Response {
    let Some(body) = parse_body(&body) else {
        return invalid_value();
    };
    let Some(raw) = body.get("threshold_dbfs") else {
        return error(StatusCode::BAD_REQUEST, "Missing field");
    };
    let Some(value) = number(raw) else {
        return invalid_value();
    };
    device.set_threshold(value);
    Json(json!({"status": "ok", "threshold_dbfs": value})).into_response()
}

async fn get_lockout(State(device): State<MockDevice>) -> Json<Value> {
    Json(json!({"lockout_sec": device.parameters().lockout_sec}))
}

async fn post_lockout(State(device): State<MockDevice>, body: Bytes) -> Response {
    let Some(body) = parse_body(&body) else {
        return invalid_value();
    };
    let Some(raw) = body.get("lockout_sec") else {
        return error(StatusCode::BAD_REQUEST, "Missing field");
    };
    let Some(value) = number(raw) else {
        return invalid_value();
    };
    device.set_lockout(value);
    Json(json!({"status": "ok", "lockout_sec": value})).into_response()
}

fn echo_document(device: &MockDevice) -> Map<String, Value> {
    match serde_json::to_value(device.parameters()) {
        Ok(Value::Object(mut all)) => {
            all.remove("threshold_dbfs");
            all.remove("lockout_sec");
            all
        }
        _ => Map::new(),
    }
}

async fn get_echo_params(State(device): State<MockDevice>) -> Json<Value> {
    Json(Value::Object(echo_document(&device)))
}

fn parse_echo_update(body: &Map<String, Value>) -> Option<EchoUpdate> {
    let field = |key: &str| -> Option<Option<f64>> {
        match body.get(key) {
            None => Some(None),
            Some(raw) => number(raw).map(Some),
        }
    };
    let taps = match body.get("taps") {
        None => None,
        Some(raw) => {
            let taps = number(raw)?.trunc();
            if taps < 0.0 {
                return None;
            }
            Some(taps as u32)
        }
    };
    Some(EchoUpdate {
        delay_sec: field("delay_sec")?,
        taps,
        feedback: field("feedback")?,
        start_vol: field("start_vol")?,
        end_vol: field("end_vol")?,
        frame_duration: field("frame_duration")?,
    })
}

async fn post_echo_params(State(device): State<MockDevice>, body: Bytes) -> Response {
    let Some(update) = parse_body(&body).as_ref().and_then(parse_echo_update) else {
        return invalid_value();
    };
    device.update_echo(&update);
    let mut reply = echo_document(&device);
    reply.insert("status".to_string(), json!("ok"));
    Json(Value::Object(reply)).into_response()
}

async fn start_echo(State(device): State<MockDevice>) -> Response {
    match device.start_echo() {
        Ok(_) => Json(json!({"status": "ok", "message": "Echo triggered"})).into_response(),
        Err(e @ DeviceError::LockedOut) => error(StatusCode::FORBIDDEN, &e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_parsing() {
        assert_eq!(number(&json!(-20)), Some(-20.0));
        assert_eq!(number(&json!("1.5")), Some(1.5));
        assert_eq!(number(&json!("loud")), None);
        assert_eq!(number(&json!(true)), None);
    }

    #[test]
    fn test_partial_echo_update() {
        let body = parse_body(&Bytes::from_static(br#"{"taps": 5, "feedback": "0.2"}"#)).unwrap();
        let update = parse_echo_update(&body).unwrap();
        assert_eq!(update.taps, Some(5));
        assert_eq!(update.feedback, Some(0.2));
        assert_eq!(update.delay_sec, None);

        let bad = parse_body(&Bytes::from_static(br#"{"taps": 5, "end_vol": "x"}"#)).unwrap();
        assert!(parse_echo_update(&bad).is_none());
    }
}
