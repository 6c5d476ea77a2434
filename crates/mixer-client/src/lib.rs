//! `mixer-client`
//!
//! Async HTTP clients used by the control panel:
//!
//! - [`TelemetryClient`]: `GET /api/status`, parameter updates and the manual
//!   echo trigger on the audio service
//! - [`ActuatorClient`]: `POST /api/led/{on,off}` on the actuator-toggle façade
//!
//! Both clients are cheap to clone and share one connection pool per instance.

pub mod actuator;
pub mod error;
pub mod telemetry;

pub use actuator::ActuatorClient;
pub use error::{ClientError, Result};
pub use telemetry::TelemetryClient;

use url::Url;

/// Parse a base URL so that relative `api/...` joins keep any path prefix.
pub(crate) fn base_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw)?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Pull a human-readable message out of an error body.
///
/// The audio service answers `{"status": "error", "message": ...}` and the
/// façade answers `{"error": ...}`; anything else is returned verbatim.
pub(crate) fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("message")
                .or_else(|| v.get("error"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_keeps_prefix() {
        let base = base_url("http://host:5000/mixer").unwrap();
        assert_eq!(base.join("api/status").unwrap().as_str(), "http://host:5000/mixer/api/status");
        let base = base_url("http://host:5000").unwrap();
        assert_eq!(base.join("api/status").unwrap().as_str(), "http://host:5000/api/status");
    }

    #[test]
    fn test_error_message_shapes() {
        assert_eq!(error_message(r#"{"status":"error","message":"Mic is locked out"}"#), "Mic is locked out");
        assert_eq!(error_message(r#"{"error":"Invalid command"}"#), "Invalid command");
        assert_eq!(error_message("  Bad Gateway \n"), "Bad Gateway");
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(base_url("not a url"), Err(ClientError::UrlParse(_))));
    }
}
