//! Client for the audio service's telemetry/control endpoint.

use crate::error::{ClientError, Result};
use crate::error_message;
use mixer_core::{ParameterUpdate, StatusSnapshot};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use url::Url;

/// Async client for `GET /api/status` and the parameter update endpoints.
#[derive(Debug, Clone)]
pub struct TelemetryClient {
    client: Client,
    base: Url,
}

impl TelemetryClient {
    /// Create a client for `base_url` with a per-request timeout.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Root of the service, e.g. `http://127.0.0.1:5000`
    /// * `request_timeout` - Upper bound for every request, connect included
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(request_timeout)
            .connect_timeout(request_timeout)
            .build()?;
        Ok(Self {
            client,
            base: crate::base_url(base_url)?,
        })
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub fn base(&self) -> &Url {
        &self.base
    }

    fn url(&self, path: &str) -> Result<Url> {
        Ok(self.base.join(path.trim_start_matches('/'))?)
    }

    /// Fetch one full status snapshot.
    ///
    /// Any non-success status is an error; the body is decoded with
    /// [`StatusSnapshot::from_json`] so `-Infinity` levels are accepted.
    pub async fn fetch_status(&self) -> Result<StatusSnapshot> {
        let url = self.url("/api/status")?;
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }
        Ok(StatusSnapshot::from_json(&body)?)
    }

    /// POST a single-field update to the parameter's bound endpoint.
    pub async fn publish(&self, update: &ParameterUpdate) -> Result<()> {
        let url = self.url(update.endpoint.path())?;
        let payload = update.payload();
        tracing::debug!(%url, %payload, "publishing parameter update");

        let response = self.client.post(url).json(&payload).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(ClientError::Status {
            status: status.as_u16(),
            message: error_message(&body),
        })
    }

    /// Ask the service to capture a frame and play the echo now.
    ///
    /// # Returns
    ///
    /// The service's confirmation message. A locked-out microphone (HTTP 403)
    /// is reported as [`ClientError::Rejected`].
    pub async fn trigger_echo(&self) -> Result<String> {
        let url = self.url("/api/start_echo")?;
        let response = self.client.post(url).send().await?;
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body);

        match status {
            s if s.is_success() => {
                tracing::info!(%message, "echo triggered");
                Ok(message)
            }
            StatusCode::FORBIDDEN => Err(ClientError::Rejected(message)),
            s => Err(ClientError::Status {
                status: s.as_u16(),
                message,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_resolve_against_base() {
        let client = TelemetryClient::new("http://127.0.0.1:5000/", Duration::from_secs(1)).unwrap();
        assert_eq!(
            client.url("/api/echo_params").unwrap().as_str(),
            "http://127.0.0.1:5000/api/echo_params"
        );
    }
}
