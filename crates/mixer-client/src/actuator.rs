//! Client for the actuator-toggle façade.

use crate::error::{ClientError, Result};
use crate::error_message;
use mixer_core::LedAction;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

#[derive(Debug, Deserialize)]
struct SwitchReply {
    result: String,
}

/// Async client for `POST /api/led/{on,off}`.
#[derive(Debug, Clone)]
pub struct ActuatorClient {
    client: Client,
    base: Url,
}

impl ActuatorClient {
    /// Create a client for the façade at `base_url`.
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(request_timeout).build()?;
        Ok(Self {
            client,
            base: crate::base_url(base_url)?,
        })
    }

    /// Switch the actuator and return the responder's reply text.
    ///
    /// A 400 or 500 from the façade becomes [`ClientError::Status`] carrying
    /// the façade's `error` message.
    pub async fn switch(&self, action: LedAction) -> Result<String> {
        let url = self.base.join(&format!("api/led/{}", action.as_str()))?;
        tracing::debug!(%url, %action, "switching actuator");

        let response = self.client.post(url).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }
        serde_json::from_str::<SwitchReply>(&body)
            .map(|reply| reply.result)
            .map_err(|e| ClientError::UnexpectedResponse(format!("{e}: {body}")))
    }
}
