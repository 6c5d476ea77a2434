//! Change Publisher sink backed by the tokio runtime.

use mixer_client::TelemetryClient;
use mixer_core::{ParameterUpdate, UpdateSink};
use tokio::runtime::Handle;

/// Spawns one POST per committed value.
///
/// Delivery is fire-and-forget: failures are logged and the next poll shows
/// whatever the service actually holds.
#[derive(Debug, Clone)]
pub struct SpawnedPublisher {
    client: TelemetryClient,
    handle: Handle,
}

impl SpawnedPublisher {
    /// Publish through `client` on the runtime behind `handle`.
    #[must_use]
    pub fn new(client: TelemetryClient, handle: Handle) -> Self {
        Self { client, handle }
    }
}

impl UpdateSink for SpawnedPublisher {
    fn publish(&self, update: ParameterUpdate) {
        let client = self.client.clone();
        self.handle.spawn(async move {
            match client.publish(&update).await {
                Ok(()) => tracing::debug!(param = %update.param, value = update.value, "parameter published"),
                Err(e) => tracing::warn!(
                    param = %update.param,
                    value = update.value,
                    error = %e,
                    "parameter update failed"
                ),
            }
        });
    }
}
