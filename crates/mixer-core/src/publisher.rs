//! Change Publisher contract.
//!
//! A commit on a slider produces exactly one [`ParameterUpdate`], handed to an
//! [`UpdateSink`]. Sinks are fire-and-forget: they must not block the caller
//! and report nothing back.

use crate::catalog::{Endpoint, ParamId, ParameterDefinition};
use parking_lot::Mutex;
use serde_json::{json, Map, Value};

/// Single-field update for one parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterUpdate {
    /// Parameter being changed.
    pub param: ParamId,
    /// Endpoint that persists it.
    pub endpoint: Endpoint,
    /// JSON field key.
    pub field: &'static str,
    /// Committed value.
    pub value: f64,
    integer: bool,
}

impl ParameterUpdate {
    /// Build an update from a definition and committed value.
    #[must_use]
    pub fn new(definition: &ParameterDefinition, value: f64) -> Self {
        Self {
            param: definition.id,
            endpoint: definition.binding.endpoint,
            field: definition.binding.field,
            value,
            integer: definition.domain.is_integer(),
        }
    }

    /// Request body, e.g. `{"threshold_dbfs": -20.0}` or `{"taps": 4}`.
    #[must_use]
    pub fn payload(&self) -> Value {
        let value = if self.integer {
            json!(self.value.round() as i64)
        } else {
            json!(self.value)
        };
        let mut body = Map::new();
        body.insert(self.field.to_string(), value);
        Value::Object(body)
    }
}

/// Destination for committed updates.
pub trait UpdateSink: Send + Sync {
    /// Dispatch one update without waiting for the outcome.
    fn publish(&self, update: ParameterUpdate);
}

impl<F> UpdateSink for F
where
    F: Fn(ParameterUpdate) + Send + Sync,
{
    fn publish(&self, update: ParameterUpdate) {
        self(update)
    }
}

/// Sink that keeps every update, for tests and dry runs.
#[derive(Debug, Default)]
pub struct RecordingSink {
    updates: Mutex<Vec<ParameterUpdate>>,
}

impl RecordingSink {
    /// Empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything published so far.
    #[must_use]
    pub fn updates(&self) -> Vec<ParameterUpdate> {
        self.updates.lock().clone()
    }

    /// Number of updates published so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.updates.lock().len()
    }

    /// True if nothing was published.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.updates.lock().is_empty()
    }
}

impl UpdateSink for RecordingSink {
    fn publish(&self, update: ParameterUpdate) {
        tracing::debug!(param = %update.param, value = update.value, "recorded update");
        self.updates.lock().push(update);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_single_field() {
        let def = ParameterDefinition::builtin(ParamId::Threshold);
        let update = ParameterUpdate::new(&def, -20.0);
        assert_eq!(update.endpoint, Endpoint::Threshold);
        assert_eq!(update.payload(), json!({"threshold_dbfs": -20.0}));
    }

    #[test]
    fn test_integer_parameters_sent_as_integers() {
        let def = ParameterDefinition::builtin(ParamId::EchoTaps);
        let update = ParameterUpdate::new(&def, 4.0);
        assert_eq!(update.payload().to_string(), r#"{"taps":4}"#);
    }

    #[test]
    fn test_closure_sink() {
        let seen = Mutex::new(Vec::new());
        let sink = |u: ParameterUpdate| seen.lock().push(u.field);
        let def = ParameterDefinition::builtin(ParamId::EchoFeedback);
        sink.publish(ParameterUpdate::new(&def, 0.4));
        assert_eq!(*seen.lock(), vec!["feedback"]);
    }
}
