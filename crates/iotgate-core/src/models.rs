//! Event models flowing through the validation pipeline.
//!
//! An [`InboundEvent`] is the raw form-urlencoded callback exactly as
//! received. The pipeline derives a [`NormalizedEvent`] from it rather than
//! mutating in place, so each stage stays pure: the raw XML `data` string
//! is replaced by its decoded structure and the extracted device identifier
//! is attached. Normalized events live for one request and are never
//! persisted.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::GateError;

/// Raw event callback as posted by the provider.
///
/// All fields default to empty strings so a sparse form body still
/// deserializes; emptiness is checked separately by the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundEvent {
    /// Provider-assigned event identifier.
    #[serde(default, rename = "eventId")]
    pub event_id: String,

    /// Provider event type, e.g. `SESSION_START`.
    #[serde(default, rename = "eventType")]
    pub event_type: String,

    /// Event timestamp on the provider clock, passed through verbatim.
    #[serde(default)]
    pub timestamp: String,

    /// Base64 MAC over the timestamp, verified against the shared secret.
    #[serde(default)]
    pub signature: String,

    /// Raw XML payload string.
    #[serde(default)]
    pub data: String,
}

impl InboundEvent {
    /// Returns true when the request carried no usable form fields.
    pub fn is_empty(&self) -> bool {
        self.event_id.is_empty()
            && self.event_type.is_empty()
            && self.timestamp.is_empty()
            && self.signature.is_empty()
            && self.data.is_empty()
    }

    /// Produces the normalized event with the decoded payload and the
    /// extracted device identifier attached.
    pub fn normalize(self, device: String, data: Value) -> NormalizedEvent {
        NormalizedEvent {
            event_id: self.event_id,
            event_type: self.event_type,
            timestamp: self.timestamp,
            signature: self.signature,
            device,
            data,
        }
    }
}

/// Inbound event augmented with the decoded payload and device identifier.
#[derive(Debug, Clone, Serialize)]
pub struct NormalizedEvent {
    /// Provider-assigned event identifier.
    #[serde(rename = "eventId")]
    pub event_id: String,

    /// Provider event type.
    #[serde(rename = "eventType")]
    pub event_type: String,

    /// Event timestamp on the provider clock.
    pub timestamp: String,

    /// Original signature, carried along for downstream consumers.
    pub signature: String,

    /// Device identifier extracted from the payload (`iccid` element).
    /// Empty when the payload carried no identifier.
    pub device: String,

    /// Decoded payload: element name mapped to string, nested mapping, or
    /// array for repeated elements.
    pub data: Value,
}

/// Terminal state of one request through the pipeline.
#[derive(Debug)]
pub enum PipelineOutcome {
    /// Device authorized; the event was forwarded and logged.
    Forwarded(NormalizedEvent),

    /// Registry had no record for the device. Not an error: a denial log
    /// entry was written and the provider sees 200 so it will not retry.
    Denied {
        /// Device identifier that was refused.
        device: String,
    },

    /// A stage failed; remaining stages were skipped.
    Rejected(GateError),
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn default_event_is_empty() {
        assert!(InboundEvent::default().is_empty());
    }

    #[test]
    fn event_with_any_field_is_not_empty() {
        let event = InboundEvent { data: "<x/>".into(), ..InboundEvent::default() };
        assert!(!event.is_empty());
    }

    #[test]
    fn provider_field_names_map_onto_the_model() {
        let event = event_from_pairs(
            "eventId=SESSION_START-123&eventType=SESSION_START&timestamp=t&signature=s&data=d",
        );
        assert_eq!(event.event_id, "SESSION_START-123");
        assert_eq!(event.event_type, "SESSION_START");
        assert_eq!(event.data, "d");
    }

    #[test]
    fn normalize_replaces_data_and_attaches_device() {
        let event = InboundEvent {
            event_id: "e1".into(),
            event_type: "SESSION_START".into(),
            timestamp: "2010-01-07T01:20:55.685Z".into(),
            signature: "sig".into(),
            data: "<Session><iccid>89</iccid></Session>".into(),
        };

        let normalized = event.normalize("89".into(), json!({"iccid": "89"}));

        assert_eq!(normalized.device, "89");
        assert_eq!(normalized.data, json!({"iccid": "89"}));
        assert_eq!(normalized.event_id, "e1");
    }

    fn event_from_pairs(body: &str) -> InboundEvent {
        serde_json::from_value(
            serde_json::to_value(
                body.split('&')
                    .filter_map(|pair| pair.split_once('='))
                    .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
                    .collect::<serde_json::Map<String, Value>>(),
            )
            .unwrap(),
        )
        .unwrap()
    }
}
