use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;

// ============================================================================
// Event Serialization Dependency
// ============================================================================
//
// The event store receives its serializer as a constructor dependency.
// Payloads cross the trait boundary as serde_json::Value so that the trait
// stays object safe; the generic helpers convert typed events on either side.
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum SerializationError {
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported payload: {0}")]
    Unsupported(String),
}

/// Turns event payloads into stored bytes and back.
pub trait EventSerializer: Send + Sync + fmt::Debug {
    /// Media type written next to stored payloads.
    fn content_type(&self) -> &'static str;

    fn serialize(&self, value: &serde_json::Value) -> Result<Vec<u8>, SerializationError>;

    fn deserialize(&self, bytes: &[u8]) -> Result<serde_json::Value, SerializationError>;
}

/// Plain `serde_json` serializer.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonSerializer;

impl EventSerializer for JsonSerializer {
    fn content_type(&self) -> &'static str {
        "application/json"
    }

    fn serialize(&self, value: &serde_json::Value) -> Result<Vec<u8>, SerializationError> {
        Ok(serde_json::to_vec(value)?)
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<serde_json::Value, SerializationError> {
        if bytes.is_empty() {
            return Err(SerializationError::Unsupported("empty payload".to_string()));
        }
        Ok(serde_json::from_slice(bytes)?)
    }
}

pub fn serialize_event<E: Serialize>(
    serializer: &dyn EventSerializer,
    event: &E,
) -> Result<Vec<u8>, SerializationError> {
    serializer.serialize(&serde_json::to_value(event)?)
}

pub fn deserialize_event<E: DeserializeOwned>(
    serializer: &dyn EventSerializer,
    bytes: &[u8],
) -> Result<E, SerializationError> {
    Ok(serde_json::from_value(serializer.deserialize(bytes)?)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct AccountOpened {
        owner: String,
        balance: i64,
    }

    #[test]
    fn test_typed_event_through_json_serializer() {
        let event = AccountOpened {
            owner: "alice".to_string(),
            balance: 100,
        };

        let bytes = serialize_event(&JsonSerializer, &event).unwrap();
        let restored: AccountOpened = deserialize_event(&JsonSerializer, &bytes).unwrap();

        assert_eq!(restored, event);
    }

    #[test]
    fn test_empty_payload_is_rejected() {
        let result = JsonSerializer.deserialize(&[]);
        assert!(matches!(result, Err(SerializationError::Unsupported(_))));
    }

    #[test]
    fn test_content_type() {
        assert_eq!(JsonSerializer.content_type(), "application/json");
    }
}
