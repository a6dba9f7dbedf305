// ============================================================================
// Event Sourcing Core - Shared Abstractions
// ============================================================================

pub mod serializer;

pub use serializer::{deserialize_event, serialize_event, EventSerializer, JsonSerializer, SerializationError};
