// ============================================================================
// Event Sourcing Infrastructure
// ============================================================================
//
// Serializer abstraction and the Cosmos-backed event store handle.
// Configuration of the handle lives in src/config/
//
// ============================================================================

pub mod core;
pub mod store;

pub use self::core::*;
pub use self::store::*;
