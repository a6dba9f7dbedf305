// ============================================================================
// Event Sourcing Store - Storage Bootstrap
// ============================================================================
//
// The event store handle handed to the registry, and the provisioning step
// that makes sure its collection exists before it is handed out.
//
// ============================================================================

pub mod event_store;
pub mod provisioning;

pub use event_store::CosmosEventStore;
pub use provisioning::{ensure_storage, ProvisioningError, ProvisioningReport, StorageProvisioner};
