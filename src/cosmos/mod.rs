// ============================================================================
// Document Database Access
// ============================================================================
//
// The remote account is reached through the DocumentClient trait so that
// provisioning can run against the REST API or an in-memory account.
//
// ============================================================================

mod auth;
mod client;
mod errors;
mod memory;
mod rest;

pub use auth::{rfc1123_date, MasterKey};
pub use client::{
    CollectionLink, CollectionSpec, DatabaseLink, DocumentClient, PartitionKeyDefinition,
    ResourceOutcome, Throughput, MIN_THROUGHPUT, PARTITION_KEY_PATH,
};
pub use errors::CosmosError;
pub use memory::{CollectionRecord, FailureMode, InMemoryDocumentClient};
pub use rest::RestDocumentClient;
