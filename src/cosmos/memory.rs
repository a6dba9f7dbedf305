use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::client::{CollectionSpec, DatabaseLink, DocumentClient, ResourceOutcome};
use super::errors::CosmosError;

// ============================================================================
// In-Memory Document Client
// ============================================================================
//
// Behaves like the remote account for the create-if-absent operations, and
// records every call so provisioning can be asserted on without a network.
//
// ============================================================================

/// A collection as it was created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionRecord {
    pub partition_key_paths: Vec<String>,
    pub throughput: u32,
}

/// Which call should fail, for exercising error paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureMode {
    CreateDatabase,
    CreateCollection,
}

#[derive(Debug, Default)]
struct State {
    databases: HashMap<String, HashMap<String, CollectionRecord>>,
    failure: Option<FailureMode>,
    database_calls: usize,
    collection_calls: usize,
}

#[derive(Debug, Default)]
pub struct InMemoryDocumentClient {
    state: Mutex<State>,
}

impl InMemoryDocumentClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call of the given kind fail with a 503.
    pub fn fail_on(self, mode: FailureMode) -> Self {
        self.lock().failure = Some(mode);
        self
    }

    pub fn clear_failure(&self) {
        self.lock().failure = None;
    }

    /// Seed an existing collection, as if created out of band.
    pub fn with_collection(
        self,
        database_id: &str,
        collection_id: &str,
        record: CollectionRecord,
    ) -> Self {
        self.lock()
            .databases
            .entry(database_id.to_string())
            .or_default()
            .insert(collection_id.to_string(), record);
        self
    }

    pub fn database_exists(&self, database_id: &str) -> bool {
        self.lock().databases.contains_key(database_id)
    }

    pub fn database_count(&self) -> usize {
        self.lock().databases.len()
    }

    pub fn collection(&self, database_id: &str, collection_id: &str) -> Option<CollectionRecord> {
        self.lock()
            .databases
            .get(database_id)
            .and_then(|collections| collections.get(collection_id))
            .cloned()
    }

    pub fn collection_count(&self, database_id: &str) -> usize {
        self.lock()
            .databases
            .get(database_id)
            .map_or(0, HashMap::len)
    }

    pub fn database_calls(&self) -> usize {
        self.lock().database_calls
    }

    pub fn collection_calls(&self) -> usize {
        self.lock().collection_calls
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn injected_failure(operation: &str) -> CosmosError {
    CosmosError::Status {
        status: 503,
        message: format!("injected failure for {operation}"),
    }
}

#[async_trait]
impl DocumentClient for InMemoryDocumentClient {
    async fn create_database_if_not_exists(
        &self,
        database_id: &str,
    ) -> Result<ResourceOutcome, CosmosError> {
        let mut state = self.lock();
        state.database_calls += 1;

        if state.failure == Some(FailureMode::CreateDatabase) {
            return Err(injected_failure("create database"));
        }

        if state.databases.contains_key(database_id) {
            return Ok(ResourceOutcome::AlreadyExists);
        }

        state.databases.insert(database_id.to_string(), HashMap::new());
        Ok(ResourceOutcome::Created)
    }

    async fn create_collection_if_not_exists(
        &self,
        database: &DatabaseLink,
        spec: &CollectionSpec,
        offer_throughput: u32,
    ) -> Result<ResourceOutcome, CosmosError> {
        let mut state = self.lock();
        state.collection_calls += 1;

        if state.failure == Some(FailureMode::CreateCollection) {
            return Err(injected_failure("create collection"));
        }

        let Some(collections) = state.databases.get_mut(database.database_id()) else {
            return Err(CosmosError::NotFound(database.to_string()));
        };

        if collections.contains_key(&spec.id) {
            return Ok(ResourceOutcome::AlreadyExists);
        }

        collections.insert(
            spec.id.clone(),
            CollectionRecord {
                partition_key_paths: spec.partition_key.paths.clone(),
                throughput: offer_throughput,
            },
        );
        Ok(ResourceOutcome::Created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_database_creation_is_idempotent() {
        let client = InMemoryDocumentClient::new();

        let first = client.create_database_if_not_exists("Elders").await.unwrap();
        let second = client.create_database_if_not_exists("Elders").await.unwrap();

        assert_eq!(first, ResourceOutcome::Created);
        assert_eq!(second, ResourceOutcome::AlreadyExists);
        assert_eq!(client.database_count(), 1);
        assert_eq!(client.database_calls(), 2);
    }

    #[tokio::test]
    async fn test_collection_requires_database() {
        let client = InMemoryDocumentClient::new();

        let result = client
            .create_collection_if_not_exists(
                &DatabaseLink::new("Missing"),
                &CollectionSpec::event_store("EventStore"),
                2500,
            )
            .await;

        assert!(matches!(result, Err(CosmosError::NotFound(link)) if link == "dbs/Missing"));
    }

    #[tokio::test]
    async fn test_injected_failure_can_be_cleared() {
        let client = InMemoryDocumentClient::new().fail_on(FailureMode::CreateDatabase);

        assert!(client.create_database_if_not_exists("Elders").await.is_err());
        assert!(!client.database_exists("Elders"));

        client.clear_failure();
        assert!(client.create_database_if_not_exists("Elders").await.is_ok());
        assert!(client.database_exists("Elders"));
    }
}
