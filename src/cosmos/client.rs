use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::CosmosError;

// ============================================================================
// Document Client - Remote Database Seam
// ============================================================================
//
// Only the two create-if-absent operations needed at bootstrap live here.
// Reading and writing documents belongs to the event store engine.
//
// ============================================================================

/// Partition key path of every event store collection.
///
/// Documents are hash-partitioned by the stream (aggregate) identifier stored
/// in the `i` field. Changing this requires migrating existing collections.
pub const PARTITION_KEY_PATH: &str = "/i";

/// Lowest offer a collection can be created with.
pub const MIN_THROUGHPUT: u32 = 2500;

/// Provisioned request units per second for a new collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Throughput(u32);

impl Throughput {
    /// `None` when `units` is below [`MIN_THROUGHPUT`].
    pub fn new(units: u32) -> Option<Self> {
        (units >= MIN_THROUGHPUT).then_some(Self(units))
    }

    pub fn units(&self) -> u32 {
        self.0
    }
}

impl Default for Throughput {
    fn default() -> Self {
        Self(MIN_THROUGHPUT)
    }
}

impl fmt::Display for Throughput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} RU/s", self.0)
    }
}

/// Link to a database, e.g. `dbs/Elders`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DatabaseLink {
    database_id: String,
}

impl DatabaseLink {
    pub fn new(database_id: impl Into<String>) -> Self {
        Self {
            database_id: database_id.into(),
        }
    }

    pub fn database_id(&self) -> &str {
        &self.database_id
    }
}

impl fmt::Display for DatabaseLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dbs/{}", self.database_id)
    }
}

/// Fully qualified collection locator, e.g. `dbs/Elders/colls/EventStore`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionLink {
    database: DatabaseLink,
    collection_id: String,
}

impl CollectionLink {
    pub fn new(database_id: impl Into<String>, collection_id: impl Into<String>) -> Self {
        Self {
            database: DatabaseLink::new(database_id),
            collection_id: collection_id.into(),
        }
    }

    pub fn database(&self) -> &DatabaseLink {
        &self.database
    }

    pub fn database_id(&self) -> &str {
        self.database.database_id()
    }

    pub fn collection_id(&self) -> &str {
        &self.collection_id
    }
}

impl fmt::Display for CollectionLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/colls/{}", self.database, self.collection_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionKeyDefinition {
    pub paths: Vec<String>,
    pub kind: String,
}

impl PartitionKeyDefinition {
    pub fn hash(path: impl Into<String>) -> Self {
        Self {
            paths: vec![path.into()],
            kind: "Hash".to_string(),
        }
    }
}

/// Body of a create-collection request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionSpec {
    pub id: String,
    pub partition_key: PartitionKeyDefinition,
}

impl CollectionSpec {
    /// Collection partitioned on [`PARTITION_KEY_PATH`].
    pub fn event_store(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            partition_key: PartitionKeyDefinition::hash(PARTITION_KEY_PATH),
        }
    }
}

/// What a create-if-not-exists call found on the remote side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceOutcome {
    Created,
    AlreadyExists,
}

impl ResourceOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceOutcome::Created => "created",
            ResourceOutcome::AlreadyExists => "already_exists",
        }
    }
}

/// Connection handle to a document database account.
///
/// Both operations must be idempotent: an existing resource is reported as
/// [`ResourceOutcome::AlreadyExists`], never as an error, and is left as is.
#[async_trait]
pub trait DocumentClient: Send + Sync + fmt::Debug {
    async fn create_database_if_not_exists(
        &self,
        database_id: &str,
    ) -> Result<ResourceOutcome, CosmosError>;

    /// `offer_throughput` only applies when the collection is created.
    async fn create_collection_if_not_exists(
        &self,
        database: &DatabaseLink,
        spec: &CollectionSpec,
        offer_throughput: u32,
    ) -> Result<ResourceOutcome, CosmosError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_links_render_resource_paths() {
        let link = CollectionLink::new("Elders", "EventStore");
        assert_eq!(link.database().to_string(), "dbs/Elders");
        assert_eq!(link.to_string(), "dbs/Elders/colls/EventStore");
        assert_eq!(link.database_id(), "Elders");
        assert_eq!(link.collection_id(), "EventStore");
    }

    #[test]
    fn test_throughput_floor() {
        assert_eq!(Throughput::new(2499), None);
        assert_eq!(Throughput::new(0), None);
        assert_eq!(Throughput::new(2500).map(|t| t.units()), Some(2500));
        assert_eq!(Throughput::new(3000).map(|t| t.units()), Some(3000));
        assert_eq!(Throughput::default().units(), MIN_THROUGHPUT);
    }

    #[test]
    fn test_collection_spec_wire_format() {
        let spec = CollectionSpec::event_store("Events");
        let json = serde_json::to_value(&spec).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "id": "Events",
                "partitionKey": { "paths": ["/i"], "kind": "Hash" }
            })
        );
    }
}
