use std::fmt;
use std::sync::Arc;

use crate::cosmos::{CollectionLink, DocumentClient, PARTITION_KEY_PATH};
use crate::event_sourcing::core::EventSerializer;

// ============================================================================
// Cosmos Event Store Handle
// ============================================================================
//
// The ready-to-use handle registered for a bounded context. It carries what
// the event store engine needs to reach its collection:
// - the document database connection
// - the fully qualified collection locator
// - the event serializer
//
// It keeps no reference to the settings it was built from.
//
// ============================================================================

#[derive(Clone)]
pub struct CosmosEventStore {
    bounded_context: String,
    client: Option<Arc<dyn DocumentClient>>,
    collection: CollectionLink,
    serializer: Arc<dyn EventSerializer>,
}

impl CosmosEventStore {
    pub fn new(
        bounded_context: impl Into<String>,
        client: Option<Arc<dyn DocumentClient>>,
        collection: CollectionLink,
        serializer: Arc<dyn EventSerializer>,
    ) -> Self {
        Self {
            bounded_context: bounded_context.into(),
            client,
            collection,
            serializer,
        }
    }

    pub fn bounded_context(&self) -> &str {
        &self.bounded_context
    }

    /// `None` when the profile was configured without a connection.
    pub fn client(&self) -> Option<&Arc<dyn DocumentClient>> {
        self.client.as_ref()
    }

    pub fn collection(&self) -> &CollectionLink {
        &self.collection
    }

    pub fn serializer(&self) -> &Arc<dyn EventSerializer> {
        &self.serializer
    }

    /// Document field every stream is partitioned on.
    pub fn partition_key_path(&self) -> &'static str {
        PARTITION_KEY_PATH
    }
}

impl fmt::Debug for CosmosEventStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CosmosEventStore")
            .field("bounded_context", &self.bounded_context)
            .field("collection", &self.collection.to_string())
            .field("connected", &self.client.is_some())
            .field("content_type", &self.serializer.content_type())
            .finish()
    }
}
