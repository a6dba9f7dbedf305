//! Bootstrap for a Cosmos DB backed event store.
//!
//! A bounded context configures its store through validated settings,
//! optionally provisions the database and stream-partitioned collection,
//! and registers the resulting [`CosmosEventStore`] as a named singleton.
//!
//! ```no_run
//! use std::sync::Arc;
//! use cosmos_event_store::{BoundedContextConfig, EventStoreRegistry, JsonSerializer};
//!
//! # async fn bootstrap() -> Result<(), cosmos_event_store::ConfigError> {
//! let registry = Arc::new(EventStoreRegistry::new());
//! BoundedContextConfig::new("Orders", registry.clone(), Arc::new(JsonSerializer))?
//!     .use_cosmos_event_store(|settings| {
//!         settings
//!             .set_database_name("Test")?
//!             .set_throughput(3000)?
//!             .set_connection("https://account.documents.azure.com:443/", "c2VjcmV0")?
//!             .with_new_storage_if_not_exists();
//!         Ok(())
//!     })
//!     .await?;
//!
//! let store = registry.resolve("Orders");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod cosmos;
pub mod event_sourcing;
pub mod metrics;
pub mod registry;

pub use config::{BoundedContextConfig, ConfigError, CosmosEventStoreSettings, StoreOptions};
pub use cosmos::{DocumentClient, InMemoryDocumentClient, RestDocumentClient, Throughput};
pub use event_sourcing::{CosmosEventStore, EventSerializer, JsonSerializer, ProvisioningError};
pub use metrics::StoreMetrics;
pub use registry::{EventStoreRegistry, RegistryError, SingletonRegistry};
