use std::time::{Duration, Instant};

use crate::cosmos::{
    CollectionLink, CollectionSpec, CosmosError, DocumentClient, ResourceOutcome, Throughput,
    PARTITION_KEY_PATH,
};
use crate::metrics::StoreMetrics;

// ============================================================================
// Storage Provisioning - Create-If-Absent Database and Collection
// ============================================================================
//
// Runs once at bootstrap when the profile asks for new storage:
// 1. Ensure the database exists
// 2. Ensure the collection exists, partitioned on the stream id, with the
//    requested throughput as its initial offer
//
// Existing resources are never modified. Failures are not retried here;
// re-running after a partial failure is safe.
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ProvisioningError {
    #[error("failed to ensure database `{database}`: {source}")]
    Database {
        database: String,
        #[source]
        source: CosmosError,
    },

    #[error("failed to ensure collection `{collection}`: {source}")]
    Collection {
        collection: String,
        #[source]
        source: CosmosError,
    },

    #[error("storage provisioning did not complete within {0:?}")]
    Timeout(Duration),

    #[error("new storage requested for bounded context `{0}` but no connection is configured")]
    MissingConnection(String),
}

/// What provisioning found for each resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProvisioningReport {
    pub database: ResourceOutcome,
    pub collection: ResourceOutcome,
}

impl ProvisioningReport {
    pub fn created_anything(&self) -> bool {
        self.database == ResourceOutcome::Created || self.collection == ResourceOutcome::Created
    }
}

pub struct StorageProvisioner<'a> {
    client: &'a dyn DocumentClient,
    metrics: Option<&'a StoreMetrics>,
}

impl<'a> StorageProvisioner<'a> {
    pub fn new(client: &'a dyn DocumentClient) -> Self {
        Self {
            client,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: &'a StoreMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Ensure the database and collection behind `collection` exist.
    pub async fn ensure_storage(
        &self,
        collection: &CollectionLink,
        throughput: Throughput,
    ) -> Result<ProvisioningReport, ProvisioningError> {
        tracing::info!(
            collection = %collection,
            throughput = throughput.units(),
            partition_key = PARTITION_KEY_PATH,
            "Ensuring event store storage exists"
        );

        let database = self.ensure_database(collection).await?;
        let collection_outcome = self.ensure_collection(collection, throughput).await?;

        let report = ProvisioningReport {
            database,
            collection: collection_outcome,
        };

        tracing::info!(
            collection = %collection,
            database_outcome = report.database.as_str(),
            collection_outcome = report.collection.as_str(),
            "✅ Event store storage is in place"
        );

        Ok(report)
    }

    async fn ensure_database(
        &self,
        collection: &CollectionLink,
    ) -> Result<ResourceOutcome, ProvisioningError> {
        let started = Instant::now();
        let result = self
            .client
            .create_database_if_not_exists(collection.database_id())
            .await;
        self.record("database", &result, started);

        result.map_err(|source| ProvisioningError::Database {
            database: collection.database_id().to_string(),
            source,
        })
    }

    async fn ensure_collection(
        &self,
        collection: &CollectionLink,
        throughput: Throughput,
    ) -> Result<ResourceOutcome, ProvisioningError> {
        let spec = CollectionSpec::event_store(collection.collection_id());

        let started = Instant::now();
        let result = self
            .client
            .create_collection_if_not_exists(collection.database(), &spec, throughput.units())
            .await;
        self.record("collection", &result, started);

        if let Ok(ResourceOutcome::AlreadyExists) = result {
            // Partition key and offer of an existing collection are not inspected.
            tracing::debug!(
                collection = %collection,
                "Collection already exists, leaving partitioning and throughput untouched"
            );
        }

        result.map_err(|source| ProvisioningError::Collection {
            collection: collection.to_string(),
            source,
        })
    }

    fn record(
        &self,
        resource: &str,
        result: &Result<ResourceOutcome, CosmosError>,
        started: Instant,
    ) {
        let outcome = match result {
            Ok(outcome) => outcome.as_str(),
            Err(e) => {
                tracing::error!(resource = resource, error = %e, "Provisioning call failed");
                "failed"
            }
        };

        if let Some(metrics) = self.metrics {
            metrics.record_provisioning(resource, outcome, started.elapsed().as_secs_f64());
        }
    }
}

/// Ensure `database_name` and `collection_name` exist, creating the collection
/// with `throughput` when it is new.
pub async fn ensure_storage(
    client: &dyn DocumentClient,
    database_name: &str,
    collection_name: &str,
    throughput: Throughput,
) -> Result<ProvisioningReport, ProvisioningError> {
    StorageProvisioner::new(client)
        .ensure_storage(&CollectionLink::new(database_name, collection_name), throughput)
        .await
}
