use std::fmt;
use std::sync::Arc;

use crate::event_sourcing::core::EventSerializer;
use crate::event_sourcing::store::{CosmosEventStore, ProvisioningError, StorageProvisioner};
use crate::metrics::StoreMetrics;
use crate::registry::EventStoreRegistry;

use super::errors::ConfigError;
use super::settings::CosmosEventStoreSettings;

// ============================================================================
// Event Store Builder - Configure, Provision, Register
// ============================================================================
//
// Orchestrates: defaults → caller overrides → finalize
//
// Finalize either provisions (when asked) and registers exactly one event
// store factory under the bounded context name, or fails without registering
// anything.
//
// ============================================================================

/// Everything a bounded context brings to event store configuration.
#[derive(Clone)]
pub struct BoundedContextConfig {
    name: String,
    registry: Arc<EventStoreRegistry>,
    serializer: Arc<dyn EventSerializer>,
    metrics: Option<Arc<StoreMetrics>>,
}

impl BoundedContextConfig {
    pub fn new(
        name: impl Into<String>,
        registry: Arc<EventStoreRegistry>,
        serializer: Arc<dyn EventSerializer>,
    ) -> Result<Self, ConfigError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ConfigError::invalid("bounded_context", "cannot be empty or whitespace"));
        }

        Ok(Self {
            name,
            registry,
            serializer,
            metrics: None,
        })
    }

    pub fn with_metrics(mut self, metrics: Arc<StoreMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn registry(&self) -> &Arc<EventStoreRegistry> {
        &self.registry
    }

    pub fn serializer(&self) -> &Arc<dyn EventSerializer> {
        &self.serializer
    }

    pub fn metrics(&self) -> Option<&Arc<StoreMetrics>> {
        self.metrics.as_ref()
    }

    /// Configure, optionally provision, and register the Cosmos event store
    /// for this bounded context.
    ///
    /// `configure` runs against settings already holding the defaults. Any
    /// error it returns aborts before anything touches the database. On
    /// success `self` is handed back unchanged for further chaining.
    pub async fn use_cosmos_event_store<F>(self, configure: F) -> Result<Self, ConfigError>
    where
        F: FnOnce(&mut CosmosEventStoreSettings) -> Result<(), ConfigError>,
    {
        let mut settings = CosmosEventStoreSettings::new(self.name.as_str());
        configure(&mut settings)?;

        settings.finalize(&self).await?;
        Ok(self)
    }

    /// [`use_cosmos_event_store`](Self::use_cosmos_event_store) with the defaults only.
    pub async fn use_cosmos_event_store_with_defaults(self) -> Result<Self, ConfigError> {
        self.use_cosmos_event_store(|_| Ok(())).await
    }
}

impl fmt::Debug for BoundedContextConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundedContextConfig")
            .field("name", &self.name)
            .field("registry", &self.registry)
            .field("serializer", &self.serializer)
            .field("metrics", &self.metrics.is_some())
            .finish()
    }
}

impl CosmosEventStoreSettings {
    /// Consume the settings: provision if requested, then register the store.
    pub async fn finalize(self, base: &BoundedContextConfig) -> Result<(), ConfigError> {
        let collection = self.collection_link();

        if self.new_storage_if_not_exists() {
            let client = self
                .client()
                .ok_or_else(|| ProvisioningError::MissingConnection(self.bounded_context().to_string()))?;

            let mut provisioner = StorageProvisioner::new(client.as_ref());
            if let Some(metrics) = base.metrics() {
                provisioner = provisioner.with_metrics(metrics);
            }

            let timeout = self.provisioning_timeout();
            tokio::time::timeout(timeout, provisioner.ensure_storage(&collection, self.throughput()))
                .await
                .map_err(|_| ProvisioningError::Timeout(timeout))??;
        } else {
            tracing::debug!(
                bounded_context = %self.bounded_context(),
                collection = %collection,
                "Storage provisioning not requested"
            );
        }

        let bounded_context = self.bounded_context().to_string();
        let client = self.client().cloned();
        let serializer = Arc::clone(base.serializer());
        let store_collection = collection.clone();
        let store_context = bounded_context.clone();

        base.registry().register_singleton(bounded_context.as_str(), move || {
            Arc::new(CosmosEventStore::new(
                store_context.as_str(),
                client.clone(),
                store_collection.clone(),
                Arc::clone(&serializer),
            ))
        })?;

        if let Some(metrics) = base.metrics() {
            metrics.record_registration(&bounded_context);
        }

        tracing::info!(
            bounded_context = %bounded_context,
            collection = %collection,
            throughput = self.throughput().units(),
            "✅ Cosmos event store registered"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cosmos::{
        CollectionSpec, CosmosError, DatabaseLink, DocumentClient, FailureMode, InMemoryDocumentClient,
        ResourceOutcome,
    };
    use crate::event_sourcing::core::JsonSerializer;
    use async_trait::async_trait;
    use std::time::Duration;

    fn context(name: &str, registry: &Arc<EventStoreRegistry>) -> BoundedContextConfig {
        BoundedContextConfig::new(name, registry.clone(), Arc::new(JsonSerializer)).unwrap()
    }

    /// Never answers within any reasonable test timeout.
    #[derive(Debug)]
    struct HangingClient;

    #[async_trait]
    impl DocumentClient for HangingClient {
        async fn create_database_if_not_exists(
            &self,
            _database_id: &str,
        ) -> Result<ResourceOutcome, CosmosError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(ResourceOutcome::Created)
        }

        async fn create_collection_if_not_exists(
            &self,
            _database: &DatabaseLink,
            _spec: &CollectionSpec,
            _offer_throughput: u32,
        ) -> Result<ResourceOutcome, CosmosError> {
            Ok(ResourceOutcome::Created)
        }
    }

    #[test]
    fn test_bounded_context_name_required() {
        let registry = Arc::new(EventStoreRegistry::new());
        let result = BoundedContextConfig::new(" ", registry, Arc::new(JsonSerializer));
        assert!(matches!(result, Err(ConfigError::InvalidArgument { name: "bounded_context", .. })));
    }

    #[tokio::test]
    async fn test_defaults_register_without_provisioning() {
        let registry = Arc::new(EventStoreRegistry::new());

        let base = context("Orders", &registry)
            .use_cosmos_event_store_with_defaults()
            .await
            .unwrap();

        assert_eq!(base.name(), "Orders");
        assert_eq!(registry.len(), 1);

        let store = registry.resolve("Orders").unwrap();
        assert_eq!(store.bounded_context(), "Orders");
        assert_eq!(store.collection().to_string(), "dbs/Elders/colls/EventStore");
        assert!(store.client().is_none());
    }

    #[tokio::test]
    async fn test_connection_without_flag_never_provisions() {
        let registry = Arc::new(EventStoreRegistry::new());
        let client = Arc::new(InMemoryDocumentClient::new());

        let shared = client.clone();
        context("Orders", &registry)
            .use_cosmos_event_store(move |settings| {
                settings.set_document_client(shared);
                Ok(())
            })
            .await
            .unwrap();

        assert_eq!(client.database_calls(), 0);
        assert_eq!(client.collection_calls(), 0);
        assert!(registry.resolve("Orders").unwrap().client().is_some());
    }

    #[tokio::test]
    async fn test_end_to_end_provisions_then_registers() {
        let registry = Arc::new(EventStoreRegistry::new());
        let client = Arc::new(InMemoryDocumentClient::new());

        let shared = client.clone();
        context("Orders", &registry)
            .use_cosmos_event_store(move |settings| {
                settings
                    .set_database_name("Test")?
                    .set_collection_name("Events")?
                    .set_throughput(3000)?
                    .set_document_client(shared)
                    .with_new_storage_if_not_exists();
                Ok(())
            })
            .await
            .unwrap();

        let record = client.collection("Test", "Events").unwrap();
        assert_eq!(record.partition_key_paths, vec!["/i".to_string()]);
        assert_eq!(record.throughput, 3000);

        assert_eq!(registry.keys(), vec!["Orders".to_string()]);
        let store = registry.resolve("Orders").unwrap();
        assert_eq!(store.collection().to_string(), "dbs/Test/colls/Events");
    }

    #[tokio::test]
    async fn test_provisioning_failure_registers_nothing() {
        let registry = Arc::new(EventStoreRegistry::new());
        let client = Arc::new(InMemoryDocumentClient::new().fail_on(FailureMode::CreateCollection));

        let shared = client.clone();
        let result = context("Orders", &registry)
            .use_cosmos_event_store(move |settings| {
                settings.set_document_client(shared).with_new_storage_if_not_exists();
                Ok(())
            })
            .await;

        assert!(matches!(
            result,
            Err(ConfigError::ProvisioningFailure(ProvisioningError::Collection { .. }))
        ));
        assert!(registry.is_empty());
        assert!(!registry.contains("Orders"));
    }

    #[tokio::test]
    async fn test_provisioning_without_connection_fails() {
        let registry = Arc::new(EventStoreRegistry::new());

        let result = context("Orders", &registry)
            .use_cosmos_event_store(|settings| {
                settings.with_new_storage_if_not_exists();
                Ok(())
            })
            .await;

        assert!(matches!(
            result,
            Err(ConfigError::ProvisioningFailure(ProvisioningError::MissingConnection(ref name))) if name == "Orders"
        ));
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_provisioning_timeout_aborts() {
        let registry = Arc::new(EventStoreRegistry::new());

        let result = context("Orders", &registry)
            .use_cosmos_event_store(|settings| {
                settings
                    .set_provisioning_timeout(Duration::from_millis(20))?
                    .set_document_client(Arc::new(HangingClient))
                    .with_new_storage_if_not_exists();
                Ok(())
            })
            .await;

        assert!(matches!(
            result,
            Err(ConfigError::ProvisioningFailure(ProvisioningError::Timeout(_)))
        ));
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_override_aborts_before_finalize() {
        let registry = Arc::new(EventStoreRegistry::new());
        let client = Arc::new(InMemoryDocumentClient::new());

        let shared = client.clone();
        let result = context("Orders", &registry)
            .use_cosmos_event_store(move |settings| {
                settings
                    .set_document_client(shared)
                    .with_new_storage_if_not_exists()
                    .set_throughput(1000)?;
                Ok(())
            })
            .await;

        assert!(matches!(result, Err(ConfigError::InvalidArgument { name: "throughput", .. })));
        assert_eq!(client.database_calls(), 0);
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_profiles_chain_on_shared_registry() {
        let registry = Arc::new(EventStoreRegistry::new());
        let metrics = Arc::new(StoreMetrics::new().unwrap());

        let orders = context("Orders", &registry)
            .with_metrics(metrics.clone())
            .use_cosmos_event_store_with_defaults()
            .await
            .unwrap();
        context("Billing", &registry)
            .with_metrics(metrics.clone())
            .use_cosmos_event_store(|settings| {
                settings.set_collection_name("BillingEvents")?;
                Ok(())
            })
            .await
            .unwrap();

        assert_eq!(orders.name(), "Orders");
        assert_eq!(registry.keys(), vec!["Billing".to_string(), "Orders".to_string()]);
        assert_eq!(
            registry.resolve("Billing").unwrap().collection().to_string(),
            "dbs/Elders/colls/BillingEvents"
        );

        let text = metrics.encode_text().unwrap();
        assert!(text.contains("event_store_registrations_total{bounded_context=\"Orders\"} 1"));
        assert!(text.contains("event_store_registrations_total{bounded_context=\"Billing\"} 1"));
    }
}
