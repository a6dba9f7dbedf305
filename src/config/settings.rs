use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::cosmos::{
    CollectionLink, CosmosError, DocumentClient, RestDocumentClient, Throughput, MIN_THROUGHPUT,
};

use super::errors::ConfigError;

// ============================================================================
// Cosmos Event Store Settings
// ============================================================================
//
// One instance per configuration profile. Every setter validates before it
// commits, so a rejected value never replaces the previous one and whatever
// reaches finalize is already valid.
//
// ============================================================================

pub const DEFAULT_DATABASE_NAME: &str = "Elders";
pub const DEFAULT_COLLECTION_NAME: &str = "EventStore";
pub const DEFAULT_PROVISIONING_TIMEOUT: Duration = Duration::from_secs(60);

pub struct CosmosEventStoreSettings {
    bounded_context: String,
    database_name: String,
    collection_name: String,
    throughput: Throughput,
    with_new_storage_if_not_exists: bool,
    client: Option<Arc<dyn DocumentClient>>,
    provisioning_timeout: Duration,
}

impl CosmosEventStoreSettings {
    /// Settings seeded with the defaults (`Elders` / `EventStore` / 2500 RU/s,
    /// no provisioning, no connection).
    pub fn new(bounded_context: impl Into<String>) -> Self {
        Self {
            bounded_context: bounded_context.into(),
            database_name: DEFAULT_DATABASE_NAME.to_string(),
            collection_name: DEFAULT_COLLECTION_NAME.to_string(),
            throughput: Throughput::default(),
            with_new_storage_if_not_exists: false,
            client: None,
            provisioning_timeout: DEFAULT_PROVISIONING_TIMEOUT,
        }
    }

    pub fn set_database_name(&mut self, name: impl Into<String>) -> Result<&mut Self, ConfigError> {
        self.database_name = non_blank("database_name", name.into())?;
        Ok(self)
    }

    pub fn set_collection_name(&mut self, name: impl Into<String>) -> Result<&mut Self, ConfigError> {
        self.collection_name = non_blank("collection_name", name.into())?;
        Ok(self)
    }

    pub fn set_throughput(&mut self, units: u32) -> Result<&mut Self, ConfigError> {
        self.throughput = Throughput::new(units).ok_or_else(|| {
            ConfigError::invalid(
                "throughput",
                format!("{units} is below the minimum of {MIN_THROUGHPUT}"),
            )
        })?;
        Ok(self)
    }

    /// Build a REST connection from the account endpoint and master key.
    pub fn set_connection(&mut self, endpoint: &str, master_key: &str) -> Result<&mut Self, ConfigError> {
        let client = RestDocumentClient::new(endpoint, master_key).map_err(|e| match e {
            CosmosError::InvalidKey(reason) => ConfigError::invalid("master_key", reason),
            other => ConfigError::invalid("endpoint", other.to_string()),
        })?;

        tracing::debug!(
            bounded_context = %self.bounded_context,
            endpoint = %client.endpoint(),
            "Document database connection configured"
        );

        self.client = Some(Arc::new(client));
        Ok(self)
    }

    /// Use an already constructed connection.
    pub fn set_document_client(&mut self, client: Arc<dyn DocumentClient>) -> &mut Self {
        self.client = Some(client);
        self
    }

    /// Create the database and collection during finalize if they are missing.
    pub fn with_new_storage_if_not_exists(&mut self) -> &mut Self {
        self.with_new_storage_if_not_exists = true;
        self
    }

    /// Upper bound on how long finalize waits for provisioning.
    pub fn set_provisioning_timeout(&mut self, timeout: Duration) -> Result<&mut Self, ConfigError> {
        if timeout.is_zero() {
            return Err(ConfigError::invalid("provisioning_timeout", "must be greater than zero"));
        }
        self.provisioning_timeout = timeout;
        Ok(self)
    }

    pub fn bounded_context(&self) -> &str {
        &self.bounded_context
    }

    pub fn database_name(&self) -> &str {
        &self.database_name
    }

    pub fn collection_name(&self) -> &str {
        &self.collection_name
    }

    pub fn throughput(&self) -> Throughput {
        self.throughput
    }

    pub fn new_storage_if_not_exists(&self) -> bool {
        self.with_new_storage_if_not_exists
    }

    pub fn client(&self) -> Option<&Arc<dyn DocumentClient>> {
        self.client.as_ref()
    }

    pub fn provisioning_timeout(&self) -> Duration {
        self.provisioning_timeout
    }

    pub fn collection_link(&self) -> CollectionLink {
        CollectionLink::new(&self.database_name, &self.collection_name)
    }
}

impl fmt::Debug for CosmosEventStoreSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CosmosEventStoreSettings")
            .field("bounded_context", &self.bounded_context)
            .field("database_name", &self.database_name)
            .field("collection_name", &self.collection_name)
            .field("throughput", &self.throughput)
            .field("with_new_storage_if_not_exists", &self.with_new_storage_if_not_exists)
            .field("client", &self.client)
            .field("provisioning_timeout", &self.provisioning_timeout)
            .finish()
    }
}

fn non_blank(name: &'static str, value: String) -> Result<String, ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::invalid(name, "cannot be empty or whitespace"));
    }
    Ok(value)
}
