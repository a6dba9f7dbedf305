use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use super::errors::ConfigError;
use super::settings::CosmosEventStoreSettings;

// ============================================================================
// Externally Loaded Options
// ============================================================================
//
// Optional overrides read from JSON or the environment. Applying them goes
// through the same validated setters as code-level configuration.
//
// ============================================================================

pub const ENV_PREFIX: &str = "COSMOS_EVENT_STORE_";

#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreOptions {
    pub database_name: Option<String>,
    pub collection_name: Option<String>,
    pub throughput: Option<u32>,
    pub endpoint: Option<String>,
    /// Account master key. Redacted in `Debug`.
    pub master_key: Option<String>,
    pub with_new_storage_if_not_exists: bool,
    pub provisioning_timeout_secs: Option<u64>,
}

impl fmt::Debug for StoreOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreOptions")
            .field("database_name", &self.database_name)
            .field("collection_name", &self.collection_name)
            .field("throughput", &self.throughput)
            .field("endpoint", &self.endpoint)
            .field("master_key", &self.master_key.as_ref().map(|_| "[REDACTED]"))
            .field("with_new_storage_if_not_exists", &self.with_new_storage_if_not_exists)
            .field("provisioning_timeout_secs", &self.provisioning_timeout_secs)
            .finish()
    }
}

impl StoreOptions {
    /// Read `COSMOS_EVENT_STORE_*` variables from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read options through `lookup`, which receives full variable names.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |suffix: &str| {
            lookup(&format!("{ENV_PREFIX}{suffix}")).filter(|value| !value.trim().is_empty())
        };

        let throughput = var("THROUGHPUT")
            .map(|raw| {
                raw.trim()
                    .parse::<u32>()
                    .map_err(|e| ConfigError::invalid("throughput", format!("{raw:?}: {e}")))
            })
            .transpose()?;

        let provisioning_timeout_secs = var("PROVISIONING_TIMEOUT_SECS")
            .map(|raw| {
                raw.trim().parse::<u64>().map_err(|e| {
                    ConfigError::invalid("provisioning_timeout", format!("{raw:?}: {e}"))
                })
            })
            .transpose()?;

        let with_new_storage_if_not_exists = match var("PROVISION") {
            None => false,
            Some(raw) => parse_flag(&raw)
                .ok_or_else(|| ConfigError::invalid("with_new_storage_if_not_exists", format!("{raw:?} is not a boolean")))?,
        };

        Ok(Self {
            database_name: var("DATABASE"),
            collection_name: var("COLLECTION"),
            throughput,
            endpoint: var("ENDPOINT"),
            master_key: var("MASTER_KEY"),
            with_new_storage_if_not_exists,
            provisioning_timeout_secs,
        })
    }

    /// Apply every option that is present to `settings`.
    pub fn apply<'a>(
        &self,
        settings: &'a mut CosmosEventStoreSettings,
    ) -> Result<&'a mut CosmosEventStoreSettings, ConfigError> {
        if let Some(name) = &self.database_name {
            settings.set_database_name(name.as_str())?;
        }
        if let Some(name) = &self.collection_name {
            settings.set_collection_name(name.as_str())?;
        }
        if let Some(units) = self.throughput {
            settings.set_throughput(units)?;
        }

        match (&self.endpoint, &self.master_key) {
            (Some(endpoint), Some(key)) => {
                settings.set_connection(endpoint, key)?;
            }
            (None, None) => {}
            _ => {
                return Err(ConfigError::invalid(
                    "connection",
                    "endpoint and master key must be set together",
                ))
            }
        }

        if let Some(secs) = self.provisioning_timeout_secs {
            settings.set_provisioning_timeout(Duration::from_secs(secs))?;
        }
        if self.with_new_storage_if_not_exists {
            settings.with_new_storage_if_not_exists();
        }

        Ok(settings)
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
