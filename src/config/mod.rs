// ============================================================================
// Event Store Configuration
// ============================================================================
//
// - settings: validated per-profile settings
// - options:  overrides loaded from JSON or the environment
// - builder:  the configure → provision → register entry point
//
// ============================================================================

pub mod builder;
pub mod errors;
pub mod options;
pub mod settings;

pub use builder::BoundedContextConfig;
pub use errors::ConfigError;
pub use options::{StoreOptions, ENV_PREFIX};
pub use settings::{
    CosmosEventStoreSettings, DEFAULT_COLLECTION_NAME, DEFAULT_DATABASE_NAME,
    DEFAULT_PROVISIONING_TIMEOUT,
};
