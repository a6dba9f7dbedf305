use crate::event_sourcing::store::ProvisioningError;
use crate::registry::RegistryError;

// ============================================================================
// Configuration Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A setter rejected its input. The previous value is kept.
    #[error("invalid argument `{name}`: {reason}")]
    InvalidArgument { name: &'static str, reason: String },

    /// Storage could not be provisioned; nothing was registered.
    #[error("event store provisioning failed: {0}")]
    ProvisioningFailure(#[from] ProvisioningError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl ConfigError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidArgument {
            name,
            reason: reason.into(),
        }
    }
}
