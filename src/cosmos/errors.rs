// ============================================================================
// Document Database Errors
// ============================================================================

/// Errors returned by a [`DocumentClient`](super::DocumentClient).
#[derive(Debug, thiserror::Error)]
pub enum CosmosError {
    /// Transport-level failure (DNS, TLS, connection reset, client timeout).
    #[error("document database request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The account rejected the request with 429.
    #[error("document database request throttled")]
    Throttled,

    /// The parent resource of the request does not exist.
    #[error("resource not found: {0}")]
    NotFound(String),

    /// Any other non-success status code.
    #[error("document database returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("invalid master key: {0}")]
    InvalidKey(String),
}

impl CosmosError {
    /// Whether the failure is worth retrying by a caller that owns a retry policy.
    pub fn is_transient(&self) -> bool {
        match self {
            CosmosError::Http(e) => e.is_timeout() || e.is_connect(),
            CosmosError::Throttled => true,
            CosmosError::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(CosmosError::Throttled.is_transient());
        assert!(CosmosError::Status { status: 503, message: "busy".into() }.is_transient());
        assert!(!CosmosError::Status { status: 403, message: "forbidden".into() }.is_transient());
        assert!(!CosmosError::NotFound("dbs/missing".into()).is_transient());
        assert!(!CosmosError::InvalidKey("empty".into()).is_transient());
    }
}
