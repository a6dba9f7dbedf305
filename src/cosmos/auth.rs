use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use sha2::Sha256;
use std::fmt;

use super::errors::CosmosError;

type HmacSha256 = Hmac<Sha256>;

// ============================================================================
// Master Key Authorization
// ============================================================================
//
// Every REST call carries an `authorization` header holding a URL-encoded
// `type=master&ver=1.0&sig=...` token. The signature is an HMAC-SHA256 over
//
//     verb \n resourceType \n resourceLink \n date \n \n
//
// with verb, resource type and date lower-cased, keyed by the decoded
// account key.
//
// ============================================================================

/// Decoded account master key. Redacted in `Debug`.
#[derive(Clone)]
pub struct MasterKey {
    key: Vec<u8>,
}

impl MasterKey {
    /// Decode a base64 account key as shown in the portal.
    pub fn from_base64(encoded: &str) -> Result<Self, CosmosError> {
        let encoded = encoded.trim();
        if encoded.is_empty() {
            return Err(CosmosError::InvalidKey("master key is empty".to_string()));
        }

        let key = STANDARD
            .decode(encoded)
            .map_err(|e| CosmosError::InvalidKey(format!("master key is not valid base64: {e}")))?;

        if key.is_empty() {
            return Err(CosmosError::InvalidKey("master key decodes to zero bytes".to_string()));
        }

        Ok(Self { key })
    }

    /// Build the value of the `authorization` header for one request.
    pub fn authorization(
        &self,
        verb: &str,
        resource_type: &str,
        resource_link: &str,
        date: &str,
    ) -> Result<String, CosmosError> {
        let payload = format!(
            "{}\n{}\n{}\n{}\n\n",
            verb.to_lowercase(),
            resource_type.to_lowercase(),
            resource_link,
            date.to_lowercase()
        );

        let mut mac = HmacSha256::new_from_slice(&self.key)
            .map_err(|e| CosmosError::InvalidKey(format!("invalid HMAC key: {e}")))?;
        mac.update(payload.as_bytes());
        let signature = STANDARD.encode(mac.finalize().into_bytes());

        let token = format!("type=master&ver=1.0&sig={signature}");
        Ok(utf8_percent_encode(&token, NON_ALPHANUMERIC).to_string())
    }
}

impl fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MasterKey").field("key", &"[REDACTED]").finish()
    }
}

/// `x-ms-date` value, e.g. `Tue, 01 Jan 2019 00:00:00 GMT`.
pub fn rfc1123_date(now: DateTime<Utc>) -> String {
    now.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}
