use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, Url};
use serde::Deserialize;
use std::time::Duration;
use uuid::Uuid;

use super::auth::{rfc1123_date, MasterKey};
use super::client::{CollectionSpec, DatabaseLink, DocumentClient, ResourceOutcome};
use super::errors::CosmosError;

// ============================================================================
// REST Document Client
// ============================================================================
//
// Talks to the SQL API over HTTPS with master-key authorization. Creation is
// a POST; a 409 Conflict means the resource is already there.
//
// ============================================================================

const API_VERSION: &str = "2018-12-31";
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Connection handle built from an account endpoint and master key.
#[derive(Debug, Clone)]
pub struct RestDocumentClient {
    endpoint: Url,
    key: MasterKey,
    http: Client,
}

impl RestDocumentClient {
    /// Validate both inputs and build a client. No request is sent.
    pub fn new(endpoint: &str, master_key: &str) -> Result<Self, CosmosError> {
        let http = Client::builder().timeout(DEFAULT_REQUEST_TIMEOUT).build()?;
        Self::with_http_client(endpoint, master_key, http)
    }

    /// Same as [`RestDocumentClient::new`] but sharing an existing connection pool.
    pub fn with_http_client(
        endpoint: &str,
        master_key: &str,
        http: Client,
    ) -> Result<Self, CosmosError> {
        Ok(Self {
            endpoint: parse_endpoint(endpoint)?,
            key: MasterKey::from_base64(master_key)?,
            http,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn create(
        &self,
        path: &str,
        resource_type: &str,
        resource_link: &str,
        body: serde_json::Value,
        offer_throughput: Option<u32>,
    ) -> Result<ResourceOutcome, CosmosError> {
        let url = self
            .endpoint
            .join(path)
            .map_err(|e| CosmosError::InvalidEndpoint(e.to_string()))?;
        let date = rfc1123_date(Utc::now());
        let authorization = self.key.authorization("POST", resource_type, resource_link, &date)?;

        let mut request = self
            .http
            .post(url)
            .header("authorization", authorization)
            .header("x-ms-date", &date)
            .header("x-ms-version", API_VERSION)
            .header("x-ms-activity-id", Uuid::new_v4().to_string())
            .header("accept", "application/json")
            .json(&body);

        if let Some(throughput) = offer_throughput {
            request = request.header("x-ms-offer-throughput", throughput.to_string());
        }

        let response = request.send().await?;
        let status = response.status().as_u16();

        tracing::debug!(
            resource_type = resource_type,
            resource_link = resource_link,
            status = status,
            "Document database create request completed"
        );

        match status {
            200..=299 => Ok(ResourceOutcome::Created),
            409 => Ok(ResourceOutcome::AlreadyExists),
            429 => Err(CosmosError::Throttled),
            404 => Err(CosmosError::NotFound(resource_link.to_string())),
            _ => {
                let text = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<ErrorBody>(&text)
                    .map(|body| body.message)
                    .unwrap_or(text);
                Err(CosmosError::Status { status, message })
            }
        }
    }
}

#[async_trait]
impl DocumentClient for RestDocumentClient {
    async fn create_database_if_not_exists(
        &self,
        database_id: &str,
    ) -> Result<ResourceOutcome, CosmosError> {
        self.create("dbs", "dbs", "", serde_json::json!({ "id": database_id }), None)
            .await
    }

    async fn create_collection_if_not_exists(
        &self,
        database: &DatabaseLink,
        spec: &CollectionSpec,
        offer_throughput: u32,
    ) -> Result<ResourceOutcome, CosmosError> {
        let link = database.to_string();
        let body = serde_json::to_value(spec)
            .map_err(|e| CosmosError::Status { status: 400, message: e.to_string() })?;

        self.create(&format!("{link}/colls"), "colls", &link, body, Some(offer_throughput))
            .await
    }
}

fn parse_endpoint(endpoint: &str) -> Result<Url, CosmosError> {
    let endpoint = endpoint.trim();
    if endpoint.is_empty() {
        return Err(CosmosError::InvalidEndpoint("endpoint is empty".to_string()));
    }

    let mut url = Url::parse(endpoint).map_err(|e| CosmosError::InvalidEndpoint(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(CosmosError::InvalidEndpoint(format!(
            "expected an http(s) account endpoint, got {endpoint}"
        )));
    }

    // Url::join drops the last segment unless the path ends with a slash
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}
