use crate::config::StoreConfig;
use crate::model::{NameRecord, NewName};
use reqwest::Method;
use serde::Deserialize;
use thiserror::Error;

/// Failures talking to the hosted store. The `Display` strings are surfaced
/// to the user as-is.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Network connection error. Please check your internet connection and try again.")]
    Network,
    #[error("{0}")]
    Remote(String),
    #[error("No names available in the database.")]
    NoNames,
}

/// Error body shape returned by the store.
#[derive(Debug, Default, Deserialize)]
struct RemoteErrorBody {
    #[serde(default)]
    message: String,
}

/// Client for the hosted names store. Cheap to clone; clones share the
/// underlying connection pool.
#[derive(Debug, Clone)]
pub struct NameStore {
    http: reqwest::Client,
    endpoint: String,
    anon_key: String,
    table: String,
    random_rpc: String,
}

impl NameStore {
    pub fn new(cfg: &StoreConfig) -> anyhow::Result<Self> {
        // No request timeout: a slow call stays in flight until the store
        // answers or the transport gives up.
        let http = reqwest::Client::builder().build()?;
        Ok(NameStore {
            http,
            endpoint: cfg.normalized_endpoint(),
            anon_key: cfg.anon_key.clone(),
            table: cfg.table.clone(),
            random_rpc: cfg.random_rpc.clone(),
        })
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/rest/v1/{}", self.endpoint, path);
        self.http
            .request(method, url)
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
    }

    /// One read-only existence check against the names table.
    pub async fn probe(&self) -> Result<(), StoreError> {
        let response = self
            .request(Method::GET, &self.table)
            .query(&[("select", "count")])
            .send()
            .await
            .map_err(transport_error)?;
        ensure_success(response).await?;
        Ok(())
    }

    /// Ask the store for one randomly chosen record.
    pub async fn random_name(&self) -> Result<NameRecord, StoreError> {
        let response = self
            .request(Method::POST, &format!("rpc/{}", self.random_rpc))
            .json(&serde_json::json!({}))
            .send()
            .await
            .map_err(transport_error)?;
        let response = ensure_success(response).await?;

        // The procedure returns a set of zero or one rows.
        let rows: Vec<NameRecord> = response.json().await.map_err(transport_error)?;
        rows.into_iter().next().ok_or(StoreError::NoNames)
    }

    /// Insert a single new entry.
    pub async fn insert_name(&self, entry: &NewName) -> Result<(), StoreError> {
        let response = self
            .request(Method::POST, &self.table)
            .header("Prefer", "return=minimal")
            .json(&[entry])
            .send()
            .await
            .map_err(transport_error)?;
        ensure_success(response).await?;
        Ok(())
    }
}

/// Map non-2xx responses to store errors. Remote messages that name the
/// connection collapse into the network variant.
async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body: RemoteErrorBody = response.json().await.unwrap_or_default();
    tracing::error!("store returned {}: {}", status, body.message);
    if body.message.to_ascii_lowercase().contains("connection") {
        return Err(StoreError::Network);
    }
    Err(StoreError::Remote(body.message))
}

fn transport_error(err: reqwest::Error) -> StoreError {
    tracing::error!("store request failed: {}", err);
    StoreError::Network
}
