//! Remote entity service.
//!
//! [`Remote`] is the seam between the optimistic client and the network.
//! [`HttpRemote`] speaks the server's `/entities/{kind}` endpoints.

use async_trait::async_trait;
use paddock_engine::JsonRecord;
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::env;

use crate::error::{ClientError, Result};

/// Create, update, delete, and list records of an entity kind.
#[async_trait]
pub trait Remote: Send + Sync {
    async fn list(&self, kind: &str) -> Result<Vec<JsonRecord>>;

    /// Persist a draft and return the server's record with its real id.
    async fn create(&self, kind: &str, draft: &Map<String, Value>) -> Result<JsonRecord>;

    async fn update(&self, kind: &str, id: &str, patch: &Map<String, Value>) -> Result<JsonRecord>;

    async fn delete(&self, kind: &str, id: &str) -> Result<()>;
}

/// Error body returned by the server.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
    #[serde(default)]
    details: Option<String>,
}

/// [`Remote`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpRemote {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRemote {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    /// Read the server address from `PADDOCK_SERVER_URL`.
    pub fn from_env() -> Result<Self> {
        let base_url = env::var("PADDOCK_SERVER_URL")
            .map_err(|_| ClientError::MissingConfig("PADDOCK_SERVER_URL"))?;
        Ok(Self::new(base_url))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self, kind: &str) -> String {
        format!("{}/entities/{}", self.base_url, kind)
    }

    fn record_url(&self, kind: &str, id: &str) -> String {
        format!("{}/entities/{}/{}", self.base_url, kind, id)
    }
}

/// Turn a non-2xx response into [`ClientError::Status`].
async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    Err(ClientError::Status {
        status,
        message: error_message(status, &text),
    })
}

fn error_message(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody {
            error,
            details: Some(details),
        }) => format!("{}: {}", error, details),
        Ok(ErrorBody { error, .. }) => error,
        Err(_) if !body.is_empty() => body.to_string(),
        Err(_) => status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string(),
    }
}

#[async_trait]
impl Remote for HttpRemote {
    async fn list(&self, kind: &str) -> Result<Vec<JsonRecord>> {
        let response = self.client.get(self.collection_url(kind)).send().await?;
        Ok(check(response).await?.json().await?)
    }

    async fn create(&self, kind: &str, draft: &Map<String, Value>) -> Result<JsonRecord> {
        let response = self
            .client
            .post(self.collection_url(kind))
            .json(draft)
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    async fn update(&self, kind: &str, id: &str, patch: &Map<String, Value>) -> Result<JsonRecord> {
        let response = self
            .client
            .patch(self.record_url(kind, id))
            .json(patch)
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    async fn delete(&self, kind: &str, id: &str) -> Result<()> {
        let response = self.client.delete(self.record_url(kind, id)).send().await?;
        check(response).await?;
        Ok(())
    }
}
