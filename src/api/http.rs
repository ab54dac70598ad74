//! HTTP backend client.
//!
//! Implements the Backend trait over reqwest against the configured base URL.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

use super::types::{extract_detail, AiResponse, Endpoint, QueryRequest, QueryResult};
use super::Backend;
use crate::config::ApiConfig;
use crate::error::{DeskError, Result};

/// Backend reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    /// Creates a client for the given API configuration.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let base_url = config.normalized_base_url()?;

        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| DeskError::internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, base_url })
    }

    /// Returns the normalized base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint_url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }

    /// Posts `{"query": ...}` to an endpoint and decodes the success body.
    async fn post<T: DeserializeOwned>(&self, endpoint: Endpoint, query: &str) -> Result<T> {
        let url = self.endpoint_url(endpoint);
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .json(&QueryRequest { query })
            .send()
            .await
            .map_err(|e| DeskError::transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message =
                extract_detail(&body).unwrap_or_else(|| endpoint.fallback_message().to_string());
            warn!("{} returned {}: {}", endpoint.path(), status, message);
            return Err(DeskError::backend(message));
        }

        response.json::<T>().await.map_err(|e| {
            DeskError::decode(format!(
                "Unexpected response from {}: {e}",
                endpoint.path()
            ))
        })
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn run_query(&self, query: &str) -> Result<QueryResult> {
        self.post(Endpoint::RunQuery, query).await
    }

    async fn ask_ai(&self, question: &str) -> Result<AiResponse> {
        self.post(Endpoint::AskAi, question).await
    }

    fn describe(&self) -> String {
        self.base_url.clone()
    }
}
