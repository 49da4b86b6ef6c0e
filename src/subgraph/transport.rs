use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;

use crate::models::{EngineError, Result};

#[derive(Debug, Clone, Serialize)]
pub struct GraphqlRequest {
    pub query: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GraphqlResponse {
    #[serde(default)]
    pub data: Option<Map<String, Value>>,
    #[serde(default)]
    pub errors: Option<Vec<GraphqlError>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphqlError {
    pub message: String,
}

/// Raw HTTP reply; status and payload checks happen in the subgraph client.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GraphqlTransport: Send + Sync {
    async fn post(&self, endpoint: &str, request: &GraphqlRequest) -> Result<TransportResponse>;
}

pub struct HttpTransport {
    http_client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EngineError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { http_client })
    }
}

#[async_trait]
impl GraphqlTransport for HttpTransport {
    async fn post(&self, endpoint: &str, request: &GraphqlRequest) -> Result<TransportResponse> {
        let response = self.http_client.post(endpoint).json(request).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(TransportResponse { status, body })
    }
}
