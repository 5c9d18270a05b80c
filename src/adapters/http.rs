use crate::domain::model::{ChatRequest, ChatResponse, ExplainRequest, Explanation, HealthStatus};
use crate::domain::ports::ExplainBackend;
use crate::utils::error::{ExplainError, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

const EXPLAIN_PATH: &str = "explain";
const CHAT_PATH: &str = "chat";
const HEALTH_PATH: &str = "health";

// Error bodies are only logged; keep them short.
const MAX_ERROR_BODY: usize = 200;

#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: Url,
}

impl HttpBackend {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::build(base_url, None)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        Self::build(base_url, Some(timeout))
    }

    fn build(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        crate::utils::validation::validate_backend_url("endpoint", base_url)?;
        let mut base_url = Url::parse(base_url).map_err(|e| ExplainError::ConfigError {
            message: format!("invalid endpoint '{}': {}", base_url, e),
        })?;
        // Url::join drops the last segment unless the path ends in '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| ExplainError::ConfigError {
                message: format!("cannot build URL for '{}': {}", path, e),
            })
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        tracing::debug!("Backend response status: {}", status);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExplainError::StatusError {
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY).collect(),
            });
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl ExplainBackend for HttpBackend {
    async fn explain(&self, request: &ExplainRequest) -> Result<Explanation> {
        let url = self.endpoint(EXPLAIN_PATH)?;
        tracing::debug!("POST {} ({} bytes of {})", url, request.code.len(), request.language);
        let response = self.client.post(url).json(request).send().await?;
        Self::decode(response).await
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let url = self.endpoint(CHAT_PATH)?;
        tracing::debug!("POST {}", url);
        let response = self.client.post(url).json(request).send().await?;
        Self::decode(response).await
    }

    async fn health(&self) -> Result<bool> {
        let url = self.endpoint(HEALTH_PATH)?;
        tracing::debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        let status: HealthStatus = Self::decode(response).await?;
        Ok(status.ok)
    }
}
