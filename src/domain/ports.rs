use crate::domain::model::{ChatRequest, ChatResponse, ExplainRequest, Explanation};
use crate::utils::error::Result;
use async_trait::async_trait;

/// The remote explanation service.
#[async_trait]
pub trait ExplainBackend: Send + Sync {
    async fn explain(&self, request: &ExplainRequest) -> Result<Explanation>;
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse>;
    async fn health(&self) -> Result<bool>;
}
