//! Language model trait

use async_trait::async_trait;

use crate::{GenerateRequest, GenerateResponse, Result};

/// Language model interface
///
/// # Example
///
/// ```ignore
/// let llm: Arc<dyn LanguageModel> = Arc::new(GeminiBackend::new(config)?);
/// let request = GenerateRequest::new("You are a music producer")
///     .with_user_message("I want to write about a breakup");
/// let response = llm.generate(request).await?;
/// ```
#[async_trait]
pub trait LanguageModel: Send + Sync + 'static {
    /// Generate one completion
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse>;

    /// Whether the backend has what it needs to serve requests
    async fn is_available(&self) -> bool;

    /// Model name for logging
    fn model_name(&self) -> &str;
}
