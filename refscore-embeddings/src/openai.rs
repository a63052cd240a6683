//! OpenAI-compatible embedding model.
//!
//! Talks to `POST {base_url}/embeddings`. Besides the hosted OpenAI API this
//! also covers local sentence-embedding servers that expose the same route
//! (text-embeddings-inference, infinity, vLLM, ...), which is how bare model
//! names such as `all-MiniLM-L6-v2` are served.

use crate::embedding::Embedding;
use crate::error::{EmbeddingError, EmbeddingResult};
use crate::model::{EmbedInput, EmbeddingModel, EmbeddingOutput, EmbeddingSettings};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default endpoint for hosted OpenAI embeddings.
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Default endpoint for a local OpenAI-compatible embedding server.
pub const LOCAL_BASE_URL: &str = "http://localhost:8080/v1";

/// OpenAI-compatible embedding model.
#[derive(Clone)]
pub struct OpenAIEmbeddingModel {
    model_name: String,
    client: Client,
    api_key: Option<String>,
    base_url: String,
    default_dimensions: usize,
}

impl OpenAIEmbeddingModel {
    /// Create a model for the hosted OpenAI API.
    pub fn new(model_name: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::compatible(model_name, OPENAI_BASE_URL).with_api_key(api_key)
    }

    /// Create a model served by any OpenAI-compatible endpoint, without auth.
    pub fn compatible(model_name: impl Into<String>, base_url: impl Into<String>) -> Self {
        let name = model_name.into();
        let dimensions = Self::model_dimensions(&name);

        Self {
            model_name: name,
            client: Client::new(),
            api_key: None,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            default_dimensions: dimensions,
        }
    }

    /// Create from `OPENAI_API_KEY` (required) and `OPENAI_BASE_URL` (optional).
    pub fn from_env(model_name: impl Into<String>) -> EmbeddingResult<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| EmbeddingError::config("OPENAI_API_KEY not set"))?;
        let mut model = Self::new(model_name, api_key);
        if let Ok(url) = std::env::var("OPENAI_BASE_URL") {
            model = model.with_base_url(url);
        }
        Ok(model)
    }

    /// Create a local-server model from `REFSCORE_EMBEDDINGS_URL` and
    /// `REFSCORE_EMBEDDINGS_API_KEY`, both optional.
    pub fn local_from_env(model_name: impl Into<String>) -> Self {
        let base_url =
            std::env::var("REFSCORE_EMBEDDINGS_URL").unwrap_or_else(|_| LOCAL_BASE_URL.to_string());
        let mut model = Self::compatible(model_name, base_url);
        if let Ok(key) = std::env::var("REFSCORE_EMBEDDINGS_API_KEY") {
            model = model.with_api_key(key);
        }
        model
    }

    /// Set the bearer token.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set custom base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set custom HTTP client.
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn model_dimensions(name: &str) -> usize {
        match name {
            "text-embedding-3-small" => 1536,
            "text-embedding-3-large" => 3072,
            "text-embedding-ada-002" => 1536,
            "all-MiniLM-L6-v2" | "sentence-transformers/all-MiniLM-L6-v2" => 384,
            "all-mpnet-base-v2" | "sentence-transformers/all-mpnet-base-v2" => 768,
            _ => 1536,
        }
    }
}

impl std::fmt::Debug for OpenAIEmbeddingModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAIEmbeddingModel")
            .field("model_name", &self.model_name)
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct OpenAIEmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct OpenAIEmbeddingResponse {
    data: Vec<OpenAIEmbeddingData>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIEmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}

#[derive(Debug, Deserialize)]
struct OpenAIUsage {
    total_tokens: u64,
}

#[derive(Debug, Deserialize)]
struct OpenAIErrorResponse {
    error: OpenAIError,
}

#[derive(Debug, Deserialize)]
struct OpenAIError {
    message: String,
}

#[async_trait]
impl EmbeddingModel for OpenAIEmbeddingModel {
    fn name(&self) -> &str {
        &self.model_name
    }

    fn dimensions(&self) -> usize {
        self.default_dimensions
    }

    async fn embed(
        &self,
        input: EmbedInput,
        settings: &EmbeddingSettings,
    ) -> EmbeddingResult<EmbeddingOutput> {
        let texts = input.into_texts();
        if texts.is_empty() {
            return Ok(EmbeddingOutput::new(Vec::new(), &self.model_name));
        }

        let request = OpenAIEmbeddingRequest {
            model: &self.model_name,
            input: &texts,
            dimensions: settings.dimensions,
            user: settings.user.as_deref(),
        };

        debug!(
            model = %self.model_name,
            texts = texts.len(),
            "Requesting embeddings"
        );

        let mut builder = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| EmbeddingError::Api(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();

            if status.as_u16() == 429 {
                return Err(EmbeddingError::RateLimited { retry_after: None });
            }
            if let Ok(error_resp) = serde_json::from_str::<OpenAIErrorResponse>(&body) {
                return Err(EmbeddingError::Api(error_resp.error.message));
            }

            return Err(EmbeddingError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let resp: OpenAIEmbeddingResponse = response
            .json()
            .await
            .map_err(|e| EmbeddingError::Api(e.to_string()))?;

        if resp.data.len() != texts.len() {
            return Err(EmbeddingError::CountMismatch {
                expected: texts.len(),
                actual: resp.data.len(),
            });
        }

        let model = resp.model.unwrap_or_else(|| self.model_name.clone());

        // Providers may return items out of order
        let mut data = resp.data;
        data.sort_by_key(|d| d.index);

        let embeddings = data
            .into_iter()
            .map(|d| {
                Embedding::new(d.embedding)
                    .with_model(&model)
                    .with_index(d.index)
            })
            .collect();

        let mut output = EmbeddingOutput::new(embeddings, model);
        if let Some(usage) = resp.usage {
            output = output.with_tokens(usage.total_tokens);
        }
        Ok(output)
    }
}
