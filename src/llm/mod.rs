//! Model backend client and explanation generation
//!
//! "Compose a prompt and call a text-generation backend" is a single
//! interface here; the concrete backend is selected by configuration. The
//! contract is deliberately thin: submit one prompt, receive one text blob.

pub mod recovery;
pub mod types;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{error, warn};

use crate::analysis::RepoAnalysis;
use crate::config::Config;
use crate::error::{Result, ServiceError};
use crate::github::RepoRef;
use crate::prompts;

pub use types::{
    DirectoryDoc, GeneratedExplanation, ImplementationNotes, ProjectInfo, RouteDoc,
    StructureOverview,
};

const API_TIMEOUT_SECS: u64 = 30;

/// A text-generation backend: one prompt in, one completion out
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Submits a system/user prompt pair and returns the completion text
    async fn complete(&self, system: &str, prompt: &str) -> Result<String>;
}

/// Chat-completions backend client
///
/// Speaks the widely-implemented `POST <base>/chat/completions` shape, so
/// hosted and local backends are interchangeable through configuration.
pub struct ChatCompletionsClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl ChatCompletionsClient {
    /// Creates a client from the configured endpoint, model, and credential
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(API_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: config.llm_base_url.trim_end_matches('/').to_string(),
            model: config.llm_model.clone(),
            api_key: config.llm_api_key.clone(),
        })
    }
}

#[async_trait]
impl TextGenerator for ChatCompletionsClient {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String> {
        let mut request = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .json(&json!({
                "model": self.model,
                "messages": [
                    {"role": "system", "content": system},
                    {"role": "user", "content": prompt}
                ],
                "temperature": 0.2
            }));
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ServiceError::Llm(format!("completion request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(ServiceError::Llm(format!(
                "completion request failed: HTTP {}",
                response.status()
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ServiceError::Llm(format!("unreadable completion response: {}", e)))?;

        body["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| ServiceError::Llm("completion response missing content".to_string()))
    }
}

/// Turns a repository analysis into a generated explanation
pub struct ExplanationGenerator {
    backend: Arc<dyn TextGenerator>,
}

impl ExplanationGenerator {
    /// Wraps an already-constructed backend
    pub fn new(backend: Arc<dyn TextGenerator>) -> Self {
        Self { backend }
    }

    /// Builds the configured chat-completions backend
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(Arc::new(ChatCompletionsClient::new(config)?)))
    }

    /// Composes the prompt, calls the backend, and recovers the reply.
    ///
    /// This never fails: a backend error or an unrecoverable response
    /// substitutes the fixed fallback explanation, and the caller still
    /// gets a well-formed payload.
    pub async fn generate(&self, repo: &RepoRef, analysis: &RepoAnalysis) -> GeneratedExplanation {
        let prompt = prompts::explanation_prompt(analysis);

        let text = match self
            .backend
            .complete(prompts::EXPLANATION_SYSTEM, &prompt)
            .await
        {
            Ok(text) => text,
            Err(e) => {
                error!("Explanation generation failed for {}: {}", repo, e);
                return GeneratedExplanation::fallback();
            }
        };

        match recovery::recover_json(&text)
            .and_then(|value| serde_json::from_value::<GeneratedExplanation>(value).ok())
        {
            Some(explanation) => explanation,
            None => {
                warn!("Unrecoverable model response for {}", repo);
                GeneratedExplanation::fallback()
            }
        }
    }
}
