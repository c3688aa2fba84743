//! Request/response payloads and the explanation pipeline
//!
//! `RepoExplainer` owns the two outbound clients for the life of the
//! process and runs the per-request pipeline: parse the URL, analyze the
//! repository, generate the explanation, assemble the combined payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use url::Url;
use uuid::Uuid;

use crate::analysis;
use crate::config::Config;
use crate::error::{Result, ServiceError};
use crate::github::{GitHubClient, RepoRef};
use crate::llm::{ExplanationGenerator, GeneratedExplanation};

/// Request payload for explaining a repository
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// The repository URL to explain
    pub url: String,
}

/// Counters describing the analyzed tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisStats {
    /// Number of tree paths carried into the analysis
    pub files: usize,
}

/// Compact heuristic-analysis block merged into the response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisSummary {
    /// Detected tech-stack tags
    pub stack: Vec<String>,
    /// Database hints
    pub database: Vec<String>,
    /// Tree counters
    pub stats: AnalysisStats,
}

/// Combined response: analysis summary plus the generated explanation,
/// flattened to the top level
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// Heuristic analysis block
    pub analysis: AnalysisSummary,
    /// The generated explanation fields, flattened
    #[serde(flatten)]
    pub explanation: GeneratedExplanation,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service name
    pub service: String,
    /// Service version
    pub version: String,
    /// Current status
    pub status: String,
    /// Current timestamp
    pub timestamp: DateTime<Utc>,
    /// Service uptime in seconds
    pub uptime: u64,
}

/// Process-wide pipeline over injected API clients
pub struct RepoExplainer {
    github: GitHubClient,
    generator: ExplanationGenerator,
    start_time: DateTime<Utc>,
}

impl RepoExplainer {
    /// Builds the pipeline from configuration
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self::with_parts(
            GitHubClient::new(config)?,
            ExplanationGenerator::from_config(config)?,
        ))
    }

    /// Builds the pipeline from already-constructed parts
    pub fn with_parts(github: GitHubClient, generator: ExplanationGenerator) -> Self {
        Self {
            github,
            generator,
            start_time: Utc::now(),
        }
    }

    /// Runs the full pipeline for one repository URL.
    ///
    /// Input that is not a URL or not a repository reference fails with a
    /// validation error before any outbound call. A fetch failure fails
    /// the request; a model failure does not (the fallback explanation is
    /// merged with the real analysis block instead).
    pub async fn explain(&self, raw_url: &str) -> Result<GenerateResponse> {
        let url = Url::parse(raw_url)
            .map_err(|_| ServiceError::Validation("Invalid input".to_string()))?;
        let repo = RepoRef::from_url(&url)
            .ok_or_else(|| ServiceError::Validation("Invalid GitHub URL".to_string()))?;

        let request_id = Uuid::new_v4();
        info!("[{}] Analyzing {}...", request_id, repo);
        let analysis = analysis::analyze_repository(&self.github, &repo).await?;

        info!("[{}] Generating explanation for {}...", request_id, repo);
        let explanation = self.generator.generate(&repo, &analysis).await;

        Ok(GenerateResponse {
            analysis: AnalysisSummary {
                stack: analysis.tech_stack.clone(),
                database: analysis.database_hints.clone(),
                stats: AnalysisStats {
                    files: analysis.file_tree.len(),
                },
            },
            explanation,
        })
    }

    /// Current service health information
    pub fn health(&self) -> HealthResponse {
        HealthResponse {
            service: "repolens".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            status: "healthy".to_string(),
            timestamp: Utc::now(),
            uptime: (Utc::now() - self.start_time).num_seconds() as u64,
        }
    }
}
