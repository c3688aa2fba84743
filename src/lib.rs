#![doc = include_str!("../README.md")]
#![warn(missing_docs)]
#![warn(clippy::all)]

//! repolens - explain a GitHub repository without reading the code
//!
//! This library fetches a repository's file tree, derives a compact
//! heuristic analysis (tech stack, database hints, directories, route
//! candidates), and asks a configurable language-model backend for a
//! structured explanation. The service is stateless per request; the only
//! engineering beyond sequential glue is a defensive JSON recovery chain
//! and a fixed fallback payload when the model backend misbehaves.
//!
//! ## Usage
//! ```rust,ignore
//! use repolens::{Config, RepoExplainer};
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load()?;
//!     let explainer = RepoExplainer::new(&config)?;
//!     let payload = explainer.explain("https://github.com/acme/widgets").await?;
//!     println!("{}", serde_json::to_string_pretty(&payload)?);
//!     Ok(())
//! }
//! ```

/// Heuristic repository analysis
pub mod analysis;
/// Request/response payloads and the explanation pipeline
pub mod api;
/// Configuration loading and validation
pub mod config;
/// Error handling types and utilities
pub mod error;
/// GitHub API client and repository references
pub mod github;
/// Model backend client, recovery chain, and explanation types
pub mod llm;
/// CLI logging configuration
pub mod logging;
/// Prompt templates
pub mod prompts;

// Re-export common types
pub use analysis::RepoAnalysis;
pub use api::{GenerateRequest, GenerateResponse, RepoExplainer};
pub use config::Config;
pub use error::{Result, ServiceError};
pub use github::{FileNode, GitHubClient, RepoRef};
pub use llm::{ExplanationGenerator, GeneratedExplanation, TextGenerator};
