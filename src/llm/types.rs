//! Generated-explanation schema
//!
//! The explanation originates from free-text generation, so every field is
//! optional with an explicit default: recovered JSON is coerced at this
//! boundary rather than trusted to be internally consistent.

use serde::{Deserialize, Serialize};

/// Structured explanation of a repository as produced by the model backend
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeneratedExplanation {
    /// What the project is
    pub project_info: ProjectInfo,
    /// How the code is organized
    pub structure: StructureOverview,
    /// Key pages and API endpoints
    pub routes: Vec<RouteDoc>,
    /// Features, prerequisites, and deployment notes
    pub implementation: ImplementationNotes,
}

/// Name, purpose, and classification of the project
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectInfo {
    /// Inferred project name
    pub name: String,
    /// One-line summary
    pub purpose: String,
    /// Longer description of features and goals
    pub description: String,
    /// Free-form classification, e.g. "Web App" or "CLI"
    #[serde(rename = "type")]
    pub kind: String,
}

/// High-level code organization
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StructureOverview {
    /// Overview of the layout
    pub summary: String,
    /// Per-directory descriptions
    pub directories: Vec<DirectoryDoc>,
}

/// One described directory
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DirectoryDoc {
    /// Directory name
    pub name: String,
    /// What it holds
    pub description: String,
}

/// One described page or endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RouteDoc {
    /// Route path, e.g. "/api/users"
    pub path: String,
    /// "frontend" or "backend" by convention; not validated
    #[serde(rename = "type")]
    pub kind: String,
    /// Inferred purpose
    pub description: String,
    /// Source file defining the route
    pub file: String,
}

/// Implementation and operations notes
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImplementationNotes {
    /// Feature list
    pub features: Vec<String>,
    /// Inferred prerequisites (runtimes, API keys)
    pub prerequisites: Vec<String>,
    /// Deployment summary
    pub deployment: String,
}

impl GeneratedExplanation {
    /// Fixed degraded explanation substituted when the backend cannot be
    /// reached or its output cannot be recovered. Always well-formed so
    /// downstream consumers never see a model outage as a hard failure.
    pub fn fallback() -> Self {
        Self {
            project_info: ProjectInfo {
                name: "Error".to_string(),
                purpose: "Failed to analyze".to_string(),
                description: "Could not generate explanation.".to_string(),
                kind: "Unknown".to_string(),
            },
            structure: StructureOverview {
                summary: "N/A".to_string(),
                directories: Vec::new(),
            },
            routes: Vec::new(),
            implementation: ImplementationNotes {
                features: vec!["Analysis Failed".to_string()],
                prerequisites: Vec::new(),
                deployment: "Unknown".to_string(),
            },
        }
    }

    /// Whether this is the fixed fallback payload
    pub fn is_fallback(&self) -> bool {
        self.project_info.name == "Error"
    }
}
