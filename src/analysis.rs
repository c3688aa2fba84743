//! Heuristic repository analysis
//!
//! Reduces a raw tree listing plus a couple of key files into a compact
//! analysis object. Everything here is string and path matching; no real
//! parsing of the underlying languages is attempted.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::error::Result;
use crate::github::{FileNode, GitHubClient, NodeKind, RepoRef};

/// Maximum number of tree paths carried into the analysis
const FILE_TREE_LIMIT: usize = 300;

/// Fixed dependency-name to tech-stack tag table, checked against the
/// manifest's merged production and development dependencies
const TECH_STACK_TAGS: &[(&str, &str)] = &[
    // Frameworks
    ("next", "Next.js"),
    ("react", "React"),
    ("vue", "Vue"),
    ("svelte", "Svelte"),
    ("express", "Express"),
    ("nestjs", "NestJS"),
    ("@angular/core", "Angular"),
    // CSS
    ("tailwindcss", "TailwindCSS"),
    // DB
    ("prisma", "Prisma"),
    ("mongoose", "Mongoose"),
    ("pg", "PostgreSQL"),
    ("mysql2", "MySQL"),
];

static ROUTE_FILE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/(page|route|layout)\.(tsx|ts|jsx|js)$").unwrap());

static PRISMA_MODEL: Lazy<Regex> = Lazy::new(|| Regex::new(r"model\s+\w+").unwrap());

/// Compact analysis of one repository, consumed by the prompt composer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoAnalysis {
    /// Tree paths in source order, capped at [`FILE_TREE_LIMIT`]
    pub file_tree: Vec<String>,
    /// The parsed manifest file, or an empty object when absent/unreadable
    pub raw_manifest: Value,
    /// Tech-stack tags, no duplicates, table order
    pub tech_stack: Vec<String>,
    /// Schema location plus any declared model names
    pub database_hints: Vec<String>,
    /// Top-level directory names, dotted names excluded
    pub top_level_directories: Vec<String>,
    /// Paths that look like page or API route definitions, tree order
    pub route_candidates: Vec<String>,
}

/// Fetches a repository's tree and key files, then analyzes them.
///
/// The manifest and schema contents are fetched concurrently; a missing or
/// unreadable key file degrades the analysis instead of failing it.
pub async fn analyze_repository(client: &GitHubClient, repo: &RepoRef) -> Result<RepoAnalysis> {
    let tree = client.fetch_tree(repo).await?;

    let manifest_path = tree
        .iter()
        .find(|n| n.path.ends_with("package.json"))
        .map(|n| n.path.clone());
    let schema_path = tree
        .iter()
        .find(|n| n.path.contains("schema.prisma") || n.path.contains("schema.sql"))
        .map(|n| n.path.clone());

    let (manifest_text, schema_text) = tokio::join!(
        async {
            match &manifest_path {
                Some(path) => client.fetch_file_content(repo, path).await,
                None => "{}".to_string(),
            }
        },
        async {
            match &schema_path {
                Some(path) => client.fetch_file_content(repo, path).await,
                None => String::new(),
            }
        },
    );

    Ok(analyze_tree(
        &tree,
        &manifest_text,
        schema_path.as_deref(),
        &schema_text,
    ))
}

/// Derives the analysis from already-fetched inputs
pub fn analyze_tree(
    tree: &[FileNode],
    manifest_text: &str,
    schema_path: Option<&str>,
    schema_text: &str,
) -> RepoAnalysis {
    let paths: Vec<String> = tree.iter().map(|n| n.path.clone()).collect();

    let raw_manifest: Value = match serde_json::from_str(manifest_text) {
        Ok(value) => value,
        Err(e) => {
            warn!("Failed to parse manifest file: {}", e);
            Value::Object(Default::default())
        }
    };

    let tech_stack = detect_tech_stack(&raw_manifest);
    let database_hints = database_hints(schema_path, schema_text);

    let top_level_directories: Vec<String> = tree
        .iter()
        .filter(|n| n.kind == NodeKind::Tree && !n.path.contains('/') && !n.path.starts_with('.'))
        .map(|n| n.path.clone())
        .collect();

    let route_candidates: Vec<String> = paths
        .iter()
        .filter(|p| ROUTE_FILE.is_match(p) || p.starts_with("pages/"))
        .cloned()
        .collect();

    let mut file_tree = paths;
    file_tree.truncate(FILE_TREE_LIMIT);

    RepoAnalysis {
        file_tree,
        raw_manifest,
        tech_stack,
        database_hints,
        top_level_directories,
        route_candidates,
    }
}

/// Looks up tech-stack tags for the manifest's declared dependencies.
/// Production and development dependencies are merged before the lookup.
pub fn detect_tech_stack(manifest: &Value) -> Vec<String> {
    let mut declared: HashSet<&str> = HashSet::new();
    for section in ["dependencies", "devDependencies"] {
        if let Some(deps) = manifest.get(section).and_then(Value::as_object) {
            declared.extend(deps.keys().map(String::as_str));
        }
    }

    let mut tags = Vec::new();
    for (dependency, tag) in TECH_STACK_TAGS {
        if declared.contains(dependency) && !tags.contains(&tag.to_string()) {
            tags.push(tag.to_string());
        }
    }
    tags
}

/// Best-effort database hints: the schema file location plus, for Prisma
/// schemas, the `model <Name>` declarations found by pattern match
pub fn database_hints(schema_path: Option<&str>, schema_text: &str) -> Vec<String> {
    let mut hints = Vec::new();
    if let Some(path) = schema_path {
        hints.push(format!("Schema file found at: {}", path));
        if path.ends_with(".prisma") {
            hints.extend(
                PRISMA_MODEL
                    .find_iter(schema_text)
                    .map(|m| m.as_str().to_string()),
            );
        }
    }
    hints
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn blob(path: &str) -> FileNode {
        FileNode {
            path: path.to_string(),
            kind: NodeKind::Blob,
            size: None,
            url: None,
        }
    }

    fn dir(path: &str) -> FileNode {
        FileNode {
            path: path.to_string(),
            kind: NodeKind::Tree,
            size: None,
            url: None,
        }
    }

    #[test]
    fn test_detect_tech_stack_single_framework() {
        let manifest = json!({"dependencies": {"next": "*"}});
        assert_eq!(detect_tech_stack(&manifest), vec!["Next.js"]);
    }

    #[test]
    fn test_detect_tech_stack_merges_dev_dependencies() {
        let manifest = json!({
            "dependencies": {"next": "14.0.0", "react": "18.2.0"},
            "devDependencies": {"tailwindcss": "^3", "eslint": "^8"}
        });
        assert_eq!(
            detect_tech_stack(&manifest),
            vec!["Next.js", "React", "TailwindCSS"]
        );
    }

    #[test]
    fn test_detect_tech_stack_empty_manifest() {
        assert!(detect_tech_stack(&json!({})).is_empty());
        assert!(detect_tech_stack(&json!({"dependencies": {"lodash": "*"}})).is_empty());
    }

    #[test]
    fn test_database_hints_prisma_models() {
        let schema = "datasource db {}\n\nmodel User {\n  id Int @id\n}\n\nmodel Post {\n}";
        let hints = database_hints(Some("prisma/schema.prisma"), schema);
        assert_eq!(
            hints,
            vec![
                "Schema file found at: prisma/schema.prisma",
                "model User",
                "model Post"
            ]
        );
    }

    #[test]
    fn test_database_hints_sql_schema_location_only() {
        let hints = database_hints(Some("db/schema.sql"), "CREATE TABLE users (id int);");
        assert_eq!(hints, vec!["Schema file found at: db/schema.sql"]);
    }

    #[test]
    fn test_database_hints_absent_schema() {
        assert!(database_hints(None, "").is_empty());
    }

    #[test]
    fn test_top_level_directories_exclude_dotted() {
        let tree = vec![
            dir(".github"),
            dir("src"),
            dir("docs"),
            blob("README.md"),
            dir("src/nested"),
        ];
        let analysis = analyze_tree(&tree, "{}", None, "");
        assert_eq!(analysis.top_level_directories, vec!["src", "docs"]);
    }

    #[test]
    fn test_route_candidates_follow_naming_convention() {
        let tree = vec![
            blob("app/page.tsx"),
            blob("app/api/users/route.ts"),
            blob("app/layout.tsx"),
            blob("pages/index.js"),
            blob("src/components/button.tsx"),
            // The pattern requires a directory prefix, so a bare root file
            // is not a candidate.
            blob("page.tsx"),
        ];
        let analysis = analyze_tree(&tree, "{}", None, "");
        assert_eq!(
            analysis.route_candidates,
            vec![
                "app/page.tsx",
                "app/api/users/route.ts",
                "app/layout.tsx",
                "pages/index.js"
            ]
        );
    }

    #[test]
    fn test_file_tree_is_capped() {
        let tree: Vec<FileNode> = (0..350).map(|i| blob(&format!("src/f{}.rs", i))).collect();
        let analysis = analyze_tree(&tree, "{}", None, "");
        assert_eq!(analysis.file_tree.len(), 300);
        assert_eq!(analysis.file_tree[0], "src/f0.rs");
    }

    #[test]
    fn test_unparsable_manifest_degrades_to_empty() {
        let analysis = analyze_tree(&[blob("package.json")], "not json", None, "");
        assert!(analysis.tech_stack.is_empty());
        assert_eq!(analysis.raw_manifest, json!({}));
    }
}
