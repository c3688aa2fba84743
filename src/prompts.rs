//! Prompt templates for the explanation generator

use crate::analysis::RepoAnalysis;

/// Number of route candidates embedded in the prompt
const PROMPT_ROUTE_LIMIT: usize = 20;

/// Number of file-tree entries embedded in the prompt
const PROMPT_TREE_LIMIT: usize = 150;

/// System persona sent with every explanation request
pub const EXPLANATION_SYSTEM: &str =
    "You are an expert Software Architect and Technical Writer.";

/// Fixed instruction template; `{...}` markers are substituted with the
/// analysis before sending
pub const EXPLANATION_TEMPLATE: &str = r#"Your goal is to explain this GitHub repository to a developer who wants to understand "What is this project?", "How is it organized?", and "How does it work?" without reading the code.

### Repository Context
- **Tech Stack**: {tech_stack}
- **Database**: {database}
- **Key Directories**: {directories}
- **Routes/Pages**: {routes}
- **File Tree (Partial)**:
{file_tree}

### Instructions
1. **Analyze the Project**: Determine its purpose (e.g., E-commerce, SaaS, Tool) based on packages and file names.
2. **Explain the Structure**: Describe what the key folders do (e.g., "lib: utility functions", "app: Next.js pages").
3. **Route Breakdown**: Map out the key pages and API endpoints. Infer their purpose from their name.
4. **Technical Implementation**: Provide a detailed list of features, inferred prerequisites (Node version, API keys), and basic deployment steps.

### Output Format (Strict JSON, no markdown)
{
  "projectInfo": {
    "name": "Project Name (Inferred)",
    "purpose": "A concise summary of what this project does.",
    "description": "A detailed explanation of the project's features and goals.",
    "type": "Web App / API / CLI / Library"
  },
  "structure": {
    "summary": "High-level overview of the code organization.",
    "directories": [
      { "name": "app", "description": "Main application routes and pages." },
      { "name": "components", "description": "Reusable UI components." }
    ]
  },
  "routes": [
    { "path": "/", "type": "frontend", "description": "Landing page.", "file": "app/page.tsx" },
    { "path": "/api/users", "type": "backend", "description": "User management endpoints.", "file": "app/api/users/route.ts" }
  ],
  "implementation": {
    "features": ["Feature 1", "Feature 2"],
    "prerequisites": ["Node.js 18+", "OpenAI API Key"],
    "deployment": "Vercel / Docker / Netlify"
  }
}"#;

/// Renders the explanation prompt for one analysis
pub fn explanation_prompt(analysis: &RepoAnalysis) -> String {
    let routes: Vec<&str> = analysis
        .route_candidates
        .iter()
        .take(PROMPT_ROUTE_LIMIT)
        .map(String::as_str)
        .collect();
    let file_tree: Vec<&str> = analysis
        .file_tree
        .iter()
        .take(PROMPT_TREE_LIMIT)
        .map(String::as_str)
        .collect();

    EXPLANATION_TEMPLATE
        .replace("{tech_stack}", &analysis.tech_stack.join(", "))
        .replace("{database}", &analysis.database_hints.join(", "))
        .replace("{directories}", &analysis.top_level_directories.join(", "))
        .replace("{routes}", &routes.join(", "))
        .replace("{file_tree}", &file_tree.join("\n"))
}
