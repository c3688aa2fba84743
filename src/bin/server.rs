use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::Json as ResponseJson,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

use repolens::{api::GenerateRequest, Config, RepoExplainer};

/// Application state shared across handlers
#[derive(Clone)]
struct AppState {
    explainer: Arc<RepoExplainer>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt().with_target(false).compact().init();

    let config = Config::load()?;
    config.ensure_tokens()?;
    let bind_addr = config.bind_addr.clone();

    let explainer = Arc::new(RepoExplainer::new(&config)?);
    let state = AppState { explainer };

    info!("repolens web server starting...");
    info!("Health check: http://{}/health", bind_addr);

    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Server listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the main application with all routes
fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route("/api/generate", post(generate))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Root endpoint - returns basic service information
async fn index() -> ResponseJson<Value> {
    ResponseJson(json!({
        "service": "repolens",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Explain a GitHub repository with heuristic analysis and an AI-generated project guide",
        "endpoints": {
            "health": "/health",
            "generate": "/api/generate"
        }
    }))
}

/// Health check endpoint
async fn health_check(State(state): State<AppState>) -> ResponseJson<Value> {
    ResponseJson(json!(state.explainer.health()))
}

/// Explain a repository endpoint
async fn generate(
    State(state): State<AppState>,
    body: String,
) -> Result<ResponseJson<Value>, (StatusCode, ResponseJson<Value>)> {
    let request: GenerateRequest = serde_json::from_str(&body).map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            ResponseJson(json!({"error": "Invalid input"})),
        )
    })?;

    match state.explainer.explain(&request.url).await {
        Ok(payload) => Ok(ResponseJson(json!(payload))),
        Err(e) => {
            error!("Failed to explain repository: {}", e);
            let status = if e.is_client_error() {
                StatusCode::BAD_REQUEST
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            let message = match e.to_string() {
                message if message.is_empty() => "Internal Server Error".to_string(),
                message => message,
            };
            Err((status, ResponseJson(json!({"error": message}))))
        }
    }
}
