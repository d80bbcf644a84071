use axum::{extract::State, routing::get, Json, Router};

use crate::models::{AppState, HealthResponse, ToolStatus};

pub const WELCOME: &str =
    "PDF to DOCX conversion service. POST a PDF to /convert in the multipart field 'file'.";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(welcome))
        .route("/health", get(health_check))
}

async fn welcome() -> &'static str {
    WELCOME
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let converters = &state.config.converters;
    let mut tools = vec![
        ("pdf2docx", converters.pdf2docx_bin.as_str()),
        ("pandoc", converters.pandoc_bin.as_str()),
    ];
    tools.extend(state.extractor.tools());

    let response = HealthResponse {
        status: "ok".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        tools: tools
            .into_iter()
            .map(|(name, program)| ToolStatus {
                name: name.to_string(),
                program: program.to_string(),
                available: program_available(program),
            })
            .collect(),
    };

    Json(response)
}

/// Whether `program` resolves to an executable, either as a path or via `PATH`.
fn program_available(program: &str) -> bool {
    which::which(program).is_ok()
}
