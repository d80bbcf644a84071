//! API Routes
//!
//! - `GET /` - Welcome text
//! - `GET /health` - Health check with external tool availability
//! - `POST /convert` - Upload a PDF, receive a DOCX attachment
//! - `POST /extract-text` - Upload a PDF, receive its text (text layer or OCR)

pub mod convert;
pub mod extract;
pub mod health;
pub mod upload;

use axum::{extract::DefaultBodyLimit, Router};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::middleware::cors_layer;
use crate::models::AppState;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    info!("Creating application router");

    let max_upload_bytes = state.config.server.max_upload_bytes;
    let cors = cors_layer(&state.config.server.cors_allowed_origins);

    Router::new()
        .merge(health::router())
        .merge(convert::router())
        .merge(extract::router())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .with_state(state)
}
