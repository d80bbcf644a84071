// pdfdocx-service - HTTP front end for PDF to DOCX conversion tools

pub mod config;
pub mod converter;
pub mod middleware;
pub mod models;
pub mod ocr;
pub mod routes;
pub mod staging;
pub mod types;
pub mod utils;

#[cfg(test)]
mod test_utils;

// Re-exports for convenience
pub use config::Config;
pub use models::AppState;

pub fn create_router(state: AppState) -> axum::Router {
    routes::create_router(state)
}
