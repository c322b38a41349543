pub mod generate;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};

use crate::state::AppState;

pub async fn health_handler() -> &'static str {
    "ok"
}

pub fn router(state: AppState) -> Router {
    let index = ServeFile::new(state.static_dir.join("index.html"));
    let assets = ServeDir::new(&state.static_dir);

    let app = Router::new()
        .route_service("/", index)
        .nest_service("/static", assets)
        .route("/health", get(health_handler))
        .route("/generate", post(generate::generate_handler))
        .layer(DefaultBodyLimit::max(state.max_upload_bytes));

    let app = if state.dev_mode {
        app.layer(CorsLayer::permissive())
    } else {
        app
    };

    app.with_state(state)
}
