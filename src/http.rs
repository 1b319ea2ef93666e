use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::cors::{Any, CorsLayer};

use crate::handlers::{self, predict, suggest, Ctx};

/// Initialize HTTP routes.
pub fn init_handlers(ctx: Arc<Ctx>) -> Router {
    // The API is consumed from browser frontends on other origins, so CORS
    // is wide open.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/config", get(handlers::get_config))
        .route("/api/autocomplete/{lang}", get(suggest::autocomplete))
        .route("/api/predict/{lang}", get(predict::predict))
        .layer(cors)
        .with_state(ctx)
}
