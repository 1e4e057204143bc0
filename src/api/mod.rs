pub mod products;
pub mod search;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/search", get(search::search))
        .route("/api/suggest", get(search::suggest))
        .route("/api/products/{handle}/related", get(products::related))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
