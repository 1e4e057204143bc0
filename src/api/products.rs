use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::models::RelatedResponse;
use crate::state::AppState;

/// GET /api/products/{handle}/related - Products to show next to this one
pub async fn related(
    State(state): State<AppState>,
    Path(handle): Path<String>,
) -> Result<Json<RelatedResponse>, (StatusCode, String)> {
    match state.related.related(&handle).await {
        Some(products) => Ok(Json(RelatedResponse { handle, products })),
        None => Err((StatusCode::NOT_FOUND, "Product not found".to_string())),
    }
}
