//! Public category listing.

use axum::Json;
use axum::extract::State;
use forum_core::forum::categories;
use forum_core::models::forum::Category;

use crate::AppState;
use crate::error::AppResult;

/// `GET /api/categories` — categories in alphabetical order.
pub async fn list_categories_handler(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Category>>> {
    Ok(Json(categories::list_categories(&state.pool).await?))
}
