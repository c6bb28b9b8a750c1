//! Categories API endpoints.

use api_types::category::CATEGORIES;
use axum::Json;

/// Fixed list of categories a transaction may be filed under.
pub async fn list() -> Json<Vec<&'static str>> {
    Json(CATEGORIES.to_vec())
}
