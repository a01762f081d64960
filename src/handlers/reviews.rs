// src/handlers/reviews.rs

use axum::{extract::State, Json};

use crate::{common::error::AppError, config::AppState, models::review::Review};

// GET /api/reviews
// Rota pública: alimenta a vitrine de avaliações do site da loja.
#[utoipa::path(
    get,
    path = "/api/reviews",
    tag = "Reviews",
    responses(
        (status = 200, description = "Avaliações da loja no Google", body = Vec<Review>),
        (status = 502, description = "O Google Places não respondeu")
    )
)]
pub async fn list_reviews(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<Review>>, AppError> {
    let reviews = app_state.review_service.fetch_reviews().await?;
    Ok(Json(reviews))
}
