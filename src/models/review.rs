// src/models/review.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// Uma avaliação vinda do Google Places, já no formato que o frontend usa.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub author_name: String,
    pub rating: f64,
    pub text: String,
    pub relative_time: String,
}

// --- Formato bruto da resposta do Google (só os campos que importam) ---

#[derive(Debug, Deserialize)]
pub struct PlaceDetailsResponse {
    pub status: String,
    pub result: Option<PlaceResult>,
}

#[derive(Debug, Deserialize)]
pub struct PlaceResult {
    #[serde(default)]
    pub reviews: Vec<PlaceReview>,
}

#[derive(Debug, Deserialize)]
pub struct PlaceReview {
    pub author_name: String,
    pub rating: f64,
    #[serde(default)]
    pub text: String,
    pub relative_time_description: String,
}
