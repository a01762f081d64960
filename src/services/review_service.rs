// src/services/review_service.rs

use crate::{
    common::error::AppError,
    models::review::{PlaceDetailsResponse, Review},
};

const PLACE_DETAILS_URL: &str = "https://maps.googleapis.com/maps/api/place/details/json";

// Proxy fino sobre o Google Places: busca as avaliações da loja para a
// vitrine do site. Nada é cacheado aqui; quem chama decide isso.
#[derive(Clone)]
pub struct ReviewService {
    client: reqwest::Client,
    place_id: String,
    api_key: String,
}

impl ReviewService {
    pub fn new(client: reqwest::Client, place_id: String, api_key: String) -> Self {
        Self {
            client,
            place_id,
            api_key,
        }
    }

    pub async fn fetch_reviews(&self) -> Result<Vec<Review>, AppError> {
        let response = self
            .client
            .get(PLACE_DETAILS_URL)
            .query(&[
                ("place_id", self.place_id.as_str()),
                ("fields", "reviews"),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AppError::ExternalServiceError(e.to_string()))?;

        let body: PlaceDetailsResponse = response
            .json()
            .await
            .map_err(|e| AppError::ExternalServiceError(e.to_string()))?;

        if body.status != "OK" {
            return Err(AppError::ExternalServiceError(format!(
                "Google Places respondeu '{}'",
                body.status
            )));
        }

        let reviews = body
            .result
            .map(|r| r.reviews)
            .unwrap_or_default()
            .into_iter()
            .map(|r| Review {
                author_name: r.author_name,
                rating: r.rating,
                text: r.text,
                relative_time: r.relative_time_description,
            })
            .collect();

        Ok(reviews)
    }
}
