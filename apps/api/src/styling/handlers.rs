//! Axum route handlers for outfit generation and rating.

use axum::{extract::State, http::HeaderMap, Json};
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::state::AppState;
use crate::styling::advisor::suggest_outfit;
use crate::styling::composer::Outfit;
use crate::styling::rater::{rate, Rating};
use crate::wardrobe::handlers::{discard_upload, read_form, save_upload};
use crate::wardrobe::models::NewRating;
use crate::wardrobe::store::RatingsDocument;

const DEFAULT_RATING_FILENAME: &str = "outfit_photo.jpg";
const RATING_PREFIX: &str = "outfit_";

#[derive(Debug, Deserialize)]
pub struct GenerateOutfitRequest {
    #[serde(default = "default_mood")]
    pub mood: String,
    #[serde(default = "default_occasion")]
    pub occasion: String,
}

fn default_mood() -> String {
    "casual".to_string()
}

fn default_occasion() -> String {
    "daily".to_string()
}

#[derive(Debug, Serialize)]
pub struct GenerateOutfitResponse {
    pub outfit: Outfit,
    pub mood: String,
    pub occasion: String,
}

#[derive(Debug, Serialize)]
pub struct RateOutfitResponse {
    pub message: &'static str,
    pub rating: Rating,
    pub filename: String,
}

/// POST /generate-outfit
///
/// Uses the advisor when it answers in time, otherwise the local composer.
pub async fn handle_generate_outfit(
    State(state): State<AppState>,
    Json(request): Json<GenerateOutfitRequest>,
) -> Result<Json<GenerateOutfitResponse>, AppError> {
    let items = state.store.load().await?;
    if items.is_empty() {
        return Err(AppError::Validation("No items in wardrobe".to_string()));
    }

    let outfit = suggest_outfit(
        state.advisor.as_ref(),
        &items,
        &request.mood,
        &request.occasion,
        state.config.advisor_timeout,
    )
    .await;

    Ok(Json(GenerateOutfitResponse {
        outfit,
        mood: request.mood,
        occasion: request.occasion,
    }))
}

/// POST /rate-outfit
///
/// Multipart body with the outfit photo plus `theme`, `occasion` and an
/// optional `description`. The rating is appended to the history.
pub async fn handle_rate_outfit(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<RateOutfitResponse>, AppError> {
    let form = read_form(&headers, &body)?;
    let file = form
        .file
        .as_ref()
        .ok_or_else(|| AppError::Validation("No outfit photo uploaded".to_string()))?;

    for required in ["theme", "occasion"] {
        if !form.has_value(required) {
            return Err(AppError::Validation(format!("{required} is required")));
        }
    }
    // Lookup is exact, so values are used as sent.
    let theme = form.raw_or("theme", "");
    let occasion = form.raw_or("occasion", "");
    let description = form.raw_or("description", "");

    let filename = save_upload(
        state.images.as_ref(),
        file,
        RATING_PREFIX,
        DEFAULT_RATING_FILENAME,
    )
    .await?;

    let rating = rate(&theme, &occasion, &description);
    let appended = state
        .store
        .append_rating(NewRating {
            filename: filename.clone(),
            theme,
            occasion,
            description,
            rating: rating.clone(),
        })
        .await;
    if let Err(e) = appended {
        discard_upload(state.images.as_ref(), &filename).await;
        return Err(e.into());
    }

    Ok(Json(RateOutfitResponse {
        message: "Outfit rated successfully",
        rating,
        filename,
    }))
}

/// GET /ratings
pub async fn handle_list_ratings(
    State(state): State<AppState>,
) -> Result<Json<RatingsDocument>, AppError> {
    let ratings = state.store.load_ratings().await?;
    Ok(Json(RatingsDocument { ratings }))
}
