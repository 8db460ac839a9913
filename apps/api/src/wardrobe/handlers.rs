//! Axum route handlers for the wardrobe: uploads, manual items, listing and
//! image retrieval.

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap},
    response::IntoResponse,
    Json,
};
use bytes::Bytes;
use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::multipart::{FormData, MultipartPart};
use crate::state::AppState;
use crate::wardrobe::images::{
    content_type_for, has_allowed_extension, sanitize_filename, stored_name, ImageStore,
    ImageStoreError,
};
use crate::wardrobe::models::{NewItem, WardrobeItem};
use crate::wardrobe::store::WardrobeDocument;

const DEFAULT_ITEM_FILENAME: &str = "uploaded_file.jpg";
const UNKNOWN: &str = "unknown";

#[derive(Debug, Serialize)]
pub struct ItemResponse {
    pub message: &'static str,
    pub item: WardrobeItem,
}

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub item_type: Option<String>,
    pub color: Option<String>,
    pub style: Option<String>,
    pub description: Option<String>,
}

/// Decodes a multipart request body, rejecting anything that is not
/// `multipart/form-data` with a boundary.
pub(crate) fn read_form(headers: &HeaderMap, body: &[u8]) -> Result<FormData, AppError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    Ok(FormData::parse(content_type, body)?)
}

/// Validates and stores an uploaded file; returns its stored name.
pub(crate) async fn save_upload(
    images: &dyn ImageStore,
    file: &MultipartPart,
    prefix: &str,
    default_name: &str,
) -> Result<String, AppError> {
    let client_name = file
        .filename
        .as_deref()
        .map(sanitize_filename)
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| default_name.to_string());

    if !has_allowed_extension(&client_name) {
        return Err(AppError::Validation("Invalid file type".to_string()));
    }

    let name = stored_name(prefix, Local::now(), &client_name);
    images.save(&name, &file.data).await?;
    info!("Stored upload {name} ({} bytes)", file.data.len());
    Ok(name)
}

/// Deletes an upload whose record could not be written.
pub(crate) async fn discard_upload(images: &dyn ImageStore, name: &str) {
    match images.remove(name).await {
        Ok(()) => info!("Discarded upload {name} after failed append"),
        Err(e) => warn!("Failed to discard upload {name}: {e}"),
    }
}

/// GET /wardrobe
pub async fn handle_list_wardrobe(
    State(state): State<AppState>,
) -> Result<Json<WardrobeDocument>, AppError> {
    let items = state.store.load().await?;
    Ok(Json(WardrobeDocument { items }))
}

/// POST /upload
///
/// Multipart body with one file part and optional `item_type`, `color`,
/// `style` and `description` fields.
pub async fn handle_upload(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ItemResponse>, AppError> {
    let form = read_form(&headers, &body)?;
    let file = form
        .file
        .as_ref()
        .ok_or_else(|| AppError::Validation("No file uploaded".to_string()))?;

    let filename = save_upload(state.images.as_ref(), file, "", DEFAULT_ITEM_FILENAME).await?;

    // Present-but-empty values are kept; only absent fields default.
    let appended = state
        .store
        .append(NewItem {
            filepath: Some(state.images.path_for(&filename)),
            filename: Some(filename.clone()),
            item_type: form.raw_or("item_type", UNKNOWN).into(),
            color: form.raw_or("color", UNKNOWN),
            style: form.raw_or("style", UNKNOWN),
            description: form.raw("description").map(str::to_string),
        })
        .await;
    let item = match appended {
        Ok(item) => item,
        Err(e) => {
            discard_upload(state.images.as_ref(), &filename).await;
            return Err(e.into());
        }
    };

    Ok(Json(ItemResponse {
        message: "File uploaded successfully",
        item,
    }))
}

/// POST /add-item
///
/// Adds an item without a photo.
pub async fn handle_add_item(
    State(state): State<AppState>,
    Json(request): Json<AddItemRequest>,
) -> Result<Json<ItemResponse>, AppError> {
    let or_unknown = |v: Option<String>| v.unwrap_or_else(|| UNKNOWN.to_string());

    let item = state
        .store
        .append(NewItem {
            description: request.description,
            ..NewItem::new(
                or_unknown(request.item_type),
                &or_unknown(request.color),
                &or_unknown(request.style),
            )
        })
        .await?;

    Ok(Json(ItemResponse {
        message: "Item added successfully",
        item,
    }))
}

/// GET /uploads/:name
pub async fn handle_get_upload(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let not_found = || AppError::NotFound(format!("File {name} not found"));

    let bytes = match state.images.load(&name).await {
        Ok(Some(bytes)) => bytes,
        Ok(None) | Err(ImageStoreError::InvalidName(_)) => return Err(not_found()),
        Err(e) => return Err(e.into()),
    };

    Ok(([(header::CONTENT_TYPE, content_type_for(&name))], bytes))
}
