pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::state::AppState;
use crate::styling::handlers as styling;
use crate::wardrobe::handlers as wardrobe;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Wardrobe
        .route("/wardrobe", get(wardrobe::handle_list_wardrobe))
        .route("/upload", post(wardrobe::handle_upload))
        .route("/add-item", post(wardrobe::handle_add_item))
        .route("/uploads/:name", get(wardrobe::handle_get_upload))
        // Styling
        .route("/generate-outfit", post(styling::handle_generate_outfit))
        .route("/rate-outfit", post(styling::handle_rate_outfit))
        .route("/ratings", get(styling::handle_list_ratings))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::util::ServiceExt; // for `oneshot`

    use super::*;
    use crate::config::Config;
    use crate::styling::advisor::DisabledAdvisor;
    use crate::wardrobe::images::MemoryImageStore;
    use crate::wardrobe::store::{WardrobeStore, RATINGS_FILE, WARDROBE_FILE};

    const BOUNDARY: &str = "stylistTestBoundary";

    fn setup_app() -> (Router, TempDir) {
        let (app, dir, _images) = setup_app_with_images();
        (app, dir)
    }

    fn setup_app_with_images() -> (Router, TempDir, Arc<MemoryImageStore>) {
        let dir = TempDir::new().unwrap();
        let config = Config {
            port: 0,
            rust_log: "debug".to_string(),
            data_dir: dir.path().to_path_buf(),
            upload_dir: dir.path().join("uploads"),
            max_upload_bytes: 1024 * 1024,
            anthropic_api_key: None,
            advisor_timeout: Duration::from_secs(1),
        };
        let images = Arc::new(MemoryImageStore::default());
        let state = AppState {
            store: Arc::new(WardrobeStore::new(dir.path())),
            images: images.clone(),
            advisor: Arc::new(DisabledAdvisor),
            config,
        };
        (build_router(state), dir, images)
    }

    /// Builds a multipart body from `(name, filename, content)` triples.
    fn multipart_body(parts: &[(&str, Option<&str>, &[u8])]) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, filename, content) in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            let disposition = match filename {
                Some(f) => format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{f}\"\r\n\
                     Content-Type: application/octet-stream\r\n\r\n"
                ),
                None => format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n"),
            };
            body.extend_from_slice(disposition.as_bytes());
            body.extend_from_slice(content);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn multipart_request(uri: &str, body: Vec<u8>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn json_request(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn send(app: &Router, request: Request<Body>) -> Response {
        app.clone().oneshot(request).await.unwrap()
    }

    async fn extract_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _dir) = setup_app();
        let response = send(&app, get_request("/health")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(extract_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_upload_then_list_and_fetch() {
        let (app, _dir) = setup_app();

        let body = multipart_body(&[
            ("file", Some("white shirt.jpg"), b"\xff\xd8JPEG\r\nBYTES"),
            ("item_type", None, b"top"),
            ("color", None, b"white"),
            ("style", None, b"formal"),
        ]);
        let response = send(&app, multipart_request("/upload", body)).await;
        assert_eq!(response.status(), StatusCode::OK);

        let json = extract_json(response).await;
        assert_eq!(json["message"], "File uploaded successfully");
        assert_eq!(json["item"]["id"], 1);
        assert_eq!(json["item"]["item_type"], "top");
        let filename = json["item"]["filename"].as_str().unwrap().to_string();
        assert!(filename.ends_with("_white_shirt.jpg"), "{filename}");

        let wardrobe = extract_json(send(&app, get_request("/wardrobe")).await).await;
        assert_eq!(wardrobe["items"].as_array().unwrap().len(), 1);
        assert_eq!(wardrobe["items"][0]["color"], "white");

        let image = send(&app, get_request(&format!("/uploads/{filename}"))).await;
        assert_eq!(image.status(), StatusCode::OK);
        assert_eq!(image.headers()[header::CONTENT_TYPE], "image/jpeg");
        let bytes = axum::body::to_bytes(image.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"\xff\xd8JPEG\r\nBYTES");
    }

    #[tokio::test]
    async fn test_upload_defaults_missing_fields() {
        let (app, _dir) = setup_app();
        let body = multipart_body(&[("file", Some(""), b"GIF89a")]);
        let json = extract_json(send(&app, multipart_request("/upload", body)).await).await;

        assert_eq!(json["item"]["item_type"], "unknown");
        assert_eq!(json["item"]["color"], "unknown");
        assert_eq!(json["item"]["style"], "unknown");
        assert!(json["item"]["filename"]
            .as_str()
            .unwrap()
            .ends_with("_uploaded_file.jpg"));
    }

    #[tokio::test]
    async fn test_upload_keeps_blank_fields() {
        let (app, _dir) = setup_app();
        let body = multipart_body(&[
            ("file", Some("a.png"), b"PNG"),
            ("item_type", None, b"top"),
            ("color", None, b""),
        ]);
        let json = extract_json(send(&app, multipart_request("/upload", body)).await).await;

        assert_eq!(json["item"]["color"], "");
        assert_eq!(json["item"]["style"], "unknown");
    }

    #[tokio::test]
    async fn test_failed_append_discards_upload() {
        let (app, dir, images) = setup_app_with_images();
        std::fs::write(dir.path().join(WARDROBE_FILE), b"[[[").unwrap();

        let body = multipart_body(&[("file", Some("a.png"), b"PNG")]);
        let response = send(&app, multipart_request("/upload", body)).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(images.stored_count().await, 0);
    }

    #[tokio::test]
    async fn test_upload_rejects_non_multipart() {
        let (app, _dir) = setup_app();
        let response = send(&app, json_request("/upload", json!({"item_type": "top"}))).await;
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[tokio::test]
    async fn test_upload_without_file_leaves_store_untouched() {
        let (app, _dir) = setup_app();
        let body = multipart_body(&[("item_type", None, b"top")]);
        let response = send(&app, multipart_request("/upload", body)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = extract_json(response).await;
        assert_eq!(json["error"]["code"], "VALIDATION_ERROR");

        let wardrobe = extract_json(send(&app, get_request("/wardrobe")).await).await;
        assert!(wardrobe["items"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upload_rejects_disallowed_extension() {
        let (app, _dir) = setup_app();
        let body = multipart_body(&[("file", Some("notes.txt"), b"hello")]);
        let response = send(&app, multipart_request("/upload", body)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_generate_outfit_requires_items() {
        let (app, _dir) = setup_app();
        let response = send(
            &app,
            json_request("/generate-outfit", json!({"mood": "formal", "occasion": "work"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_generate_outfit_composes_locally() {
        let (app, _dir) = setup_app();
        for item in [
            json!({"item_type": "top", "color": "white", "style": "casual"}),
            json!({"item_type": "dress", "color": "black", "style": "formal"}),
            json!({"item_type": "shoes", "color": "brown", "style": "formal"}),
        ] {
            let response = send(&app, json_request("/add-item", item)).await;
            assert_eq!(response.status(), StatusCode::OK);
        }

        let response = send(
            &app,
            json_request("/generate-outfit", json!({"mood": "formal", "occasion": "work"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let json = extract_json(response).await;
        assert_eq!(json["mood"], "formal");
        assert_eq!(json["occasion"], "work");
        assert_eq!(json["outfit"]["top"], "black dress (formal)");
        assert_eq!(json["outfit"]["shoes"], "brown shoes (formal)");
        assert_eq!(json["outfit"]["bottom"], "Select appropriate bottoms");
    }

    #[tokio::test]
    async fn test_generate_outfit_defaults_mood_and_occasion() {
        let (app, _dir) = setup_app();
        send(&app, json_request("/add-item", json!({"item_type": "top"}))).await;

        let json = extract_json(send(&app, json_request("/generate-outfit", json!({}))).await).await;
        assert_eq!(json["mood"], "casual");
        assert_eq!(json["occasion"], "daily");
        assert_eq!(json["outfit"]["top"], "unknown top (unknown)");
    }

    #[tokio::test]
    async fn test_rate_outfit_records_history() {
        let (app, _dir) = setup_app();
        let body = multipart_body(&[
            ("outfit", Some("look.png"), b"PNGDATA"),
            ("theme", None, b"formal"),
            ("occasion", None, b"work"),
            ("description", None, b"grey suit"),
        ]);
        let response = send(&app, multipart_request("/rate-outfit", body)).await;
        assert_eq!(response.status(), StatusCode::OK);

        let json = extract_json(response).await;
        assert_eq!(json["message"], "Outfit rated successfully");
        assert_eq!(json["rating"]["overall_score"], 85);
        assert_eq!(json["rating"]["star_rating"], 4);
        assert!(json["rating"]["feedback"]
            .as_str()
            .unwrap()
            .contains("'grey suit'"));
        let filename = json["filename"].as_str().unwrap();
        assert!(filename.starts_with("outfit_") && filename.ends_with("_look.png"));

        let history = extract_json(send(&app, get_request("/ratings")).await).await;
        let ratings = history["ratings"].as_array().unwrap();
        assert_eq!(ratings.len(), 1);
        assert_eq!(ratings[0]["theme"], "formal");
        assert_eq!(ratings[0]["description"], "grey suit");
        assert_eq!(ratings[0]["rating"], json["rating"]);
    }

    #[tokio::test]
    async fn test_rate_outfit_keeps_fields_as_sent() {
        let (app, _dir) = setup_app();
        let body = multipart_body(&[
            ("outfit", Some("look.png"), b"PNGDATA"),
            ("theme", None, b" formal"),
            ("occasion", None, b"work"),
            ("description", None, b"  grey suit  "),
        ]);
        let json = extract_json(send(&app, multipart_request("/rate-outfit", body)).await).await;

        // " formal" is not the formal theme.
        assert_eq!(json["rating"]["overall_score"], 75);
        assert!(json["rating"]["feedback"].as_str().unwrap().ends_with(
            " Based on your description '  grey suit  ', this outfit shows great attention to detail."
        ));

        let history = extract_json(send(&app, get_request("/ratings")).await).await;
        assert_eq!(history["ratings"][0]["theme"], " formal");
        assert_eq!(history["ratings"][0]["description"], "  grey suit  ");
    }

    #[tokio::test]
    async fn test_rate_outfit_blank_theme_is_missing() {
        let (app, _dir) = setup_app();
        let body = multipart_body(&[
            ("outfit", Some("look.jpg"), b"JPEG"),
            ("theme", None, b"   "),
            ("occasion", None, b"work"),
        ]);
        let response = send(&app, multipart_request("/rate-outfit", body)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_failed_rating_append_discards_photo() {
        let (app, dir, images) = setup_app_with_images();
        std::fs::write(dir.path().join(RATINGS_FILE), b"{").unwrap();

        let body = multipart_body(&[
            ("outfit", Some("look.jpg"), b"JPEG"),
            ("theme", None, b"casual"),
            ("occasion", None, b"daily"),
        ]);
        let response = send(&app, multipart_request("/rate-outfit", body)).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(images.stored_count().await, 0);
    }

    #[tokio::test]
    async fn test_rate_outfit_requires_theme() {
        let (app, _dir) = setup_app();
        let body = multipart_body(&[
            ("outfit", Some("look.jpg"), b"JPEG"),
            ("occasion", None, b"work"),
        ]);
        let response = send(&app, multipart_request("/rate-outfit", body)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let history = extract_json(send(&app, get_request("/ratings")).await).await;
        assert!(history["ratings"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_upload_is_not_found() {
        let (app, _dir) = setup_app();
        let response = send(&app, get_request("/uploads/nothing.jpg")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = send(&app, get_request("/uploads/..%2Fwardrobe.json")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_corrupt_wardrobe_is_surfaced() {
        let (app, dir) = setup_app();
        std::fs::write(dir.path().join(WARDROBE_FILE), b"[[[").unwrap();

        let response = send(&app, get_request("/wardrobe")).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(extract_json(response).await["error"]["code"], "STORAGE_ERROR");
    }
}
