//! End-to-end tests for the HTTP API against in-memory SQLite and a
//! temporary media root.

use std::path::Path;
use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header::CONTENT_TYPE},
};
use http_body_util::BodyExt;
use quill_api::{AppState, create_router};
use quill_core::storage::{MediaStorage, StorageConfig};
use quill_db::migration::{Migrator, MigratorTrait};
use sea_orm::Database;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

const BOUNDARY: &str = "quill-test-boundary";
const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nnot-really-an-image";

struct TestApp {
    router: Router,
    media: TempDir,
}

impl TestApp {
    async fn new() -> Self {
        Self::with_upload_limit(1024 * 1024).await
    }

    async fn with_upload_limit(max_upload_bytes: usize) -> Self {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to connect to test database");
        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");

        let media = TempDir::new().expect("Failed to create media root");
        let storage = MediaStorage::new(StorageConfig::new(media.path(), "/uploads"))
            .expect("valid storage config");

        let router = create_router(AppState {
            db: Arc::new(db),
            storage: Arc::new(storage),
            max_upload_bytes,
        });

        Self { router, media }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, bytes.to_vec())
    }

    async fn json(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let (status, bytes) = self.send(request).await;
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn upload(&self, uri: &str, field: &str, filename: &str, data: &[u8]) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(multipart_body(field, filename, data)))
            .unwrap();

        let (status, bytes) = self.send(request).await;
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn register(&self, email: &str) -> i64 {
        let (status, body) = self
            .json(
                "POST",
                "/api/v1/users",
                Some(json!({
                    "name": "Ada",
                    "email": email,
                    "password": "correct horse battery",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["id"].as_i64().unwrap()
    }

    fn files_under(&self, subdir: &str) -> usize {
        count_files(&self.media.path().join(subdir))
    }
}

fn multipart_body(field: &str, filename: &str, data: &[u8]) -> Vec<u8> {
    let mut body = format!(
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n\
         Content-Type: application/octet-stream\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn count_files(dir: &Path) -> usize {
    std::fs::read_dir(dir).map_or(0, |entries| entries.count())
}

fn assert_random_name(url: &str, prefix: &str, ext: &str) {
    let name = url
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_suffix(ext))
        .unwrap_or_else(|| panic!("unexpected url {url}"));
    assert_eq!(name.len(), 32, "{url}");
    assert!(name.chars().all(|c| c.is_ascii_hexdigit()), "{url}");
}

#[tokio::test]
async fn test_health_reports_database() {
    let app = TestApp::new().await;

    let (status, body) = app.json("GET", "/api/v1/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "up");
}

#[tokio::test]
async fn test_register_hides_password_and_rejects_duplicates() {
    let app = TestApp::new().await;
    let payload = json!({
        "name": "Ada",
        "email": "ada@example.com",
        "password": "correct horse battery",
    });

    let (status, body) = app.json("POST", "/api/v1/users", Some(payload.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["email"], "ada@example.com");
    assert!(body.get("password").is_none());
    assert!(body.get("password_hash").is_none());

    let (status, body) = app.json("POST", "/api/v1/users", Some(payload)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "CONFLICT");
}

#[tokio::test]
async fn test_register_validates_body() {
    let app = TestApp::new().await;

    let (status, body) = app
        .json(
            "POST",
            "/api/v1/users",
            Some(json!({ "name": "Ada", "email": "not-an-email", "password": "short" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_user_image_upload_is_stored_and_served() {
    let app = TestApp::new().await;
    let id = app.register("ada@example.com").await;

    let (status, body) = app
        .upload(&format!("/api/v1/users/{id}/image"), "file", "Avatar.PNG", PNG_BYTES)
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let url = body["image_url"].as_str().unwrap().to_string();
    assert_random_name(&url, "/uploads/users/", ".png");

    let request = Request::builder().uri(&url).body(Body::empty()).unwrap();
    let (status, served) = app.send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(served, PNG_BYTES);

    let (_, fetched) = app.json("GET", &format!("/api/v1/users/{id}"), None).await;
    assert_eq!(fetched["image_url"], url.as_str());
}

#[tokio::test]
async fn test_upload_for_missing_user_writes_nothing() {
    let app = TestApp::new().await;

    let (status, body) = app
        .upload("/api/v1/users/42/image", "file", "avatar.png", PNG_BYTES)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NOT_FOUND");
    assert_eq!(app.files_under("users"), 0);
}

#[tokio::test]
async fn test_upload_without_file_field_is_rejected() {
    let app = TestApp::new().await;
    let id = app.register("ada@example.com").await;

    let (status, body) = app
        .upload(&format!("/api/v1/users/{id}/image"), "avatar", "avatar.png", PNG_BYTES)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");
    assert_eq!(app.files_under("users"), 0);
}

#[tokio::test]
async fn test_oversized_upload_is_rejected() {
    let app = TestApp::with_upload_limit(1024).await;
    let id = app.register("ada@example.com").await;

    let (status, body) = app
        .upload(&format!("/api/v1/users/{id}/image"), "file", "big.bin", &[7u8; 4096])
        .await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["error"], "PAYLOAD_TOO_LARGE");
    assert_eq!(app.files_under("users"), 0);
}

#[tokio::test]
async fn test_post_lifecycle_with_tags_comments_and_cover() {
    let app = TestApp::new().await;
    let author = app.register("author@example.com").await;

    let (status, category) = app
        .json("POST", "/api/v1/categories", Some(json!({ "name": "Rust" })))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let category_id = category["id"].as_i64().unwrap();

    let mut tag_ids = Vec::new();
    for name in ["async", "storage"] {
        let (status, tag) = app
            .json("POST", "/api/v1/tags", Some(json!({ "name": name })))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        tag_ids.push(tag["id"].as_i64().unwrap());
    }

    let (status, post) = app
        .json(
            "POST",
            "/api/v1/posts",
            Some(json!({
                "title": "Streaming uploads",
                "content": "Chunk by chunk.",
                "author_id": author,
                "category_id": category_id,
                "tag_ids": tag_ids,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{post}");
    let post_id = post["id"].as_i64().unwrap();
    assert_eq!(post["tags"].as_array().unwrap().len(), 2);

    let (status, body) = app
        .json(
            "POST",
            "/api/v1/posts",
            Some(json!({
                "title": "Broken",
                "content": "x",
                "author_id": author,
                "category_id": category_id,
                "tag_ids": [999],
            })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "INVALID_REFERENCE");

    let (status, comment) = app
        .json(
            "POST",
            &format!("/api/v1/posts/{post_id}/comments"),
            Some(json!({ "user_id": author, "message": "First!" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(comment["post_id"], post_id);

    let (status, comments) = app
        .json("GET", &format!("/api/v1/posts/{post_id}/comments"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(comments["meta"]["total"], 1);

    let (status, body) = app
        .upload(&format!("/api/v1/posts/{post_id}/image"), "file", "cover.jpg", PNG_BYTES)
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_random_name(body["image_url"].as_str().unwrap(), "/uploads/posts/", ".jpg");

    let (status, list) = app
        .json("GET", &format!("/api/v1/posts?category_id={category_id}"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["meta"]["total"], 1);
    assert_eq!(list["data"][0]["id"], post_id);

    let (status, _) = app.json("DELETE", &format!("/api/v1/posts/{post_id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app
        .json("GET", &format!("/api/v1/posts/{post_id}/comments"), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_category_image_upload() {
    let app = TestApp::new().await;

    let (_, category) = app
        .json("POST", "/api/v1/categories", Some(json!({ "name": "News" })))
        .await;
    let id = category["id"].as_i64().unwrap();

    let (status, body) = app
        .upload(&format!("/api/v1/categories/{id}/image"), "file", "banner", PNG_BYTES)
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_random_name(body["image_url"].as_str().unwrap(), "/uploads/categories/", "");
    assert_eq!(app.files_under("categories"), 1);

    let (status, _) = app
        .upload("/api/v1/categories/999/image", "file", "banner.png", PNG_BYTES)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(app.files_under("categories"), 1);
}
