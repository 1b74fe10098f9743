//! Shared fixtures for router tests.

use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use http_body_util::BodyExt;
use sea_orm::{DatabaseBackend, MockDatabase};
use serde_json::Value;

use campus_core::asset::{AssetManager, UploadPolicy};
use campus_core::resource::ResourceService;
use campus_core::storage::StorageService;
use campus_db::ResourceRepository;
use campus_shared::{JwtConfig, JwtService, Secret};

use crate::AppState;

pub fn jwt_service() -> JwtService {
    JwtService::new(JwtConfig {
        secret: Secret::new("router-test-secret-0123456789abcdef"),
        token_expires_minutes: 15,
    })
}

/// State over a mock database and an in-memory object store.
pub fn state_with(db: MockDatabase) -> AppState {
    let storage = Arc::new(StorageService::in_memory().expect("memory store"));
    let assets = Arc::new(AssetManager::new(storage, UploadPolicy::default()));
    let repo = Arc::new(ResourceRepository::new(db.into_connection()));

    AppState {
        resources: Arc::new(ResourceService::new(repo, assets)),
        jwt_service: Arc::new(jwt_service()),
    }
}

pub fn state() -> AppState {
    state_with(MockDatabase::new(DatabaseBackend::Postgres))
}

pub fn bearer(state: &AppState) -> String {
    let token = state
        .jwt_service
        .generate_token("editor@campus.test", "editor")
        .expect("should generate token");
    format!("Bearer {token}")
}

pub fn multipart_body(boundary: &str, parts: &[(&str, Option<(&str, &str)>, &[u8])]) -> Body {
    let mut body = Vec::new();
    for (name, file, content) in parts {
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        match file {
            Some((file_name, content_type)) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
            ),
        }
        body.extend_from_slice(content);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
    Body::from(body)
}

pub fn request(method: &str, uri: &str) -> axum::http::request::Builder {
    Request::builder().method(method).uri(uri)
}

pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
