use std::collections::BTreeMap;

use axum::body::Body;
use axum::http::{StatusCode, header};
use sea_orm::{DatabaseBackend, MockDatabase, Value as DbValue};
use tower::ServiceExt;

use crate::test_support::{bearer, body_json, multipart_body, request, state, state_with};
use crate::{HttpLimits, create_router};

const BOUNDARY: &str = "campus-test-boundary";

#[tokio::test]
async fn test_health_is_public() {
    let app = create_router(state(), HttpLimits::default());

    let response = app
        .oneshot(request("GET", "/api/v1/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_unknown_resource_is_not_found() {
    let app = create_router(state(), HttpLimits::default());

    let response = app
        .oneshot(
            request("GET", "/api/v1/resources/Spaceship")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "NOT_FOUND");
}

#[tokio::test]
async fn test_malformed_id_is_rejected() {
    let app = create_router(state(), HttpLimits::default());

    let response = app
        .oneshot(
            request("GET", "/api/v1/resources/Program?id=abc")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_get_by_path_returns_record() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[
        BTreeMap::from([
            ("id", DbValue::from(1i64)),
            ("name", DbValue::from("Physics")),
            ("code", DbValue::from("PHY")),
        ]),
    ]]);
    let app = create_router(state_with(db), HttpLimits::default());

    let response = app
        .oneshot(
            request("GET", "/api/v1/resources/department/1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["name"], "Physics");
    assert_eq!(body["code"], "PHY");
}

#[tokio::test]
async fn test_create_requires_token() {
    let app = create_router(state(), HttpLimits::default());

    let response = app
        .oneshot(
            request("POST", "/api/v1/resources/Department")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"name":"Physics"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_invalid_token_is_rejected() {
    let app = create_router(state(), HttpLimits::default());

    let response = app
        .oneshot(
            request("DELETE", "/api/v1/resources/Department/1")
                .header(header::AUTHORIZATION, "Bearer not-a-jwt")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_put_without_id_is_rejected() {
    let state = state();
    let token = bearer(&state);
    let app = create_router(state, HttpLimits::default());

    let response = app
        .oneshot(
            request("PUT", "/api/v1/resources/Department")
                .header(header::AUTHORIZATION, token)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"name":"Physics"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_without_id_is_rejected() {
    let state = state();
    let token = bearer(&state);
    let app = create_router(state, HttpLimits::default());

    let response = app
        .oneshot(
            request("DELETE", "/api/v1/resources/News")
                .header(header::AUTHORIZATION, token)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upload_asset() {
    let state = state();
    let token = bearer(&state);
    let app = create_router(state.clone(), HttpLimits::default());

    let body = multipart_body(
        BOUNDARY,
        &[
            ("folder", None, b"gallery".as_slice()),
            ("file", Some(("Open Day.png", "image/png")), b"\x89PNG".as_slice()),
        ],
    );
    let response = app
        .oneshot(
            request("POST", "/api/v1/assets")
                .header(header::AUTHORIZATION, token)
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={BOUNDARY}"),
                )
                .body(body)
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    let key = body["key"].as_str().unwrap();
    assert!(key.starts_with("gallery/"));
    assert!(key.ends_with("Open_Day.png"));
    assert_eq!(body["contentType"], "image/png");

    let assets = state.resources.assets();
    assert!(assets.verify_reference(key).await.unwrap());
}

#[tokio::test]
async fn test_upload_to_unknown_folder_is_rejected() {
    let state = state();
    let token = bearer(&state);
    let app = create_router(state, HttpLimits::default());

    let body = multipart_body(
        BOUNDARY,
        &[
            ("folder", None, b"tmp".as_slice()),
            ("file", Some(("a.png", "image/png")), b"\x89PNG".as_slice()),
        ],
    );
    let response = app
        .oneshot(
            request("POST", "/api/v1/assets")
                .header(header::AUTHORIZATION, token)
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={BOUNDARY}"),
                )
                .body(body)
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_foreign_asset_is_rejected() {
    let state = state();
    let token = bearer(&state);
    let app = create_router(state, HttpLimits::default());

    let response = app
        .oneshot(
            request("DELETE", "/api/v1/assets?key=https://elsewhere.example/a.png")
                .header(header::AUTHORIZATION, token)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
