//! Error responses.

use axum::Json;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::error;

use campus_core::resource::ResourceError;
use campus_core::storage::StorageError;
use campus_shared::AppError;

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// Any failure leaving a handler.
///
/// Rendered as `{"error": CODE, "message": text}`; server-side failures are
/// logged in full and answered with a generic message.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl ApiError {
    /// Create a validation error.
    #[must_use]
    pub fn validation(msg: impl Into<String>) -> Self {
        Self(AppError::Validation(msg.into()))
    }

    /// Create an unauthorized error.
    #[must_use]
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self(AppError::Unauthorized(msg.into()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if self.0.is_server_error() {
            error!(error = %self.0, code = self.0.error_code(), "Request failed");
        }

        (status, Json(self.0.body())).into_response()
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<ResourceError> for ApiError {
    fn from(err: ResourceError) -> Self {
        Self(err.into())
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        Self(err.into())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        Self::validation(format!("invalid multipart body: {}", err.body_text()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use rstest::rstest;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[rstest]
    #[case(ResourceError::validation("bad"), StatusCode::BAD_REQUEST, "VALIDATION_ERROR")]
    #[case(ResourceError::not_found("News", 9), StatusCode::NOT_FOUND, "NOT_FOUND")]
    #[case(ResourceError::UnknownResource("Widgets".into()), StatusCode::NOT_FOUND, "NOT_FOUND")]
    #[case(
        ResourceError::Storage(StorageError::invalid_mime_type("text/html")),
        StatusCode::BAD_REQUEST,
        "VALIDATION_ERROR"
    )]
    #[case(
        ResourceError::Storage(StorageError::operation("timeout")),
        StatusCode::INTERNAL_SERVER_ERROR,
        "STORAGE_ERROR"
    )]
    #[case(
        ResourceError::repository("pool closed"),
        StatusCode::INTERNAL_SERVER_ERROR,
        "REPOSITORY_ERROR"
    )]
    #[tokio::test]
    async fn test_error_response(
        #[case] err: ResourceError,
        #[case] status: StatusCode,
        #[case] code: &str,
    ) {
        let response = ApiError::from(err).into_response();
        assert_eq!(response.status(), status);

        let body = body_json(response).await;
        assert_eq!(body["error"], code);
        assert!(body["message"].is_string());
    }

    #[tokio::test]
    async fn test_server_error_message_is_generic() {
        let response =
            ApiError::from(ResourceError::repository("password authentication failed")).into_response();
        let body = body_json(response).await;
        assert!(!body["message"].as_str().unwrap().contains("password"));
    }
}
