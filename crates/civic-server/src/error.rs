use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use civic_shared::FieldErrors;
use civic_store::StoreError;

/// Message returned for every 500, whatever the cause.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal Server Error";

#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or malformed input (400).
    #[error("{0}")]
    BadRequest(String),

    /// Per-field validation failure (400 with a `fields` map).
    #[error("{message}")]
    Validation { message: String, fields: FieldErrors },

    /// Bad credentials (401).
    #[error("{0}")]
    Unauthorized(String),

    /// Unknown id or referenced entity (404).
    #[error("{0}")]
    NotFound(String),

    /// Uniqueness conflict (409).
    #[error("{0}")]
    Conflict(String),

    /// Anything unexpected (500). The detail is logged, never returned.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        ApiError::BadRequest(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        ApiError::NotFound(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound => ApiError::NotFound("Record not found.".into()),
            StoreError::Conflict(msg) => ApiError::Conflict(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        tracing::debug!(error = %e, "rejected request body");
        ApiError::BadRequest("Invalid JSON body.".into())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(e: QueryRejection) -> Self {
        tracing::debug!(error = %e, "rejected query string");
        ApiError::BadRequest("Invalid query string.".into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::Internal(detail) => {
                tracing::error!(error = %detail, "request failed");
                serde_json::json!({ "error": INTERNAL_ERROR_MESSAGE })
            }
            ApiError::Validation { message, fields } => serde_json::json!({
                "error": message,
                "fields": fields,
            }),
            ApiError::BadRequest(message)
            | ApiError::Unauthorized(message)
            | ApiError::NotFound(message)
            | ApiError::Conflict(message) => serde_json::json!({ "error": message }),
        };

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_of(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn internal_detail_is_not_leaked() {
        let (status, body) =
            body_of(ApiError::Internal("disk I/O error at /var/lib".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, serde_json::json!({ "error": "Internal Server Error" }));
    }

    #[tokio::test]
    async fn store_errors_map_to_status() {
        assert_eq!(
            ApiError::from(StoreError::Conflict("Email already registered.".into())).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(StoreError::NotFound).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(StoreError::Migration("boom".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn validation_carries_fields() {
        let mut fields = FieldErrors::new();
        fields.insert(
            civic_shared::ProfileField::Phone,
            "Phone number must be 10 digits".into(),
        );
        let (status, body) = body_of(ApiError::Validation {
            message: "Validation failed.".into(),
            fields,
        })
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["fields"]["phone"], "Phone number must be 10 digits");
    }
}
