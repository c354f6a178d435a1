//! HTTP error bodies: `{"error": ..., "details"?: ..., "message"?: ...}`.

use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequest;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::error::ImageError;

/// An error response returned by a handler.
#[derive(Debug, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    pub(crate) code: StatusCode,
    pub(crate) error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) message: Option<String>,
}

impl ApiError {
    pub(crate) fn bad_request(error: impl Into<String>) -> Self {
        Self { code: StatusCode::BAD_REQUEST, error: error.into(), details: None, message: None }
    }

    pub(crate) fn not_found() -> Self {
        Self { code: StatusCode::NOT_FOUND, error: "Not found".into(), details: None, message: None }
    }

    pub(crate) fn method_not_allowed() -> Self {
        Self {
            code: StatusCode::METHOD_NOT_ALLOWED,
            error: "Method not allowed".into(),
            details: None,
            message: None,
        }
    }

    pub(crate) fn generation_failed(details: impl Into<String>) -> Self {
        Self {
            code: StatusCode::INTERNAL_SERVER_ERROR,
            error: "Failed to generate image".into(),
            details: Some(details.into()),
            message: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.code, Json(self)).into_response()
    }
}

impl From<ImageError> for ApiError {
    fn from(e: ImageError) -> Self {
        match e {
            ImageError::Validation(msg) | ImageError::InvalidArgument(msg) => Self::bad_request(msg),
            ImageError::Config(_) | ImageError::MissingApiKey { .. } => {
                tracing::error!(error = %e, "server misconfigured");
                Self {
                    code: StatusCode::INTERNAL_SERVER_ERROR,
                    error: "Server configuration error".into(),
                    details: None,
                    message: None,
                }
            }
            other => {
                tracing::error!(error = %other, "generation failed");
                Self {
                    code: StatusCode::INTERNAL_SERVER_ERROR,
                    error: "Failed to generate image".into(),
                    details: None,
                    message: Some(other.slot_message()),
                }
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            code: StatusCode::BAD_REQUEST,
            error: "Invalid request body".into(),
            details: None,
            message: Some(rejection.body_text()),
        }
    }
}

/// `Json` extractor whose rejections use the JSON error body.
#[derive(FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);
