use crate::utils::error::{ErrorCategory, F1BetError};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Error body returned for every failed request.
#[derive(Debug, Serialize)]
pub struct Problem {
    pub status: u16,
    pub title: &'static str,
    pub detail: String,
}

#[derive(Debug)]
pub struct ApiError(pub F1BetError);

impl ApiError {
    fn status_and_title(&self) -> (StatusCode, &'static str) {
        match self.0.category() {
            ErrorCategory::Validation => (StatusCode::BAD_REQUEST, "Validation failed"),
            ErrorCategory::BadRequest => (StatusCode::BAD_REQUEST, "Bad request"),
            ErrorCategory::Domain => {
                (StatusCode::UNPROCESSABLE_ENTITY, "Domain validation error")
            }
            ErrorCategory::Conflict => (StatusCode::CONFLICT, "Optimistic lock error"),
            ErrorCategory::NotFound => (StatusCode::NOT_FOUND, "Not found"),
            ErrorCategory::Upstream => (StatusCode::BAD_GATEWAY, "Provider error"),
            ErrorCategory::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "Internal error"),
        }
    }
}

impl From<F1BetError> for ApiError {
    fn from(err: F1BetError) -> Self {
        ApiError(err)
    }
}

// 框架層的解析錯誤一律視為 400
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError(F1BetError::invalid_argument(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError(F1BetError::invalid_argument(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, title) = self.status_and_title();
        if status.is_server_error() {
            tracing::error!("❌ {}: {}", title, self.0);
        } else {
            tracing::debug!("{}: {}", title, self.0);
        }

        let problem = Problem {
            status: status.as_u16(),
            title,
            detail: self.0.to_string(),
        };
        let mut response = (status, Json(problem)).into_response();
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/problem+json"),
        );
        response
    }
}
