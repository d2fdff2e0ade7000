use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::domain::DomainError;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Handler error rendered as `{"error": ...}`.
#[derive(Debug)]
pub enum ApiError {
    Domain(DomainError),
    /// Refused before decoding, e.g. body over the size limit or wrong
    /// content type. Keeps the status the extractor chose.
    Rejected { status: StatusCode, message: String },
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Domain(DomainError::Validation(_)) => StatusCode::BAD_REQUEST,
            Self::Domain(DomainError::Internal(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Rejected { status, .. } => *status,
        }
    }

    fn message(&self) -> &str {
        match self {
            Self::Domain(err) => err.message(),
            Self::Rejected { message, .. } => message,
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self::Domain(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonSyntaxError(_) | JsonRejection::JsonDataError(_) => {
                Self::Domain(DomainError::validation(rejection.body_text()))
            }
            other => Self::Rejected {
                status: other.status(),
                message: other.body_text(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.message(), "Request failed");
        } else {
            tracing::warn!(status = %status.as_u16(), error = %self.message(), "Rejected request");
        }

        let body = ErrorBody {
            error: self.message().to_string(),
        };
        (status, Json(body)).into_response()
    }
}
