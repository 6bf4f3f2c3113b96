use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use domain::value_objects::validation::FieldErrors;
use serde::Serialize;
use thiserror::Error;

const INTERNAL_MESSAGE: &str = "Something went wrong, please try again later";

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_errors: Option<FieldErrors>,
    /// The submitted form, echoed back so the client can re-render it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub values: Option<serde_json::Value>,
}

/// Implemented by every use-case error so handlers can map it uniformly.
pub trait UseCaseError: std::error::Error {
    fn status_code(&self) -> StatusCode;

    fn field_errors(&self) -> Option<&FieldErrors> {
        None
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{message}")]
    Conflict {
        message: String,
        field_errors: Option<FieldErrors>,
        values: Option<serde_json::Value>,
    },

    #[error("{message}")]
    Validation {
        message: String,
        field_errors: FieldErrors,
        values: Option<serde_json::Value>,
    },

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// The use case has already logged internal failures.
    pub fn from_usecase<E: UseCaseError>(err: E) -> Self {
        let message = err.to_string();
        let field_errors = err.field_errors().cloned();

        match err.status_code() {
            StatusCode::UNAUTHORIZED => AppError::Unauthorized,
            StatusCode::FORBIDDEN => AppError::Forbidden(message),
            StatusCode::NOT_FOUND => AppError::NotFound(message),
            StatusCode::CONFLICT => AppError::Conflict {
                message,
                field_errors,
                values: None,
            },
            StatusCode::UNPROCESSABLE_ENTITY | StatusCode::BAD_REQUEST => AppError::Validation {
                message,
                field_errors: field_errors.unwrap_or_default(),
                values: None,
            },
            _ => AppError::Internal(anyhow::anyhow!(message)),
        }
    }

    /// Attaches the submitted form to validation and conflict responses.
    pub fn with_values<T: Serialize>(self, submitted: &T) -> Self {
        let echoed = serde_json::to_value(submitted).ok();
        match self {
            AppError::Conflict {
                message,
                field_errors,
                ..
            } => AppError::Conflict {
                message,
                field_errors,
                values: echoed,
            },
            AppError::Validation {
                message,
                field_errors,
                ..
            } => AppError::Validation {
                message,
                field_errors,
                values: echoed,
            },
            other => other,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let (message, field_errors, values) = match self {
            AppError::Conflict {
                message,
                field_errors,
                values,
            } => (message, field_errors, values),
            AppError::Validation {
                message,
                field_errors,
                values,
            } => (message, Some(field_errors), values),
            // Don't leak internal error detail to client
            AppError::Internal(_) => (INTERNAL_MESSAGE.to_string(), None, None),
            other => (other.to_string(), None, None),
        };

        let body = Json(ErrorResponse {
            code: status.as_u16(),
            message,
            field_errors,
            values,
        });

        (status, body).into_response()
    }
}
