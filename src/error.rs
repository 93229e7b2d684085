use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

/// Failures of one exchange with the evaluator.
///
/// Every variant ends up in the same place: the error view of the result
/// display, showing the variant's message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// The request never produced a response (connect, timeout, body read).
    #[error("{message}")]
    Transport { message: String },

    /// The evaluator answered with a non-2xx status.
    #[error("evaluator returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The body was not JSON.
    #[error("invalid JSON in evaluator response: {message}")]
    Decode { message: String },

    /// The body was JSON but not an evaluation result.
    #[error("unexpected evaluator response: {message}")]
    Schema { message: String },
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Transport {
            message: err.to_string(),
        }
    }
}

/// A form control the collector needs is absent from the document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("form control #{id} is missing")]
    MissingControl { id: &'static str },
}

/// A request field that does not parse into an applicant attribute.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProfileError {
    #[error("{field} is required")]
    Blank { field: &'static str },

    #[error("{field} is not a number: {value:?}")]
    NotNumeric { field: &'static str, value: String },

    #[error("{field} is out of range: {value:?}")]
    OutOfRange { field: &'static str, value: String },
}

/// Custom error type for the application
#[derive(Debug)]
pub enum AppError {
    BadGateway(String),
    InternalServerError(String),
    ValidationError(String),
}

/// Error response structure
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg),
            AppError::BadGateway(msg) => {
                error!("Evaluator request failed: {}", msg);
                (StatusCode::BAD_GATEWAY, "BAD_GATEWAY", msg)
            }
            AppError::InternalServerError(msg) => {
                error!("Internal server error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_SERVER_ERROR",
                    msg,
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_type.to_string(),
            message,
        });

        (status, body).into_response()
    }
}

impl From<FormError> for AppError {
    fn from(err: FormError) -> Self {
        AppError::ValidationError(err.to_string())
    }
}

impl From<ClientError> for AppError {
    fn from(err: ClientError) -> Self {
        AppError::BadGateway(err.to_string())
    }
}

/// Result type for application handlers
pub type AppResult<T> = Result<T, AppError>;
