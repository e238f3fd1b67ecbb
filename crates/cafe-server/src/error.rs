//! Error types for the cafe service

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CafeError>;

#[derive(Error, Debug)]
pub enum CafeError {
    #[error("{0}")]
    NotFound(String),

    #[error("Sorry, there are no cafes in the database.")]
    EmptyCollection,

    #[error("Sorry, that's not allowed. Make sure you have the correct api_key.")]
    Forbidden,

    #[error("A cafe named '{0}' already exists.")]
    DuplicateName(String),

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("{0}")]
    BadRequest(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl CafeError {
    pub fn status(&self) -> StatusCode {
        match self {
            CafeError::NotFound(_) | CafeError::EmptyCollection => StatusCode::NOT_FOUND,
            CafeError::Forbidden => StatusCode::FORBIDDEN,
            CafeError::DuplicateName(_) => StatusCode::CONFLICT,
            CafeError::MissingField(_) | CafeError::BadRequest(_) => StatusCode::BAD_REQUEST,
            CafeError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Key used inside the `error` object of the response body
    fn label(&self) -> &'static str {
        match self {
            CafeError::NotFound(_) | CafeError::EmptyCollection => "Not Found",
            CafeError::Forbidden => "Forbidden",
            CafeError::DuplicateName(_) => "Conflict",
            CafeError::MissingField(_) | CafeError::BadRequest(_) => "Bad Request",
            CafeError::Database(_) => "Internal Server Error",
        }
    }

    /// Text sent to the client. Storage failures stay in the logs.
    fn public_message(&self) -> String {
        match self {
            CafeError::Database(_) => "Sorry, something went wrong on our side.".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for CafeError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::debug!("Request rejected ({}): {}", status, self);
        }

        let body = Json(json!({
            "error": { self.label(): self.public_message() }
        }));
        (status, body).into_response()
    }
}
