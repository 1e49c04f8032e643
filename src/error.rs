//! Error types for Shelter Guru

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Database error: {0}")]
    Database(#[from] tokio_postgres::Error),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Failed to sign token: {0}")]
    TokenIssue(jsonwebtoken::errors::Error),

    #[error("No bearer token in request")]
    Unauthorized,

    #[error("Invalid token: {0}")]
    InvalidToken(jsonwebtoken::errors::Error),

    #[error("Identity does not own the requested resource")]
    Forbidden,

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Mail delivery failed: {0}")]
    Mail(String),

    #[error("Config file not found. Run 'shelter init' first.")]
    ConfigNotFound,
}

impl Error {
    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            Error::Unauthorized => StatusCode::UNAUTHORIZED,
            Error::InvalidToken(_) | Error::Forbidden => StatusCode::FORBIDDEN,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match status {
            StatusCode::UNAUTHORIZED => "unauthorized access",
            StatusCode::FORBIDDEN => "forbidden access",
            _ => {
                tracing::error!("Request failed: {}", self);
                "internal server error"
            }
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, Error>;
