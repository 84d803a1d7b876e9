use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::store::{unique_violation, UniqueKey};

/// Every failure a request can end with.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Incorrect username or password")]
    InvalidCredentials,

    #[error("Username already registered")]
    DuplicateUsername,

    #[error("Email already registered")]
    DuplicateEmail,

    #[error("Folder name already in use")]
    DuplicateFolderName,

    #[error("{0}")]
    Forbidden(&'static str),

    #[error("{0}")]
    InvalidReference(&'static str),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Unauthorized(&'static str),

    #[error("Invalid role {0:?}, expected \"parent\" or \"child\"")]
    InvalidRole(String),

    #[error("{0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidCredentials | AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::DuplicateUsername
            | AppError::DuplicateEmail
            | AppError::DuplicateFolderName => StatusCode::CONFLICT,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::InvalidReference(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidRole(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code for clients.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidCredentials => "invalid_credentials",
            AppError::DuplicateUsername => "duplicate_username",
            AppError::DuplicateEmail => "duplicate_email",
            AppError::DuplicateFolderName => "duplicate_folder_name",
            AppError::Forbidden(_) => "forbidden",
            AppError::InvalidReference(_) => "invalid_reference",
            AppError::NotFound(_) => "not_found",
            AppError::Unauthorized(_) => "unauthorized",
            AppError::InvalidRole(_) => "invalid_role",
            AppError::Validation(_) => "validation",
            AppError::Internal(_) => "internal",
        }
    }
}

impl From<UniqueKey> for AppError {
    fn from(key: UniqueKey) -> Self {
        match key {
            UniqueKey::Username => AppError::DuplicateUsername,
            UniqueKey::ParentEmail => AppError::DuplicateEmail,
            UniqueKey::FolderName => AppError::DuplicateFolderName,
        }
    }
}

impl AppError {
    /// Store failure as a domain error: unique violations become the matching
    /// conflict, anything else is internal.
    pub fn from_store(err: anyhow::Error) -> Self {
        match unique_violation(&err) {
            Some(key) => key.into(),
            None => AppError::Internal(err),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = match &self {
            AppError::Internal(e) => {
                error!(error = %e, "request failed");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(json!({ "error": self.code(), "detail": detail }))).into_response()
    }
}
