//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the application.
//! Core components (password hashing, tokens, identity resolution, task access and the
//! storage layer) all surface their failures through it, and the HTTP layer turns it into
//! a response via `actix_web::error::ResponseError`.
//!
//! Server-side failures are logged and replaced by a generic body so that hashes,
//! secrets and storage internals never reach the caller.

use actix_web::{
    error::ResponseError,
    http::{header, StatusCode},
    HttpResponse,
};
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

use crate::auth::token::TokenError;
use crate::store::StoreError;

/// Message returned for every authentication failure on protected routes.
pub const CREDENTIALS_MESSAGE: &str = "Could not validate credentials";

/// Message returned when a task does not exist or belongs to someone else.
pub const TASK_NOT_FOUND_MESSAGE: &str = "Task not found or access denied";

const INTERNAL_MESSAGE: &str = "Internal server error";

/// Represents all possible errors that can occur within the application.
#[derive(Debug, PartialEq, Eq)]
pub enum AppError {
    /// Missing, invalid or expired credentials on a protected route (HTTP 401).
    Unauthorized(String),
    /// A malformed request, a duplicate signup or a failed login (HTTP 400).
    BadRequest(String),
    /// The requested resource was not found or is not visible to the caller (HTTP 404).
    NotFound(String),
    /// An unexpected server-side error (HTTP 500).
    InternalServerError(String),
    /// A failure reported by the storage backend (HTTP 500).
    DatabaseError(String),
    /// Input that failed validation (HTTP 400).
    ValidationError(String),
}

impl AppError {
    /// The uniform rejection used by the identity resolver and the auth middleware.
    pub fn unauthenticated() -> Self {
        AppError::Unauthorized(CREDENTIALS_MESSAGE.into())
    }

    /// The rejection for a task that is missing or owned by another user.
    pub fn task_not_found() -> Self {
        AppError::NotFound(TASK_NOT_FOUND_MESSAGE.into())
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

/// Converts `AppError` variants into `HttpResponse` objects.
impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) | AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InternalServerError(_) | AppError::DatabaseError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::Unauthorized(msg) => HttpResponse::Unauthorized()
                .insert_header((header::WWW_AUTHENTICATE, "Bearer"))
                .json(json!({ "error": msg })),
            AppError::BadRequest(msg) | AppError::ValidationError(msg) => {
                HttpResponse::BadRequest().json(json!({ "error": msg }))
            }
            AppError::NotFound(msg) => HttpResponse::NotFound().json(json!({ "error": msg })),
            // The detail stays in the log; the caller only learns that something broke.
            AppError::InternalServerError(_) | AppError::DatabaseError(_) => {
                log::error!("{}", self);
                HttpResponse::InternalServerError().json(json!({ "error": INTERNAL_MESSAGE }))
            }
        }
    }
}

/// Converts `validator::ValidationErrors` into `AppError::ValidationError`.
///
/// The detailed validation messages are preserved.
impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::ValidationError(error.to_string())
    }
}

/// Converts `bcrypt::BcryptError` into `AppError::InternalServerError`.
impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::InternalServerError(format!("Password hashing failed: {}", error))
    }
}

/// Converts `jsonwebtoken::errors::Error` into `AppError::InternalServerError`.
///
/// Only reached while signing; verification failures go through `TokenError`.
impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(error: jsonwebtoken::errors::Error) -> AppError {
        AppError::InternalServerError(format!("Failed to generate token: {}", error))
    }
}

/// Every token failure collapses into the same client-visible rejection.
impl From<TokenError> for AppError {
    fn from(_: TokenError) -> AppError {
        AppError::unauthenticated()
    }
}

impl From<StoreError> for AppError {
    fn from(error: StoreError) -> AppError {
        match error {
            StoreError::DuplicateKey => AppError::BadRequest("Duplicate key".into()),
            StoreError::Backend(msg) => AppError::DatabaseError(msg),
        }
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(error: tokio::task::JoinError) -> AppError {
        AppError::InternalServerError(format!("Blocking task failed: {}", error))
    }
}
