//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the client.
//! It centralizes error management, providing a consistent way to represent the
//! failure classes the client distinguishes: validation failures, rejected
//! credentials, server-reported errors, transport failures and a missing session.
//!
//! `From` implementations for `reqwest::Error`, `serde_json::Error`, `std::io::Error`
//! and `validator::ValidationErrors` allow easy conversion using the `?` operator.

use reqwest::StatusCode;
use std::fmt;
use validator::ValidationErrors;

/// Represents all possible errors that can occur within the client.
#[derive(Debug)]
pub enum AppError {
    /// Input failed a form rule. User-correctable, rendered inline.
    Validation(String),
    /// The backend rejected the credentials (HTTP 401 on login).
    Unauthorized(String),
    /// The backend answered with a non-2xx status.
    /// `message` is the server-provided reason when one was sent.
    Api { status: StatusCode, message: String },
    /// The request never produced a usable response (connect, body, decode).
    Network(String),
    /// No session token is stored. The front-end must navigate to login.
    MissingSession,
    /// Reading or writing local storage failed.
    Storage(String),
    /// A configuration value could not be parsed.
    Config(String),
}

impl AppError {
    /// The message meant for the user, without the category prefix.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(msg)
            | AppError::Unauthorized(msg)
            | AppError::Network(msg)
            | AppError::Storage(msg)
            | AppError::Config(msg) => msg.clone(),
            AppError::Api { message, .. } => message.clone(),
            AppError::MissingSession => "Please log in to continue".to_string(),
        }
    }

    /// `true` for failures that only require abandoning the current operation.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, AppError::MissingSession | AppError::Storage(_))
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Validation(msg) => write!(f, "Validation Error: {}", msg),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::Api { status, message } => write!(f, "API Error ({}): {}", status, message),
            AppError::Network(msg) => write!(f, "Network Error: {}", msg),
            AppError::MissingSession => write!(f, "Missing Session: no token stored"),
            AppError::Storage(msg) => write!(f, "Storage Error: {}", msg),
            AppError::Config(msg) => write!(f, "Configuration Error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

/// Converts `reqwest::Error` into `AppError`.
///
/// Errors that carry a status are kept as `AppError::Api`; everything else
/// (connect failures, body or decode failures) becomes `AppError::Network`.
impl From<reqwest::Error> for AppError {
    fn from(error: reqwest::Error) -> AppError {
        match error.status() {
            Some(status) => AppError::Api {
                status,
                message: error.to_string(),
            },
            None => AppError::Network(error.to_string()),
        }
    }
}

/// Converts `serde_json::Error` into `AppError::Storage`.
///
/// JSON is only (de)serialized by hand for the local storage snapshots.
impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> AppError {
        AppError::Storage(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> AppError {
        AppError::Storage(error.to_string())
    }
}

/// Converts `validator::ValidationErrors` into `AppError::Validation`.
///
/// The detailed validation messages are preserved.
impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::Validation(error.to_string())
    }
}
