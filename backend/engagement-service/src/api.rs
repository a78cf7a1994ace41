/// Response envelopes exposed to the routing layer
///
/// Success payloads are `{status, data, message, success}`; failures are
/// `{status, message, errors, success}` with HTTP-style codes taken from the
/// error taxonomy.
use serde::Serialize;

use crate::error::AppError;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub status: u16,
    pub data: T,
    pub message: String,
    pub success: bool,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            status: 200,
            data,
            message: message.into(),
            success: true,
        }
    }

    pub fn created(data: T, message: impl Into<String>) -> Self {
        Self {
            status: 201,
            data,
            message: message.into(),
            success: true,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiFailure {
    pub status: u16,
    pub message: String,
    pub errors: Vec<String>,
    pub success: bool,
}

impl From<&AppError> for ApiFailure {
    fn from(err: &AppError) -> Self {
        // Store detail stays in the logs; callers get a stable kind + message
        let message = match err {
            AppError::Database(_) => "internal storage error".to_string(),
            other => other.to_string(),
        };

        Self {
            status: err.status_code(),
            message,
            errors: Vec::new(),
            success: false,
        }
    }
}

impl From<AppError> for ApiFailure {
    fn from(err: AppError) -> Self {
        ApiFailure::from(&err)
    }
}
