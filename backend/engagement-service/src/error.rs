/// Error types for the engagement service
use thiserror::Error;

/// Result type alias for service operations
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error taxonomy
///
/// Every failure carries a stable kind and a human-readable message; store
/// errors never leak driver-level detail to callers.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("no data: {0}")]
    NoData(String),

    #[error("unavailable: {0}")]
    Unavailable(String),

    #[error("database error: {0}")]
    Database(String),
}

impl AppError {
    /// HTTP-style status code for the response envelope
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::InvalidArgument(_) => 400,
            AppError::Unauthenticated(_) => 401,
            AppError::Forbidden(_) => 403,
            AppError::NotFound(_) | AppError::NoData(_) => 404,
            AppError::Conflict(_) => 409,
            AppError::Database(_) => 500,
            AppError::Unavailable(_) => 503,
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            // Pool exhaustion and I/O timeouts are transient, not data errors
            sqlx::Error::PoolTimedOut => {
                AppError::Unavailable("timed out acquiring a database connection".to_string())
            }
            sqlx::Error::Io(e) if e.kind() == std::io::ErrorKind::TimedOut => {
                AppError::Unavailable("database I/O timed out".to_string())
            }
            other => {
                tracing::error!(error = %other, "database operation failed");
                AppError::Database(other.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::InvalidArgument("x".into()).status_code(), 400);
        assert_eq!(AppError::Unauthenticated("x".into()).status_code(), 401);
        assert_eq!(AppError::Forbidden("x".into()).status_code(), 403);
        assert_eq!(AppError::NotFound("x".into()).status_code(), 404);
        assert_eq!(AppError::NoData("x".into()).status_code(), 404);
        assert_eq!(AppError::Conflict("x".into()).status_code(), 409);
        assert_eq!(AppError::Database("x".into()).status_code(), 500);
        assert_eq!(AppError::Unavailable("x".into()).status_code(), 503);
    }

    #[test]
    fn test_pool_timeout_maps_to_unavailable() {
        let err = AppError::from(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, AppError::Unavailable(_)));
    }

    #[test]
    fn test_row_not_found_maps_to_database() {
        let err = AppError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, AppError::Database(_)));
    }
}
