//! # Application Error Types
//!
//! This module defines common error types used throughout the receipt
//! processing engine. Only two situations are fatal: an invalid engine
//! configuration and a structurally invalid food reference table, both of
//! which can only occur at startup. The per-scan pipeline never fails.

use std::fmt;

/// General application error type for consistent error handling
#[derive(Debug, Clone, PartialEq)]
pub enum AppError {
    /// Configuration validation errors
    Config(String),
    /// Food reference table integrity errors (alias conflicts, empty entries)
    Table(String),
    /// File system errors while loading a table file
    Io(String),
    /// Internal application errors
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(msg) => write!(f, "[CONFIG] {}", msg),
            AppError::Table(msg) => write!(f, "[TABLE] {}", msg),
            AppError::Io(msg) => write!(f, "[IO] {}", msg),
            AppError::Internal(msg) => write!(f, "[INTERNAL] {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(err.to_string())
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_prefixes() {
        assert_eq!(
            AppError::Config("bad threshold".to_string()).to_string(),
            "[CONFIG] bad threshold"
        );
        assert_eq!(
            AppError::Table("alias conflict".to_string()).to_string(),
            "[TABLE] alias conflict"
        );
    }

    #[test]
    fn test_from_anyhow() {
        let err: AppError = anyhow::anyhow!("boom").into();
        assert_eq!(err, AppError::Internal("boom".to_string()));
    }
}
