//! Typed failures at the edges of the engine
//!
//! Only the I/O edge (dataset loading, config, CLI parsing) can fail. The
//! calculation engine in `reports` degrades locally and never returns errors.

use thiserror::Error;

/// Core error types for dataset and configuration handling
#[derive(Error, Debug)]
pub enum HoldingsError {
    #[error("parse error: {0}")]
    ParseError(String),

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("config error: {0}")]
    ConfigError(String),

    #[error("io error")]
    Io(#[from] std::io::Error),
}

/// Result type alias for holdings operations
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;
    use crate::importers::load_dataset;
    use crate::models::Month;

    #[test]
    fn test_bad_month_token_names_the_token() {
        let err = "2024-13".parse::<Month>().unwrap_err();
        assert!(matches!(err, HoldingsError::ParseError(_)));
        assert_eq!(err.to_string(), "parse error: invalid month token '2024-13'");
    }

    #[test]
    fn test_missing_dataset_keeps_io_source() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = load_dataset(dir.path().join("absent.json")).unwrap_err();

        assert!(err.to_string().starts_with("Failed to read dataset"));
        let io = err
            .downcast_ref::<HoldingsError>()
            .expect("io failure is typed");
        assert!(matches!(io, HoldingsError::Io(e) if e.kind() == std::io::ErrorKind::NotFound));
    }

    #[test]
    fn test_config_type_mismatch_is_config_error() {
        let err = parse_config("decimals = \"two\"").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<HoldingsError>(),
            Some(HoldingsError::ConfigError(_))
        ));
    }
}
