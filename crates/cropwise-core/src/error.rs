//! Centralized error types for Cropwise.
//!
//! Each crate keeps its own error enum; `AppError` gathers them so the
//! front end can show one user-friendly message while logs keep the detail.

use cropwise_conditions::{ConditionsError, LocationError, MissingFieldError};
use cropwise_match::{DataFormatError, RecommendError};
use thiserror::Error;

/// Top-level application error type.
///
/// Use `user_message()` to get a display-appropriate message.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Reference data error: {0}")]
    Data(#[from] DataFormatError),

    #[error("Recommendation error: {0}")]
    Recommend(#[from] RecommendError),

    #[error("Site conditions error: {0}")]
    Conditions(#[from] ConditionsError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl From<LocationError> for AppError {
    fn from(e: LocationError) -> Self {
        AppError::Conditions(e.into())
    }
}

impl From<MissingFieldError> for AppError {
    fn from(e: MissingFieldError) -> Self {
        AppError::Conditions(e.into())
    }
}

impl AppError {
    /// Returns a user-friendly message suitable for display.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Data(e) => e.user_message(),
            AppError::Recommend(e) => e.user_message(),
            AppError::Conditions(e) => e.user_message(),
            AppError::Config(e) => e.user_message(),
            AppError::Other(_) => "An unexpected error occurred. Please try again.",
        }
    }

    /// True for errors that make the whole process unusable, such as a
    /// broken reference file.
    pub fn is_fatal(&self) -> bool {
        matches!(self, AppError::Data(_) | AppError::Config(_))
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),

    #[error("Missing required setting: {0}")]
    MissingSetting(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::NotFound(_) => "Configuration not found. Using defaults.",
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
            ConfigError::ParseError(_) => "Configuration file is malformed. Check your settings.",
            ConfigError::MissingSetting(_) => "A required setting is missing. Check your settings.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cropwise_match::Measurement;

    #[test]
    fn test_missing_field_message_names_dataset() {
        let err: AppError = MissingFieldError(Measurement::Temperature).into();
        assert_eq!(err.user_message(), "No temperature data for this region!");
    }

    #[test]
    fn test_location_error_conversion() {
        let err: AppError = LocationError::LatitudeOutOfRange(95.0).into();
        assert!(matches!(
            err,
            AppError::Conditions(ConditionsError::Location(_))
        ));
        assert!(err.user_message().contains("coordinates"));
    }

    #[test]
    fn test_data_errors_are_fatal() {
        assert!(AppError::Data(DataFormatError::Empty).is_fatal());
        assert!(!AppError::Recommend(RecommendError::ZeroK).is_fatal());
    }

    #[test]
    fn test_user_message_propagation() {
        let err = AppError::Config(ConfigError::Invalid("top_k".into()));
        assert_eq!(err.user_message(), "Invalid configuration. Check your settings.");
    }
}
