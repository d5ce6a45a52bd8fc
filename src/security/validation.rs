//! Request Validation Module
//!
//! Input checks and sanitization for chat requests.

use serde::Serialize;
use thiserror::Error;

use crate::error::AppError;

/// Validation error types
#[derive(Debug, Error, Clone, Serialize, PartialEq)]
pub enum ValidationError {
    #[error("Required field '{field}' is missing")]
    MissingField { field: String },

    #[error("Field '{field}' is too long (max: {max}, got: {got})")]
    TooLong {
        field: String,
        max: usize,
        got: usize,
    },

    #[error("Field '{field}' is not a valid UUID: {value}")]
    InvalidUuid { field: String, value: String },
}

impl ValidationError {
    pub fn field(&self) -> &str {
        match self {
            Self::MissingField { field } => field.as_str(),
            Self::TooLong { field, .. } => field.as_str(),
            Self::InvalidUuid { field, .. } => field.as_str(),
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err.to_string())
    }
}

/// Validation result type
pub type ValidationResult<T> = std::result::Result<T, ValidationError>;

/// Request validator
#[derive(Debug, Clone)]
pub struct RequestValidator {
    /// Maximum characters in one chat message
    max_message_length: usize,
}

impl RequestValidator {
    pub fn new(max_message_length: usize) -> Self {
        Self { max_message_length }
    }

    /// Validates a chat message and returns its sanitized form.
    pub fn validate_message(&self, field: &str, value: &str) -> ValidationResult<String> {
        let sanitized = Self::sanitize_string(value);
        if sanitized.is_empty() {
            return Err(ValidationError::MissingField {
                field: field.to_string(),
            });
        }

        let length = sanitized.chars().count();
        if length > self.max_message_length {
            return Err(ValidationError::TooLong {
                field: field.to_string(),
                max: self.max_message_length,
                got: length,
            });
        }

        Ok(sanitized)
    }

    /// Validate UUID format
    pub fn validate_uuid(field: &str, value: &str) -> ValidationResult<()> {
        match uuid::Uuid::parse_str(value) {
            Ok(_) => Ok(()),
            Err(_) => Err(ValidationError::InvalidUuid {
                field: field.to_string(),
                value: value.to_string(),
            }),
        }
    }

    /// Trims and strips control characters other than whitespace.
    pub fn sanitize_string(input: &str) -> String {
        input
            .trim()
            .chars()
            .filter(|c| !c.is_control() || c.is_whitespace())
            .collect()
    }
}
