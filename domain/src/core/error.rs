//! Domain error types

use thiserror::Error;

/// Errors raised by domain value object construction
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid model identifier: {0}")]
    InvalidModelIdentifier(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_model_identifier_display() {
        let error = DomainError::InvalidModelIdentifier("gpt-5.2".to_string());
        assert_eq!(error.to_string(), "Invalid model identifier: gpt-5.2");
    }
}
