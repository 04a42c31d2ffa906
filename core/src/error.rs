//! Error types for the Paystack client.
//!
//! # Design
//! `ApiError` is internal plumbing for the dispatcher: each step returns
//! `Result<_, ApiError>` and the dispatch boundary folds the error into an
//! `ApiResponse::Failure`. Credential, validation and remote errors keep
//! their message. Everything else collapses to the generic
//! "An unexpected error occurred" so transport internals never reach callers.

use thiserror::Error;

use crate::http::TransportError;
use crate::schema::Violations;

/// Message returned for any failure that carries no processor-formatted body.
pub const UNEXPECTED_ERROR_MESSAGE: &str = "An unexpected error occurred";

/// Errors raised while preparing, sending, or decoding a request.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The secret key is missing or shorter than the minimum length.
    #[error("{0}")]
    InvalidCredential(String),

    /// The outgoing payload or path parameters broke one or more schema rules.
    #[error("validation error: {0}")]
    Validation(Violations),

    /// A path template referenced a parameter the operation did not supply.
    #[error("missing path parameter `{0}`")]
    MissingPathParam(String),

    /// The processor answered with a structured error message.
    #[error("{0}")]
    Remote(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The response body did not match the expected envelope.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl ApiError {
    /// The message surfaced to callers in `ApiResponse::Failure`.
    pub fn failure_message(&self) -> String {
        match self {
            ApiError::InvalidCredential(_)
            | ApiError::Validation(_)
            | ApiError::MissingPathParam(_)
            | ApiError::Remote(_) => self.to_string(),
            ApiError::Serialization(_) | ApiError::Deserialization(_) | ApiError::Transport(_) => {
                UNEXPECTED_ERROR_MESSAGE.to_string()
            }
        }
    }
}

/// Errors raised while building a client configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    MissingEnv(&'static str),

    #[error("invalid base url `{url}`: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_joins_violations() {
        let err = ApiError::Validation(Violations::from(vec![
            "The email is required".to_string(),
            "The amount is required".to_string(),
        ]));
        assert_eq!(
            err.failure_message(),
            "validation error: The email is required, The amount is required"
        );
    }

    #[test]
    fn remote_message_is_passed_through() {
        let err = ApiError::Remote("Invalid key".to_string());
        assert_eq!(err.failure_message(), "Invalid key");
    }

    #[test]
    fn transport_details_are_hidden() {
        let err = ApiError::from(TransportError::Request("connection reset by peer".to_string()));
        assert_eq!(err.failure_message(), UNEXPECTED_ERROR_MESSAGE);
        assert!(err.to_string().contains("connection reset"));

        let err = ApiError::Deserialization("expected value at line 1".to_string());
        assert_eq!(err.failure_message(), UNEXPECTED_ERROR_MESSAGE);
    }
}
