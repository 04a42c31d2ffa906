//! The secret key used to authenticate against the API.

use std::fmt;

use crate::error::ApiError;

/// Shortest secret key accepted before any request is attempted.
pub const MIN_SECRET_KEY_LEN: usize = 10;

/// A secret API key. `Debug` never prints the key itself.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey(String);

impl SecretKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Check the key against the length rule. Runs before every request.
    /// An empty key is just a short key.
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.0.chars().count() < MIN_SECRET_KEY_LEN {
            return Err(ApiError::InvalidCredential("Invalid secret key".to_string()));
        }
        Ok(())
    }

    pub(crate) fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(***)")
    }
}

impl From<&str> for SecretKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for SecretKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}
