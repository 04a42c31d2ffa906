//! The result of every API call.
//!
//! # Design
//! The wire envelope `{status, message, data?, meta?}` overlaps success and
//! failure in one object. It is decoded in two passes: first loosely, to read
//! the `status` discriminant, then `data`/`meta` are decoded into their typed
//! shapes only when `status` is true. A failure envelope with an odd `data`
//! field therefore still surfaces the server's message.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;

/// Pagination counters returned alongside list results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub total: u64,
    pub skipped: u64,
    pub per_page: u64,
    pub page: u64,
    pub page_count: u64,
}

/// Outcome of one API call. Callers match on the variant before touching
/// `data`.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse<T> {
    Success {
        message: String,
        data: T,
    },
    ListSuccess {
        message: String,
        data: T,
        meta: PaginationMeta,
    },
    Failure {
        message: String,
    },
}

impl<T> ApiResponse<T> {
    pub fn failure(message: impl Into<String>) -> Self {
        ApiResponse::Failure {
            message: message.into(),
        }
    }

    /// The wire `status` flag: `true` for both success variants.
    pub fn status(&self) -> bool {
        !matches!(self, ApiResponse::Failure { .. })
    }

    pub fn message(&self) -> &str {
        match self {
            ApiResponse::Success { message, .. }
            | ApiResponse::ListSuccess { message, .. }
            | ApiResponse::Failure { message } => message,
        }
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            ApiResponse::Success { data, .. } | ApiResponse::ListSuccess { data, .. } => Some(data),
            ApiResponse::Failure { .. } => None,
        }
    }

    pub fn meta(&self) -> Option<&PaginationMeta> {
        match self {
            ApiResponse::ListSuccess { meta, .. } => Some(meta),
            _ => None,
        }
    }

    /// Consume the response, yielding `data` or the failure message.
    pub fn into_data(self) -> Result<T, String> {
        match self {
            ApiResponse::Success { data, .. } | ApiResponse::ListSuccess { data, .. } => Ok(data),
            ApiResponse::Failure { message } => Err(message),
        }
    }
}

impl<T> From<ApiError> for ApiResponse<T> {
    fn from(err: ApiError) -> Self {
        ApiResponse::Failure {
            message: err.failure_message(),
        }
    }
}

/// Loosely-typed wire envelope.
#[derive(Debug, Deserialize)]
struct RawEnvelope {
    status: bool,
    #[serde(default)]
    message: String,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    meta: Option<Value>,
}

/// Decode a 2xx response body into an `ApiResponse`.
pub(crate) fn decode_envelope<T: DeserializeOwned>(body: &str) -> Result<ApiResponse<T>, ApiError> {
    let raw: RawEnvelope =
        serde_json::from_str(body).map_err(|e| ApiError::Deserialization(e.to_string()))?;

    if !raw.status {
        return Ok(ApiResponse::Failure {
            message: raw.message,
        });
    }

    let data = raw
        .data
        .ok_or_else(|| ApiError::Deserialization("success envelope without data".to_string()))?;
    let data: T =
        serde_json::from_value(data).map_err(|e| ApiError::Deserialization(e.to_string()))?;

    match raw.meta {
        Some(meta) => {
            let meta: PaginationMeta = serde_json::from_value(meta)
                .map_err(|e| ApiError::Deserialization(format!("meta: {e}")))?;
            Ok(ApiResponse::ListSuccess {
                message: raw.message,
                data,
                meta,
            })
        }
        None => Ok(ApiResponse::Success {
            message: raw.message,
            data,
        }),
    }
}

/// Extract the processor's message from an error body, if it has one.
pub(crate) fn decode_error_message(body: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct ErrorBody {
        message: Option<String>,
    }

    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.trim().is_empty())
}
