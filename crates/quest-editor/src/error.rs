//! Editor error taxonomy and its HTTP mapping.

use serde_json::{Value, json};
use thiserror::Error;

use quest_model::ModelError;
use quest_store::StoreError;

/// Per-request failure of an editor operation.
///
/// Every variant maps to an HTTP status and a response payload; none is
/// fatal to the process. Validation failures are always raised before any
/// mutation is applied.
#[derive(Debug, Error)]
pub enum EditorError {
    /// Malformed input the user can correct.
    #[error("{message}")]
    Validation { message: String },

    /// The request was built against an outdated version; the user must
    /// refresh and retry.
    #[error("{message}")]
    StaleVersion { message: String },

    /// The actor may not perform this operation.
    #[error("User {username} is not authorized to {action}")]
    Authorization { username: String, action: String },

    /// Unknown exploration id or version.
    #[error("{message}")]
    NotFound { message: String },
}

impl EditorError {
    pub fn validation(message: impl Into<String>) -> Self {
        EditorError::Validation {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        EditorError::NotFound {
            message: message.into(),
        }
    }

    pub(crate) fn unauthorized(username: &str, action: &str) -> Self {
        EditorError::Authorization {
            username: username.to_string(),
            action: action.to_string(),
        }
    }

    /// The HTTP status an HTTP frontend should answer with.
    pub fn http_status(&self) -> u16 {
        match self {
            EditorError::Validation { .. } | EditorError::StaleVersion { .. } => 400,
            EditorError::Authorization { .. } => 401,
            EditorError::NotFound { .. } => 404,
        }
    }

    /// The JSON body an HTTP frontend should answer with.
    pub fn payload(&self) -> Value {
        match self {
            EditorError::Authorization { .. } => json!({ "code": 401 }),
            other => json!({ "error": other.to_string() }),
        }
    }
}

impl From<ModelError> for EditorError {
    fn from(error: ModelError) -> Self {
        EditorError::Validation {
            message: error.to_string(),
        }
    }
}

impl From<StoreError> for EditorError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound { .. } => EditorError::NotFound {
                message: error.to_string(),
            },
            other => EditorError::Validation {
                message: other.to_string(),
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, EditorError>;
