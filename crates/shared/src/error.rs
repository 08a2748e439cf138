use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{domain::ContactField, protocol::FIELDS_REQUIRED_MESSAGE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Validation,
    MalformedBody,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{code:?}: {message}")]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<ContactField>,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            missing: Vec::new(),
        }
    }

    /// Rejection for a submission with empty fields. The message is fixed regardless of which
    /// fields are missing; `missing` is kept for logging only.
    pub fn fields_required(missing: Vec<ContactField>) -> Self {
        Self {
            code: ErrorCode::Validation,
            message: FIELDS_REQUIRED_MESSAGE.to_string(),
            missing,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown contact form field '{0}'")]
pub struct UnknownField(pub String);
