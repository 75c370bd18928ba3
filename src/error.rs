//! Error types and GraphQL error response envelopes.

use crate::depth::DepthLimitExceeded;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;

/// Kinds of error a client can see in the `errors` array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorType {
    /// Field nesting exceeds the depth limit
    DepthLimitExceeded,
    /// GraphQL syntax error
    ParseError,
    /// Invalid request format
    InvalidRequest,
    /// The execution engine failed or could not be reached
    ExecutionError,
}

impl ErrorType {
    /// Get the type as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DepthLimitExceeded => "DepthLimitExceeded",
            Self::ParseError => "ParseError",
            Self::InvalidRequest => "InvalidRequest",
            Self::ExecutionError => "ExecutionError",
        }
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An error reported back to the client in place of execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestError {
    #[serde(rename = "type")]
    pub error_type: ErrorType,
    pub message: String,
}

impl RequestError {
    pub fn new(error_type: ErrorType, message: impl Into<String>) -> Self {
        Self {
            error_type,
            message: message.into(),
        }
    }

    pub fn parse_error(message: &str) -> Self {
        Self::new(ErrorType::ParseError, message)
    }

    pub fn invalid_request(message: &str) -> Self {
        Self::new(ErrorType::InvalidRequest, message)
    }

    pub fn execution_error(message: &str) -> Self {
        Self::new(ErrorType::ExecutionError, message)
    }
}

impl From<DepthLimitExceeded> for RequestError {
    fn from(err: DepthLimitExceeded) -> Self {
        Self::new(ErrorType::DepthLimitExceeded, err.to_string())
    }
}

/// Service errors.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Upstream error: {0}")]
    Upstream(#[from] reqwest::Error),

    #[error("Execution error: {0}")]
    Execution(String),
}

/// Build the error envelope returned instead of an execution result.
///
/// Shaped as `{ "data": null, "errors": [{ "type", "message" }] }` and sent with
/// HTTP 200 for errors the client caused in the query itself.
pub fn graphql_error_response(errors: &[RequestError]) -> Value {
    json!({
        "data": null,
        "errors": errors.iter().map(|e| json!({
            "type": e.error_type.as_str(),
            "message": e.message,
        })).collect::<Vec<_>>()
    })
}
