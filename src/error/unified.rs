//! Error classification shared by the assistant and weather clients.

use serde::{Deserialize, Serialize};

/// Machine-readable error code reported by the assistant service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidApiKey,
    InsufficientQuota,
    RateLimitExceeded,
    NotFound,
    InvalidRequest,
    ServerError,
    Unknown,
}

impl ErrorCode {
    /// Map the service's `code`/`type` strings onto a known code.
    pub fn from_provider(code: Option<&str>, kind: Option<&str>) -> Self {
        match (code, kind) {
            (Some("invalid_api_key"), _) => Self::InvalidApiKey,
            (Some("insufficient_quota"), _) => Self::InsufficientQuota,
            (Some("rate_limit_exceeded"), _) => Self::RateLimitExceeded,
            (_, Some("invalid_request_error")) => Self::InvalidRequest,
            (_, Some("not_found_error")) => Self::NotFound,
            (_, Some("server_error")) => Self::ServerError,
            _ => Self::Unknown,
        }
    }
}

/// Broad error category for routing recovery logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Authentication,
    RateLimit,
    Network,
    Timeout,
    Server,
    Api,
    Configuration,
    Serialization,
    ToolExecution,
    Unknown,
}

/// Structured details from an `{"error": {...}}` response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: Option<ErrorCode>,
    pub provider_code: Option<String>,
    pub param: Option<String>,
}

/// Suggested recovery action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoverySuggestion {
    RetryWithBackoff,
    CheckCredentials,
    CheckConfiguration,
    IncreaseTimeout,
    CheckToolImplementation,
    Abort,
}
