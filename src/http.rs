//! Shared HTTP client, headers, and status-to-error mapping.

use std::sync::OnceLock;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;

use crate::error::{ClimaError, ErrorCode, ErrorDetails};

static SHARED_CLIENT: OnceLock<reqwest::Client> = OnceLock::new();

/// Header selecting the v2 Assistants API surface.
pub const ASSISTANTS_BETA: &str = "assistants=v2";

/// Get (or create) the shared reqwest client.
pub fn shared_client() -> &'static reqwest::Client {
    SHARED_CLIENT.get_or_init(|| {
        reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .pool_max_idle_per_host(10)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new())
    })
}

/// Build headers for the Assistants API: bearer auth plus the beta opt-in.
pub fn assistant_headers(api_key: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert("OpenAI-Beta", HeaderValue::from_static(ASSISTANTS_BETA));
    if let Ok(val) = HeaderValue::from_str(&format!("Bearer {api_key}")) {
        headers.insert(AUTHORIZATION, val);
    }
    headers
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    code: Option<String>,
    param: Option<String>,
}

/// Turn a non-success status and its body into a [`ClimaError`].
pub fn status_to_error(status: u16, body: &str) -> ClimaError {
    let parsed = serde_json::from_str::<ErrorEnvelope>(body).ok();
    let message = parsed
        .as_ref()
        .and_then(|e| e.error.message.clone())
        .unwrap_or_else(|| body.to_string());

    match status {
        401 | 403 => ClimaError::Authentication(message),
        _ => match parsed {
            Some(envelope) => {
                let details = ErrorDetails {
                    code: Some(ErrorCode::from_provider(
                        envelope.error.code.as_deref(),
                        envelope.error.kind.as_deref(),
                    )),
                    provider_code: envelope.error.code,
                    param: envelope.error.param,
                };
                ClimaError::api_with_details(status, message, details)
            }
            None => ClimaError::api(status, message),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_maps_to_authentication() {
        let err = status_to_error(
            401,
            r#"{"error":{"message":"Incorrect API key provided","type":"invalid_request_error","code":"invalid_api_key"}}"#,
        );
        match err {
            ClimaError::Authentication(message) => {
                assert_eq!(message, "Incorrect API key provided")
            }
            other => panic!("expected authentication error, got {other:?}"),
        }
    }

    #[test]
    fn structured_body_populates_details() {
        let err = status_to_error(
            404,
            r#"{"error":{"message":"No assistant found","type":"invalid_request_error","param":"assistant_id","code":null}}"#,
        );
        match err {
            ClimaError::Api {
                status,
                message,
                details: Some(details),
            } => {
                assert_eq!(status, 404);
                assert_eq!(message, "No assistant found");
                assert_eq!(details.code, Some(ErrorCode::InvalidRequest));
                assert_eq!(details.param.as_deref(), Some("assistant_id"));
            }
            other => panic!("expected api error with details, got {other:?}"),
        }
    }

    #[test]
    fn plain_body_is_kept_as_message() {
        let err = status_to_error(502, "bad gateway");
        assert!(matches!(
            err,
            ClimaError::Api { status: 502, ref message, details: None } if message == "bad gateway"
        ));
    }

    #[test]
    fn headers_carry_auth_and_beta() {
        let headers = assistant_headers("sk-test");
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer sk-test");
        assert_eq!(headers.get("OpenAI-Beta").unwrap(), ASSISTANTS_BETA);
    }
}
