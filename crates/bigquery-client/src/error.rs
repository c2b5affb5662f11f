//! Error types for the BigQuery REST client.

use serde::Deserialize;
use thiserror::Error;

/// Errors returned by BigQuery API calls.
#[derive(Error, Debug)]
pub enum BigQueryError {
    /// The API answered with a non-success HTTP status.
    #[error("BigQuery API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Transport-level failure (DNS, TLS, connection reset, body decoding).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Failed to obtain an access token from Application Default Credentials.
    #[error("Authentication error: {0}")]
    Auth(#[from] gcp_auth::Error),

    /// A response body could not be parsed.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl BigQueryError {
    /// Whether the API reported that the requested resource does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, BigQueryError::Api { status: 404, .. })
    }

    /// Build an `Api` error from a failed response's status and raw body.
    ///
    /// Google APIs wrap failures as `{"error": {"code": .., "message": ..}}`;
    /// anything else is kept verbatim.
    pub fn from_response_body(status: u16, body: &str) -> Self {
        let message = match serde_json::from_str::<ErrorEnvelope>(body) {
            Ok(envelope) => match envelope.error.status {
                Some(reason) => format!("{} [{}]", envelope.error.message, reason),
                None => envelope.error.message,
            },
            Err(_) if body.trim().is_empty() => "empty response body".to_string(),
            Err(_) => body.trim().to_string(),
        };
        BigQueryError::Api { status, message }
    }
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
    #[serde(default)]
    status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_google_error_envelope() {
        let body = r#"{
            "error": {
                "code": 404,
                "message": "Not found: Table my-project:ds.bqwrite_test",
                "errors": [{"message": "Not found", "domain": "global", "reason": "notFound"}],
                "status": "NOT_FOUND"
            }
        }"#;
        let err = BigQueryError::from_response_body(404, body);
        assert!(err.is_not_found());
        assert_eq!(
            err.to_string(),
            "BigQuery API error (404): Not found: Table my-project:ds.bqwrite_test [NOT_FOUND]"
        );
    }

    #[test]
    fn test_non_json_body_is_kept() {
        let err = BigQueryError::from_response_body(502, "Bad Gateway\n");
        assert!(!err.is_not_found());
        assert_eq!(err.to_string(), "BigQuery API error (502): Bad Gateway");
    }

    #[test]
    fn test_empty_body() {
        let err = BigQueryError::from_response_body(403, "");
        assert_eq!(err.to_string(), "BigQuery API error (403): empty response body");
    }
}
