//! API-level error taxonomy mapped to response status codes and JSON payloads.

use http::{HeaderMap, StatusCode};
use serde_json::{json, Value};
use thiserror::Error;

use crate::response::Response;

/// Errors that the simulated API reports to its callers as HTTP responses.
///
/// Transport-level faults (malformed request JSON, passthrough network
/// failures) are not part of this taxonomy; they travel as `anyhow::Error`
/// through the transport future instead of becoming synthetic responses.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Missing or incorrect bearer credential.
    #[error("Invalid API Key provided.")]
    Authentication,

    /// A required creation field is missing or empty.
    #[error("Missing required parameters.")]
    MissingParameters,

    /// The referenced user id does not exist.
    #[error("No such user: {0}")]
    NoSuchUser(String),

    /// No path/method rule matched the request.
    #[error("Endpoint not found")]
    UnknownEndpoint,
}

impl ApiError {
    /// Status code reported for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Authentication => StatusCode::UNAUTHORIZED,
            ApiError::MissingParameters => StatusCode::BAD_REQUEST,
            ApiError::NoSuchUser(_) => StatusCode::NOT_FOUND,
            ApiError::UnknownEndpoint => StatusCode::NOT_FOUND,
        }
    }

    /// Machine-readable error type carried in the payload.
    ///
    /// The unmatched-endpoint error deliberately has none; its payload shape
    /// is asymmetric with the others and callers may depend on that.
    pub fn error_type(&self) -> Option<&'static str> {
        match self {
            ApiError::Authentication => Some("authentication_error"),
            ApiError::MissingParameters | ApiError::NoSuchUser(_) => Some("invalid_request_error"),
            ApiError::UnknownEndpoint => None,
        }
    }

    /// Structured JSON payload for this error.
    pub fn payload(&self) -> Value {
        match self.error_type() {
            Some(kind) => json!({ "error": { "type": kind, "message": self.to_string() } }),
            None => json!({ "error": { "message": self.to_string() } }),
        }
    }

    /// Render the error as a complete response.
    pub fn into_response(self) -> Response {
        Response::build(Some(&self.payload()), self.status(), HeaderMap::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_and_type_mapping() {
        assert_eq!(ApiError::Authentication.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::MissingParameters.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::NoSuchUser("user_9".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(ApiError::UnknownEndpoint.status(), StatusCode::NOT_FOUND);

        assert_eq!(
            ApiError::Authentication.error_type(),
            Some("authentication_error")
        );
        assert_eq!(
            ApiError::NoSuchUser("user_9".into()).error_type(),
            Some("invalid_request_error")
        );
        assert_eq!(ApiError::UnknownEndpoint.error_type(), None);
    }

    #[test]
    fn unknown_endpoint_payload_has_no_type_field() {
        let payload = ApiError::UnknownEndpoint.payload();
        assert_eq!(payload["error"]["message"], "Endpoint not found");
        assert!(payload["error"].get("type").is_none());
    }

    #[test]
    fn not_found_message_includes_id() {
        let payload = ApiError::NoSuchUser("user_999".into()).payload();
        assert_eq!(payload["error"]["message"], "No such user: user_999");
        assert_eq!(payload["error"]["type"], "invalid_request_error");
    }
}
