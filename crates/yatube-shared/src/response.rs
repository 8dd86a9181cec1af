//! Error page payload.

use serde::{Deserialize, Serialize};

/// What an error page tells the visitor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// The HTTP status code.
    pub status: u16,

    /// A short, human-readable summary of the problem type.
    pub title: String,

    /// A human-readable explanation specific to this occurrence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// Id of the failed request, for matching the page against server logs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl ErrorResponse {
    pub fn new(status: u16, title: impl Into<String>) -> Self {
        Self {
            status,
            title: title.into(),
            detail: None,
            request_id: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    // Common error constructors
    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(400, "Bad Request").with_detail(detail)
    }

    pub fn forbidden() -> Self {
        Self::new(403, "Forbidden")
    }

    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::new(404, "Page not found").with_detail(detail)
    }

    pub fn too_many_requests(retry_after_secs: u64) -> Self {
        Self::new(429, "Too Many Requests")
            .with_detail(format!("Try again in {retry_after_secs} seconds."))
    }

    pub fn internal_error() -> Self {
        Self::new(500, "Internal Server Error")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_id_only_serialized_when_known() {
        let anonymous = serde_json::to_value(ErrorResponse::internal_error()).unwrap();
        assert!(anonymous.get("request_id").is_none());

        let tagged =
            serde_json::to_value(ErrorResponse::not_found("nope").with_request_id("req-1")).unwrap();
        assert_eq!(tagged["request_id"], "req-1");
        assert_eq!(tagged["status"], 404);
    }
}
