//! Provider types shared by HTTP clients

use std::fmt;

/// Errors that can occur while talking to a remote service.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// HTTP request failed before a response was received
    HttpError(String),
    /// Request exceeded the client timeout
    Timeout(String),
    /// Response could not be read
    InvalidResponse(String),
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::HttpError(msg) => write!(f, "HTTP error: {}", msg),
            ProviderError::Timeout(msg) => write!(f, "Request timed out: {}", msg),
            ProviderError::InvalidResponse(msg) => write!(f, "Invalid response: {}", msg),
        }
    }
}

impl std::error::Error for ProviderError {}

/// A fully-read HTTP response.
///
/// Non-2xx statuses are still responses; only transport failures surface as
/// [`ProviderError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Value of the `Content-Type` header, if present
    pub content_type: Option<String>,
    /// Response body
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Create a response with the given status and body.
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            content_type: None,
            body: body.into(),
        }
    }

    /// Create a `200 OK` response.
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self::new(200, body)
    }

    /// Synthetic `503` returned when neither the network nor the cache can serve a frame.
    pub fn service_unavailable() -> Self {
        Self::new(503, "Service unavailable").with_content_type("text/plain")
    }

    /// Set the content type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Borrow the body as UTF-8 text.
    pub fn text(&self) -> Result<&str, ProviderError> {
        std::str::from_utf8(&self.body)
            .map_err(|e| ProviderError::InvalidResponse(format!("body is not UTF-8: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_range() {
        assert!(HttpResponse::ok("x").is_success());
        assert!(HttpResponse::new(204, "").is_success());
        assert!(!HttpResponse::new(304, "").is_success());
        assert!(!HttpResponse::service_unavailable().is_success());
    }

    #[test]
    fn test_service_unavailable_body() {
        let resp = HttpResponse::service_unavailable();
        assert_eq!(resp.status, 503);
        assert_eq!(resp.text().unwrap(), "Service unavailable");
        assert_eq!(resp.content_type.as_deref(), Some("text/plain"));
    }

    #[test]
    fn test_text_rejects_invalid_utf8() {
        let resp = HttpResponse::ok(vec![0xff, 0xfe]);
        assert!(matches!(resp.text(), Err(ProviderError::InvalidResponse(_))));
    }

    #[test]
    fn test_error_display() {
        let err = ProviderError::Timeout("http://example.com".to_string());
        assert_eq!(err.to_string(), "Request timed out: http://example.com");
    }
}
