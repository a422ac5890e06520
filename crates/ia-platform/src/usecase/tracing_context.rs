//! Tracing Context
//!
//! Correlation, causation and principal ids carried in on request headers.

use axum::http::HeaderMap;

pub const CORRELATION_ID_HEADER: &str = "x-correlation-id";
pub const CAUSATION_ID_HEADER: &str = "x-causation-id";
pub const PRINCIPAL_ID_HEADER: &str = "x-principal-id";

/// Ids supplied by the caller, all optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TracingContext {
    correlation_id: Option<String>,
    causation_id: Option<String>,
    principal_id: Option<String>,
}

impl TracingContext {
    pub fn new(
        correlation_id: Option<String>,
        causation_id: Option<String>,
        principal_id: Option<String>,
    ) -> Self {
        Self {
            correlation_id: correlation_id.and_then(non_blank),
            causation_id: causation_id.and_then(non_blank),
            principal_id: principal_id.and_then(non_blank),
        }
    }

    /// Read the tracing headers. Missing, blank or non-ASCII values are ignored.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let read = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };

        Self::new(
            read(CORRELATION_ID_HEADER),
            read(CAUSATION_ID_HEADER),
            read(PRINCIPAL_ID_HEADER),
        )
    }

    pub fn correlation_id(&self) -> Option<&str> {
        self.correlation_id.as_deref()
    }

    pub fn causation_id(&self) -> Option<&str> {
        self.causation_id.as_deref()
    }

    pub fn principal_id(&self) -> Option<&str> {
        self.principal_id.as_deref()
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(CORRELATION_ID_HEADER, HeaderValue::from_static("corr-1"));
        headers.insert(PRINCIPAL_ID_HEADER, HeaderValue::from_static(" ops@acme.local "));

        let ctx = TracingContext::from_headers(&headers);
        assert_eq!(ctx.correlation_id(), Some("corr-1"));
        assert_eq!(ctx.causation_id(), None);
        assert_eq!(ctx.principal_id(), Some("ops@acme.local"));
    }

    #[test]
    fn test_blank_headers_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(CORRELATION_ID_HEADER, HeaderValue::from_static("   "));

        assert_eq!(TracingContext::from_headers(&headers), TracingContext::default());
    }
}
