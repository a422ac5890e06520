//! Request extractors

use std::convert::Infallible;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::usecase::{ExecutionContext, TracingContext};

/// Execution context built from the tracing headers of the request.
///
/// No credentials are checked: `X-Principal-ID` is taken at face value and
/// only recorded for audit and logging.
pub struct RequestContext(pub ExecutionContext);

#[async_trait]
impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let tracing = TracingContext::from_headers(&parts.headers);
        Ok(RequestContext(ExecutionContext::from_tracing_context(&tracing)))
    }
}
