//! Execution Context
//!
//! Context for one administration operation. Carries tracing ids, the
//! acting principal and the cancellation signal through the operation.

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;
use tracing::Span;

use super::tracing_context::TracingContext;
use crate::shared::tsid::TsidGenerator;

/// Principal recorded when the caller does not identify itself
pub const ANONYMOUS_PRINCIPAL: &str = "anonymous";

/// Principal used for operations the platform starts on its own (seeding)
pub const SYSTEM_PRINCIPAL: &str = "system";

/// Context for a single operation execution.
///
/// - `execution_id` is fresh for every execution
/// - `correlation_id` follows the request across services
/// - `causation_id` names whatever triggered this execution, if known
/// - `principal_id` is recorded in audit entries
///
/// Cancelling the token stops the operation at its next checkpoint. A
/// store write that has already been dispatched runs to completion.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    pub execution_id: String,
    pub correlation_id: String,
    pub causation_id: Option<String>,
    pub principal_id: String,
    pub initiated_at: DateTime<Utc>,
    cancellation: CancellationToken,
}

impl ExecutionContext {
    /// Fresh context; the correlation id starts out as the execution id.
    pub fn create(principal_id: impl Into<String>) -> Self {
        let execution_id = TsidGenerator::generate_prefixed("exec");
        Self {
            correlation_id: execution_id.clone(),
            execution_id,
            causation_id: None,
            principal_id: principal_id.into(),
            initiated_at: Utc::now(),
            cancellation: CancellationToken::new(),
        }
    }

    /// Context for the platform acting on its own behalf.
    pub fn system() -> Self {
        Self::create(SYSTEM_PRINCIPAL)
    }

    /// Build from caller-supplied ids, falling back to the anonymous principal.
    pub fn from_tracing_context(tracing_context: &TracingContext) -> Self {
        let mut ctx = Self::create(
            tracing_context
                .principal_id()
                .unwrap_or(ANONYMOUS_PRINCIPAL),
        );
        if let Some(correlation_id) = tracing_context.correlation_id() {
            ctx.correlation_id = correlation_id.to_string();
        }
        ctx.causation_id = tracing_context.causation_id().map(str::to_string);
        ctx
    }

    /// Fresh context joined to an existing correlation id.
    pub fn with_correlation(
        principal_id: impl Into<String>,
        correlation_id: impl Into<String>,
    ) -> Self {
        let mut ctx = Self::create(principal_id);
        ctx.correlation_id = correlation_id.into();
        ctx
    }

    /// Same execution, driven by a different cause.
    pub fn with_causation(&self, causation_id: impl Into<String>) -> Self {
        Self {
            causation_id: Some(causation_id.into()),
            initiated_at: Utc::now(),
            ..self.clone()
        }
    }

    /// Replace the cancellation token, typically with a child of a
    /// request- or shutdown-scoped token.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancellation
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Span that tags everything logged during `operation` with this context.
    pub fn span(&self, operation: &'static str) -> Span {
        tracing::info_span!(
            "access_op",
            operation,
            execution_id = %self.execution_id,
            correlation_id = %self.correlation_id,
            principal_id = %self.principal_id,
        )
    }
}
