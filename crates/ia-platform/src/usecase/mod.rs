//! Operation context: tracing ids, acting principal and cancellation.

pub mod execution_context;
pub mod tracing_context;

pub use execution_context::{ExecutionContext, ANONYMOUS_PRINCIPAL, SYSTEM_PRINCIPAL};
pub use tracing_context::TracingContext;
