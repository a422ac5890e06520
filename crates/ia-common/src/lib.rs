//! Shared runtime utilities for the access administration services.

pub mod logging;

pub use logging::{init_logging, LogFormat};
