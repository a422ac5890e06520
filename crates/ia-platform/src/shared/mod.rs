//! Shared infrastructure

pub mod api_common;
pub mod error;
pub mod middleware;
pub mod tsid;

pub use error::{PlatformError, Result};
pub use tsid::TsidGenerator;
