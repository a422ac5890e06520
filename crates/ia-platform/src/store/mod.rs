//! Store plumbing shared by the user, role and audit aggregates.

pub mod error;
pub mod indexes;
pub mod memory;

pub use error::{StoreError, StoreResult};
pub use indexes::initialize_indexes;
pub use memory::{InMemoryRoleStore, InMemoryUserStore};
