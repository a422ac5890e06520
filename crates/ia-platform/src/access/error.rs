//! Access Administration Errors

use std::fmt;

use thiserror::Error;

use crate::store::StoreError;

/// Which mutation or read failed inside the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    CreateFailed,
    AssignmentFailed,
    ClaimAssignmentFailed,
    RevocationFailed,
    ReadFailed,
}

impl FailureKind {
    pub fn code(&self) -> &'static str {
        match self {
            Self::CreateFailed => "CREATE_FAILED",
            Self::AssignmentFailed => "ASSIGNMENT_FAILED",
            Self::ClaimAssignmentFailed => "CLAIM_ASSIGNMENT_FAILED",
            Self::RevocationFailed => "REVOCATION_FAILED",
            Self::ReadFailed => "READ_FAILED",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Category of an [`AccessError`], for callers that only branch on kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    AlreadyExists,
    InvalidInput,
    Cancelled,
    OperationFailed(FailureKind),
}

/// Error returned by every administration operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    #[error("User does not exist: {email}")]
    UserNotFound { email: String },

    #[error("Role does not exist: {name}")]
    RoleNotFound { name: String },

    #[error("Role already exists: {name}")]
    AlreadyExists { name: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Operation cancelled: {reason}")]
    Cancelled { reason: String },

    #[error("{kind}: {message}")]
    OperationFailed { kind: FailureKind, message: String },
}

impl AccessError {
    pub fn user_not_found(email: impl Into<String>) -> Self {
        Self::UserNotFound { email: email.into() }
    }

    pub fn role_not_found(name: impl Into<String>) -> Self {
        Self::RoleNotFound { name: name.into() }
    }

    pub fn already_exists(name: impl Into<String>) -> Self {
        Self::AlreadyExists { name: name.into() }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput { message: message.into() }
    }

    pub fn cancelled(reason: impl Into<String>) -> Self {
        Self::Cancelled { reason: reason.into() }
    }

    pub fn failed(kind: FailureKind, cause: &StoreError) -> Self {
        Self::OperationFailed {
            kind,
            message: cause.to_string(),
        }
    }

    pub fn read_failed(cause: StoreError) -> Self {
        Self::failed(FailureKind::ReadFailed, &cause)
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UserNotFound { .. } | Self::RoleNotFound { .. } => ErrorKind::NotFound,
            Self::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            Self::InvalidInput { .. } => ErrorKind::InvalidInput,
            Self::Cancelled { .. } => ErrorKind::Cancelled,
            Self::OperationFailed { kind, .. } => ErrorKind::OperationFailed(*kind),
        }
    }

    /// Stable code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            Self::UserNotFound { .. } => "USER_NOT_FOUND",
            Self::RoleNotFound { .. } => "ROLE_NOT_FOUND",
            Self::AlreadyExists { .. } => "ROLE_ALREADY_EXISTS",
            Self::InvalidInput { .. } => "INVALID_INPUT",
            Self::Cancelled { .. } => "CANCELLED",
            Self::OperationFailed { kind, .. } => kind.code(),
        }
    }

    /// Caller mistakes as opposed to store or runtime failures
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::UserNotFound { .. }
                | Self::RoleNotFound { .. }
                | Self::AlreadyExists { .. }
                | Self::InvalidInput { .. }
        )
    }

    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::UserNotFound { .. } | Self::RoleNotFound { .. } => 404,
            Self::AlreadyExists { .. } => 409,
            Self::InvalidInput { .. } => 400,
            Self::Cancelled { .. } => 408,
            Self::OperationFailed { .. } => 500,
        }
    }
}
