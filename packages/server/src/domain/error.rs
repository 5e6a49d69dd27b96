//! Domain layer error definitions.

use thiserror::Error;

/// Errors related to Value Objects validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueObjectError {
    /// UserId must be a positive integer
    #[error("UserId must be a positive integer (got {0})")]
    UserIdNotPositive(i64),

    /// UserId could not be parsed
    #[error("UserId must be a positive integer (got: {0})")]
    UserIdInvalidFormat(String),

    /// MaterialId invalid format error (not a valid UUID format)
    #[error("MaterialId must be a valid UUID format (got: {0})")]
    MaterialIdInvalidFormat(String),

    /// SessionId invalid format error (not a valid UUID format)
    #[error("SessionId must be a valid UUID format (got: {0})")]
    SessionIdInvalidFormat(String),

    /// Message body is empty after trimming whitespace
    #[error("Message cannot be empty")]
    MessageBodyEmpty,

    /// Message body too long error
    #[error("Message cannot exceed {max} characters (got {actual})")]
    MessageBodyTooLong { max: usize, actual: usize },
}

/// Errors returned by the identity verifier
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VerifyError {
    /// No credential was presented
    #[error("missing credential")]
    MissingCredential,

    /// The credential is malformed, badly signed or expired
    #[error("invalid credential: {0}")]
    InvalidCredential(String),

    /// The credential names a user that does not exist
    #[error("unknown user: {0}")]
    UnknownUser(i64),

    /// The user directory could not be consulted
    #[error("identity lookup failed: {0}")]
    LookupFailed(String),
}

/// Errors returned by storage-backed collaborators
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// The underlying store rejected or failed the operation
    #[error("storage error: {0}")]
    Storage(String),

    /// A row could not be converted into a domain value
    #[error("corrupt row: {0}")]
    CorruptRow(String),
}

/// Illegal connection session state transition
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("illegal session transition from {from} to {to}")]
pub struct SessionStateError {
    pub from: &'static str,
    pub to: &'static str,
}
