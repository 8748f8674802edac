//! Typed failure taxonomy shared across the crate. Every operation exposed to
//! the UI/IPC layer reports one of these variants instead of a half-applied
//! mutation, so callers can branch on the discriminant and show an actionable
//! message.

use thiserror::Error;

/// Crate-wide result alias over [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The named subject does not exist (or is soft-deleted). Login against an
    /// unknown or deleted identifier also lands here.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Login or password-change secret did not match the stored digest.
    #[error("invalid credentials")]
    InvalidCredential,

    /// A role-hierarchy or self-protection rule rejected the request before
    /// any row was touched.
    #[error("permission denied: {0}")]
    PermissionDenied(&'static str),

    /// A field failed validation. `field` always names the offending input so
    /// the UI can point at the right form control. Duplicate email/name
    /// constraint hits from the store are translated into this variant rather
    /// than leaking as `Storage`.
    #[error("{field} {problem}")]
    Validation {
        field: &'static str,
        problem: &'static str,
    },

    /// The operation requires an authenticated session and none exists.
    #[error("no active session")]
    NoActiveSession,

    /// Password hashing failed inside the bcrypt backend.
    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    /// Anything else surfaced by the SQLite store.
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// Filesystem problems while locating or creating the database file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
