//! Persistence layer split across logical submodules. All functions take a
//! plain [`rusqlite::Connection`] reference so callers decide where the
//! database lives (home directory in production, in-memory in tests).

pub mod audit;
pub mod connection;
pub mod participants;
pub mod scores;
pub(crate) mod sessions;
pub mod users;

pub use connection::{ensure_schema, open_at, open_default};

use crate::error::Error;

/// Translate a UNIQUE-constraint failure on the name/email columns into the
/// validation error the caller's user typed their way into. Anything else
/// passes through as a storage error.
pub(crate) fn map_unique_constraint(err: rusqlite::Error) -> Error {
    if let rusqlite::Error::SqliteFailure(ref code, Some(ref message)) = err {
        if code.code == rusqlite::ErrorCode::ConstraintViolation && message.contains("UNIQUE") {
            let field = if message.contains(".name") { "name" } else { "email" };
            return Error::Validation {
                field,
                problem: "already exists",
            };
        }
    }

    Error::Storage(err)
}
