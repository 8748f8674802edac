//! Session lifecycle over the persisted singleton row.
//!
//! Persisting the session means an application crash does not log anyone out;
//! the next start finds the row and resumes. A clean shutdown erases it.

use rusqlite::Connection;

use crate::auth::password;
use crate::db::{sessions, users};
use crate::error::{Error, Result};
use crate::models::Session;

/// Authenticate by username or email and make the resulting session the
/// active one, replacing whatever session was there. Unknown or deleted
/// identifiers and wrong passwords are reported as distinct errors so the
/// caller can phrase them differently.
pub(crate) fn login(conn: &Connection, identifier: &str, password: &str) -> Result<Session> {
    let credential = users::find_credential(conn, identifier)?.ok_or(Error::NotFound("user"))?;

    if !password::verify(password, &credential.password_hash) {
        return Err(Error::InvalidCredential);
    }

    let session = Session {
        user_id: credential.user_id,
        role: credential.role,
    };
    sessions::save(conn, session)?;
    tracing::info!(user_id = session.user_id, role = %session.role, "logged in");

    Ok(session)
}

/// The active session, if one is persisted. Read-only.
pub(crate) fn current(conn: &Connection) -> Result<Option<Session>> {
    sessions::load(conn)
}

/// Erase the active session. Idempotent: logging out while logged out does
/// nothing and succeeds.
pub(crate) fn logout(conn: &Connection) -> Result<()> {
    sessions::clear(conn)?;
    tracing::info!("logged out");

    Ok(())
}
