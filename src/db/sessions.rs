use rusqlite::{params, Connection, OptionalExtension};

use crate::error::Result;
use crate::models::Session;

/// Persist the session, replacing whichever one was there. The `CHECK (id = 1)`
/// schema constraint plus `INSERT OR REPLACE` keeps the table at one row max.
pub(crate) fn save(conn: &Connection, session: Session) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO active_session (id, user_id, role) VALUES (1, ?1, ?2)",
        params![session.user_id, session.role],
    )?;

    Ok(())
}

/// Read the persisted session, if any. This is how a restart after a crash
/// picks the previous login back up.
pub(crate) fn load(conn: &Connection) -> Result<Option<Session>> {
    let session = conn
        .query_row(
            "SELECT user_id, role FROM active_session WHERE id = 1",
            [],
            |row| {
                Ok(Session {
                    user_id: row.get(0)?,
                    role: row.get(1)?,
                })
            },
        )
        .optional()?;

    Ok(session)
}

/// Erase the session unconditionally. Safe to call with no session present;
/// logout from the logged-out state is a no-op.
pub(crate) fn clear(conn: &Connection) -> Result<()> {
    conn.execute("DELETE FROM active_session", [])?;

    Ok(())
}
