use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use crate::error::Result;
use crate::models::{AuditEntry, Subject};

/// Append one audit row. Callers pass the timestamp so the row shares its
/// instant with the update it records; the profile engine invokes this inside
/// the same transaction as the column write.
pub(crate) fn append(
    conn: &Connection,
    subject: Subject,
    subject_id: i64,
    modified_by: i64,
    modified_at: DateTime<Utc>,
) -> Result<()> {
    conn.execute(
        "INSERT INTO profile_audit (subject_kind, subject_id, modified_by, modified_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![subject, subject_id, modified_by, modified_at],
    )?;

    tracing::debug!(subject = subject.as_str(), subject_id, modified_by, "audit row appended");
    Ok(())
}

/// Read a subject's full audit trail in insertion order. Soft deletion does
/// not hide history; the trail outlives the listing visibility of its row.
pub fn fetch_trail(
    conn: &Connection,
    subject: Subject,
    subject_id: i64,
) -> Result<Vec<AuditEntry>> {
    let mut stmt = conn.prepare(
        "SELECT id, subject_kind, subject_id, modified_by, modified_at
         FROM profile_audit
         WHERE subject_kind = ?1 AND subject_id = ?2
         ORDER BY id",
    )?;

    let entries = stmt
        .query_map(params![subject, subject_id], |row| {
            Ok(AuditEntry {
                id: row.get(0)?,
                subject: row.get(1)?,
                subject_id: row.get(2)?,
                modified_by: row.get(3)?,
                modified_at: row.get(4)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(entries)
}
