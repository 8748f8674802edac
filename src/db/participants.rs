use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use crate::db::map_unique_constraint;
use crate::error::Result;
use crate::models::{Participant, ProfileRow};

/// Retrieve every live participant sorted by name, case-insensitively.
pub fn fetch_participants(conn: &Connection) -> Result<Vec<Participant>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, email, phone, emergency_contact, address, date_of_birth,
                gender, blood_group, created_at
         FROM participants
         WHERE is_deleted = 0
         ORDER BY name COLLATE NOCASE",
    )?;

    let participants = stmt
        .query_map([], |row| {
            Ok(Participant {
                id: row.get(0)?,
                name: row.get(1)?,
                email: row.get(2)?,
                phone: row.get(3)?,
                emergency_contact: row.get(4)?,
                address: row.get(5)?,
                date_of_birth: row.get(6)?,
                gender: row.get(7)?,
                blood_group: row.get(8)?,
                created_at: row.get(9)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(participants)
}

/// Look up a single live participant by id.
pub fn fetch_participant(conn: &Connection, id: i64) -> Result<Option<Participant>> {
    let participant = conn
        .query_row(
            "SELECT id, name, email, phone, emergency_contact, address, date_of_birth,
                    gender, blood_group, created_at
             FROM participants
             WHERE id = ?1 AND is_deleted = 0",
            params![id],
            |row| {
                Ok(Participant {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    email: row.get(2)?,
                    phone: row.get(3)?,
                    emergency_contact: row.get(4)?,
                    address: row.get(5)?,
                    date_of_birth: row.get(6)?,
                    gender: row.get(7)?,
                    blood_group: row.get(8)?,
                    created_at: row.get(9)?,
                })
            },
        )
        .optional()?;

    Ok(participant)
}

/// Insert a validated participant row and return its id. Duplicate emails
/// come back as validation failures, matching the user store.
pub(crate) fn insert_participant(conn: &Connection, profile: &ProfileRow) -> Result<i64> {
    conn.execute(
        "INSERT INTO participants (name, email, phone, emergency_contact, address,
                                   date_of_birth, gender, blood_group, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            profile.name,
            profile.email,
            profile.phone,
            profile.emergency_contact,
            profile.address,
            profile.date_of_birth,
            profile.gender,
            profile.blood_group,
            Utc::now(),
        ],
    )
    .map_err(map_unique_constraint)?;

    Ok(conn.last_insert_rowid())
}

/// Soft-delete a participant. The row (and its audit history) stays; listings
/// and score reads stop seeing it.
pub(crate) fn soft_delete(conn: &Connection, id: i64) -> Result<usize> {
    let deleted = conn.execute(
        "UPDATE participants SET is_deleted = 1 WHERE id = ?1 AND is_deleted = 0",
        params![id],
    )?;

    Ok(deleted)
}
