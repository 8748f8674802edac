use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use crate::db::map_unique_constraint;
use crate::error::Result;
use crate::models::{ProfileRow, Role, User};

/// Hash-bearing lookup result used only by the login path. The public
/// [`User`] model never carries the digest, so this stays crate-private.
pub(crate) struct Credential {
    pub(crate) user_id: i64,
    pub(crate) role: Role,
    pub(crate) password_hash: String,
}

/// Retrieve every live user sorted by name. The OWNER row is only included
/// for owner sessions; everyone else gets the filtered view.
pub fn fetch_users(conn: &Connection, include_owner: bool) -> Result<Vec<User>> {
    let sql = if include_owner {
        "SELECT id, name, email, phone, emergency_contact, address, date_of_birth,
                gender, blood_group, role, created_at
         FROM users
         WHERE is_deleted = 0
         ORDER BY name COLLATE NOCASE"
    } else {
        "SELECT id, name, email, phone, emergency_contact, address, date_of_birth,
                gender, blood_group, role, created_at
         FROM users
         WHERE is_deleted = 0 AND role <> 'OWNER'
         ORDER BY name COLLATE NOCASE"
    };

    let mut stmt = conn.prepare(sql)?;
    let users = stmt
        .query_map([], |row| {
            Ok(User {
                id: row.get(0)?,
                name: row.get(1)?,
                email: row.get(2)?,
                phone: row.get(3)?,
                emergency_contact: row.get(4)?,
                address: row.get(5)?,
                date_of_birth: row.get(6)?,
                gender: row.get(7)?,
                blood_group: row.get(8)?,
                role: row.get(9)?,
                created_at: row.get(10)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(users)
}

/// Look up a single live user by id. Soft-deleted rows are invisible here,
/// which is what makes "deleted users cannot be targeted" fall out of the
/// store instead of extra checks.
pub fn fetch_user(conn: &Connection, id: i64) -> Result<Option<User>> {
    let user = conn
        .query_row(
            "SELECT id, name, email, phone, emergency_contact, address, date_of_birth,
                    gender, blood_group, role, created_at
             FROM users
             WHERE id = ?1 AND is_deleted = 0",
            params![id],
            |row| {
                Ok(User {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    email: row.get(2)?,
                    phone: row.get(3)?,
                    emergency_contact: row.get(4)?,
                    address: row.get(5)?,
                    date_of_birth: row.get(6)?,
                    gender: row.get(7)?,
                    blood_group: row.get(8)?,
                    role: row.get(9)?,
                    created_at: row.get(10)?,
                })
            },
        )
        .optional()?;

    Ok(user)
}

/// Resolve a login identifier (username or email) to the stored credential.
/// Deleted accounts do not match, so their logins fail as "not found".
pub(crate) fn find_credential(conn: &Connection, identifier: &str) -> Result<Option<Credential>> {
    let credential = conn
        .query_row(
            "SELECT id, role, password_hash
             FROM users
             WHERE is_deleted = 0 AND (name = ?1 OR email = ?1)",
            params![identifier],
            |row| {
                Ok(Credential {
                    user_id: row.get(0)?,
                    role: row.get(1)?,
                    password_hash: row.get(2)?,
                })
            },
        )
        .optional()?;

    Ok(credential)
}

/// Read the current password digest for a live user. Only the password-change
/// flow needs this; everything else treats the column as write-only.
pub(crate) fn password_hash(conn: &Connection, id: i64) -> Result<Option<String>> {
    let digest = conn
        .query_row(
            "SELECT password_hash FROM users WHERE id = ?1 AND is_deleted = 0",
            params![id],
            |row| row.get(0),
        )
        .optional()?;

    Ok(digest)
}

/// Id of the provisioned OWNER row, if one exists yet.
pub(crate) fn owner_id(conn: &Connection) -> Result<Option<i64>> {
    let id = conn
        .query_row(
            "SELECT id FROM users WHERE role = 'OWNER' AND is_deleted = 0",
            [],
            |row| row.get(0),
        )
        .optional()?;

    Ok(id)
}

/// Insert a validated user row and return its id. Duplicate name/email
/// constraint hits are surfaced as validation failures so the storage engine
/// never leaks into user-facing messages.
pub(crate) fn insert_user(
    conn: &Connection,
    profile: &ProfileRow,
    role: Role,
    password_hash: &str,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO users (name, email, phone, emergency_contact, address, date_of_birth,
                            gender, blood_group, role, password_hash, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            profile.name,
            profile.email,
            profile.phone,
            profile.emergency_contact,
            profile.address,
            profile.date_of_birth,
            profile.gender,
            profile.blood_group,
            role,
            password_hash,
            Utc::now(),
        ],
    )
    .map_err(map_unique_constraint)?;

    Ok(conn.last_insert_rowid())
}

/// Rewrite the role column for a live user. Returns the affected-row count so
/// callers can distinguish "changed" from "no such live user".
pub(crate) fn set_role(conn: &Connection, id: i64, role: Role) -> Result<usize> {
    let changed = conn.execute(
        "UPDATE users SET role = ?1 WHERE id = ?2 AND is_deleted = 0",
        params![role, id],
    )?;

    Ok(changed)
}

/// Soft-delete a user: the row stays for audit history but disappears from
/// listings and logins. Idempotent against already-deleted rows (they simply
/// no longer match).
pub(crate) fn soft_delete(conn: &Connection, id: i64) -> Result<usize> {
    let deleted = conn.execute(
        "UPDATE users SET is_deleted = 1 WHERE id = ?1 AND is_deleted = 0",
        params![id],
    )?;

    Ok(deleted)
}

/// Replace the stored digest. Password changes bypass the audit trail by
/// design, so this touches nothing else.
pub(crate) fn update_password_hash(conn: &Connection, id: i64, digest: &str) -> Result<usize> {
    let changed = conn.execute(
        "UPDATE users SET password_hash = ?1 WHERE id = ?2 AND is_deleted = 0",
        params![digest, id],
    )?;

    Ok(changed)
}
