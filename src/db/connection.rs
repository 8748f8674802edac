use std::fs;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use rusqlite::Connection;

use crate::error::{Error, Result};

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".event-desk";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "registry.sqlite";

/// Open the database at its default location under the user's home, creating
/// the file and schema on first run.
pub fn open_default() -> Result<Connection> {
    open_at(&default_db_path()?)
}

/// Open (or create) a database at an explicit path. Useful for tests and for
/// installations that keep their data somewhere other than the home
/// directory.
pub fn open_at(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let conn = Connection::open(path)?;
    ensure_schema(&conn)?;
    Ok(conn)
}

/// Run lazy migrations against an open connection. The function also toggles
/// `PRAGMA foreign_keys = ON` so the referential integrity checks in our
/// schema behave the same during tests and production runs.
pub fn ensure_schema(conn: &Connection) -> Result<()> {
    conn.execute("PRAGMA foreign_keys = ON", [])?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            email TEXT NOT NULL UNIQUE,
            phone TEXT NOT NULL,
            emergency_contact TEXT NOT NULL,
            address TEXT NOT NULL,
            date_of_birth TEXT NOT NULL,
            gender TEXT NOT NULL CHECK (gender IN ('M', 'F', 'O')),
            blood_group TEXT NOT NULL,
            role TEXT NOT NULL CHECK (role IN ('OWNER', 'MANAGER', 'OPERATOR')),
            password_hash TEXT NOT NULL,
            is_deleted INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS participants (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            phone TEXT NOT NULL,
            emergency_contact TEXT NOT NULL,
            address TEXT NOT NULL,
            date_of_birth TEXT NOT NULL,
            gender TEXT NOT NULL CHECK (gender IN ('M', 'F', 'O')),
            blood_group TEXT NOT NULL,
            is_deleted INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        )",
        [],
    )?;

    // Single-row table: the CHECK pins the primary key so a second session
    // can never coexist with the first.
    conn.execute(
        "CREATE TABLE IF NOT EXISTS active_session (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            user_id INTEGER NOT NULL,
            role TEXT NOT NULL CHECK (role IN ('OWNER', 'MANAGER', 'OPERATOR'))
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS profile_audit (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            subject_kind TEXT NOT NULL CHECK (subject_kind IN ('user', 'participant')),
            subject_id INTEGER NOT NULL,
            modified_by INTEGER NOT NULL,
            modified_at TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS scores (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            participant_id INTEGER NOT NULL,
            score INTEGER NOT NULL,
            recorded_on TEXT NOT NULL,
            FOREIGN KEY(participant_id) REFERENCES participants(id) ON DELETE CASCADE
        )",
        [],
    )?;

    Ok(())
}

/// Resolve the absolute path to the SQLite database inside the user's home.
fn default_db_path() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or(Error::NotFound("home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME).join(DB_FILE_NAME))
}
