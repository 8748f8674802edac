//! Domain models that mirror the SQLite schema and get passed between the
//! store, the authorization layer, and the UI/IPC collaborators. These types
//! stay light-weight data holders so the other layers can focus on policy and
//! persistence logic.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef};
use rusqlite::ToSql;

/// Privilege tiers, strictly ordered OWNER > MANAGER > OPERATOR. Exactly one
/// OWNER row exists per installation; it is provisioned by seeding, never by
/// the public creation operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Owner,
    Manager,
    Operator,
}

impl Role {
    /// Canonical text stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Owner => "OWNER",
            Role::Manager => "MANAGER",
            Role::Operator => "OPERATOR",
        }
    }

    /// Parse the canonical text back into a role.
    pub fn parse(text: &str) -> Option<Role> {
        match text {
            "OWNER" => Some(Role::Owner),
            "MANAGER" => Some(Role::Manager),
            "OPERATOR" => Some(Role::Operator),
            _ => None,
        }
    }

    /// Whether this role sits at or above `other` in the hierarchy.
    pub fn at_least(&self, other: Role) -> bool {
        self.rank() >= other.rank()
    }

    fn rank(&self) -> u8 {
        match self {
            Role::Operator => 0,
            Role::Manager => 1,
            Role::Owner => 2,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ToSql for Role {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for Role {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;
        Role::parse(text).ok_or_else(|| FromSqlError::Other(format!("unknown role: {text}").into()))
    }
}

/// Gender marker kept as the single letters the registration forms collect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "M",
            Gender::Female => "F",
            Gender::Other => "O",
        }
    }

    /// Accepts the stored letter in either case; anything else is rejected at
    /// the validation boundary.
    pub fn parse(text: &str) -> Option<Gender> {
        match text {
            "M" | "m" => Some(Gender::Male),
            "F" | "f" => Some(Gender::Female),
            "O" | "o" => Some(Gender::Other),
            _ => None,
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ToSql for Gender {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for Gender {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;
        Gender::parse(text)
            .ok_or_else(|| FromSqlError::Other(format!("unknown gender: {text}").into()))
    }
}

/// Which directory a profile mutation or audit entry refers to. Users and
/// participants share the update/audit plumbing, so the engine is told which
/// table it is working against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subject {
    User,
    Participant,
}

impl Subject {
    /// Discriminator stored in the audit table and used in error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Subject::User => "user",
            Subject::Participant => "participant",
        }
    }

    pub fn parse(text: &str) -> Option<Subject> {
        match text {
            "user" => Some(Subject::User),
            "participant" => Some(Subject::Participant),
            _ => None,
        }
    }

    /// Table the subject's profile columns live in.
    pub(crate) fn table(&self) -> &'static str {
        match self {
            Subject::User => "users",
            Subject::Participant => "participants",
        }
    }
}

impl ToSql for Subject {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for Subject {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;
        Subject::parse(text)
            .ok_or_else(|| FromSqlError::Other(format!("unknown subject: {text}").into()))
    }
}

/// The single authenticated context. The role is captured at login time and
/// deliberately not re-derived from the user table on later calls, so a
/// promotion or demotion only takes effect at the next login. Operations that
/// need authorization take this value explicitly instead of reading ambient
/// state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    /// Identity of the logged-in user.
    pub user_id: i64,
    /// Role held at the moment the session was created.
    pub role: Role,
}

/// A staff account. The password digest is intentionally absent: it is stored
/// write-only and never hydrated onto the model.
#[derive(Debug, Clone)]
pub struct User {
    /// Primary key from the database; stable and immutable.
    pub id: i64,
    /// Display name, doubling as the login username. Unique among rows.
    pub name: String,
    /// Contact address, unique across the table.
    pub email: String,
    /// Ten digits, stored without punctuation.
    pub phone: String,
    /// Ten digits, stored without punctuation.
    pub emergency_contact: String,
    pub address: String,
    pub date_of_birth: String,
    pub gender: Gender,
    pub blood_group: String,
    /// Current privilege tier. Listings hide the OWNER row from lower roles.
    pub role: Role,
    /// Set once at insert time.
    pub created_at: DateTime<Utc>,
}

/// A registered attendee. Structurally a [`User`] without role or password;
/// participants never log in.
#[derive(Debug, Clone)]
pub struct Participant {
    pub id: i64,
    pub name: String,
    /// Unique across the table.
    pub email: String,
    pub phone: String,
    pub emergency_contact: String,
    pub address: String,
    pub date_of_birth: String,
    pub gender: Gender,
    pub blood_group: String,
    pub created_at: DateTime<Utc>,
}

/// One leaderboard entry. This core only reads scores; the ingestion path
/// that writes them lives elsewhere.
#[derive(Debug, Clone)]
pub struct Score {
    pub id: i64,
    /// Foreign key into the participants table.
    pub participant_id: i64,
    pub score: i64,
    pub recorded_on: NaiveDate,
}

/// One row of the append-only profile audit trail: who changed a subject's
/// profile and when. Rows are never updated or removed, so the actor and
/// timestamp sequences stay in lockstep by construction.
#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub id: i64,
    pub subject: Subject,
    pub subject_id: i64,
    /// User id of the actor who performed the update.
    pub modified_by: i64,
    pub modified_at: DateTime<Utc>,
}

/// Input for the public user-creation operation. Every identity field is
/// required; the created account always starts as OPERATOR, so there is no
/// role field to get wrong.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub emergency_contact: String,
    pub address: String,
    pub date_of_birth: String,
    /// Raw gender letter as collected by the form; validated to M/F/O.
    pub gender: String,
    pub blood_group: String,
    /// Initial password, checked against the strength rules before hashing.
    pub password: String,
}

impl NewUser {
    /// View the identity fields as a fully-populated patch so creation runs
    /// through the same normalization as updates.
    pub(crate) fn as_patch(&self) -> ProfilePatch {
        ProfilePatch {
            name: Some(self.name.clone()),
            email: Some(self.email.clone()),
            phone: Some(self.phone.clone()),
            emergency_contact: Some(self.emergency_contact.clone()),
            address: Some(self.address.clone()),
            date_of_birth: Some(self.date_of_birth.clone()),
            gender: Some(self.gender.clone()),
            blood_group: Some(self.blood_group.clone()),
        }
    }
}

/// Input for participant registration. Same shape as [`NewUser`] minus the
/// credential.
#[derive(Debug, Clone)]
pub struct NewParticipant {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub emergency_contact: String,
    pub address: String,
    pub date_of_birth: String,
    pub gender: String,
    pub blood_group: String,
}

impl NewParticipant {
    pub(crate) fn as_patch(&self) -> ProfilePatch {
        ProfilePatch {
            name: Some(self.name.clone()),
            email: Some(self.email.clone()),
            phone: Some(self.phone.clone()),
            emergency_contact: Some(self.emergency_contact.clone()),
            address: Some(self.address.clone()),
            date_of_birth: Some(self.date_of_birth.clone()),
            gender: Some(self.gender.clone()),
            blood_group: Some(self.blood_group.clone()),
        }
    }
}

/// Partial profile update: only fields that are `Some` are validated and
/// written; everything else is left untouched. An all-`None` patch is a legal
/// no-op that changes nothing and appends no audit entry.
#[derive(Debug, Clone, Default)]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub emergency_contact: Option<String>,
    pub address: Option<String>,
    pub date_of_birth: Option<String>,
    /// Raw gender letter; canonicalised during normalization.
    pub gender: Option<String>,
    pub blood_group: Option<String>,
}

impl ProfilePatch {
    /// True when no field is present, i.e. the update would be a no-op.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.emergency_contact.is_none()
            && self.address.is_none()
            && self.date_of_birth.is_none()
            && self.gender.is_none()
            && self.blood_group.is_none()
    }
}

/// A normalized, fully-populated field set ready to insert. Produced only by
/// the mutation engine after validation, so the store layer can trust it.
#[derive(Debug, Clone)]
pub(crate) struct ProfileRow {
    pub(crate) name: String,
    pub(crate) email: String,
    pub(crate) phone: String,
    pub(crate) emergency_contact: String,
    pub(crate) address: String,
    pub(crate) date_of_birth: String,
    pub(crate) gender: String,
    pub(crate) blood_group: String,
}
