//! Session, role, and credential core for a desktop event-registration tool.
//!
//! This crate decides who is logged in, what their role lets them do, and how
//! profile edits are tracked. The surrounding application (window shell, IPC
//! wiring, CSV import, rendering) consumes it through the [`Desk`] facade and
//! the domain types re-exported here, so the public surface is deliberately
//! small.
pub mod auth;
pub mod db;
pub mod desk;
pub mod error;
pub mod models;
pub mod profile;

/// The facade every collaborator talks to, plus its configuration.
pub use auth::Policy;
pub use desk::Desk;

/// The error taxonomy shared by every operation.
pub use error::{Error, Result};

/// Domain types that cross the library boundary.
pub use models::{
    AuditEntry, Gender, NewParticipant, NewUser, Participant, ProfilePatch, Role, Score, Session,
    Subject, User,
};
