//! The operation surface consumed by the UI and IPC collaborators.
//!
//! [`Desk`] owns the database connection and the authorization [`Policy`].
//! Operations that require authentication take the caller's [`Session`]
//! explicitly; holding one is the proof of login, and its captured role is
//! what every check runs against. Mutating methods take `&mut self`, so
//! exclusive access to the store is a compile-time property rather than a
//! lock.

use std::path::Path;

use rusqlite::Connection;

use crate::auth::{guard, session, Policy};
use crate::db::{self, audit, participants, scores, sessions, users};
use crate::error::{Error, Result};
use crate::models::{
    AuditEntry, NewParticipant, NewUser, Participant, ProfilePatch, Role, Score, Session, Subject,
    User,
};
use crate::profile;

pub struct Desk {
    conn: Connection,
    policy: Policy,
}

impl Desk {
    /// Wrap an open connection, making sure the schema exists. Tests hand in
    /// an in-memory connection here.
    pub fn new(conn: Connection, policy: Policy) -> Result<Desk> {
        db::ensure_schema(&conn)?;

        Ok(Desk { conn, policy })
    }

    /// Open the database at its default home-directory location with the
    /// default policy.
    pub fn open_default() -> Result<Desk> {
        Ok(Desk {
            conn: db::open_default()?,
            policy: Policy::default(),
        })
    }

    /// Open the database at an explicit path.
    pub fn open_at<P: AsRef<Path>>(path: P, policy: Policy) -> Result<Desk> {
        Ok(Desk {
            conn: db::open_at(path.as_ref())?,
            policy,
        })
    }

    /// Authenticate by username or email. Replaces any previously active
    /// session.
    pub fn login(&mut self, identifier: &str, password: &str) -> Result<Session> {
        session::login(&self.conn, identifier, password)
    }

    /// Erase the active session. A no-op when nobody is logged in.
    pub fn logout(&mut self) -> Result<()> {
        session::logout(&self.conn)
    }

    /// The persisted session, if any. After a crash this is how the previous
    /// login is resumed.
    pub fn current_session(&self) -> Result<Option<Session>> {
        session::current(&self.conn)
    }

    /// Like [`Desk::current_session`], but absence is an error. Collaborators
    /// that need an ambient "whoever is logged in" call this once and pass
    /// the session along.
    pub fn require_session(&self) -> Result<Session> {
        self.current_session()?.ok_or(Error::NoActiveSession)
    }

    /// Create an OPERATOR account. Managers and the owner only.
    pub fn create_user(&mut self, session: &Session, input: &NewUser) -> Result<i64> {
        guard::authorize_create_user(session)?;

        profile::create_user(&self.conn, input)
    }

    /// List live users sorted by name. The owner row only appears in the
    /// owner's own listing.
    pub fn list_users(&self, session: &Session) -> Result<Vec<User>> {
        users::fetch_users(&self.conn, session.role == Role::Owner)
    }

    /// Soft-delete a user. The caller must outrank the target, nobody may
    /// delete themselves, and the owner account is not deletable at all.
    pub fn delete_user(&mut self, session: &Session, id: i64) -> Result<()> {
        let target = users::fetch_user(&self.conn, id)?.ok_or(Error::NotFound("user"))?;
        guard::authorize_delete_user(session, id, target.role)?;

        if users::soft_delete(&self.conn, id)? == 0 {
            return Err(Error::NotFound("user"));
        }
        tracing::info!(id, by = session.user_id, "user deleted");

        Ok(())
    }

    /// Promote an OPERATOR to MANAGER. Who may do this is governed by the
    /// policy; by default only the owner.
    pub fn promote_to_manager(&mut self, session: &Session, id: i64) -> Result<()> {
        let target = users::fetch_user(&self.conn, id)?.ok_or(Error::NotFound("user"))?;
        guard::authorize_promote(&self.policy, session, id, target.role)?;

        if users::set_role(&self.conn, id, Role::Manager)? == 0 {
            return Err(Error::NotFound("user"));
        }
        tracing::info!(id, by = session.user_id, "promoted to manager");

        Ok(())
    }

    /// Demote a MANAGER to OPERATOR. Same authority rule as promotion.
    pub fn demote_to_operator(&mut self, session: &Session, id: i64) -> Result<()> {
        let target = users::fetch_user(&self.conn, id)?.ok_or(Error::NotFound("user"))?;
        guard::authorize_demote(&self.policy, session, id, target.role)?;

        if users::set_role(&self.conn, id, Role::Operator)? == 0 {
            return Err(Error::NotFound("user"));
        }
        tracing::info!(id, by = session.user_id, "demoted to operator");

        Ok(())
    }

    /// Change the logged-in user's own password, proving knowledge of the
    /// current one first.
    pub fn change_own_password(&mut self, session: &Session, old: &str, new: &str) -> Result<()> {
        profile::change_password(&self.conn, session.user_id, old, new)
    }

    /// Apply a partial update to the logged-in user's own profile. Returns
    /// the number of rows written: 1, or 0 for an all-`None` patch.
    pub fn update_own_profile(&mut self, session: &Session, patch: &ProfilePatch) -> Result<usize> {
        profile::update(
            &mut self.conn,
            Subject::User,
            session.user_id,
            patch,
            session.user_id,
        )
    }

    /// The logged-in user's own profile row.
    pub fn own_profile(&self, session: &Session) -> Result<User> {
        users::fetch_user(&self.conn, session.user_id)?.ok_or(Error::NotFound("user"))
    }

    /// Register a participant. Open to every authenticated role.
    pub fn create_participant(
        &mut self,
        _session: &Session,
        input: &NewParticipant,
    ) -> Result<i64> {
        profile::create_participant(&self.conn, input)
    }

    /// List live participants sorted by name.
    pub fn list_participants(&self, _session: &Session) -> Result<Vec<Participant>> {
        participants::fetch_participants(&self.conn)
    }

    /// Apply a partial update to a participant's profile, recording the
    /// logged-in user as the actor.
    pub fn update_participant(
        &mut self,
        session: &Session,
        id: i64,
        patch: &ProfilePatch,
    ) -> Result<usize> {
        profile::update(&mut self.conn, Subject::Participant, id, patch, session.user_id)
    }

    /// Soft-delete a participant. Their scores drop out of reads with them.
    pub fn delete_participant(&mut self, session: &Session, id: i64) -> Result<()> {
        if participants::soft_delete(&self.conn, id)? == 0 {
            return Err(Error::NotFound("participant"));
        }
        tracing::info!(id, by = session.user_id, "participant deleted");

        Ok(())
    }

    /// A subject's profile-change history, oldest first.
    pub fn audit_trail(
        &self,
        _session: &Session,
        subject: Subject,
        id: i64,
    ) -> Result<Vec<AuditEntry>> {
        audit::fetch_trail(&self.conn, subject, id)
    }

    /// A participant's recorded scores, oldest first.
    pub fn scores_for(&self, _session: &Session, participant_id: i64) -> Result<Vec<Score>> {
        scores::fetch_for_participant(&self.conn, participant_id)
    }
}

/// Clean shutdown logs the session out. Only a hard crash leaves the
/// persisted row behind, and the next login replaces it.
impl Drop for Desk {
    fn drop(&mut self) {
        if let Err(error) = sessions::clear(&self.conn) {
            tracing::warn!(%error, "failed to erase session on shutdown");
        }
    }
}
