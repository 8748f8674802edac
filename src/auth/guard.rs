//! Role checks for the user-directory mutations.
//!
//! Every check runs against the role captured in the caller's [`Session`];
//! nothing here re-reads the user table. Self-targeting checks come before
//! role checks, so even the owner cannot delete or re-rank their own account.

use crate::error::{Error, Result};
use crate::models::{Role, Session};

/// Knobs for authorization behavior. Held as a plain value by the operation
/// surface; there is no config file behind it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Policy {
    /// When true (the default), only the owner may promote or demote. When
    /// false, managers may change roles too.
    pub promotion_requires_owner: bool,
}

impl Default for Policy {
    fn default() -> Self {
        Policy {
            promotion_requires_owner: true,
        }
    }
}

fn denied(reason: &'static str) -> Error {
    tracing::debug!(reason, "authorization denied");
    Error::PermissionDenied(reason)
}

/// Creating user accounts takes manager access or better.
pub(crate) fn authorize_create_user(session: &Session) -> Result<()> {
    if !session.role.at_least(Role::Manager) {
        return Err(denied("creating users requires manager access"));
    }

    Ok(())
}

/// Shared preamble for promote and demote: never your own account, and only
/// with the authority the policy grants.
fn authorize_role_change(policy: &Policy, session: &Session, target_id: i64) -> Result<()> {
    if session.user_id == target_id {
        return Err(denied("cannot change your own role"));
    }

    if policy.promotion_requires_owner {
        if session.role != Role::Owner {
            return Err(denied("only the owner may change roles"));
        }
    } else if !session.role.at_least(Role::Manager) {
        return Err(denied("changing roles requires manager access"));
    }

    Ok(())
}

/// Promotion moves an OPERATOR to MANAGER; any other starting role is
/// rejected before the row is touched.
pub(crate) fn authorize_promote(
    policy: &Policy,
    session: &Session,
    target_id: i64,
    target_role: Role,
) -> Result<()> {
    authorize_role_change(policy, session, target_id)?;

    if target_role != Role::Operator {
        return Err(denied("target is not an operator"));
    }

    Ok(())
}

/// Demotion moves a MANAGER to OPERATOR; any other starting role is rejected
/// before the row is touched.
pub(crate) fn authorize_demote(
    policy: &Policy,
    session: &Session,
    target_id: i64,
    target_role: Role,
) -> Result<()> {
    authorize_role_change(policy, session, target_id)?;

    if target_role != Role::Manager {
        return Err(denied("target is not a manager"));
    }

    Ok(())
}

/// Deletion requires outranking the target: the owner may delete anyone below
/// them, managers may delete operators, and the owner account itself is never
/// deletable.
pub(crate) fn authorize_delete_user(
    session: &Session,
    target_id: i64,
    target_role: Role,
) -> Result<()> {
    if session.user_id == target_id {
        return Err(denied("cannot delete your own account"));
    }

    if target_role == Role::Owner {
        return Err(denied("the owner account cannot be deleted"));
    }

    if session.role == target_role || !session.role.at_least(target_role) {
        return Err(denied("cannot delete a peer or higher role"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(user_id: i64, role: Role) -> Session {
        Session { user_id, role }
    }

    #[test]
    fn operators_cannot_create_users() {
        assert!(authorize_create_user(&session(1, Role::Owner)).is_ok());
        assert!(authorize_create_user(&session(2, Role::Manager)).is_ok());
        assert!(matches!(
            authorize_create_user(&session(3, Role::Operator)),
            Err(Error::PermissionDenied(_))
        ));
    }

    #[test]
    fn default_policy_reserves_role_changes_for_the_owner() {
        let policy = Policy::default();
        assert!(authorize_promote(&policy, &session(1, Role::Owner), 5, Role::Operator).is_ok());
        assert!(matches!(
            authorize_promote(&policy, &session(2, Role::Manager), 5, Role::Operator),
            Err(Error::PermissionDenied(_))
        ));
        assert!(matches!(
            authorize_demote(&policy, &session(2, Role::Manager), 5, Role::Manager),
            Err(Error::PermissionDenied(_))
        ));
    }

    #[test]
    fn relaxed_policy_lets_managers_change_roles() {
        let policy = Policy {
            promotion_requires_owner: false,
        };
        assert!(authorize_promote(&policy, &session(2, Role::Manager), 5, Role::Operator).is_ok());
        assert!(authorize_demote(&policy, &session(2, Role::Manager), 5, Role::Manager).is_ok());
        assert!(matches!(
            authorize_promote(&policy, &session(3, Role::Operator), 5, Role::Operator),
            Err(Error::PermissionDenied(_))
        ));
    }

    #[test]
    fn self_protection_beats_role_rank() {
        let policy = Policy::default();
        assert!(matches!(
            authorize_promote(&policy, &session(1, Role::Owner), 1, Role::Operator),
            Err(Error::PermissionDenied(_))
        ));
        assert!(matches!(
            authorize_demote(&policy, &session(1, Role::Owner), 1, Role::Manager),
            Err(Error::PermissionDenied(_))
        ));
        assert!(matches!(
            authorize_delete_user(&session(1, Role::Owner), 1, Role::Owner),
            Err(Error::PermissionDenied(_))
        ));
    }

    #[test]
    fn promote_rejects_targets_that_are_not_operators() {
        let policy = Policy::default();
        assert!(matches!(
            authorize_promote(&policy, &session(1, Role::Owner), 5, Role::Manager),
            Err(Error::PermissionDenied(_))
        ));
        assert!(matches!(
            authorize_demote(&policy, &session(1, Role::Owner), 5, Role::Operator),
            Err(Error::PermissionDenied(_))
        ));
    }

    #[test]
    fn deletion_requires_outranking_the_target() {
        assert!(authorize_delete_user(&session(1, Role::Owner), 5, Role::Manager).is_ok());
        assert!(authorize_delete_user(&session(1, Role::Owner), 5, Role::Operator).is_ok());
        assert!(authorize_delete_user(&session(2, Role::Manager), 5, Role::Operator).is_ok());
        assert!(matches!(
            authorize_delete_user(&session(2, Role::Manager), 5, Role::Manager),
            Err(Error::PermissionDenied(_))
        ));
        assert!(matches!(
            authorize_delete_user(&session(3, Role::Operator), 5, Role::Operator),
            Err(Error::PermissionDenied(_))
        ));
        assert!(matches!(
            authorize_delete_user(&session(2, Role::Manager), 5, Role::Owner),
            Err(Error::PermissionDenied(_))
        ));
    }
}
