//! Authorization rules
//!
//! Every rule is a pure predicate over the acting user and the target
//! entity (plus its parent for nested resources). Rules never touch the
//! database; callers load what the rule needs, evaluate it, and only then
//! write.

use super::{DomainError, Role};

/// The authenticated user a rule is evaluated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: i32,
    pub role: Role,
}

impl Actor {
    pub fn new(id: i32, role: Role) -> Self {
        Self { id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(&'static str),
}

impl Decision {
    pub fn is_allowed(self) -> bool {
        matches!(self, Decision::Allow)
    }

    /// Deny becomes `DomainError::Forbidden` with the rule's reason.
    pub fn into_result(self) -> Result<(), DomainError> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny(reason) => Err(DomainError::Forbidden(reason.to_string())),
        }
    }
}

/// Kinds of group content that only the creator or an admin may manage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupContent {
    Schedule,
    Event,
}

/// Admin endpoint self-protection: an admin cannot demote or deactivate
/// their own account.
pub fn admin_update_user(
    actor: &Actor,
    target_user_id: i32,
    new_role: Option<Role>,
    new_active: Option<bool>,
) -> Decision {
    if actor.id != target_user_id {
        return Decision::Allow;
    }
    if matches!(new_role, Some(role) if role != Role::Admin) {
        return Decision::Deny("Cannot change your own admin role");
    }
    if new_active == Some(false) {
        return Decision::Deny("Cannot deactivate your own account");
    }
    Decision::Allow
}

/// Admin endpoint self-protection: an admin cannot delete their own account.
pub fn admin_delete_user(actor: &Actor, target_user_id: i32) -> Decision {
    if actor.id == target_user_id {
        Decision::Deny("Cannot delete your own account")
    } else {
        Decision::Allow
    }
}

/// Group fields and its current book belong to the creator alone.
/// Admin role grants nothing here.
pub fn edit_group(actor: &Actor, group_created_by: i32) -> Decision {
    if actor.id == group_created_by {
        Decision::Allow
    } else {
        Decision::Deny("Only the group creator can update this group")
    }
}

/// Schedules and events: group creator or any admin.
pub fn manage_group_content(actor: &Actor, group_created_by: i32, content: GroupContent) -> Decision {
    if actor.id == group_created_by || actor.is_admin() {
        return Decision::Allow;
    }
    match content {
        GroupContent::Schedule => {
            Decision::Deny("Only the group creator or an admin can manage schedules")
        }
        GroupContent::Event => Decision::Deny("Only the group creator or an admin can manage events"),
    }
}

/// Discussions can only be posted by current members.
pub fn post_discussion(is_member: bool) -> Decision {
    if is_member {
        Decision::Allow
    } else {
        Decision::Deny("You must be a member of this group to post discussions")
    }
}

/// A discussion can be removed by its author, the group creator, or an admin.
pub fn delete_discussion(actor: &Actor, discussion_author_id: i32, group_created_by: i32) -> Decision {
    if actor.id == discussion_author_id || actor.id == group_created_by || actor.is_admin() {
        Decision::Allow
    } else {
        Decision::Deny("You can only delete your own discussions")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CREATOR: i32 = 1;

    fn user(id: i32) -> Actor {
        Actor::new(id, Role::User)
    }

    fn admin(id: i32) -> Actor {
        Actor::new(id, Role::Admin)
    }

    #[test]
    fn admin_cannot_demote_or_deactivate_self() {
        let me = admin(7);
        assert_eq!(
            admin_update_user(&me, 7, Some(Role::User), None),
            Decision::Deny("Cannot change your own admin role")
        );
        assert_eq!(
            admin_update_user(&me, 7, None, Some(false)),
            Decision::Deny("Cannot deactivate your own account")
        );
        assert!(admin_update_user(&me, 7, Some(Role::Admin), Some(true)).is_allowed());
        assert!(admin_update_user(&me, 8, Some(Role::User), Some(false)).is_allowed());
    }

    #[test]
    fn admin_cannot_delete_self() {
        assert!(!admin_delete_user(&admin(3), 3).is_allowed());
        assert!(admin_delete_user(&admin(3), 4).is_allowed());
    }

    #[test]
    fn group_edit_is_creator_only_even_for_admins() {
        assert!(edit_group(&user(CREATOR), CREATOR).is_allowed());
        assert!(!edit_group(&user(2), CREATOR).is_allowed());
        assert!(!edit_group(&admin(2), CREATOR).is_allowed());
    }

    #[test]
    fn schedules_and_events_accept_creator_or_admin() {
        for content in [GroupContent::Schedule, GroupContent::Event] {
            assert!(manage_group_content(&user(CREATOR), CREATOR, content).is_allowed());
            assert!(manage_group_content(&admin(9), CREATOR, content).is_allowed());
            assert!(!manage_group_content(&user(2), CREATOR, content).is_allowed());
        }
    }

    #[test]
    fn discussion_rules() {
        assert!(post_discussion(true).is_allowed());
        assert!(!post_discussion(false).is_allowed());

        let author = 5;
        assert!(delete_discussion(&user(author), author, CREATOR).is_allowed());
        assert!(delete_discussion(&user(CREATOR), author, CREATOR).is_allowed());
        assert!(delete_discussion(&admin(9), author, CREATOR).is_allowed());
        assert!(!delete_discussion(&user(6), author, CREATOR).is_allowed());
    }

    #[test]
    fn deny_maps_to_forbidden() {
        let err = edit_group(&user(2), CREATOR).into_result().unwrap_err();
        assert_eq!(
            err,
            DomainError::Forbidden("Only the group creator can update this group".to_string())
        );
        assert!(edit_group(&user(CREATOR), CREATOR).into_result().is_ok());
    }
}
