//! Authorization decisions over an optional actor.
//!
//! Every function here is total: a missing actor, an inactive actor, or a stored rank outside
//! the registry's range degrades to "no authority" rather than an error.

use super::actor::Actor;
use super::permission::PermissionFlag;
use super::role::{LOWEST_RANK, TOP_RANK};

/// Rank at or above which an actor may approve or reject listings.
pub const APPROVER_RANK: u8 = 3;

pub fn has_permission(actor: Option<&Actor>, flag: PermissionFlag) -> bool {
    match actor {
        Some(actor) if actor.is_active => actor.permissions.get(flag),
        _ => false,
    }
}

pub fn has_all_permissions(actor: Option<&Actor>, flags: &[PermissionFlag]) -> bool {
    flags.iter().all(|flag| has_permission(actor, *flag))
}

pub fn has_any_permission(actor: Option<&Actor>, flags: &[PermissionFlag]) -> bool {
    flags.iter().any(|flag| has_permission(actor, *flag))
}

pub fn hierarchy_of(actor: Option<&Actor>) -> u8 {
    actor
        .map(|actor| actor.hierarchy)
        .filter(|rank| (TOP_RANK..=LOWEST_RANK).contains(rank))
        .unwrap_or(LOWEST_RANK)
}

/// Numerically smaller ranks carry more authority.
pub fn meets_hierarchy(actor: Option<&Actor>, required_rank: u8) -> bool {
    hierarchy_of(actor) <= required_rank
}

pub fn is_admin_family(actor: Option<&Actor>) -> bool {
    actor.is_some_and(|actor| actor.role.is_admin_family())
}

/// Managers act on targets of equal or lower authority. Refusing self-targeted destructive
/// actions is the caller's job.
pub fn can_manage(manager: Option<&Actor>, target: Option<&Actor>) -> bool {
    if manager.is_none() {
        return false;
    }
    hierarchy_of(manager) <= hierarchy_of(target)
}

/// Approve/reject gate: approver rank or the explicit permission.
pub fn can_approve_properties(actor: Option<&Actor>) -> bool {
    let active = actor.is_some_and(|actor| actor.is_active);
    active
        && (meets_hierarchy(actor, APPROVER_RANK)
            || has_permission(actor, PermissionFlag::ApproveProperties))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::actor::ActorId;
    use crate::access::role::Role;

    fn actor(role: Role) -> Actor {
        Actor {
            id: ActorId::new(),
            email: format!("{}@example.com", role.as_str()),
            name: role.label().to_string(),
            role,
            hierarchy: role.hierarchy(),
            permissions: role.permissions(),
            is_active: true,
        }
    }

    #[test]
    fn absent_actor_has_no_authority() {
        assert!(!has_permission(None, PermissionFlag::AccessDashboard));
        assert_eq!(hierarchy_of(None), LOWEST_RANK);
        assert!(!meets_hierarchy(None, 4));
        assert!(meets_hierarchy(None, LOWEST_RANK));
        assert!(!is_admin_family(None));
        assert!(!can_manage(None, Some(&actor(Role::User))));
    }

    #[test]
    fn inactive_actor_loses_permissions() {
        let mut admin = actor(Role::Admin);
        admin.is_active = false;
        assert!(!has_permission(Some(&admin), PermissionFlag::ManageUsers));
        assert!(!can_approve_properties(Some(&admin)));
    }

    #[test]
    fn stored_snapshot_wins_over_registry() {
        let mut agent = actor(Role::SalesAgent);
        agent.permissions.can_approve_properties = true;
        assert!(has_permission(Some(&agent), PermissionFlag::ApproveProperties));

        let mut manager = actor(Role::SalesManager);
        manager.permissions.can_manage_users = false;
        assert!(!has_permission(Some(&manager), PermissionFlag::ManageUsers));
    }

    #[test]
    fn all_and_any_combine_flags() {
        let leader = actor(Role::SalesTeamLeader);
        let flags = [PermissionFlag::ApproveProperties, PermissionFlag::ManageUsers];
        assert!(!has_all_permissions(Some(&leader), &flags));
        assert!(has_any_permission(Some(&leader), &flags));
        assert!(has_all_permissions(Some(&leader), &[]));
        assert!(!has_any_permission(Some(&leader), &[]));
    }

    #[test]
    fn can_manage_follows_rank_order() {
        let admin = actor(Role::Admin);
        let other_admin = actor(Role::Admin);
        let manager = actor(Role::SalesManager);
        let leader = actor(Role::SalesTeamLeader);

        assert!(can_manage(Some(&admin), Some(&other_admin)));
        assert!(can_manage(Some(&manager), Some(&leader)));
        assert!(!can_manage(Some(&leader), Some(&manager)));
        assert!(can_manage(Some(&leader), None));

        for manager_role in Role::ALL {
            for target_role in Role::ALL {
                let expected = manager_role.hierarchy() <= target_role.hierarchy();
                assert_eq!(
                    can_manage(Some(&actor(manager_role)), Some(&actor(target_role))),
                    expected,
                    "{manager_role} managing {target_role}"
                );
            }
        }
    }

    #[test]
    fn malformed_rank_degrades_to_lowest() {
        let mut forged = actor(Role::User);
        forged.hierarchy = 0;
        assert_eq!(hierarchy_of(Some(&forged)), LOWEST_RANK);
        assert!(!meets_hierarchy(Some(&forged), APPROVER_RANK));
    }

    #[test]
    fn admin_family_excludes_plain_users() {
        assert!(is_admin_family(Some(&actor(Role::SalesAgent))));
        assert!(!is_admin_family(Some(&actor(Role::User))));
    }

    #[test]
    fn approver_gate_accepts_rank_or_permission() {
        assert!(can_approve_properties(Some(&actor(Role::SalesTeamLeader))));
        assert!(!can_approve_properties(Some(&actor(Role::SalesAgent))));

        let mut trusted_agent = actor(Role::SalesAgent);
        trusted_agent.permissions.can_approve_properties = true;
        assert!(can_approve_properties(Some(&trusted_agent)));
    }
}
