//! Role registry and permission evaluator.

mod actor;
pub mod evaluator;
mod permission;
mod role;

pub use actor::{Actor, ActorId};
pub use evaluator::{
    can_approve_properties, can_manage, has_all_permissions, has_any_permission, has_permission,
    hierarchy_of, is_admin_family, meets_hierarchy, APPROVER_RANK,
};
pub use permission::{PermissionFlag, PermissionSet};
pub use role::{
    hierarchy_of_name, permissions_of, permissions_of_name, Role, UnknownRole, LOWEST_RANK,
    TOP_RANK,
};

