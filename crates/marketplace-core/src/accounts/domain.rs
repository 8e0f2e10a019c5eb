use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::access::{permissions_of, Actor, ActorId, PermissionSet, Role};

use super::password::HashedPassword;

/// Stored account, including the secret hash that never leaves the account module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorRecord {
    pub id: ActorId,
    pub email: String,
    pub name: String,
    pub password: HashedPassword,
    pub role: Role,
    pub hierarchy: u8,
    pub permissions: PermissionSet,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ActorRecord {
    /// New account with its rank and permission snapshot taken from the registry.
    pub fn new(
        email: String,
        name: String,
        password: HashedPassword,
        role: Role,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ActorId::new(),
            email,
            name,
            password,
            role,
            hierarchy: role.hierarchy(),
            permissions: permissions_of(Some(role)),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrite role, rank, and snapshot together.
    pub fn assign_role(&mut self, role: Role, now: DateTime<Utc>) {
        self.role = role;
        self.recompute_snapshot(now);
    }

    /// Re-derive rank and permissions from the current registry. Only role assignment and the
    /// explicit refresh operation call this; existing snapshots otherwise stay as stored.
    pub fn recompute_snapshot(&mut self, now: DateTime<Utc>) {
        self.hierarchy = self.role.hierarchy();
        self.permissions = permissions_of(Some(self.role));
        self.updated_at = now;
    }

    pub fn snapshot_is_current(&self) -> bool {
        self.hierarchy == self.role.hierarchy() && self.permissions == permissions_of(Some(self.role))
    }

    /// Public projection with the password hash stripped.
    pub fn to_actor(&self) -> Actor {
        Actor {
            id: self.id,
            email: self.email.clone(),
            name: self.name.clone(),
            role: self.role,
            hierarchy: self.hierarchy,
            permissions: self.permissions,
            is_active: self.is_active,
        }
    }
}

/// Self-service registration payload.
#[derive(Debug, Clone, Deserialize)]
pub struct Registration {
    pub email: String,
    pub name: String,
    pub password: String,
}

/// Staff account created by someone holding `canManageUsers`.
#[derive(Debug, Clone, Deserialize)]
pub struct MemberDraft {
    pub email: String,
    pub name: String,
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Token plus the account it was issued for.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginGrant {
    pub token: String,
    pub token_type: &'static str,
    pub expires_at: DateTime<Utc>,
    pub actor: Actor,
}

/// What moved when an account was deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnershipTransfer {
    pub properties_reassigned: usize,
    pub approvals_reassigned: usize,
    pub inquiries_unassigned: usize,
}
