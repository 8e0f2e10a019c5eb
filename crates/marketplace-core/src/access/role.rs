use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::permission::PermissionSet;

/// Rank assigned to anything the registry does not recognise.
pub const LOWEST_RANK: u8 = 5;

/// Rank held by the top administrative role.
pub const TOP_RANK: u8 = 1;

/// Closed set of marketplace roles, ordered from most to least authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    Admin,
    SalesManager,
    SalesTeamLeader,
    SalesAgent,
    User,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Admin,
        Role::SalesManager,
        Role::SalesTeamLeader,
        Role::SalesAgent,
        Role::User,
    ];

    /// Canonical wire representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::SalesManager => "sales_manager",
            Role::SalesTeamLeader => "sales_team_leader",
            Role::SalesAgent => "sales_agent",
            Role::User => "user",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Role::Admin => "Administrator",
            Role::SalesManager => "Sales manager",
            Role::SalesTeamLeader => "Sales team leader",
            Role::SalesAgent => "Sales agent",
            Role::User => "User",
        }
    }

    /// Fixed rank where 1 is the most powerful role.
    pub const fn hierarchy(self) -> u8 {
        match self {
            Role::Admin => 1,
            Role::SalesManager => 2,
            Role::SalesTeamLeader => 3,
            Role::SalesAgent => 4,
            Role::User => LOWEST_RANK,
        }
    }

    /// Everything except the plain marketplace user.
    pub const fn is_admin_family(self) -> bool {
        !matches!(self, Role::User)
    }

    pub fn permissions(self) -> PermissionSet {
        permissions_of(Some(self))
    }

    /// Decode a stored or submitted role name. Case and `-`/`_`/space separators are ignored so
    /// legacy upper-case values such as `SALES_AGENT` resolve to the same variant.
    pub fn parse(raw: &str) -> Option<Role> {
        let normalized: String = raw
            .trim()
            .chars()
            .map(|ch| match ch {
                '-' | ' ' => '_',
                other => other.to_ascii_lowercase(),
            })
            .collect();

        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == normalized)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::parse(s).ok_or_else(|| UnknownRole(s.to_string()))
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Role::parse(&raw).ok_or_else(|| serde::de::Error::custom(UnknownRole(raw)))
    }
}

/// Registry lookup for a possibly missing role.
pub fn hierarchy_of(role: Option<Role>) -> u8 {
    role.map(Role::hierarchy).unwrap_or(LOWEST_RANK)
}

/// Registry lookup by raw name; anything unrecognised ranks lowest.
pub fn hierarchy_of_name(raw: &str) -> u8 {
    hierarchy_of(Role::parse(raw))
}

/// Fully populated permission record for a role. Unknown or missing roles get nothing.
pub fn permissions_of(role: Option<Role>) -> PermissionSet {
    match role {
        Some(Role::Admin) => PermissionSet::all(),
        Some(Role::SalesManager) => PermissionSet {
            can_manage_users: true,
            can_approve_properties: true,
            can_manage_properties: true,
            can_manage_launches: true,
            can_manage_developers: true,
            can_manage_inquiries: true,
            can_manage_leads: true,
            can_manage_jobs: false,
            can_access_dashboard: true,
            can_bulk_upload: true,
        },
        Some(Role::SalesTeamLeader) => PermissionSet {
            can_approve_properties: true,
            can_manage_properties: true,
            can_manage_inquiries: true,
            can_manage_leads: true,
            can_access_dashboard: true,
            ..PermissionSet::none()
        },
        Some(Role::SalesAgent) => PermissionSet {
            can_manage_properties: true,
            can_manage_inquiries: true,
            can_manage_leads: true,
            can_access_dashboard: true,
            ..PermissionSet::none()
        },
        Some(Role::User) | None => PermissionSet::none(),
    }
}

/// Permissions looked up by raw role name.
pub fn permissions_of_name(raw: &str) -> PermissionSet {
    permissions_of(Role::parse(raw))
}
