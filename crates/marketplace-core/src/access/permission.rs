use serde::{Deserialize, Serialize};

/// Individual capability checked by the evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PermissionFlag {
    ManageUsers,
    ApproveProperties,
    ManageProperties,
    ManageLaunches,
    ManageDevelopers,
    ManageInquiries,
    ManageLeads,
    ManageJobs,
    AccessDashboard,
    BulkUpload,
}

impl PermissionFlag {
    pub const ALL: [PermissionFlag; 10] = [
        PermissionFlag::ManageUsers,
        PermissionFlag::ApproveProperties,
        PermissionFlag::ManageProperties,
        PermissionFlag::ManageLaunches,
        PermissionFlag::ManageDevelopers,
        PermissionFlag::ManageInquiries,
        PermissionFlag::ManageLeads,
        PermissionFlag::ManageJobs,
        PermissionFlag::AccessDashboard,
        PermissionFlag::BulkUpload,
    ];

    /// Field name used on stored actor records.
    pub const fn field(self) -> &'static str {
        match self {
            PermissionFlag::ManageUsers => "canManageUsers",
            PermissionFlag::ApproveProperties => "canApproveProperties",
            PermissionFlag::ManageProperties => "canManageProperties",
            PermissionFlag::ManageLaunches => "canManageLaunches",
            PermissionFlag::ManageDevelopers => "canManageDevelopers",
            PermissionFlag::ManageInquiries => "canManageInquiries",
            PermissionFlag::ManageLeads => "canManageLeads",
            PermissionFlag::ManageJobs => "canManageJobs",
            PermissionFlag::AccessDashboard => "canAccessDashboard",
            PermissionFlag::BulkUpload => "canBulkUpload",
        }
    }
}

/// Boolean record with every flag spelled out. Stored denormalized on the actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionSet {
    pub can_manage_users: bool,
    pub can_approve_properties: bool,
    pub can_manage_properties: bool,
    pub can_manage_launches: bool,
    pub can_manage_developers: bool,
    pub can_manage_inquiries: bool,
    pub can_manage_leads: bool,
    pub can_manage_jobs: bool,
    pub can_access_dashboard: bool,
    pub can_bulk_upload: bool,
}

impl PermissionSet {
    pub const fn none() -> Self {
        Self {
            can_manage_users: false,
            can_approve_properties: false,
            can_manage_properties: false,
            can_manage_launches: false,
            can_manage_developers: false,
            can_manage_inquiries: false,
            can_manage_leads: false,
            can_manage_jobs: false,
            can_access_dashboard: false,
            can_bulk_upload: false,
        }
    }

    pub const fn all() -> Self {
        Self {
            can_manage_users: true,
            can_approve_properties: true,
            can_manage_properties: true,
            can_manage_launches: true,
            can_manage_developers: true,
            can_manage_inquiries: true,
            can_manage_leads: true,
            can_manage_jobs: true,
            can_access_dashboard: true,
            can_bulk_upload: true,
        }
    }

    pub const fn get(&self, flag: PermissionFlag) -> bool {
        match flag {
            PermissionFlag::ManageUsers => self.can_manage_users,
            PermissionFlag::ApproveProperties => self.can_approve_properties,
            PermissionFlag::ManageProperties => self.can_manage_properties,
            PermissionFlag::ManageLaunches => self.can_manage_launches,
            PermissionFlag::ManageDevelopers => self.can_manage_developers,
            PermissionFlag::ManageInquiries => self.can_manage_inquiries,
            PermissionFlag::ManageLeads => self.can_manage_leads,
            PermissionFlag::ManageJobs => self.can_manage_jobs,
            PermissionFlag::AccessDashboard => self.can_access_dashboard,
            PermissionFlag::BulkUpload => self.can_bulk_upload,
        }
    }

    pub fn granted(&self) -> Vec<PermissionFlag> {
        PermissionFlag::ALL
            .into_iter()
            .filter(|flag| self.get(*flag))
            .collect()
    }
}
