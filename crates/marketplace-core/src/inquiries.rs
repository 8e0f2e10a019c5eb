//! Inquiry records, kept only as far as account deletion needs them: a deleted staff member's
//! assignments must be cleared in the same transaction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::access::ActorId;
use crate::listings::PropertyId;
use crate::store::RepositoryError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InquiryId(pub Uuid);

impl InquiryId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for InquiryId {
    fn default() -> Self {
        Self::new()
    }
}

/// Prospect inquiry about a listing, optionally assigned to a staff member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InquiryRecord {
    pub id: InquiryId,
    pub property_id: Option<PropertyId>,
    pub name: String,
    pub phone: String,
    pub message: String,
    pub assigned_to_id: Option<ActorId>,
    pub created_at: DateTime<Utc>,
}

pub trait InquiryRepository: Send + Sync {
    fn insert_inquiry(&self, record: InquiryRecord) -> Result<InquiryRecord, RepositoryError>;
    fn fetch_inquiry(&self, id: &InquiryId) -> Result<Option<InquiryRecord>, RepositoryError>;
    fn assign_inquiry(
        &self,
        id: &InquiryId,
        assignee: Option<ActorId>,
    ) -> Result<InquiryRecord, RepositoryError>;
}
