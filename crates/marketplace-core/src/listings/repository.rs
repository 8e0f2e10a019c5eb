use crate::access::ActorId;
use crate::store::RepositoryError;

use super::approval::Transition;
use super::domain::{ApprovalStats, ApprovalStatus, PropertyId, PropertyRecord};

/// Result of a conditional review write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionOutcome {
    Applied(PropertyRecord),
    /// The listing left `PENDING` before this write; carries the status found.
    NotPending(ApprovalStatus),
    Missing,
}

/// Listing filter; `None` fields match everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PropertyFilter {
    pub status: Option<ApprovalStatus>,
    pub submitted_by_id: Option<ActorId>,
}

impl PropertyFilter {
    pub fn with_status(status: ApprovalStatus) -> Self {
        Self {
            status: Some(status),
            submitted_by_id: None,
        }
    }

    pub fn matches(&self, record: &PropertyRecord) -> bool {
        self.status.map_or(true, |s| record.approval_status == s)
            && self
                .submitted_by_id
                .map_or(true, |id| record.submitted_by_id == id)
    }
}

/// Storage abstraction for listings.
pub trait PropertyRepository: Send + Sync {
    fn insert_property(&self, record: PropertyRecord) -> Result<PropertyRecord, RepositoryError>;
    fn update_property(&self, record: PropertyRecord) -> Result<(), RepositoryError>;
    fn fetch_property(&self, id: &PropertyId) -> Result<Option<PropertyRecord>, RepositoryError>;

    /// Write `record` only if the stored listing still equals `seen`, the copy the caller read.
    /// A listing that changed in between yields `Conflict` and stays as it is.
    fn replace_property_if_unchanged(
        &self,
        record: PropertyRecord,
        seen: &PropertyRecord,
    ) -> Result<(), RepositoryError>;

    /// Apply `transition` only if the listing is still `PENDING`, checked and written under a
    /// single lock or statement. Concurrent reviewers of the same listing see exactly one
    /// `Applied`.
    fn transition_pending(
        &self,
        id: &PropertyId,
        transition: &Transition,
    ) -> Result<TransitionOutcome, RepositoryError>;

    /// Newest first. Returns the requested slice and the total number of matches.
    fn list_properties(
        &self,
        filter: &PropertyFilter,
        offset: usize,
        limit: usize,
    ) -> Result<(Vec<PropertyRecord>, usize), RepositoryError>;

    fn count_by_status(&self) -> Result<ApprovalStats, RepositoryError>;
}

/// Failure reported by the external image host.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BlobError {
    #[error("asset '{0}' not found")]
    NotFound(String),
    #[error("image storage unavailable: {0}")]
    Unavailable(String),
}

/// External blob storage holding listing images.
pub trait ImageStore: Send + Sync {
    fn delete(&self, public_id: &str) -> Result<(), BlobError>;
}
