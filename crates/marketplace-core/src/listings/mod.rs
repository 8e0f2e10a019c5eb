//! Property listings and their approval workflow.

pub mod approval;
pub mod domain;
pub mod query;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use approval::{
    can_auto_approve, decide_on_create, decide_on_edit, ApprovalDecision, EditPatch, Transition,
    DEFAULT_REJECTION_REASON,
};
pub use domain::{
    ApprovalStats, ApprovalStatus, PropertyDraft, PropertyId, PropertyImage, PropertyLocation,
    PropertyPatch, PropertyRecord, PropertyView, ViewVariant,
};
pub use query::{ListingQuery, Page, PageRequest, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use repository::{BlobError, ImageStore, PropertyFilter, PropertyRepository, TransitionOutcome};
pub use router::listing_router;
pub use service::{CachedListing, ListingError, PropertyService};
