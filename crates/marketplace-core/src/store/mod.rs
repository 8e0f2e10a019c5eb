//! Storage contracts shared by the account, listing, and inquiry modules plus the in-process
//! implementation used by the service binary and tests.

mod memory;

pub use memory::InMemoryStore;

use crate::accounts::ActorRepository;
use crate::inquiries::InquiryRepository;
use crate::listings::PropertyRepository;

/// Error enumeration for repository failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Everything the marketplace needs from one backing store. Actor deletion spans actors,
/// properties, and inquiries, so the three repositories must share a transaction boundary.
pub trait MarketplaceStore: ActorRepository + PropertyRepository + InquiryRepository {}

impl<T> MarketplaceStore for T where T: ActorRepository + PropertyRepository + InquiryRepository {}
