use crate::access::ActorId;
use crate::store::RepositoryError;

use super::domain::{ActorRecord, OwnershipTransfer};

/// Storage abstraction for accounts so the services can be exercised in isolation.
pub trait ActorRepository: Send + Sync {
    fn insert_actor(&self, record: ActorRecord) -> Result<ActorRecord, RepositoryError>;
    fn update_actor(&self, record: ActorRecord) -> Result<(), RepositoryError>;
    fn fetch_actor(&self, id: &ActorId) -> Result<Option<ActorRecord>, RepositoryError>;
    fn find_actor_by_email(&self, email: &str) -> Result<Option<ActorRecord>, RepositoryError>;

    /// Hand every listing the target submitted, created, or approved to `successor`, clear the
    /// target's inquiry assignments, and delete the target. All-or-nothing: on error none of
    /// the records change.
    fn delete_actor_transferring(
        &self,
        target: &ActorId,
        successor: &ActorId,
    ) -> Result<OwnershipTransfer, RepositoryError>;
}
