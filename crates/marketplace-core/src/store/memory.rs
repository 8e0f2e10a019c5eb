use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::access::ActorId;
use crate::accounts::{ActorRecord, ActorRepository, OwnershipTransfer};
use crate::inquiries::{InquiryId, InquiryRecord, InquiryRepository};
use crate::listings::{
    ApprovalStats, ApprovalStatus, PropertyFilter, PropertyId, PropertyRecord,
    PropertyRepository, Transition, TransitionOutcome,
};

use super::RepositoryError;

#[derive(Debug, Default)]
struct StoreState {
    actors: HashMap<ActorId, ActorRecord>,
    properties: HashMap<PropertyId, PropertyRecord>,
    inquiries: HashMap<InquiryId, InquiryRecord>,
}

/// In-memory store backing every repository behind one lock, so multi-record writes are
/// atomic with respect to other callers.
#[derive(Debug, Default, Clone)]
pub struct InMemoryStore {
    state: Arc<Mutex<StoreState>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn actor_count(&self) -> usize {
        self.state.lock().expect("store mutex poisoned").actors.len()
    }

    pub fn property_count(&self) -> usize {
        self.state
            .lock()
            .expect("store mutex poisoned")
            .properties
            .len()
    }
}

impl ActorRepository for InMemoryStore {
    fn insert_actor(&self, record: ActorRecord) -> Result<ActorRecord, RepositoryError> {
        let mut guard = self.state.lock().expect("store mutex poisoned");
        if guard.actors.contains_key(&record.id)
            || guard
                .actors
                .values()
                .any(|existing| existing.email == record.email)
        {
            return Err(RepositoryError::Conflict);
        }
        guard.actors.insert(record.id, record.clone());
        Ok(record)
    }

    fn update_actor(&self, record: ActorRecord) -> Result<(), RepositoryError> {
        let mut guard = self.state.lock().expect("store mutex poisoned");
        if guard
            .actors
            .values()
            .any(|existing| existing.id != record.id && existing.email == record.email)
        {
            return Err(RepositoryError::Conflict);
        }
        match guard.actors.get_mut(&record.id) {
            Some(slot) => {
                *slot = record;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch_actor(&self, id: &ActorId) -> Result<Option<ActorRecord>, RepositoryError> {
        let guard = self.state.lock().expect("store mutex poisoned");
        Ok(guard.actors.get(id).cloned())
    }

    fn find_actor_by_email(&self, email: &str) -> Result<Option<ActorRecord>, RepositoryError> {
        let guard = self.state.lock().expect("store mutex poisoned");
        Ok(guard
            .actors
            .values()
            .find(|record| record.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    fn delete_actor_transferring(
        &self,
        target: &ActorId,
        successor: &ActorId,
    ) -> Result<OwnershipTransfer, RepositoryError> {
        let mut guard = self.state.lock().expect("store mutex poisoned");
        if target == successor
            || !guard.actors.contains_key(target)
            || !guard.actors.contains_key(successor)
        {
            return Err(RepositoryError::NotFound);
        }

        let mut transfer = OwnershipTransfer::default();
        for property in guard.properties.values_mut() {
            let mut owned = false;
            if property.submitted_by_id == *target {
                property.submitted_by_id = *successor;
                owned = true;
            }
            if property.created_by_id == *target {
                property.created_by_id = *successor;
                owned = true;
            }
            if owned {
                transfer.properties_reassigned += 1;
            }
            if property.approved_by_id == Some(*target) {
                property.approved_by_id = Some(*successor);
                transfer.approvals_reassigned += 1;
            }
        }
        for inquiry in guard.inquiries.values_mut() {
            if inquiry.assigned_to_id == Some(*target) {
                inquiry.assigned_to_id = None;
                transfer.inquiries_unassigned += 1;
            }
        }
        guard.actors.remove(target);
        Ok(transfer)
    }
}

impl PropertyRepository for InMemoryStore {
    fn insert_property(&self, record: PropertyRecord) -> Result<PropertyRecord, RepositoryError> {
        let mut guard = self.state.lock().expect("store mutex poisoned");
        if guard.properties.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.properties.insert(record.id, record.clone());
        Ok(record)
    }

    fn update_property(&self, record: PropertyRecord) -> Result<(), RepositoryError> {
        let mut guard = self.state.lock().expect("store mutex poisoned");
        match guard.properties.get_mut(&record.id) {
            Some(slot) => {
                *slot = record;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch_property(&self, id: &PropertyId) -> Result<Option<PropertyRecord>, RepositoryError> {
        let guard = self.state.lock().expect("store mutex poisoned");
        Ok(guard.properties.get(id).cloned())
    }

    fn replace_property_if_unchanged(
        &self,
        record: PropertyRecord,
        seen: &PropertyRecord,
    ) -> Result<(), RepositoryError> {
        let mut guard = self.state.lock().expect("store mutex poisoned");
        match guard.properties.get_mut(&record.id) {
            Some(slot) if *slot == *seen => {
                *slot = record;
                Ok(())
            }
            Some(_) => Err(RepositoryError::Conflict),
            None => Err(RepositoryError::NotFound),
        }
    }

    fn transition_pending(
        &self,
        id: &PropertyId,
        transition: &Transition,
    ) -> Result<TransitionOutcome, RepositoryError> {
        let mut guard = self.state.lock().expect("store mutex poisoned");
        let Some(record) = guard.properties.get_mut(id) else {
            return Ok(TransitionOutcome::Missing);
        };
        if record.approval_status != ApprovalStatus::Pending {
            return Ok(TransitionOutcome::NotPending(record.approval_status));
        }
        transition.apply_to(record);
        Ok(TransitionOutcome::Applied(record.clone()))
    }

    fn list_properties(
        &self,
        filter: &PropertyFilter,
        offset: usize,
        limit: usize,
    ) -> Result<(Vec<PropertyRecord>, usize), RepositoryError> {
        let guard = self.state.lock().expect("store mutex poisoned");
        let mut matches: Vec<&PropertyRecord> = guard
            .properties
            .values()
            .filter(|record| filter.matches(record))
            .collect();
        matches.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });

        let total = matches.len();
        let items = matches
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();
        Ok((items, total))
    }

    fn count_by_status(&self) -> Result<ApprovalStats, RepositoryError> {
        let guard = self.state.lock().expect("store mutex poisoned");
        let mut stats = ApprovalStats::default();
        for record in guard.properties.values() {
            stats.record(record.approval_status);
        }
        Ok(stats)
    }
}

impl InquiryRepository for InMemoryStore {
    fn insert_inquiry(&self, record: InquiryRecord) -> Result<InquiryRecord, RepositoryError> {
        let mut guard = self.state.lock().expect("store mutex poisoned");
        if guard.inquiries.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.inquiries.insert(record.id, record.clone());
        Ok(record)
    }

    fn fetch_inquiry(&self, id: &InquiryId) -> Result<Option<InquiryRecord>, RepositoryError> {
        let guard = self.state.lock().expect("store mutex poisoned");
        Ok(guard.inquiries.get(id).cloned())
    }

    fn assign_inquiry(
        &self,
        id: &InquiryId,
        assignee: Option<ActorId>,
    ) -> Result<InquiryRecord, RepositoryError> {
        let mut guard = self.state.lock().expect("store mutex poisoned");
        if let Some(actor_id) = assignee {
            if !guard.actors.contains_key(&actor_id) {
                return Err(RepositoryError::NotFound);
            }
        }
        let record = guard
            .inquiries
            .get_mut(id)
            .ok_or(RepositoryError::NotFound)?;
        record.assigned_to_id = assignee;
        Ok(record.clone())
    }
}
