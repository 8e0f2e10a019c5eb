use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::access::{
    can_approve_properties, has_permission, is_admin_family, Actor, PermissionFlag, Role,
};
use crate::accounts::ActorRepository;
use crate::cache::{CacheKey, CacheTtls, TtlCache};
use crate::clock::Clock;
use crate::store::RepositoryError;
use crate::validation::ValidationError;

use super::approval::{decide_on_create, decide_on_edit, Transition};
use super::domain::{
    ApprovalStats, ApprovalStatus, PropertyDraft, PropertyId, PropertyPatch, PropertyRecord,
    PropertyView, ViewVariant,
};
use super::query::{ListingQuery, Page, PageRequest};
use super::repository::{ImageStore, PropertyFilter, PropertyRepository, TransitionOutcome};

const MAX_REASON_LEN: usize = 1_000;
const STATS_FINGERPRINT: &str = "approval";

/// Error raised by the listing service.
#[derive(Debug, thiserror::Error)]
pub enum ListingError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("forbidden: {0}")]
    Forbidden(&'static str),
    #[error("property not found")]
    NotFound,
    #[error("property is already {current}; only PENDING properties can be reviewed")]
    InvalidState { current: ApprovalStatus },
    #[error("property changed while it was being edited; reload and retry")]
    Conflict,
    #[error(transparent)]
    Repository(RepositoryError),
}

impl From<RepositoryError> for ListingError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::NotFound => Self::NotFound,
            RepositoryError::Conflict => Self::Conflict,
            other => Self::Repository(other),
        }
    }
}

/// Payloads held in the listing cache.
#[derive(Debug, Clone)]
pub enum CachedListing {
    Page(Page<PropertyView>),
    Detail(PropertyView),
    Stats(ApprovalStats),
}

/// Submission, moderation, and cached reads over listings.
pub struct PropertyService<S, B> {
    store: Arc<S>,
    images: Arc<B>,
    cache: TtlCache<CachedListing>,
    clock: Arc<dyn Clock>,
}

impl<S, B> PropertyService<S, B>
where
    S: PropertyRepository + ActorRepository + 'static,
    B: ImageStore + 'static,
{
    pub fn new(store: Arc<S>, images: Arc<B>, ttls: CacheTtls, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            images,
            cache: TtlCache::new(ttls, clock.clone()),
            clock,
        }
    }

    pub fn cache(&self) -> &TtlCache<CachedListing> {
        &self.cache
    }

    pub fn create(
        &self,
        actor: &Actor,
        draft: PropertyDraft,
    ) -> Result<PropertyRecord, ListingError> {
        draft.validate()?;

        let now = self.clock.now();
        let mut record = PropertyRecord::from_draft(draft, actor.id, now);
        decide_on_create(actor, now).apply(&mut record);

        let record = self.store.insert_property(record)?;
        self.invalidate(&record.id);
        info!(
            property_id = %record.id,
            actor_id = %actor.id,
            status = %record.approval_status,
            "property submitted"
        );
        Ok(record)
    }

    pub fn edit(
        &self,
        actor: &Actor,
        id: &PropertyId,
        patch: PropertyPatch,
    ) -> Result<PropertyRecord, ListingError> {
        patch.validate()?;

        let seen = self.store.fetch_property(id)?.ok_or(ListingError::NotFound)?;
        if !seen.is_owned_by(&actor.id)
            && !has_permission(Some(actor), PermissionFlag::ManageProperties)
        {
            return Err(ListingError::Forbidden(
                "only the submitter or a property manager may edit this property",
            ));
        }

        let now = self.clock.now();
        let previous = seen.approval_status;
        let mut record = seen.clone();
        patch.apply_fields(&mut record);
        decide_on_edit(actor, previous, now).apply(&mut record);
        record.updated_at = now;

        self.store.replace_property_if_unchanged(record.clone(), &seen)?;
        self.invalidate(id);
        info!(
            property_id = %record.id,
            actor_id = %actor.id,
            from = %previous,
            to = %record.approval_status,
            "property edited"
        );
        Ok(record)
    }

    pub fn approve(&self, actor: &Actor, id: &PropertyId) -> Result<PropertyRecord, ListingError> {
        require_approver(actor)?;

        let transition = Transition::approve(actor.id, self.clock.now());
        let record = self.review(id, &transition)?;
        info!(property_id = %id, reviewer_id = %actor.id, "property approved");
        Ok(record)
    }

    /// Reject a pending listing. Images of plain-user submissions are deleted from blob
    /// storage afterwards; deletion failures are logged and do not fail the rejection.
    pub fn reject(
        &self,
        actor: &Actor,
        id: &PropertyId,
        reason: Option<String>,
    ) -> Result<PropertyRecord, ListingError> {
        if let Some(reason) = &reason {
            if reason.chars().count() > MAX_REASON_LEN {
                return Err(ValidationError::new(
                    "reason",
                    format!("must be at most {MAX_REASON_LEN} characters"),
                )
                .into());
            }
        }
        require_approver(actor)?;

        let transition = Transition::reject(actor.id, self.clock.now(), reason);
        let record = self.review(id, &transition)?;
        let purged = self.purge_user_images(&record);
        info!(
            property_id = %id,
            reviewer_id = %actor.id,
            images_deleted = purged,
            "property rejected"
        );
        Ok(record)
    }

    pub fn get(
        &self,
        viewer: Option<&Actor>,
        id: &PropertyId,
        bypass: bool,
    ) -> Result<PropertyView, ListingError> {
        let variant = variant_for(viewer);
        let key = CacheKey::detail(id.to_string(), variant.as_str());

        let view = match self.cache.lookup(&key, bypass) {
            Some(CachedListing::Detail(view)) => view,
            _ => {
                let record = self.store.fetch_property(id)?.ok_or(ListingError::NotFound)?;
                let view = PropertyView::project(&record, variant);
                self.cache.set(key, CachedListing::Detail(view.clone()));
                view
            }
        };

        let own_submission = viewer.is_some_and(|actor| actor.id == view.submitted_by_id);
        if variant == ViewVariant::Public
            && view.approval_status != ApprovalStatus::Approved
            && !own_submission
        {
            return Err(ListingError::NotFound);
        }
        Ok(view)
    }

    /// Paginated listing. Only staff may filter by status; everyone else sees `APPROVED`.
    pub fn list(
        &self,
        viewer: Option<&Actor>,
        query: &ListingQuery,
    ) -> Result<Page<PropertyView>, ListingError> {
        let request = query.validate()?;
        let variant = variant_for(viewer);
        let status = match variant {
            ViewVariant::Staff => request.status,
            ViewVariant::Public => Some(ApprovalStatus::Approved),
        };
        let role = viewer.map_or("anonymous", |actor| actor.role.as_str());
        let key = CacheKey::list(format!(
            "page={}:limit={}:status={}:role={role}",
            request.page,
            request.limit,
            status.map_or("ALL", ApprovalStatus::label),
        ));

        if let Some(CachedListing::Page(page)) = self.cache.lookup(&key, query.fresh) {
            debug!(key = %key, "listing served from cache");
            return Ok(page);
        }

        let filter = PropertyFilter {
            status,
            submitted_by_id: None,
        };
        let page = self.load_page(&filter, &request, variant)?;
        self.cache.set(key, CachedListing::Page(page.clone()));
        Ok(page)
    }

    /// Approval queue. Always read from the store.
    pub fn pending(
        &self,
        actor: &Actor,
        query: &ListingQuery,
    ) -> Result<Page<PropertyView>, ListingError> {
        let request = query.validate()?;
        require_approver(actor)?;

        let filter = PropertyFilter::with_status(ApprovalStatus::Pending);
        self.load_page(&filter, &request, ViewVariant::Staff)
    }

    pub fn stats(&self, actor: &Actor, bypass: bool) -> Result<ApprovalStats, ListingError> {
        if !is_admin_family(Some(actor)) {
            return Err(ListingError::Forbidden("requires a staff account"));
        }

        let key = CacheKey::stats(STATS_FINGERPRINT);
        if let Some(CachedListing::Stats(stats)) = self.cache.lookup(&key, bypass) {
            return Ok(stats);
        }
        let stats = self.store.count_by_status()?;
        self.cache.set(key, CachedListing::Stats(stats));
        Ok(stats)
    }

    pub fn invalidate(&self, id: &PropertyId) {
        let dropped = self.cache.invalidate(&id.to_string());
        debug!(property_id = %id, dropped, "listing cache invalidated");
    }

    /// Drop everything, used after writes that touch many listings at once.
    pub fn invalidate_all(&self) {
        self.cache.clear();
    }

    fn review(
        &self,
        id: &PropertyId,
        transition: &Transition,
    ) -> Result<PropertyRecord, ListingError> {
        match self.store.transition_pending(id, transition)? {
            TransitionOutcome::Applied(record) => {
                self.invalidate(id);
                Ok(record)
            }
            TransitionOutcome::NotPending(current) => Err(ListingError::InvalidState { current }),
            TransitionOutcome::Missing => Err(ListingError::NotFound),
        }
    }

    fn load_page(
        &self,
        filter: &PropertyFilter,
        request: &PageRequest,
        variant: ViewVariant,
    ) -> Result<Page<PropertyView>, ListingError> {
        let (records, total) =
            self.store
                .list_properties(filter, request.offset(), request.limit as usize)?;
        let items = records
            .iter()
            .map(|record| PropertyView::project(record, variant))
            .collect();
        Ok(Page::new(items, request, total))
    }

    fn purge_user_images(&self, record: &PropertyRecord) -> usize {
        let submitter = match self.store.fetch_actor(&record.submitted_by_id) {
            Ok(Some(submitter)) => submitter,
            Ok(None) => return 0,
            Err(err) => {
                warn!(
                    property_id = %record.id,
                    error = %err,
                    "could not load submitter; skipping image cleanup"
                );
                return 0;
            }
        };
        if submitter.role != Role::User {
            return 0;
        }

        let mut deleted = 0;
        for public_id in record.hosted_image_ids() {
            match self.images.delete(&public_id) {
                Ok(()) => deleted += 1,
                Err(err) => warn!(
                    property_id = %record.id,
                    public_id = %public_id,
                    error = %err,
                    "failed to delete rejected property image"
                ),
            }
        }
        deleted
    }
}

fn variant_for(viewer: Option<&Actor>) -> ViewVariant {
    if is_admin_family(viewer) {
        ViewVariant::Staff
    } else {
        ViewVariant::Public
    }
}

fn require_approver(actor: &Actor) -> Result<(), ListingError> {
    if can_approve_properties(Some(actor)) {
        Ok(())
    } else {
        Err(ListingError::Forbidden(
            "requires approver rank or canApproveProperties",
        ))
    }
}
