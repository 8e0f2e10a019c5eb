//! Listing approval state machine.
//!
//! `PENDING` is the initial state for every submission unless the acting account may
//! auto-approve. `APPROVED` and `REJECTED` are otherwise reachable only from `PENDING`, once,
//! through [`Transition`], which repositories apply as a conditional update.

use chrono::{DateTime, Utc};

use crate::access::{
    has_permission, hierarchy_of, meets_hierarchy, Actor, ActorId, PermissionFlag, Role,
    APPROVER_RANK, TOP_RANK,
};

use super::domain::{ApprovalStatus, PropertyRecord};

pub const DEFAULT_REJECTION_REASON: &str = "No reason provided";

/// Top rank, the admin role, or approver rank together with `canApproveProperties`.
pub fn can_auto_approve(actor: &Actor) -> bool {
    if !actor.is_active {
        return false;
    }
    let actor = Some(actor);
    if hierarchy_of(actor) == TOP_RANK || actor.is_some_and(|a| a.role == Role::Admin) {
        return true;
    }
    meets_hierarchy(actor, APPROVER_RANK)
        && has_permission(actor, PermissionFlag::ApproveProperties)
}

/// Resulting approval fields for a listing write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApprovalDecision {
    pub status: ApprovalStatus,
    pub approved_by_id: Option<ActorId>,
    pub approval_date: Option<DateTime<Utc>>,
}

impl ApprovalDecision {
    pub fn pending() -> Self {
        Self {
            status: ApprovalStatus::Pending,
            approved_by_id: None,
            approval_date: None,
        }
    }

    pub fn approved_by(actor_id: ActorId, at: DateTime<Utc>) -> Self {
        Self {
            status: ApprovalStatus::Approved,
            approved_by_id: Some(actor_id),
            approval_date: Some(at),
        }
    }

    pub(crate) fn apply(&self, record: &mut PropertyRecord) {
        record.approval_status = self.status;
        record.approved_by_id = self.approved_by_id;
        record.approval_date = self.approval_date;
        record.rejection_reason = None;
    }
}

pub fn decide_on_create(actor: &Actor, now: DateTime<Utc>) -> ApprovalDecision {
    if can_auto_approve(actor) {
        ApprovalDecision::approved_by(actor.id, now)
    } else {
        ApprovalDecision::pending()
    }
}

/// Approval consequence of an edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditPatch {
    /// Trusted editor on an already approved listing: the existing approval stands.
    KeepApproval,
    /// Trusted editor on a pending or rejected listing: approve as the editor.
    Approve(ApprovalDecision),
    /// Untrusted editor: back to `PENDING`, approval trail cleared, editor becomes submitter.
    Resubmit { submitted_by_id: ActorId },
}

impl EditPatch {
    pub fn apply(&self, record: &mut PropertyRecord) {
        match self {
            EditPatch::KeepApproval => {}
            EditPatch::Approve(decision) => decision.apply(record),
            EditPatch::Resubmit { submitted_by_id } => {
                ApprovalDecision::pending().apply(record);
                record.submitted_by_id = *submitted_by_id;
            }
        }
    }
}

pub fn decide_on_edit(actor: &Actor, existing: ApprovalStatus, now: DateTime<Utc>) -> EditPatch {
    if !can_auto_approve(actor) {
        return EditPatch::Resubmit {
            submitted_by_id: actor.id,
        };
    }
    match existing {
        ApprovalStatus::Approved => EditPatch::KeepApproval,
        ApprovalStatus::Pending | ApprovalStatus::Rejected => {
            EditPatch::Approve(ApprovalDecision::approved_by(actor.id, now))
        }
    }
}

/// One-shot move out of `PENDING`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub status: ApprovalStatus,
    pub reviewer_id: ActorId,
    pub reviewed_at: DateTime<Utc>,
    pub rejection_reason: Option<String>,
}

impl Transition {
    pub fn approve(reviewer_id: ActorId, at: DateTime<Utc>) -> Self {
        Self {
            status: ApprovalStatus::Approved,
            reviewer_id,
            reviewed_at: at,
            rejection_reason: None,
        }
    }

    /// Blank or missing reasons fall back to the default text.
    pub fn reject(reviewer_id: ActorId, at: DateTime<Utc>, reason: Option<String>) -> Self {
        let reason = reason
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| DEFAULT_REJECTION_REASON.to_string());

        Self {
            status: ApprovalStatus::Rejected,
            reviewer_id,
            reviewed_at: at,
            rejection_reason: Some(reason),
        }
    }

    /// Write the transition onto a record the caller has confirmed is `PENDING`.
    pub fn apply_to(&self, record: &mut PropertyRecord) {
        debug_assert_eq!(record.approval_status, ApprovalStatus::Pending);
        record.approval_status = self.status;
        record.approved_by_id = Some(self.reviewer_id);
        record.approval_date = Some(self.reviewed_at);
        record.rejection_reason = self.rejection_reason.clone();
        record.updated_at = self.reviewed_at;
    }
}
