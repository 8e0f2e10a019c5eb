use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::access::ActorId;
use crate::validation::{require_text, ValidationError};

const MAX_TITLE_LEN: usize = 200;
const MAX_DESCRIPTION_LEN: usize = 5_000;
const MAX_LOCATION_LEN: usize = 120;
const MAX_IMAGES: usize = 30;

/// Identifier wrapper for property listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyId(pub Uuid);

impl PropertyId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PropertyId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for PropertyId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// Moderation state of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "PENDING",
            ApprovalStatus::Approved => "APPROVED",
            ApprovalStatus::Rejected => "REJECTED",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Some(Self::Pending),
            "APPROVED" => Some(Self::Approved),
            "REJECTED" => Some(Self::Rejected),
            _ => None,
        }
    }
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Governorate → city → area placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyLocation {
    pub governorate: String,
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,
}

impl PropertyLocation {
    fn validate(&self) -> Result<(), ValidationError> {
        require_text("location.governorate", &self.governorate, MAX_LOCATION_LEN)?;
        require_text("location.city", &self.city, MAX_LOCATION_LEN)?;
        if let Some(area) = &self.area {
            require_text("location.area", area, MAX_LOCATION_LEN)?;
        }
        Ok(())
    }
}

/// Image hosted in external blob storage. `public_id` is the storage handle, when known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyImage {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_id: Option<String>,
}

fn validate_images(images: &[PropertyImage]) -> Result<(), ValidationError> {
    if images.len() > MAX_IMAGES {
        return Err(ValidationError::new(
            "images",
            format!("at most {MAX_IMAGES} images are allowed"),
        ));
    }
    for image in images {
        require_text("images.url", &image.url, 2_048)?;
    }
    Ok(())
}

/// Listing submission payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: u64,
    pub location: PropertyLocation,
    #[serde(default)]
    pub images: Vec<PropertyImage>,
}

impl PropertyDraft {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("title", &self.title, MAX_TITLE_LEN)?;
        if self.description.chars().count() > MAX_DESCRIPTION_LEN {
            return Err(ValidationError::new(
                "description",
                format!("must be at most {MAX_DESCRIPTION_LEN} characters"),
            ));
        }
        if self.price == 0 {
            return Err(ValidationError::new("price", "must be greater than zero"));
        }
        self.location.validate()?;
        validate_images(&self.images)
    }
}

/// Partial edit; absent fields keep their stored values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<u64>,
    pub location: Option<PropertyLocation>,
    pub images: Option<Vec<PropertyImage>>,
}

impl PropertyPatch {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(title) = &self.title {
            require_text("title", title, MAX_TITLE_LEN)?;
        }
        if let Some(description) = &self.description {
            if description.chars().count() > MAX_DESCRIPTION_LEN {
                return Err(ValidationError::new(
                    "description",
                    format!("must be at most {MAX_DESCRIPTION_LEN} characters"),
                ));
            }
        }
        if self.price == Some(0) {
            return Err(ValidationError::new("price", "must be greater than zero"));
        }
        if let Some(location) = &self.location {
            location.validate()?;
        }
        if let Some(images) = &self.images {
            validate_images(images)?;
        }
        Ok(())
    }

    pub(crate) fn apply_fields(self, record: &mut PropertyRecord) {
        if let Some(title) = self.title {
            record.title = title.trim().to_string();
        }
        if let Some(description) = self.description {
            record.description = description;
        }
        if let Some(price) = self.price {
            record.price = price;
        }
        if let Some(location) = self.location {
            record.location = location;
        }
        if let Some(images) = self.images {
            record.images = images;
        }
    }
}

/// Stored listing with its moderation trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyRecord {
    pub id: PropertyId,
    pub title: String,
    pub description: String,
    pub price: u64,
    pub location: PropertyLocation,
    pub images: Vec<PropertyImage>,
    pub created_by_id: ActorId,
    pub submitted_by_id: ActorId,
    pub approval_status: ApprovalStatus,
    pub approved_by_id: Option<ActorId>,
    pub approval_date: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PropertyRecord {
    /// Fresh record owned by `author`, still pending until a decision is applied.
    pub fn from_draft(draft: PropertyDraft, author: ActorId, now: DateTime<Utc>) -> Self {
        Self {
            id: PropertyId::new(),
            title: draft.title.trim().to_string(),
            description: draft.description,
            price: draft.price,
            location: draft.location,
            images: draft.images,
            created_by_id: author,
            submitted_by_id: author,
            approval_status: ApprovalStatus::Pending,
            approved_by_id: None,
            approval_date: None,
            rejection_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_owned_by(&self, actor_id: &ActorId) -> bool {
        self.submitted_by_id == *actor_id || self.created_by_id == *actor_id
    }

    pub fn hosted_image_ids(&self) -> Vec<String> {
        self.images
            .iter()
            .filter_map(|image| image.public_id.clone())
            .filter(|id| !id.trim().is_empty())
            .collect()
    }
}

/// Which projection of a listing a caller receives. Cached separately per variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewVariant {
    Staff,
    Public,
}

impl ViewVariant {
    pub const ALL: [ViewVariant; 2] = [ViewVariant::Staff, ViewVariant::Public];

    pub const fn as_str(self) -> &'static str {
        match self {
            ViewVariant::Staff => "staff",
            ViewVariant::Public => "public",
        }
    }
}

/// Listing as returned over HTTP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyView {
    pub id: PropertyId,
    pub title: String,
    pub description: String,
    pub price: u64,
    pub location: PropertyLocation,
    pub images: Vec<PropertyImage>,
    pub approval_status: ApprovalStatus,
    pub submitted_by_id: ActorId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by_id: Option<ActorId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_by_id: Option<ActorId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approval_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PropertyView {
    pub fn project(record: &PropertyRecord, variant: ViewVariant) -> Self {
        let staff = variant == ViewVariant::Staff;
        Self {
            id: record.id,
            title: record.title.clone(),
            description: record.description.clone(),
            price: record.price,
            location: record.location.clone(),
            images: record.images.clone(),
            approval_status: record.approval_status,
            submitted_by_id: record.submitted_by_id,
            rejection_reason: record.rejection_reason.clone(),
            created_by_id: staff.then_some(record.created_by_id),
            approved_by_id: record.approved_by_id.filter(|_| staff),
            approval_date: record.approval_date.filter(|_| staff),
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// Listing counts per moderation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalStats {
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
    pub total: usize,
}

impl ApprovalStats {
    pub fn record(&mut self, status: ApprovalStatus) {
        match status {
            ApprovalStatus::Pending => self.pending += 1,
            ApprovalStatus::Approved => self.approved += 1,
            ApprovalStatus::Rejected => self.rejected += 1,
        }
        self.total += 1;
    }
}
