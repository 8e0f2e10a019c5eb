use serde::{Deserialize, Serialize};

use crate::validation::{require_range, ValidationError};

use super::domain::ApprovalStatus;

pub const DEFAULT_PAGE_SIZE: u32 = 12;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Query string accepted by the listing endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub status: Option<String>,
    #[serde(default)]
    pub fresh: bool,
}

impl ListingQuery {
    pub fn validate(&self) -> Result<PageRequest, ValidationError> {
        let page = match self.page {
            Some(page) => require_range("page", page, 1, u32::MAX)?,
            None => 1,
        };
        let limit = match self.limit {
            Some(limit) => require_range("limit", limit, 1, MAX_PAGE_SIZE)?,
            None => DEFAULT_PAGE_SIZE,
        };
        let status = match self.status.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(ApprovalStatus::parse(raw).ok_or_else(|| {
                ValidationError::new("status", "must be one of PENDING, APPROVED, REJECTED")
            })?),
        };
        Ok(PageRequest {
            page,
            limit,
            status,
        })
    }
}

/// Validated paging window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
    pub status: Option<ApprovalStatus>,
}

impl PageRequest {
    pub fn offset(&self) -> usize {
        (self.page as usize - 1).saturating_mul(self.limit as usize)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub limit: u32,
    pub total: usize,
    pub pages: usize,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: &PageRequest, total: usize) -> Self {
        Self {
            items,
            page: request.page,
            limit: request.limit,
            total,
            pages: total.div_ceil(request.limit as usize),
        }
    }
}
