use serde::{Deserialize, Serialize};

use super::errors::DomainError;

/// Largest row offset a store is asked to skip (SQL `OFFSET` is signed)
const MAX_OFFSET: u64 = i64::MAX as u64;

/// Pagination query parameters (1-based page number)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationParams {
    pub page_number: u64,
    pub page_size: u64,
}

impl PaginationParams {
    pub fn new(page_number: u64, page_size: u64) -> Result<Self, DomainError> {
        if page_number < 1 {
            return Err(DomainError::InvalidArgument(
                "pageNumber must be at least 1".to_string(),
            ));
        }
        if page_size == 0 {
            return Err(DomainError::InvalidArgument(
                "pageSize must be greater than 0".to_string(),
            ));
        }
        let offset = (page_number - 1).checked_mul(page_size);
        if !matches!(offset, Some(offset) if offset <= MAX_OFFSET) {
            return Err(DomainError::InvalidArgument(
                "pageNumber is out of range for this pageSize".to_string(),
            ));
        }
        Ok(Self {
            page_number,
            page_size,
        })
    }

    /// Rows to skip; saturates for hand-built params past the last page.
    pub fn offset(&self) -> u64 {
        self.page_number.saturating_sub(1).saturating_mul(self.page_size)
    }
}

/// One page of results plus the size of the unpaged set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedResult<T> {
    pub items: Vec<T>,
    pub total_count: u64,
    pub page_number: u64,
    pub page_size: u64,
    pub total_pages: u64,
}

impl<T> PagedResult<T> {
    pub fn new(items: Vec<T>, total_count: u64, params: PaginationParams) -> Self {
        Self {
            items,
            total_count,
            page_number: params.page_number,
            page_size: params.page_size,
            total_pages: total_count.div_ceil(params.page_size),
        }
    }
}
