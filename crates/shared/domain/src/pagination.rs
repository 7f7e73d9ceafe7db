//! Pagination policy shared by the list operations.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_PAGE_NUMBER, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::error::{DomainError, DomainResult};

/// A validated page request (1-indexed page, positive limit).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    page: u64,
    limit: u64,
}

impl PageRequest {
    /// Create a page request.
    ///
    /// # Errors
    /// Returns a validation error if `page` or `limit` is zero, if `limit`
    /// exceeds [`MAX_PAGE_SIZE`], or if the page starts beyond the largest
    /// offset the store accepts (`i64::MAX`).
    pub fn new(page: u64, limit: u64) -> DomainResult<Self> {
        if page < 1 {
            return Err(DomainError::validation("Page must be at least 1"));
        }
        if limit < 1 {
            return Err(DomainError::validation("Limit must be at least 1"));
        }
        if limit > MAX_PAGE_SIZE {
            return Err(DomainError::validation(format!(
                "Limit must be at most {}",
                MAX_PAGE_SIZE
            )));
        }

        let skip = (page - 1).checked_mul(limit);
        if !matches!(skip, Some(skip) if skip <= i64::MAX as u64) {
            return Err(DomainError::validation("Page is out of range"));
        }

        Ok(Self { page, limit })
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Number of records to skip before this page.
    pub fn skip(&self) -> u64 {
        (self.page - 1) * self.limit
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE_NUMBER,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Pagination metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    pub total: u64,
    pub page: u64,
    pub last_page: u64,
}

impl PageMeta {
    /// Compute metadata for `request` given the total number of matches.
    pub fn new(total: u64, request: &PageRequest) -> Self {
        Self {
            total,
            page: request.page,
            last_page: total.div_ceil(request.limit),
        }
    }
}

/// Paginated response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub meta: PageMeta,
    pub data: Vec<T>,
}

impl<T> Paginated<T> {
    pub fn new(data: Vec<T>, meta: PageMeta) -> Self {
        Self { meta, data }
    }

    /// Transform every record while keeping the metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            meta: self.meta,
            data: self.data.into_iter().map(f).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_first_page_skips_nothing() {
        let request = PageRequest::new(1, 25).unwrap();
        assert_eq!(request.skip(), 0);
    }

    #[test]
    fn test_skip_for_later_page() {
        let request = PageRequest::new(3, 10).unwrap();
        assert_eq!(request.skip(), 20);
    }

    #[test]
    fn test_last_page_rounds_up() {
        let request = PageRequest::new(1, 10).unwrap();
        assert_eq!(PageMeta::new(21, &request).last_page, 3);
        assert_eq!(PageMeta::new(20, &request).last_page, 2);
    }

    #[test]
    fn test_empty_total_has_no_pages() {
        let request = PageRequest::new(4, 10).unwrap();
        let meta = PageMeta::new(0, &request);
        assert_eq!(meta.last_page, 0);
        assert_eq!(meta.page, 4);
    }

    #[test]
    fn test_zero_page_or_limit_rejected() {
        assert!(matches!(PageRequest::new(0, 10), Err(DomainError::Validation(_))));
        assert!(matches!(PageRequest::new(1, 0), Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_limit_above_maximum_rejected() {
        assert!(PageRequest::new(1, MAX_PAGE_SIZE).is_ok());
        assert!(matches!(
            PageRequest::new(1, MAX_PAGE_SIZE + 1),
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(PageRequest::new(2, u64::MAX), Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_page_beyond_largest_offset_rejected() {
        assert!(matches!(PageRequest::new(u64::MAX, 10), Err(DomainError::Validation(_))));

        let last_page = i64::MAX as u64 / 10 + 1;
        let request = PageRequest::new(last_page, 10).unwrap();
        assert!(request.skip() <= i64::MAX as u64);
        assert!(matches!(
            PageRequest::new(last_page + 1, 10),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn test_default_request() {
        let request = PageRequest::default();
        assert_eq!(request.page(), DEFAULT_PAGE_NUMBER);
        assert_eq!(request.limit(), DEFAULT_PAGE_SIZE);
    }

    proptest! {
        #[test]
        fn skip_and_last_page_follow_the_policy(
            page in 1u64..10_000,
            limit in 1u64..=MAX_PAGE_SIZE,
            total in 0u64..10_000_000,
        ) {
            let request = PageRequest::new(page, limit).unwrap();
            let meta = PageMeta::new(total, &request);

            prop_assert_eq!(request.skip(), (page - 1) * limit);
            prop_assert_eq!(meta.last_page, (total + limit - 1) / limit);
            prop_assert!(meta.last_page * limit >= total);
            prop_assert!(meta.last_page == 0 || (meta.last_page - 1) * limit < total);
            prop_assert_eq!(meta.total, total);
            prop_assert_eq!(meta.page, page);
            if total == 0 {
                prop_assert_eq!(meta.last_page, 0);
            }
        }
    }
}
