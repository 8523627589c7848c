//! Pagination helper types for repository queries

use serde::{Deserialize, Serialize};

/// Page of records to list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Page number, starting at 1
    pub page: u32,
    /// Number of items per page
    pub page_size: u32,
}

impl PageRequest {
    /// Create a new page request
    ///
    /// # Examples
    ///
    /// ```
    /// use core_library::repositories::PageRequest;
    ///
    /// let request = PageRequest::new(2, 10);
    /// assert_eq!(request.offset(), 10);
    /// assert_eq!(request.limit(), 10);
    /// ```
    pub fn new(page: u32, page_size: u32) -> Self {
        Self { page, page_size }
    }

    /// SQL OFFSET: `(page - 1) * page_size`
    ///
    /// Page 0 is treated as the first page.
    pub fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.page_size)
    }

    /// SQL LIMIT, same as `page_size`
    pub fn limit(&self) -> i64 {
        i64::from(self.page_size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 50,
        }
    }
}

/// Window of verses within one record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerseRange {
    /// Maximum number of verses returned
    pub limit: u32,
    /// Verses skipped, counted from the lowest number
    pub offset: u32,
}

impl VerseRange {
    pub fn new(limit: u32, offset: u32) -> Self {
        Self { limit, offset }
    }
}
