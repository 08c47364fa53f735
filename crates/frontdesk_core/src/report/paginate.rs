//! Client-side page slicing.
//!
//! # Invariants
//! - Pages are 1-based; out-of-range pages yield an empty slice, never an
//!   error.
//! - `total_pages` is at least 1, even for an empty set.
//! - User-facing page sizes come from [`PAGE_SIZE_OPTIONS`].

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Selectable page sizes.
pub const PAGE_SIZE_OPTIONS: [usize; 4] = [10, 20, 50, 100];

pub const DEFAULT_PAGE_SIZE: usize = 20;

/// A page size outside [`PAGE_SIZE_OPTIONS`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSizeError(pub usize);

impl Display for PageSizeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let options = PAGE_SIZE_OPTIONS
            .iter()
            .map(usize::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "page size {} is not one of {options}", self.0)
    }
}

impl Error for PageSizeError {}

/// Accepts `page_size` only when it is a selectable option.
pub fn page_size_option(page_size: usize) -> Result<usize, PageSizeError> {
    if PAGE_SIZE_OPTIONS.contains(&page_size) {
        Ok(page_size)
    } else {
        Err(PageSizeError(page_size))
    }
}

/// Returns page `page` (1-based) of `records`.
///
/// `page == 0` and `page_size == 0` both yield an empty slice.
pub fn paginate<T>(records: &[T], page: usize, page_size: usize) -> &[T] {
    let Some(start) = page
        .checked_sub(1)
        .and_then(|index| index.checked_mul(page_size))
    else {
        return &[];
    };
    if start >= records.len() {
        return &[];
    }
    let end = start.saturating_add(page_size).min(records.len());
    &records[start..end]
}

/// `max(1, ceil(len / page_size))`.
pub fn total_pages(len: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 1;
    }
    len.div_ceil(page_size).max(1)
}

/// Page cursor over a record set of known length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    page: usize,
    page_size: usize,
}

impl Default for Pager {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Pager {
    pub fn new(page_size: usize) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Changes the page size and returns to page 1.
    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
        self.page = 1;
    }

    /// Returns to page 1, e.g. after new criteria were applied.
    pub fn reset(&mut self) {
        self.page = 1;
    }

    pub fn total_pages(&self, len: usize) -> usize {
        total_pages(len, self.page_size)
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self, len: usize) -> bool {
        self.page < self.total_pages(len)
    }

    /// Moves forward, clamped to the last page.
    pub fn next(&mut self, len: usize) {
        self.page = (self.page + 1).min(self.total_pages(len));
    }

    /// Moves back, clamped to page 1.
    pub fn previous(&mut self) {
        self.page = self.page.saturating_sub(1).max(1);
    }

    /// Jumps to `page` without range checks; see [`paginate`].
    pub fn go_to(&mut self, page: usize) {
        self.page = page;
    }

    /// Jumps to `page` clamped to `1..=total_pages(len)`.
    pub fn go_to_clamped(&mut self, page: usize, len: usize) {
        self.page = page.clamp(1, self.total_pages(len));
    }

    pub fn slice<'a, T>(&self, records: &'a [T]) -> &'a [T] {
        paginate(records, self.page, self.page_size)
    }
}
