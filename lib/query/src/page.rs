//! Page numbers and pagination arithmetic.

use crate::error::QueryError;
use serde::Serialize;
use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;

/// Number of action-log rows on one page.
pub const PAGE_SIZE: u32 = 25;

/// A 1-indexed page number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct PageNumber(NonZeroU32);

impl PageNumber {
    /// The first page.
    pub const FIRST: PageNumber = PageNumber(NonZeroU32::MIN);

    /// Creates a page number, rejecting zero.
    pub fn new(page: u32) -> Result<Self, QueryError> {
        NonZeroU32::new(page)
            .map(Self)
            .ok_or(QueryError::InvalidPage { page })
    }

    /// Returns the page number.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0.get()
    }

    /// Returns the row offset of the first entry on this page.
    #[must_use]
    pub fn offset(&self) -> i64 {
        i64::from(self.get() - 1) * i64::from(PAGE_SIZE)
    }

    /// Returns the preceding page, if any.
    #[must_use]
    pub fn previous(&self) -> Option<Self> {
        NonZeroU32::new(self.get() - 1).map(Self)
    }

    /// Returns the following page.
    #[must_use]
    pub fn next(&self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl Default for PageNumber {
    fn default() -> Self {
        Self::FIRST
    }
}

impl FromStr for PageNumber {
    type Err = QueryError;

    /// Parses a decimal page segment. Anything that is not a `u32` is
    /// malformed; zero is an invalid page.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let page = raw.parse::<u32>().map_err(|_| QueryError::MalformedPage {
            raw: raw.to_string(),
        })?;
        Self::new(page)
    }
}

impl fmt::Display for PageNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Page count and neighbouring pages for one listing page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    num_pages: u64,
    previous: Option<PageNumber>,
    next: Option<PageNumber>,
}

impl Pagination {
    /// Computes pagination for `page` given the number of matching rows.
    ///
    /// A previous page exists whenever `page > 1`, even when `page` is past
    /// the end. A next page exists only while `page < num_pages`.
    #[must_use]
    pub fn new(page: PageNumber, total_rows: u64) -> Self {
        let num_pages = total_rows.div_ceil(u64::from(PAGE_SIZE));
        let next = if u64::from(page.get()) < num_pages {
            page.next()
        } else {
            None
        };

        Self {
            num_pages,
            previous: page.previous(),
            next,
        }
    }

    /// Returns `ceil(total_rows / PAGE_SIZE)`.
    #[must_use]
    pub fn num_pages(&self) -> u64 {
        self.num_pages
    }

    /// Returns the previous page, if it is in range.
    #[must_use]
    pub fn previous(&self) -> Option<PageNumber> {
        self.previous
    }

    /// Returns the next page, if it is in range.
    #[must_use]
    pub fn next(&self) -> Option<PageNumber> {
        self.next
    }
}
