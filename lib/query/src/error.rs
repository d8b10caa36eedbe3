//! Query construction errors.

use std::fmt;

/// Errors from building listing queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// Page numbers are 1-indexed.
    InvalidPage { page: u32 },
    /// The page segment is not a number that fits a page.
    MalformedPage { raw: String },
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPage { page } => {
                write!(f, "invalid page number {page}: pages start at 1")
            }
            Self::MalformedPage { raw } => write!(f, "malformed page number {raw:?}"),
        }
    }
}

impl std::error::Error for QueryError {}
