//! Listing query construction for the moderation action log.
//!
//! Every statement built here is scoped to exactly one community, bounded to
//! a single page of [`PAGE_SIZE`] rows, and carries its values as positional
//! placeholders. Column identifiers come only from the [`Column`] allow-list,
//! so a request can influence *what* is compared but never *which column*.
//!
//! # Example
//!
//! ```
//! use modlog_core::{CommunityId, UserId};
//! use modlog_query::{ListingQuery, PageNumber, Restriction};
//!
//! let page = PageNumber::new(2).expect("page 2 is valid");
//! let statements = ListingQuery::new(CommunityId::new(10))
//!     .restrict(Restriction::Moderator(UserId::new(3)))
//!     .page(page)
//!     .build();
//!
//! assert_eq!(statements.params, vec![10, 3]);
//! assert_eq!(statements.offset, 25);
//! assert!(statements.count_sql.contains("a.moderator = $2"));
//! ```

mod builder;
mod column;
mod error;
mod page;

pub use builder::{ListingQuery, Restriction, Statements};
pub use column::Column;
pub use error::QueryError;
pub use page::{PAGE_SIZE, PageNumber, Pagination};
