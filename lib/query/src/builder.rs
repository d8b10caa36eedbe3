//! Listing and count statement assembly.

use crate::column::Column;
use crate::page::{PAGE_SIZE, PageNumber};
use modlog_core::{CommunityId, UserId};
use std::collections::BTreeMap;
use std::fmt::Write;

/// Columns selected for every listing row.
const LISTING_SELECT: &str = "SELECT a.id, a.time, m.username AS moderator, a.target_type, \
     a.target_id, au.username AS author, a.action_summary, a.action_details \
     FROM actions a \
     LEFT JOIN users m ON (a.moderator = m.id) \
     LEFT JOIN users au ON (a.author = au.id)";

/// An optional equality restriction on top of the mandatory community scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Restriction {
    /// Only entries performed by this moderator.
    Moderator(UserId),
    /// Only entries targeting content by this author.
    Author(UserId),
}

impl Restriction {
    /// Returns the column this restriction compares.
    #[must_use]
    pub const fn column(&self) -> Column {
        match self {
            Self::Moderator(_) => Column::Moderator,
            Self::Author(_) => Column::Author,
        }
    }

    /// Returns the value bound for the comparison.
    #[must_use]
    pub const fn value(&self) -> i64 {
        match self {
            Self::Moderator(id) | Self::Author(id) => id.get(),
        }
    }
}

/// A page of the action log for one community, with optional restrictions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingQuery {
    restrictions: BTreeMap<Column, i64>,
    page: PageNumber,
}

impl ListingQuery {
    /// Starts a listing scoped to `community`, on the first page.
    #[must_use]
    pub fn new(community: CommunityId) -> Self {
        let mut restrictions = BTreeMap::new();
        restrictions.insert(Column::Community, community.get());
        Self {
            restrictions,
            page: PageNumber::FIRST,
        }
    }

    /// Adds a restriction. A second restriction on the same column replaces
    /// the first.
    #[must_use]
    pub fn restrict(mut self, restriction: Restriction) -> Self {
        self.restrictions
            .insert(restriction.column(), restriction.value());
        self
    }

    /// Selects the page to fetch.
    #[must_use]
    pub fn page(mut self, page: PageNumber) -> Self {
        self.page = page;
        self
    }

    /// Returns the community every row must belong to.
    #[must_use]
    pub fn community(&self) -> CommunityId {
        // Inserted by `new` and never removed.
        CommunityId::new(self.restrictions[&Column::Community])
    }

    /// Returns the requested page.
    #[must_use]
    pub fn page_number(&self) -> PageNumber {
        self.page
    }

    /// Returns every equality restriction, community first, in bind order.
    pub fn restrictions(&self) -> impl Iterator<Item = (Column, i64)> + '_ {
        self.restrictions.iter().map(|(column, value)| (*column, *value))
    }

    /// Compiles the count and listing statements.
    #[must_use]
    pub fn build(&self) -> Statements {
        let mut where_clause = String::from("WHERE ");
        for (index, column) in self.restrictions.keys().enumerate() {
            if index > 0 {
                where_clause.push_str(" AND ");
            }
            // Column text is 'static and placeholders are numbered, so no
            // request data ever reaches the statement text.
            let _ = write!(where_clause, "{} = ${}", column.as_sql(), index + 1);
        }

        let params: Vec<i64> = self.restrictions.values().copied().collect();
        let offset_placeholder = params.len() + 1;

        let count_sql = format!("SELECT COUNT(*) FROM actions a {where_clause}");
        let listing_sql = format!(
            "{LISTING_SELECT} {where_clause} ORDER BY a.time DESC, a.id DESC \
             LIMIT {PAGE_SIZE} OFFSET ${offset_placeholder}"
        );

        Statements {
            count_sql,
            listing_sql,
            params,
            offset: self.page.offset(),
        }
    }
}

/// Compiled statements for one listing page.
///
/// Bind `params` in order to both statements; the listing statement takes
/// `offset` as one extra trailing parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statements {
    /// Counts all rows matching the restrictions.
    pub count_sql: String,
    /// Fetches one page of rows, newest first.
    pub listing_sql: String,
    /// Restriction values, in placeholder order.
    pub params: Vec<i64>,
    /// Row offset, bound after `params` in the listing statement.
    pub offset: i64,
}
