//! The fixed set of action-log columns a listing may be restricted on.

/// A column of the `actions` table that supports an equality restriction.
///
/// There is deliberately no way to build a `Column` from a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Column {
    /// The community that owns the entry.
    Community,
    /// The moderator who performed the action.
    Moderator,
    /// The author of the moderated content.
    Author,
}

impl Column {
    /// Every column in the allow-list.
    pub const ALL: [Column; 3] = [Column::Community, Column::Moderator, Column::Author];

    /// Returns the qualified SQL identifier for this column.
    #[must_use]
    pub const fn as_sql(&self) -> &'static str {
        match self {
            Self::Community => "a.subreddit",
            Self::Moderator => "a.moderator",
            Self::Author => "a.author",
        }
    }
}

impl std::fmt::Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_sql())
    }
}
