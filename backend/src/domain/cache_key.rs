//! Cache key taxonomy shared by cache adapters and invalidation handlers.
//!
//! Keys are partitioned by a purpose prefix (`users-list`, `user-info:`,
//! `user-stats:`, `station:`, `top-users`). Every entry is derivable from
//! persisted state, so deleting any of them is always safe.
use thiserror::Error;

use super::proposals::StationId;
use super::user::Email;

const USERS_LIST: &str = "users-list";
const USER_INFO: &str = "user-info";
const USER_STATS: &str = "user-stats";
const STATION: &str = "station";
const TOP_USERS: &str = "top-users";

/// Exact cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Construct a cache key after validating that it is non-empty and trimmed.
    pub fn new(value: impl Into<String>) -> Result<Self, CacheKeyValidationError> {
        validate(value.into()).map(Self)
    }

    /// Cached profile of one user: `user-info:<email>`.
    pub fn user_info(email: &Email) -> Self {
        Self(format!("{USER_INFO}:{email}"))
    }

    /// Cached proposal statistics of one user: `user-stats:<email>`.
    pub fn user_stats(email: &Email) -> Self {
        Self(format!("{USER_STATS}:{email}"))
    }

    /// Borrow the underlying key as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Whether this key falls under `prefix`.
    pub fn matches(&self, prefix: &CachePrefix) -> bool {
        self.0.starts_with(prefix.as_str())
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Key prefix selecting a family of entries for bulk invalidation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CachePrefix(String);

impl CachePrefix {
    /// Construct a prefix after validating that it is non-empty and trimmed.
    pub fn new(value: impl Into<String>) -> Result<Self, CacheKeyValidationError> {
        validate(value.into()).map(Self)
    }

    /// Every paginated or filtered user list view.
    pub fn users_list() -> Self {
        Self(USERS_LIST.to_owned())
    }

    /// Every top-contributor ranking.
    pub fn top_users() -> Self {
        Self(TOP_USERS.to_owned())
    }

    /// The station entry and everything derived from it (prices, history).
    pub fn station(station_id: &StationId) -> Self {
        Self(format!("{STATION}:{station_id}"))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for CachePrefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn validate(raw: String) -> Result<String, CacheKeyValidationError> {
    if raw.trim().is_empty() {
        return Err(CacheKeyValidationError::Empty);
    }
    if raw.trim() != raw {
        return Err(CacheKeyValidationError::ContainsWhitespace);
    }
    Ok(raw)
}

/// Validation errors returned when constructing [`CacheKey`] or [`CachePrefix`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheKeyValidationError {
    /// Key is empty after trimming whitespace.
    #[error("cache key must not be empty")]
    Empty,
    /// Key contains leading or trailing whitespace.
    #[error("cache key must not contain surrounding whitespace")]
    ContainsWhitespace,
}
