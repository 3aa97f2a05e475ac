//! User identity and account state carried by moderation events.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Validation errors returned when constructing user identity values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    #[error("user id must not be empty")]
    EmptyId,
    #[error("user id must be a valid UUID")]
    InvalidId,
    #[error("email must not be empty")]
    EmptyEmail,
    #[error("email must contain a single '@' with text on both sides")]
    MalformedEmail,
    #[error("email must not contain whitespace")]
    EmailContainsWhitespace,
}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Validate and construct a [`UserId`] from borrowed input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let raw = id.as_ref();
        if raw.is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        if raw.trim() != raw {
            return Err(UserValidationError::InvalidId);
        }
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
    }

    /// Generate a new random [`UserId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for UserId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Email address used both as notification recipient and cache key segment.
///
/// ## Invariants
/// - Non-empty, free of whitespace, exactly one `@` with text either side.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Validate and construct an [`Email`].
    ///
    /// # Examples
    /// ```
    /// use fuelwatch::domain::Email;
    ///
    /// let email = Email::new("driver@example.com").expect("valid email");
    /// assert_eq!(email.as_ref(), "driver@example.com");
    /// assert!(Email::new("not-an-address").is_err());
    /// ```
    pub fn new(value: impl Into<String>) -> Result<Self, UserValidationError> {
        Self::from_owned(value.into())
    }

    fn from_owned(value: String) -> Result<Self, UserValidationError> {
        if value.trim().is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        if value.chars().any(char::is_whitespace) {
            return Err(UserValidationError::EmailContainsWhitespace);
        }
        let mut parts = value.split('@');
        let well_formed = matches!(
            (parts.next(), parts.next(), parts.next()),
            (Some(local), Some(domain), None) if !local.is_empty() && !domain.is_empty()
        );
        if !well_formed {
            return Err(UserValidationError::MalformedEmail);
        }
        Ok(Self(value))
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

impl TryFrom<String> for Email {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Snapshot of a user embedded in events so handlers never look users up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: UserId,
    pub email: Email,
    pub display_name: String,
}

impl UserSummary {
    pub fn new(id: UserId, email: Email, display_name: impl Into<String>) -> Self {
        Self {
            id,
            email,
            display_name: display_name.into(),
        }
    }
}

/// Administrator acting on a moderation decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminSummary {
    pub id: UserId,
    pub display_name: String,
}

/// Persisted account lockout state touched by ban expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccount {
    pub user: UserSummary,
    /// Lockout deadline; `None` when the account can sign in.
    pub locked_until: Option<DateTime<Utc>>,
    pub failed_login_attempts: u32,
}

impl UserAccount {
    /// Clear the lockout and reset failed sign-in counters.
    ///
    /// # Examples
    /// ```
    /// use chrono::Utc;
    /// use fuelwatch::domain::{Email, UserAccount, UserId, UserSummary};
    ///
    /// let user = UserSummary::new(UserId::random(), Email::new("a@b.c").unwrap(), "Ada");
    /// let mut account = UserAccount {
    ///     user,
    ///     locked_until: Some(Utc::now()),
    ///     failed_login_attempts: 4,
    /// };
    /// account.unlock();
    /// assert!(account.locked_until.is_none());
    /// assert_eq!(account.failed_login_attempts, 0);
    /// ```
    pub fn unlock(&mut self) {
        self.locked_until = None;
        self.failed_login_attempts = 0;
    }
}
