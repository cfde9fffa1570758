//! Notification domain model.
//!
//! # Responsibility
//! - Define the canonical notification record shared by store, view and
//!   gateway layers.
//! - Provide the id validation used before any mutation is dispatched.
//!
//! # Invariants
//! - `id` is unique within a store and never blank for a valid record.
//! - `created_at` is Unix epoch milliseconds.
//! - Absent `priority` behaves as `Priority::Normal`.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Display category of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Message,
    Alert,
    Task,
    Update,
}

impl NotificationKind {
    /// Stable wire/storage string.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Message => "message",
            Self::Alert => "alert",
            Self::Task => "task",
            Self::Update => "update",
        }
    }

    /// Parses a wire/storage string.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "message" => Some(Self::Message),
            "alert" => Some(Self::Alert),
            "task" => Some(Self::Task),
            "update" => Some(Self::Update),
            _ => None,
        }
    }
}

/// Notification urgency.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    #[default]
    Normal,
    High,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::High => "high",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "normal" => Some(Self::Normal),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

/// Display routing tag. Carries no behavior in core beyond
/// `UserOnboarding` selecting the onboarding route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    View,
    Update,
    Download,
    Modal,
    Redirect,
    UserOnboarding,
}

impl ActionType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Update => "update",
            Self::Download => "download",
            Self::Modal => "modal",
            Self::Redirect => "redirect",
            Self::UserOnboarding => "user_onboarding",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "view" => Some(Self::View),
            "update" => Some(Self::Update),
            "download" => Some(Self::Download),
            "modal" => Some(Self::Modal),
            "redirect" => Some(Self::Redirect),
            "user_onboarding" => Some(Self::UserOnboarding),
            _ => None,
        }
    }
}

/// Who a notification is from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sender {
    pub name: String,
    /// Empty avatar URLs are normalized to `None`.
    pub avatar_url: Option<String>,
}

impl Sender {
    pub fn new(name: impl Into<String>, avatar_url: Option<&str>) -> Self {
        Self {
            name: name.into(),
            avatar_url: avatar_url
                .map(str::trim)
                .filter(|url| !url.is_empty())
                .map(str::to_string),
        }
    }
}

/// Canonical notification record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    /// Serialized as `type` to match the remote row naming.
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub pinned: bool,
    #[serde(default)]
    pub sender: Option<Sender>,
    #[serde(default)]
    pub action_type: Option<ActionType>,
}

impl Notification {
    /// Creates an unread, unpinned notification with a generated id.
    pub fn new(kind: NotificationKind, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), kind, title, message)
    }

    /// Creates a notification with a caller-provided id.
    ///
    /// Does not validate the id; callers that accept external ids must call
    /// [`Notification::validate`].
    pub fn with_id(
        id: impl Into<String>,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            title: title.into(),
            message: message.into(),
            is_read: false,
            created_at: now_epoch_ms(),
            priority: None,
            pinned: false,
            sender: None,
            action_type: None,
        }
    }

    /// Validates record-level invariants.
    ///
    /// # Errors
    /// - `EmptyId` when `id` is empty or whitespace-only.
    pub fn validate(&self) -> Result<(), NotificationValidationError> {
        if self.id.trim().is_empty() {
            return Err(NotificationValidationError::EmptyId);
        }
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    pub fn effective_priority(&self) -> Priority {
        self.priority.unwrap_or_default()
    }

    /// Whether opening this notification routes to the onboarding form.
    pub fn opens_onboarding(&self) -> bool {
        self.action_type == Some(ActionType::UserOnboarding)
    }

    /// Case-insensitive substring match against title or message.
    ///
    /// `needle_lower` must already be lowercase.
    pub fn matches_text(&self, needle_lower: &str) -> bool {
        self.title.to_lowercase().contains(needle_lower)
            || self.message.to_lowercase().contains(needle_lower)
    }
}

/// Record validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationValidationError {
    EmptyId,
}

impl Display for NotificationValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyId => write!(f, "notification id must not be empty"),
        }
    }
}

impl Error for NotificationValidationError {}

/// Rejected mutation target id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidIdError {
    pub raw: String,
}

impl Display for InvalidIdError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid notification id `{}`", self.raw)
    }
}

impl Error for InvalidIdError {}

/// Checks a mutation target id before anything is dispatched.
///
/// Returns the trimmed id on success.
pub fn validate_notification_id(id: &str) -> Result<&str, InvalidIdError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        return Err(InvalidIdError { raw: id.to_string() });
    }
    Ok(trimmed)
}

/// Current wall clock in epoch milliseconds. Returns 0 if the clock is
/// before the epoch.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
}
