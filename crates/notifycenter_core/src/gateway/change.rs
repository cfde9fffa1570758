//! Real-time change events and payload validation.
//!
//! # Responsibility
//! - Define the tagged change union delivered by subscriptions.
//! - Decode raw realtime payloads at the boundary, rejecting malformed
//!   ones before they reach the store.
//!
//! # Invariants
//! - Every decoded change carries a non-blank id.
//! - `Inserted` always carries a complete, valid notification.

use crate::model::notification::{
    now_epoch_ms, ActionType, Notification, NotificationKind, Priority, Sender,
};
use chrono::DateTime;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Change observed on the remote notifications table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteChange {
    Inserted(Notification),
    Updated(NotificationPatch),
    Deleted(String),
}

impl RemoteChange {
    /// Id of the affected row.
    pub fn id(&self) -> &str {
        match self {
            Self::Inserted(notification) => &notification.id,
            Self::Updated(patch) => &patch.id,
            Self::Deleted(id) => id,
        }
    }

    /// Decodes a realtime JSON payload.
    pub fn from_json_str(payload: &str) -> Result<Self, ChangeError> {
        let value: serde_json::Value = serde_json::from_str(payload)
            .map_err(|err| ChangeError::Malformed(err.to_string()))?;
        Self::from_value(value)
    }

    /// Decodes an already-parsed realtime payload of shape
    /// `{"eventType": "...", "new": {..}, "old": {..}}`.
    pub fn from_value(value: serde_json::Value) -> Result<Self, ChangeError> {
        let raw: RawChange =
            serde_json::from_value(value).map_err(|err| ChangeError::Malformed(err.to_string()))?;
        match raw {
            RawChange::Insert { new } => {
                let patch = new.into_patch()?;
                patch
                    .into_notification()
                    .map(Self::Inserted)
                    .ok_or(ChangeError::IncompleteInsert)
            }
            RawChange::Update { new } => Ok(Self::Updated(new.into_patch()?)),
            RawChange::Delete { old } => {
                let id = old.id.unwrap_or_default();
                if id.trim().is_empty() {
                    return Err(ChangeError::MissingId);
                }
                Ok(Self::Deleted(id))
            }
        }
    }
}

/// Partial row update. `None` fields leave local values untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationPatch {
    pub id: String,
    pub kind: Option<NotificationKind>,
    pub title: Option<String>,
    pub message: Option<String>,
    pub is_read: Option<bool>,
    pub created_at: Option<i64>,
    pub priority: Option<Priority>,
    pub pinned: Option<bool>,
    pub sender: Option<Sender>,
    pub action_type: Option<ActionType>,
}

impl NotificationPatch {
    /// Patch carrying every field of `notification`.
    pub fn full(notification: &Notification) -> Self {
        Self {
            id: notification.id.clone(),
            kind: Some(notification.kind),
            title: Some(notification.title.clone()),
            message: Some(notification.message.clone()),
            is_read: Some(notification.is_read),
            created_at: Some(notification.created_at),
            priority: notification.priority,
            pinned: Some(notification.pinned),
            sender: notification.sender.clone(),
            action_type: notification.action_type,
        }
    }

    /// Overwrites the fields present in this patch (last write wins).
    pub fn apply_to(&self, target: &mut Notification) {
        if let Some(kind) = self.kind {
            target.kind = kind;
        }
        if let Some(title) = &self.title {
            target.title.clone_from(title);
        }
        if let Some(message) = &self.message {
            target.message.clone_from(message);
        }
        if let Some(is_read) = self.is_read {
            target.is_read = is_read;
        }
        if let Some(created_at) = self.created_at {
            target.created_at = created_at;
        }
        if self.priority.is_some() {
            target.priority = self.priority;
        }
        if let Some(pinned) = self.pinned {
            target.pinned = pinned;
        }
        if self.sender.is_some() {
            target.sender.clone_from(&self.sender);
        }
        if self.action_type.is_some() {
            target.action_type = self.action_type;
        }
    }

    /// Builds a full notification when kind, title and message are present.
    pub fn into_notification(self) -> Option<Notification> {
        let (Some(kind), Some(title), Some(message)) = (self.kind, self.title, self.message)
        else {
            return None;
        };
        let notification = Notification {
            id: self.id,
            kind,
            title,
            message,
            is_read: self.is_read.unwrap_or(false),
            created_at: self.created_at.unwrap_or_else(now_epoch_ms),
            priority: self.priority,
            pinned: self.pinned.unwrap_or(false),
            sender: self.sender,
            action_type: self.action_type,
        };
        notification.is_valid().then_some(notification)
    }
}

/// Rejected realtime payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeError {
    /// Payload is not valid JSON, has an unknown event type, or carries an
    /// unknown enum tag.
    Malformed(String),
    MissingId,
    /// Insert payload lacks type, title or message.
    IncompleteInsert,
}

impl Display for ChangeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(message) => write!(f, "malformed change payload: {message}"),
            Self::MissingId => write!(f, "change payload has no notification id"),
            Self::IncompleteInsert => {
                write!(f, "insert payload must carry type, title and message")
            }
        }
    }
}

impl Error for ChangeError {}

#[derive(Debug, Deserialize)]
#[serde(tag = "eventType")]
enum RawChange {
    #[serde(rename = "INSERT")]
    Insert { new: RawRow },
    #[serde(rename = "UPDATE")]
    Update { new: RawRow },
    #[serde(rename = "DELETE")]
    Delete { old: RawRow },
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawRow {
    id: Option<String>,
    #[serde(rename = "type")]
    kind: Option<NotificationKind>,
    title: Option<String>,
    message: Option<String>,
    is_read: Option<bool>,
    created_at: Option<RawTimestamp>,
    priority: Option<Priority>,
    pinned: Option<bool>,
    sender_name: Option<String>,
    sender_avatar_url: Option<String>,
    action_type: Option<ActionType>,
}

/// `created_at` as epoch milliseconds or a timestamptz string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    EpochMs(i64),
    Text(String),
}

impl RawTimestamp {
    fn to_epoch_ms(&self) -> Result<i64, ChangeError> {
        match self {
            Self::EpochMs(value) => Ok(*value),
            Self::Text(text) => parse_timestamptz(text).ok_or_else(|| {
                ChangeError::Malformed(format!("invalid created_at `{text}`"))
            }),
        }
    }
}

/// Accepts RFC 3339 and the Postgres text form (`2024-05-01 10:00:00+00`).
fn parse_timestamptz(text: &str) -> Option<i64> {
    let text = text.trim();
    DateTime::parse_from_rfc3339(text)
        .or_else(|_| DateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f%#z"))
        .ok()
        .map(|parsed| parsed.timestamp_millis())
}

impl RawRow {
    fn into_patch(self) -> Result<NotificationPatch, ChangeError> {
        let id = self.id.unwrap_or_default();
        if id.trim().is_empty() {
            return Err(ChangeError::MissingId);
        }
        let created_at = self
            .created_at
            .as_ref()
            .map(RawTimestamp::to_epoch_ms)
            .transpose()?;
        let sender = self
            .sender_name
            .map(|name| Sender::new(name, self.sender_avatar_url.as_deref()));
        Ok(NotificationPatch {
            id,
            kind: self.kind,
            title: self.title,
            message: self.message,
            is_read: self.is_read,
            created_at,
            priority: self.priority,
            pinned: self.pinned,
            sender,
            action_type: self.action_type,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{ChangeError, RemoteChange};

    #[test]
    fn update_without_id_is_rejected() {
        let err = RemoteChange::from_json_str(r#"{"eventType":"UPDATE","new":{"is_read":true}}"#)
            .unwrap_err();
        assert_eq!(err, ChangeError::MissingId);
    }

    #[test]
    fn unknown_event_type_is_malformed() {
        let err = RemoteChange::from_json_str(r#"{"eventType":"TRUNCATE","new":{}}"#).unwrap_err();
        assert!(matches!(err, ChangeError::Malformed(_)));
    }
}
