//! Remote notification gateway contract and implementations.
//!
//! # Responsibility
//! - Define the read/write/subscribe contract against the hosted
//!   notifications table.
//! - Keep transport and storage details out of the store.
//!
//! # Invariants
//! - Gateway APIs return semantic errors (`NotFound`, `Unauthorized`) in
//!   addition to transport/DB errors.
//! - Inserts require an authenticated session.
//! - Successful writes are echoed on the change feed.

pub mod change;
pub mod feed;
pub mod sqlite;

use crate::db::DbError;
use crate::model::notification::{ActionType, Notification, NotificationKind, Priority, Sender};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub use change::{ChangeError, NotificationPatch, RemoteChange};
pub use feed::{ChangeFeed, Subscription, SubscriptionBatch};
pub use sqlite::{Session, SqliteNotificationGateway};

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Error raised by a gateway call.
#[derive(Debug)]
pub enum GatewayError {
    /// Connectivity failure; the backend could not be reached.
    Transport(String),
    /// The call requires an authenticated session.
    Unauthorized,
    /// Target row does not exist.
    NotFound(String),
    /// Stored or received data does not decode into a valid notification.
    InvalidData(String),
    Db(DbError),
}

impl Display for GatewayError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(message) => write!(f, "transport error: {message}"),
            Self::Unauthorized => write!(f, "you must be logged in to perform this action"),
            Self::NotFound(id) => write!(f, "notification not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid notification data: {message}"),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for GatewayError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for GatewayError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for GatewayError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Fields accepted by [`NotificationGateway::insert_notification`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    pub id: String,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    /// Assigned by the gateway when `None`.
    pub created_at: Option<i64>,
    pub priority: Option<Priority>,
    pub sender: Option<Sender>,
    pub action_type: Option<ActionType>,
}

impl From<&Notification> for NewNotification {
    fn from(value: &Notification) -> Self {
        Self {
            id: value.id.clone(),
            kind: value.kind,
            title: value.title.clone(),
            message: value.message.clone(),
            created_at: Some(value.created_at),
            priority: value.priority,
            sender: value.sender.clone(),
            action_type: value.action_type,
        }
    }
}

/// Read/write/subscribe contract of the hosted notifications table.
pub trait NotificationGateway {
    /// Returns every notification, newest first.
    fn list_notifications(&self) -> GatewayResult<Vec<Notification>>;
    fn update_read_state(&self, id: &str, is_read: bool) -> GatewayResult<()>;
    /// Marks every unread notification read.
    fn bulk_mark_all_read(&self) -> GatewayResult<()>;
    fn delete_notification(&self, id: &str) -> GatewayResult<()>;
    /// Requires an authenticated session; fails with `Unauthorized` otherwise.
    fn insert_notification(&self, fields: &NewNotification) -> GatewayResult<()>;
    /// Opens a real-time subscription delivering insert/update/delete changes.
    fn subscribe_to_changes(&self) -> GatewayResult<Subscription>;
}
