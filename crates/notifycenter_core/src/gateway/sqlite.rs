//! SQLite-backed notification gateway.
//!
//! # Responsibility
//! - Serve the gateway contract from a local `notifications` table.
//! - Echo every committed write on the change feed.
//!
//! # Invariants
//! - Reads are ordered by `created_at DESC, id ASC`.
//! - Read paths reject invalid persisted rows instead of masking them.
//! - Feed publication happens only after the write committed.
//! - Pin state is a client-side annotation and is never stored here.
//! - Reads and writes only touch rows owned by the signed-in user; without
//!   a session no row is visible (`user_id = NULL` never matches).

use super::change::{NotificationPatch, RemoteChange};
use super::feed::{ChangeFeed, Subscription};
use super::{GatewayError, GatewayResult, NewNotification, NotificationGateway};
use crate::model::notification::{
    now_epoch_ms, validate_notification_id, ActionType, Notification, NotificationKind, Priority,
    Sender,
};
use log::{debug, info};
use rusqlite::{params, Connection, Row};

const NOTIFICATION_SELECT_SQL: &str = "SELECT
    id,
    type,
    title,
    message,
    is_read,
    created_at,
    priority,
    sender_name,
    sender_avatar_url,
    action_type
FROM notifications";

/// Authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
}

/// Gateway over a migrated SQLite connection.
pub struct SqliteNotificationGateway {
    conn: Connection,
    feed: ChangeFeed,
    session: Option<Session>,
    offline: bool,
}

impl SqliteNotificationGateway {
    /// Wraps a connection returned by `db::open_db*`.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn,
            feed: ChangeFeed::new(),
            session: None,
            offline: false,
        }
    }

    pub fn sign_in(&mut self, user_id: impl Into<String>) {
        let session = Session {
            user_id: user_id.into(),
        };
        info!("event=session_start module=gateway status=ok");
        self.session = Some(session);
    }

    pub fn sign_out(&mut self) {
        self.session = None;
        info!("event=session_end module=gateway status=ok");
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Simulates connectivity loss: every call fails with `Transport`.
    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    /// Drops the realtime channel for all current subscribers.
    pub fn close_feed(&self) {
        self.feed.close();
    }

    /// Allows new subscriptions after [`Self::close_feed`].
    pub fn reopen_feed(&self) {
        self.feed.reopen();
    }

    pub fn feed(&self) -> &ChangeFeed {
        &self.feed
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    fn owner(&self) -> Option<&str> {
        self.session.as_ref().map(|session| session.user_id.as_str())
    }

    fn ensure_online(&self) -> GatewayResult<()> {
        if self.offline {
            return Err(GatewayError::Transport(
                "backend unreachable (offline)".to_string(),
            ));
        }
        Ok(())
    }

    fn get_notification(&self, id: &str) -> GatewayResult<Option<Notification>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{NOTIFICATION_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        let found = match rows.next()? {
            Some(row) => Some(parse_notification_row(row)?),
            None => None,
        };
        Ok(found)
    }

    fn publish_update(&self, id: &str) -> GatewayResult<()> {
        if let Some(current) = self.get_notification(id)? {
            let mut patch = NotificationPatch::full(&current);
            // Pin state is not stored remotely.
            patch.pinned = None;
            self.feed.publish(RemoteChange::Updated(patch));
        }
        Ok(())
    }
}

impl NotificationGateway for SqliteNotificationGateway {
    fn list_notifications(&self) -> GatewayResult<Vec<Notification>> {
        self.ensure_online()?;
        let mut stmt = self.conn.prepare(&format!(
            "{NOTIFICATION_SELECT_SQL} WHERE user_id = ?1 ORDER BY created_at DESC, id ASC;"
        ))?;
        let mut rows = stmt.query(params![self.owner()])?;
        let mut notifications = Vec::new();
        while let Some(row) = rows.next()? {
            notifications.push(parse_notification_row(row)?);
        }
        debug!(
            "event=gateway_list module=gateway status=ok count={}",
            notifications.len()
        );
        Ok(notifications)
    }

    fn update_read_state(&self, id: &str, is_read: bool) -> GatewayResult<()> {
        self.ensure_online()?;
        let changed = self.conn.execute(
            "UPDATE notifications SET is_read = ?1 WHERE id = ?2 AND user_id = ?3;",
            params![bool_to_int(is_read), id, self.owner()],
        )?;
        if changed == 0 {
            return Err(GatewayError::NotFound(id.to_string()));
        }
        self.publish_update(id)
    }

    fn bulk_mark_all_read(&self) -> GatewayResult<()> {
        self.ensure_online()?;
        let tx = self.conn.unchecked_transaction()?;
        let mut ids = Vec::new();
        {
            let mut stmt =
                tx.prepare("SELECT id FROM notifications WHERE is_read = 0 AND user_id = ?1;")?;
            let mut rows = stmt.query(params![self.owner()])?;
            while let Some(row) = rows.next()? {
                ids.push(row.get::<_, String>(0)?);
            }
        }
        tx.execute(
            "UPDATE notifications SET is_read = 1 WHERE is_read = 0 AND user_id = ?1;",
            params![self.owner()],
        )?;
        tx.commit()?;

        for id in &ids {
            self.publish_update(id)?;
        }
        debug!(
            "event=gateway_mark_all_read module=gateway status=ok count={}",
            ids.len()
        );
        Ok(())
    }

    fn delete_notification(&self, id: &str) -> GatewayResult<()> {
        self.ensure_online()?;
        let changed = self
            .conn
            .execute(
                "DELETE FROM notifications WHERE id = ?1 AND user_id = ?2;",
                params![id, self.owner()],
            )?;
        if changed == 0 {
            return Err(GatewayError::NotFound(id.to_string()));
        }
        self.feed.publish(RemoteChange::Deleted(id.to_string()));
        Ok(())
    }

    fn insert_notification(&self, fields: &NewNotification) -> GatewayResult<()> {
        self.ensure_online()?;
        let Some(session) = self.session.as_ref() else {
            return Err(GatewayError::Unauthorized);
        };
        let id = validate_notification_id(&fields.id)
            .map_err(|err| GatewayError::InvalidData(err.to_string()))?;

        self.conn.execute(
            "INSERT INTO notifications (
                id,
                user_id,
                type,
                title,
                message,
                is_read,
                created_at,
                priority,
                sender_name,
                sender_avatar_url,
                action_type
            ) VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6, ?7, ?8, ?9, ?10);",
            params![
                id,
                session.user_id.as_str(),
                fields.kind.as_str(),
                fields.title.as_str(),
                fields.message.as_str(),
                fields.created_at.unwrap_or_else(now_epoch_ms),
                fields.priority.map(Priority::as_str),
                fields.sender.as_ref().map(|sender| sender.name.as_str()),
                fields
                    .sender
                    .as_ref()
                    .and_then(|sender| sender.avatar_url.as_deref()),
                fields.action_type.map(ActionType::as_str),
            ],
        )?;

        let stored = self
            .get_notification(id)?
            .ok_or_else(|| GatewayError::NotFound(id.to_string()))?;
        self.feed.publish(RemoteChange::Inserted(stored));
        Ok(())
    }

    fn subscribe_to_changes(&self) -> GatewayResult<Subscription> {
        self.ensure_online()?;
        Ok(self.feed.subscribe())
    }
}

/// Counts stored rows; used by diagnostics and tests.
pub fn count_notifications(conn: &Connection) -> GatewayResult<u64> {
    let count = conn.query_row("SELECT COUNT(*) FROM notifications;", [], |row| {
        row.get::<_, i64>(0)
    })?;
    Ok(u64::try_from(count).unwrap_or(0))
}

fn parse_notification_row(row: &Row<'_>) -> GatewayResult<Notification> {
    let id: String = row.get("id")?;

    let type_text: String = row.get("type")?;
    let kind = NotificationKind::parse(&type_text).ok_or_else(|| {
        GatewayError::InvalidData(format!("invalid type `{type_text}` in notifications.type"))
    })?;

    let priority = match row.get::<_, Option<String>>("priority")? {
        Some(value) => Some(Priority::parse(&value).ok_or_else(|| {
            GatewayError::InvalidData(format!(
                "invalid priority `{value}` in notifications.priority"
            ))
        })?),
        None => None,
    };

    let action_type = match row.get::<_, Option<String>>("action_type")? {
        Some(value) => Some(ActionType::parse(&value).ok_or_else(|| {
            GatewayError::InvalidData(format!(
                "invalid action type `{value}` in notifications.action_type"
            ))
        })?),
        None => None,
    };

    let sender = row
        .get::<_, Option<String>>("sender_name")?
        .map(|name| -> rusqlite::Result<Sender> {
            let avatar: Option<String> = row.get("sender_avatar_url")?;
            Ok(Sender::new(name, avatar.as_deref()))
        })
        .transpose()?;

    let notification = Notification {
        id,
        kind,
        title: row.get("title")?,
        message: row.get("message")?,
        is_read: int_to_bool(row.get("is_read")?, "is_read")?,
        created_at: row.get("created_at")?,
        priority,
        pinned: false,
        sender,
        action_type,
    };
    notification
        .validate()
        .map_err(|err| GatewayError::InvalidData(err.to_string()))?;
    Ok(notification)
}

fn int_to_bool(value: i64, column: &str) -> GatewayResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(GatewayError::InvalidData(format!(
            "invalid {column} value `{other}` in notifications.{column}"
        ))),
    }
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
