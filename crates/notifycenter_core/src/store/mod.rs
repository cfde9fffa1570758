//! Notification store: single source of truth for the notification list.
//!
//! # Responsibility
//! - Apply optimistic local mutations and mirror them through the gateway.
//! - Reconcile real-time remote changes into the same list.
//! - Surface every failure as a logged, user-visible notice.
//!
//! # Invariants
//! - All list changes go through [`reducer::reduce`].
//! - Invalid ids are rejected before any gateway call and change nothing.
//! - Optimistic local changes are never rolled back on remote failure.
//! - After `teardown`, no further remote change is applied.

pub mod notice;
pub mod reducer;
pub mod samples;

use crate::config::CenterConfig;
use crate::gateway::{
    GatewayError, NewNotification, NotificationGateway, RemoteChange, Subscription,
};
use crate::model::notification::{validate_notification_id, InvalidIdError, Notification};
use crate::model::onboarding::OnboardingData;
use log::{debug, error, info, warn};
use notice::Notice;
use reducer::{reduce, StoreEvent, StoreState};
use samples::SampleCatalog;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Store operation failure. Already logged and queued as a notice when
/// returned.
#[derive(Debug)]
pub enum StoreError {
    InvalidId(InvalidIdError),
    NotFound(String),
    Gateway(GatewayError),
    TornDown,
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidId(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "notification not found: {id}"),
            Self::Gateway(err) => write!(f, "{err}"),
            Self::TornDown => write!(f, "notification store has been torn down"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidId(err) => Some(err),
            Self::Gateway(err) => Some(err),
            Self::NotFound(_) | Self::TornDown => None,
        }
    }
}

impl From<InvalidIdError> for StoreError {
    fn from(value: InvalidIdError) -> Self {
        Self::InvalidId(value)
    }
}

impl From<GatewayError> for StoreError {
    fn from(value: GatewayError) -> Self {
        Self::Gateway(value)
    }
}

impl StoreError {
    fn code(&self) -> &'static str {
        match self {
            Self::InvalidId(_) => "invalid_id",
            Self::NotFound(_) => "not_found",
            Self::Gateway(GatewayError::Unauthorized) => "unauthorized",
            Self::Gateway(GatewayError::Transport(_)) => "transport_failed",
            Self::Gateway(_) => "gateway_failed",
            Self::TornDown => "torn_down",
        }
    }
}

/// Where the presentation layer should route an opened notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationRoute {
    Detail,
    Onboarding,
}

/// Result of [`NotificationStore::open_notification`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenedNotification {
    pub notification: Notification,
    pub route: NotificationRoute,
}

/// Stateful notification store over a gateway implementation.
pub struct NotificationStore<G: NotificationGateway> {
    gateway: G,
    config: CenterConfig,
    state: StoreState,
    notices: Vec<Notice>,
    catalog: SampleCatalog,
    subscription: Option<Subscription>,
    loading: bool,
    torn_down: bool,
}

impl<G: NotificationGateway> NotificationStore<G> {
    pub fn new(gateway: G, config: CenterConfig) -> Self {
        Self {
            gateway,
            config,
            state: StoreState::default(),
            notices: Vec::new(),
            catalog: SampleCatalog::default(),
            subscription: None,
            loading: true,
            torn_down: false,
        }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn gateway_mut(&mut self) -> &mut G {
        &mut self.gateway
    }

    pub fn config(&self) -> &CenterConfig {
        &self.config
    }

    pub fn state(&self) -> &StoreState {
        &self.state
    }

    pub fn items(&self) -> &[Notification] {
        &self.state.items
    }

    pub fn get(&self, id: &str) -> Option<&Notification> {
        self.state.get(id)
    }

    pub fn unread_count(&self) -> usize {
        self.state.unread_count()
    }

    /// `true` until the first `load` finished, successfully or not.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Whether a real-time subscription is currently held.
    pub fn is_live(&self) -> bool {
        self.subscription.is_some()
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Pending notices, oldest first.
    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Drains pending notices.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Replaces the list with the full remote set, newest first.
    ///
    /// On failure the list is left unchanged.
    pub fn load(&mut self) -> StoreResult<usize> {
        self.ensure_open()?;
        let result = self.gateway.list_notifications();
        self.loading = false;
        match result {
            Ok(items) => {
                self.dispatch(StoreEvent::Loaded(items));
                let count = self.state.items.len();
                info!("event=store_load module=store status=ok count={count}");
                Ok(count)
            }
            Err(err) => Err(self.fail("store_load", "Failed to load notifications", err.into())),
        }
    }

    /// Marks one notification read locally, then mirrors it remotely.
    pub fn mark_read(&mut self, id: &str) -> StoreResult<()> {
        let id = self.checked_target("store_mark_read", id)?;
        self.dispatch(StoreEvent::LocallyMarkedRead(id.clone()));

        if let Err(err) = self.gateway.update_read_state(&id, true) {
            let description = format!("Failed to mark notification as read: {err}");
            return Err(self.fail("store_mark_read", &description, err.into()));
        }
        debug!("event=store_mark_read module=store status=ok id={id}");
        Ok(())
    }

    /// Marks every notification read locally with one remote bulk update.
    pub fn mark_all_read(&mut self) -> StoreResult<()> {
        self.ensure_open()?;
        self.dispatch(StoreEvent::LocallyMarkedAllRead);

        if let Err(err) = self.gateway.bulk_mark_all_read() {
            return Err(self.fail(
                "store_mark_all_read",
                "Failed to mark all notifications as read",
                err.into(),
            ));
        }
        self.notices
            .push(Notice::info("All notifications marked as read", None));
        info!("event=store_mark_all_read module=store status=ok");
        Ok(())
    }

    /// Removes one notification locally, then deletes it remotely.
    pub fn delete_by_id(&mut self, id: &str) -> StoreResult<()> {
        let id = self.checked_target("store_delete", id)?;
        self.dispatch(StoreEvent::LocallyDeleted(id.clone()));

        if let Err(err) = self.gateway.delete_notification(&id) {
            let description = format!("Failed to delete notification: {err}");
            return Err(self.fail("store_delete", &description, err.into()));
        }
        self.notices.push(Notice::info("Notification deleted", None));
        info!("event=store_delete module=store status=ok id={id}");
        Ok(())
    }

    /// Toggles the client-only pinned flag. Returns the new value.
    pub fn toggle_pin(&mut self, id: &str) -> StoreResult<bool> {
        let id = self.checked_target("store_toggle_pin", id)?;
        self.dispatch(StoreEvent::LocallyPinned(id.clone()));
        let pinned = self.state.get(&id).is_some_and(|item| item.pinned);
        debug!("event=store_toggle_pin module=store status=ok id={id} pinned={pinned}");
        Ok(pinned)
    }

    /// Prepends a synthesized sample and, when configured, inserts it
    /// remotely. Returns the generated id.
    pub fn add_sample(&mut self) -> StoreResult<String> {
        self.ensure_open()?;
        let sample = self.catalog.synthesize(&mut rand::thread_rng());
        let id = sample.id.clone();
        let fields = NewNotification::from(&sample);
        let notice = Notice::info(sample.title.clone(), Some(sample.message.clone()));
        self.dispatch(StoreEvent::Inserted(sample));

        if self.config.mirror_samples_remotely {
            if let Err(err) = self.gateway.insert_notification(&fields) {
                let description = match &err {
                    GatewayError::Unauthorized => {
                        "You must be logged in to add notifications".to_string()
                    }
                    other => format!("Failed to add sample notification: {other}"),
                };
                return Err(self.fail("store_add_sample", &description, err.into()));
            }
        }
        self.notices.push(notice);
        debug!("event=store_add_sample module=store status=ok id={id}");
        Ok(id)
    }

    /// Opens (or reopens) the real-time subscription.
    pub fn connect(&mut self) -> StoreResult<()> {
        self.ensure_open()?;
        match self.gateway.subscribe_to_changes() {
            Ok(subscription) => {
                info!(
                    "event=store_subscribe module=store status=ok subscription_id={}",
                    subscription.id()
                );
                self.subscription = Some(subscription);
                Ok(())
            }
            Err(err) => Err(self.fail(
                "store_subscribe",
                "Failed to subscribe to notification updates",
                err.into(),
            )),
        }
    }

    /// Applies every change delivered since the last call.
    ///
    /// Returns how many changes modified the list. A dropped channel is
    /// logged and the subscription released; it is not re-established.
    pub fn sync_remote(&mut self) -> usize {
        if self.torn_down {
            return 0;
        }
        let Some(subscription) = self.subscription.as_ref() else {
            return 0;
        };
        let batch = subscription.drain();
        if !batch.connected {
            warn!(
                "event=subscription_dropped module=store status=error subscription_id={} buffered={}",
                subscription.id(),
                batch.changes.len()
            );
            self.subscription = None;
        }

        let mut applied = 0;
        for change in batch.changes {
            if self.apply_remote_change(change) {
                applied += 1;
            }
        }
        applied
    }

    /// Reconciles one remote change. Returns whether the list changed.
    pub fn apply_remote_change(&mut self, change: RemoteChange) -> bool {
        if self.torn_down {
            debug!("event=store_remote_change module=store status=ignored reason=torn_down");
            return false;
        }
        let inserted_title = match &change {
            RemoteChange::Inserted(notification) if !self.state.contains(&notification.id) => {
                Some(notification.title.clone())
            }
            _ => None,
        };

        let before = self.state.revision;
        self.dispatch(change.into());
        let changed = self.state.revision != before;

        if changed {
            if let Some(title) = inserted_title {
                self.notices
                    .push(Notice::info("New notification received", Some(title)));
            }
        }
        changed
    }

    /// Opens one notification: marks it read when unread and reports the
    /// route the presentation layer should take.
    pub fn open_notification(&mut self, id: &str) -> StoreResult<OpenedNotification> {
        let id = self.checked_target("store_open", id)?;
        let unread = self.state.get(&id).is_some_and(|item| !item.is_read);
        if unread {
            // Remote failure is already surfaced; opening still proceeds.
            let _ = self.mark_read(&id);
        }

        let notification = self
            .state
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        let route = if notification.opens_onboarding() {
            NotificationRoute::Onboarding
        } else {
            NotificationRoute::Detail
        };
        Ok(OpenedNotification {
            notification,
            route,
        })
    }

    /// Finishes onboarding started from notification `id`.
    pub fn complete_onboarding(&mut self, id: &str, data: &OnboardingData) -> StoreResult<()> {
        let result = self.mark_read(id);
        self.notices.push(Notice::info(
            "Profile setup completed!",
            Some(format!(
                "Welcome {}! Your account is now fully configured.",
                data.account.username
            )),
        ));
        result
    }

    /// Releases the subscription and stops applying remote changes.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        if let Some(subscription) = self.subscription.take() {
            subscription.release();
        }
        self.torn_down = true;
        info!("event=store_teardown module=store status=ok");
    }

    fn dispatch(&mut self, event: StoreEvent) {
        let state = std::mem::take(&mut self.state);
        self.state = reduce(state, event);
    }

    fn ensure_open(&self) -> StoreResult<()> {
        if self.torn_down {
            debug!("event=store_call module=store status=rejected reason=torn_down");
            return Err(StoreError::TornDown);
        }
        Ok(())
    }

    /// Validates a mutation target and checks it exists locally.
    fn checked_target(&mut self, op: &'static str, raw_id: &str) -> StoreResult<String> {
        self.ensure_open()?;
        let id = match validate_notification_id(raw_id) {
            Ok(id) => id.to_string(),
            Err(err) => {
                warn!("event={op} module=store status=rejected error_code=invalid_id");
                self.notices.push(Notice::error("Invalid notification ID"));
                return Err(err.into());
            }
        };
        if !self.state.contains(&id) {
            return Err(self.fail(
                op,
                "Notification not found",
                StoreError::NotFound(id),
            ));
        }
        Ok(id)
    }

    fn fail(&mut self, op: &'static str, description: &str, err: StoreError) -> StoreError {
        error!(
            "event={op} module=store status=error error_code={} error={err}",
            err.code()
        );
        self.notices.push(Notice::error(description));
        err
    }
}
