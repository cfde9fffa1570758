//! Notification list reducer.
//!
//! # Responsibility
//! - Apply local and remote events to the notification list through one
//!   pure merge point.
//!
//! # Invariants
//! - Ids are unique within `StoreState::items`.
//! - Records with a blank id never enter the state.
//! - `revision` increments exactly when `items` changed.
//! - Overlapping fields follow last-write-wins.

use crate::gateway::change::{NotificationPatch, RemoteChange};
use crate::model::notification::Notification;
use log::warn;
use std::collections::HashSet;

/// Notification list plus a change counter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreState {
    pub items: Vec<Notification>,
    pub revision: u64,
}

impl StoreState {
    pub fn get(&self, id: &str) -> Option<&Notification> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn unread_count(&self) -> usize {
        self.items.iter().filter(|item| !item.is_read).count()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }
}

/// Everything that may change the notification list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// Full remote snapshot replacing the list.
    Loaded(Vec<Notification>),
    Inserted(Notification),
    Updated(NotificationPatch),
    Deleted(String),
    LocallyMarkedRead(String),
    LocallyMarkedAllRead,
    LocallyDeleted(String),
    /// Toggles the pinned flag.
    LocallyPinned(String),
}

impl From<RemoteChange> for StoreEvent {
    fn from(value: RemoteChange) -> Self {
        match value {
            RemoteChange::Inserted(notification) => Self::Inserted(notification),
            RemoteChange::Updated(patch) => Self::Updated(patch),
            RemoteChange::Deleted(id) => Self::Deleted(id),
        }
    }
}

/// Applies one event and returns the next state.
pub fn reduce(mut state: StoreState, event: StoreEvent) -> StoreState {
    let changed = match event {
        StoreEvent::Loaded(items) => {
            let next = normalize_snapshot(items);
            let changed = next != state.items;
            state.items = next;
            changed
        }
        StoreEvent::Inserted(notification) => {
            if !notification.is_valid() {
                warn!("event=reduce_insert module=store status=error error_code=invalid_record");
                false
            } else if state.contains(&notification.id) {
                false
            } else {
                state.items.insert(0, notification);
                true
            }
        }
        StoreEvent::Updated(patch) => merge_patch(&mut state, patch),
        StoreEvent::Deleted(id) | StoreEvent::LocallyDeleted(id) => match state.position(&id) {
            Some(index) => {
                state.items.remove(index);
                true
            }
            None => false,
        },
        StoreEvent::LocallyMarkedRead(id) => match state.position(&id) {
            Some(index) if !state.items[index].is_read => {
                state.items[index].is_read = true;
                true
            }
            _ => false,
        },
        StoreEvent::LocallyMarkedAllRead => {
            let mut changed = false;
            for item in state.items.iter_mut().filter(|item| !item.is_read) {
                item.is_read = true;
                changed = true;
            }
            changed
        }
        StoreEvent::LocallyPinned(id) => match state.position(&id) {
            Some(index) => {
                let item = &mut state.items[index];
                item.pinned = !item.pinned;
                true
            }
            None => false,
        },
    };

    if changed {
        state.revision += 1;
    }
    state
}

fn merge_patch(state: &mut StoreState, patch: NotificationPatch) -> bool {
    if patch.id.trim().is_empty() {
        return false;
    }
    if let Some(index) = state.position(&patch.id) {
        let before = state.items[index].clone();
        patch.apply_to(&mut state.items[index]);
        return state.items[index] != before;
    }

    let id = patch.id.clone();
    match patch.into_notification() {
        Some(notification) => {
            state.items.insert(0, notification);
            true
        }
        None => {
            warn!(
                "event=reduce_update module=store status=error error_code=incomplete_patch id={id}"
            );
            false
        }
    }
}

/// Drops invalid and duplicate records, then orders newest first.
fn normalize_snapshot(items: Vec<Notification>) -> Vec<Notification> {
    let mut seen = HashSet::new();
    let mut next = items
        .into_iter()
        .filter(|item| item.is_valid() && seen.insert(item.id.clone()))
        .collect::<Vec<_>>();
    next.sort_by(|left, right| right.created_at.cmp(&left.created_at));
    next
}
