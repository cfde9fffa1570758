//! Filter and display ordering for the notification list.
//!
//! # Invariants
//! - Invalid (blank-id) records never appear in derived output.
//! - Ordering is stable: fully tied entries keep their input order.

use crate::model::notification::{Notification, NotificationKind, Priority};
use std::cmp::Ordering;

/// Category selector; `All` disables the category filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(NotificationKind),
}

impl CategoryFilter {
    /// Parses `all` or a notification kind string.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "" | "all" => Some(Self::All),
            other => NotificationKind::parse(other).map(Self::Only),
        }
    }

    fn accepts(self, item: &Notification) -> bool {
        match self {
            Self::All => true,
            Self::Only(kind) => item.kind == kind,
        }
    }
}

/// Read-state selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReadFilter {
    #[default]
    All,
    Unread,
    Read,
}

impl ReadFilter {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "" | "all" => Some(Self::All),
            "unread" => Some(Self::Unread),
            "read" => Some(Self::Read),
            _ => None,
        }
    }

    fn accepts(self, item: &Notification) -> bool {
        match self {
            Self::All => true,
            Self::Unread => !item.is_read,
            Self::Read => item.is_read,
        }
    }
}

/// Inputs of the derived display list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilter {
    pub query: String,
    pub category: CategoryFilter,
    pub read_state: ReadFilter,
}

/// Filters `items` and sorts the survivors by [`display_order`].
pub fn filter_and_sort<'a>(items: &'a [Notification], filter: &ListFilter) -> Vec<&'a Notification> {
    let needle = filter.query.trim().to_lowercase();
    let mut derived = items
        .iter()
        .filter(|item| item.is_valid())
        .filter(|item| filter.category.accepts(item))
        .filter(|item| needle.is_empty() || item.matches_text(&needle))
        .filter(|item| filter.read_state.accepts(item))
        .collect::<Vec<_>>();
    // `sort_by` is stable.
    derived.sort_by(|left, right| display_order(left, right));
    derived
}

/// Pinned first, then unread, then high priority, then newest.
pub fn display_order(left: &Notification, right: &Notification) -> Ordering {
    right
        .pinned
        .cmp(&left.pinned)
        .then_with(|| left.is_read.cmp(&right.is_read))
        .then_with(|| priority_rank(right).cmp(&priority_rank(left)))
        .then_with(|| right.created_at.cmp(&left.created_at))
}

fn priority_rank(item: &Notification) -> u8 {
    match item.effective_priority() {
        Priority::Normal => 0,
        Priority::High => 1,
    }
}
