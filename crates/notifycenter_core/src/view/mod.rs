//! Notification list view pipeline.
//!
//! # Responsibility
//! - Derive the display list from store state and the active filter.
//! - Track the visible page window and the "no more data" flag.
//!
//! # Invariants
//! - Any filter change resets the pager to page 1 with `has_more = true`.
//! - `has_more` is re-armed whenever the filtered id set changes, never on
//!   a pure reorder.

pub mod filter;
pub mod pager;

use crate::model::notification::Notification;
use crate::store::reducer::StoreState;
use filter::{filter_and_sort, CategoryFilter, ListFilter, ReadFilter};
use log::debug;
use pager::Pager;

/// Rendered window of the derived list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListSnapshot {
    /// Visible entries in display order.
    pub items: Vec<Notification>,
    /// Size of the unfiltered list.
    pub total: usize,
    pub filtered_total: usize,
    pub unread_count: usize,
    pub page: usize,
    pub has_more: bool,
}

/// Filter + pager state for one list screen.
#[derive(Debug, Clone)]
pub struct NotificationListView {
    filter: ListFilter,
    pager: Pager,
    /// Sorted ids of the last observed filtered set.
    last_filtered_ids: Option<Vec<String>>,
}

impl NotificationListView {
    pub fn new(page_size: usize) -> Self {
        Self {
            filter: ListFilter::default(),
            pager: Pager::new(page_size),
            last_filtered_ids: None,
        }
    }

    pub fn filter(&self) -> &ListFilter {
        &self.filter
    }

    pub fn pager(&self) -> &Pager {
        &self.pager
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        let query = query.into();
        if query != self.filter.query {
            self.filter.query = query;
            self.filter_changed();
        }
    }

    pub fn set_category(&mut self, category: CategoryFilter) {
        if category != self.filter.category {
            self.filter.category = category;
            self.filter_changed();
        }
    }

    pub fn set_read_filter(&mut self, read_state: ReadFilter) {
        if read_state != self.filter.read_state {
            self.filter.read_state = read_state;
            self.filter_changed();
        }
    }

    /// End-of-window signal from the presentation layer.
    ///
    /// Returns whether another page was revealed.
    pub fn load_more(&mut self, state: &StoreState) -> bool {
        let filtered_total = self.observe(state);
        let advanced = self.pager.load_more(filtered_total);
        debug!(
            "event=view_load_more module=view status=ok page={} has_more={} filtered_total={filtered_total}",
            self.pager.page(),
            self.pager.has_more()
        );
        advanced
    }

    /// Renders the current window.
    pub fn snapshot(&mut self, state: &StoreState) -> ListSnapshot {
        self.observe(state);
        let derived = filter_and_sort(&state.items, &self.filter);
        let visible = self.pager.visible_len(derived.len());
        ListSnapshot {
            items: derived.iter().take(visible).map(|item| (*item).clone()).collect(),
            total: state.items.len(),
            filtered_total: derived.len(),
            unread_count: state.unread_count(),
            page: self.pager.page(),
            has_more: self.pager.has_more(),
        }
    }

    /// Recomputes the filtered id set, re-arming the pager when it changed.
    ///
    /// Reordering alone (pin, read, priority) leaves the set untouched.
    fn observe(&mut self, state: &StoreState) -> usize {
        let mut ids = filter_and_sort(&state.items, &self.filter)
            .into_iter()
            .map(|item| item.id.clone())
            .collect::<Vec<_>>();
        ids.sort_unstable();
        let total = ids.len();
        if self.last_filtered_ids.as_ref() != Some(&ids) {
            if self.last_filtered_ids.is_some() {
                self.pager.rearm();
            }
            self.last_filtered_ids = Some(ids);
        }
        total
    }

    fn filter_changed(&mut self) {
        self.pager.reset();
        self.last_filtered_ids = None;
        debug!("event=view_filter_changed module=view status=ok");
    }
}
