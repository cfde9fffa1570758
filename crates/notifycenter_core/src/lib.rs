//! Core logic for the notification center.
//! This crate owns the notification list, its reconciliation with the remote
//! table, and the derived display pipeline.

pub mod config;
pub mod db;
pub mod gateway;
pub mod logging;
pub mod model;
pub mod store;
pub mod view;

pub use config::{CenterConfig, ConfigError};
pub use gateway::{
    ChangeError, ChangeFeed, GatewayError, GatewayResult, NewNotification, NotificationGateway,
    NotificationPatch, RemoteChange, Session, SqliteNotificationGateway, Subscription,
};
pub use logging::{init_logging, logging_status, LogSettings, LoggingError, LoggingResult};
pub use model::notification::{
    now_epoch_ms, validate_notification_id, ActionType, InvalidIdError, Notification,
    NotificationKind, NotificationValidationError, Priority, Sender,
};
pub use model::onboarding::{OnboardingData, OnboardingField, OnboardingForm, OnboardingStep};
pub use store::notice::{Notice, NoticeLevel};
pub use store::reducer::{reduce, StoreEvent, StoreState};
pub use store::{
    NotificationRoute, NotificationStore, OpenedNotification, StoreError, StoreResult,
};
pub use view::filter::{display_order, filter_and_sort, CategoryFilter, ListFilter, ReadFilter};
pub use view::pager::Pager;
pub use view::{ListSnapshot, NotificationListView};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
