//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose one process-wide notification center to Dart via FRB.
//! - Flatten core types into plain envelopes with stable string labels.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Every center call fails softly with `ok=false` while no center is open.
//! - Remote changes are drained before each list render.

use notifycenter_core::db::open_db;
use notifycenter_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    CategoryFilter, CenterConfig, ListSnapshot, Notice, NoticeLevel, Notification,
    NotificationListView, NotificationRoute, NotificationStore, OnboardingData, OnboardingField,
    OnboardingForm, ReadFilter, RemoteChange, SqliteNotificationGateway,
};
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock, PoisonError};

const CENTER_DB_FILE_NAME: &str = "notifycenter.sqlite3";
static CENTER_DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static CENTER: OnceLock<Mutex<Option<Center>>> = OnceLock::new();

struct Center {
    store: NotificationStore<SqliteNotificationGateway>,
    view: NotificationListView,
}

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Reconfiguration attempts with different level or directory return error.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Flattened notification row for list rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationItem {
    pub id: String,
    /// `message|alert|task|update`.
    pub kind: String,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub created_at_ms: i64,
    /// `normal|high`; absent priority renders as `normal`.
    pub priority: String,
    pub pinned: bool,
    pub sender_name: Option<String>,
    pub sender_avatar_url: Option<String>,
    pub action_type: Option<String>,
}

/// One rendered page of the filtered list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationPageResponse {
    pub ok: bool,
    pub items: Vec<NotificationItem>,
    pub total: u32,
    pub filtered_total: u32,
    pub unread_count: u32,
    pub page: u32,
    pub has_more: bool,
    /// Human-readable response message for diagnostics.
    pub message: String,
}

impl NotificationPageResponse {
    fn from_snapshot(snapshot: ListSnapshot) -> Self {
        let message = if snapshot.items.is_empty() {
            "No notifications.".to_string()
        } else {
            format!("Showing {} of {}.", snapshot.items.len(), snapshot.filtered_total)
        };
        Self {
            ok: true,
            items: snapshot.items.iter().map(to_item).collect(),
            total: to_u32(snapshot.total),
            filtered_total: to_u32(snapshot.filtered_total),
            unread_count: to_u32(snapshot.unread_count),
            page: to_u32(snapshot.page),
            has_more: snapshot.has_more,
            message,
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            items: Vec::new(),
            total: 0,
            filtered_total: 0,
            unread_count: 0,
            page: 0,
            has_more: false,
            message: message.into(),
        }
    }
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CenterActionResponse {
    /// Whether operation succeeded.
    pub ok: bool,
    /// Target or created notification ID, when the action has one.
    pub notification_id: Option<String>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl CenterActionResponse {
    fn success(message: impl Into<String>, notification_id: Option<String>) -> Self {
        Self {
            ok: true,
            notification_id,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            notification_id: None,
            message: message.into(),
        }
    }
}

/// Result of opening one notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenNotificationResponse {
    pub ok: bool,
    pub item: Option<NotificationItem>,
    /// `detail|onboarding` on success.
    pub route: Option<String>,
    pub message: String,
}

/// Transient toast raised by a center operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoticeItem {
    /// `info|error`.
    pub level: String,
    pub title: String,
    pub description: Option<String>,
}

/// Opens the process-wide notification center.
///
/// Input semantics:
/// - `db_path`: SQLite file; blank uses `NOTIFYCENTER_DB_PATH` or a temp file.
/// - `user_id`: signed-in user; `None` opens a signed-out session.
/// - `config_json`: optional JSON object with `page_size` and
///   `mirror_samples_remotely`.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Replaces (and tears down) any center opened earlier.
/// - Loads the list and subscribes to remote changes before returning.
#[flutter_rust_bridge::frb(sync)]
pub fn center_open(
    db_path: String,
    user_id: Option<String>,
    config_json: Option<String>,
) -> CenterActionResponse {
    let config = match config_json.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => match CenterConfig::from_json_str(raw) {
            Ok(config) => config,
            Err(err) => {
                return CenterActionResponse::failure(format!("center_open failed: {err}"))
            }
        },
        _ => CenterConfig::default(),
    };

    let path = match db_path.trim() {
        "" => resolve_center_db_path(),
        explicit => PathBuf::from(explicit),
    };
    let conn = match open_db(&path) {
        Ok(conn) => conn,
        Err(err) => return CenterActionResponse::failure(format!("center_open failed: {err}")),
    };

    let mut gateway = SqliteNotificationGateway::new(conn);
    if let Some(user_id) = user_id.as_deref().map(str::trim).filter(|id| !id.is_empty()) {
        gateway.sign_in(user_id);
    }
    let view = NotificationListView::new(config.page_size);
    let mut store = NotificationStore::new(gateway, config);
    // Failures are queued as notices for the UI.
    let loaded = store.load();
    let _ = store.connect();

    let mut slot = center_slot();
    if let Some(previous) = slot.as_mut() {
        previous.store.teardown();
    }
    *slot = Some(Center { store, view });
    log::info!("event=ffi_center_open module=ffi status=ok path={}", path.display());

    match loaded {
        Ok(count) => CenterActionResponse::success(format!("Loaded {count} notification(s)."), None),
        Err(err) => CenterActionResponse::success(format!("Center opened; load failed: {err}"), None),
    }
}

/// Tears down the open center, if any.
#[flutter_rust_bridge::frb(sync)]
pub fn center_close() -> CenterActionResponse {
    match center_slot().take() {
        Some(mut center) => {
            center.store.teardown();
            CenterActionResponse::success("Center closed.", None)
        }
        None => CenterActionResponse::success("Center was not open.", None),
    }
}

/// Applies filters and renders the current page.
///
/// Input semantics:
/// - `category`: `all` or a notification kind.
/// - `read_state`: `all|unread|read`.
/// - Unchanged filter values keep the current page.
#[flutter_rust_bridge::frb(sync)]
pub fn center_list(query: String, category: String, read_state: String) -> NotificationPageResponse {
    let Some(category) = CategoryFilter::parse(&category) else {
        return NotificationPageResponse::failure(format!("unsupported category: {category}"));
    };
    let Some(read_state) = ReadFilter::parse(&read_state) else {
        return NotificationPageResponse::failure(format!("unsupported read state: {read_state}"));
    };
    with_center_page(|center| {
        center.view.set_query(query);
        center.view.set_category(category);
        center.view.set_read_filter(read_state);
    })
}

/// End-of-list signal; reveals one more page when available.
#[flutter_rust_bridge::frb(sync)]
pub fn center_load_more() -> NotificationPageResponse {
    with_center_page(|center| {
        center.view.load_more(center.store.state());
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn center_mark_read(id: String) -> CenterActionResponse {
    with_center_action(|center| {
        center
            .store
            .mark_read(&id)
            .map(|()| CenterActionResponse::success("Marked as read.", Some(id.trim().to_string())))
            .map_err(|err| err.to_string())
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn center_mark_all_read() -> CenterActionResponse {
    with_center_action(|center| {
        center
            .store
            .mark_all_read()
            .map(|()| CenterActionResponse::success("All marked as read.", None))
            .map_err(|err| err.to_string())
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn center_delete(id: String) -> CenterActionResponse {
    with_center_action(|center| {
        center
            .store
            .delete_by_id(&id)
            .map(|()| CenterActionResponse::success("Deleted.", Some(id.trim().to_string())))
            .map_err(|err| err.to_string())
    })
}

/// Toggles the client-only pin; the message reports the new state.
#[flutter_rust_bridge::frb(sync)]
pub fn center_toggle_pin(id: String) -> CenterActionResponse {
    with_center_action(|center| {
        center
            .store
            .toggle_pin(&id)
            .map(|pinned| {
                let message = if pinned { "Pinned." } else { "Unpinned." };
                CenterActionResponse::success(message, Some(id.trim().to_string()))
            })
            .map_err(|err| err.to_string())
    })
}

/// Adds one synthesized sample notification.
#[flutter_rust_bridge::frb(sync)]
pub fn center_add_sample() -> CenterActionResponse {
    with_center_action(|center| {
        center
            .store
            .add_sample()
            .map(|id| CenterActionResponse::success("Sample added.", Some(id)))
            .map_err(|err| err.to_string())
    })
}

/// Drains pending real-time changes into the list.
#[flutter_rust_bridge::frb(sync)]
pub fn center_sync() -> CenterActionResponse {
    with_center_action(|center| {
        let applied = center.store.sync_remote();
        let message = if center.store.is_live() {
            format!("Applied {applied} change(s).")
        } else {
            format!("Applied {applied} change(s); not subscribed.")
        };
        Ok(CenterActionResponse::success(message, None))
    })
}

/// Reconciles one change-event payload pushed from the host side.
///
/// `payload` uses the `eventType` + `new`/`old` JSON shape of the
/// notifications change stream.
#[flutter_rust_bridge::frb(sync)]
pub fn center_apply_remote_payload(payload: String) -> CenterActionResponse {
    let change = match RemoteChange::from_json_str(&payload) {
        Ok(change) => change,
        Err(err) => {
            log::warn!("event=ffi_remote_payload module=ffi status=rejected error={err}");
            return CenterActionResponse::failure(format!("invalid change payload: {err}"));
        }
    };
    let id = change.id().to_string();
    with_center_action(|center| {
        let message = if center.store.apply_remote_change(change) {
            "Change applied."
        } else {
            "No change."
        };
        Ok(CenterActionResponse::success(message, Some(id)))
    })
}

/// Opens one notification, marking it read when unread.
#[flutter_rust_bridge::frb(sync)]
pub fn center_open_notification(id: String) -> OpenNotificationResponse {
    let mut slot = center_slot();
    let Some(center) = slot.as_mut() else {
        return OpenNotificationResponse {
            ok: false,
            item: None,
            route: None,
            message: not_open_message(),
        };
    };
    match center.store.open_notification(&id) {
        Ok(opened) => OpenNotificationResponse {
            ok: true,
            item: Some(to_item(&opened.notification)),
            route: Some(route_label(opened.route).to_string()),
            message: "Opened.".to_string(),
        },
        Err(err) => OpenNotificationResponse {
            ok: false,
            item: None,
            route: None,
            message: err.to_string(),
        },
    }
}

/// Onboarding form values collected by the Dart dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnboardingInput {
    pub username: String,
    pub email: String,
    pub password: String,
    pub country: String,
    pub gender: String,
}

/// Validates the onboarding form and finishes the flow started from
/// notification `id` (marks it read, queues the welcome toast).
///
/// # FFI contract
/// - Validation failures return `ok=false` with every field message and
///   leave the notification untouched.
#[flutter_rust_bridge::frb(sync)]
pub fn center_complete_onboarding(id: String, input: OnboardingInput) -> CenterActionResponse {
    let data = match collect_onboarding(input) {
        Ok(data) => data,
        Err(message) => return CenterActionResponse::failure(message),
    };
    with_center_action(|center| {
        center
            .store
            .complete_onboarding(&id, &data)
            .map(|()| {
                CenterActionResponse::success("Onboarding completed.", Some(id.trim().to_string()))
            })
            .map_err(|err| err.to_string())
    })
}

/// Returns and clears queued toasts, oldest first.
#[flutter_rust_bridge::frb(sync)]
pub fn center_take_notices() -> Vec<NoticeItem> {
    center_slot()
        .as_mut()
        .map(|center| center.store.take_notices().iter().map(to_notice_item).collect())
        .unwrap_or_default()
}

fn center_slot() -> std::sync::MutexGuard<'static, Option<Center>> {
    CENTER
        .get_or_init(|| Mutex::new(None))
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

fn with_center_page(f: impl FnOnce(&mut Center)) -> NotificationPageResponse {
    let mut slot = center_slot();
    let Some(center) = slot.as_mut() else {
        return NotificationPageResponse::failure(not_open_message());
    };
    center.store.sync_remote();
    f(center);
    let snapshot = center.view.snapshot(center.store.state());
    NotificationPageResponse::from_snapshot(snapshot)
}

fn with_center_action(
    f: impl FnOnce(&mut Center) -> Result<CenterActionResponse, String>,
) -> CenterActionResponse {
    let mut slot = center_slot();
    let Some(center) = slot.as_mut() else {
        return CenterActionResponse::failure(not_open_message());
    };
    f(center).unwrap_or_else(CenterActionResponse::failure)
}

/// Walks the form through every step so each step's rules apply.
fn collect_onboarding(input: OnboardingInput) -> Result<OnboardingData, String> {
    let mut form = OnboardingForm::new();
    form.set_field(OnboardingField::Username, input.username.trim());
    form.set_field(OnboardingField::Email, input.email.trim());
    form.set_field(OnboardingField::Password, input.password);
    form.set_field(OnboardingField::Country, input.country.trim());
    form.set_field(OnboardingField::Gender, input.gender.trim());

    while form.next() {}
    if !form.errors().is_empty() {
        let messages = form.errors().values().copied().collect::<Vec<_>>();
        return Err(messages.join("; "));
    }
    form
        .complete()
        .map_err(|err| format!("onboarding stopped at step {}", err.0.number()))
}

fn not_open_message() -> String {
    "notification center is not open".to_string()
}

fn resolve_center_db_path() -> PathBuf {
    CENTER_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var("NOTIFYCENTER_DB_PATH") {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(CENTER_DB_FILE_NAME)
        })
        .clone()
}

fn to_item(notification: &Notification) -> NotificationItem {
    NotificationItem {
        id: notification.id.clone(),
        kind: notification.kind.as_str().to_string(),
        title: notification.title.clone(),
        message: notification.message.clone(),
        is_read: notification.is_read,
        created_at_ms: notification.created_at,
        priority: notification.effective_priority().as_str().to_string(),
        pinned: notification.pinned,
        sender_name: notification.sender.as_ref().map(|sender| sender.name.clone()),
        sender_avatar_url: notification
            .sender
            .as_ref()
            .and_then(|sender| sender.avatar_url.clone()),
        action_type: notification
            .action_type
            .map(|action| action.as_str().to_string()),
    }
}

fn to_notice_item(notice: &Notice) -> NoticeItem {
    NoticeItem {
        level: match notice.level {
            NoticeLevel::Info => "info",
            NoticeLevel::Error => "error",
        }
        .to_string(),
        title: notice.title.clone(),
        description: notice.description.clone(),
    }
}

fn route_label(route: NotificationRoute) -> &'static str {
    match route {
        NotificationRoute::Detail => "detail",
        NotificationRoute::Onboarding => "onboarding",
    }
}

fn to_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
