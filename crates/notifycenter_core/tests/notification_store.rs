use notifycenter_core::db::open_db_in_memory;
use notifycenter_core::{
    ActionType, CenterConfig, GatewayError, NewNotification, NotificationGateway,
    NotificationKind, NotificationRoute, NotificationStore, OnboardingData,
    SqliteNotificationGateway, StoreError,
};

type Store = NotificationStore<SqliteNotificationGateway>;

fn new_row(id: &str, created_at: i64) -> NewNotification {
    NewNotification {
        id: id.to_string(),
        kind: NotificationKind::Task,
        title: format!("title {id}"),
        message: format!("message {id}"),
        created_at: Some(created_at),
        priority: None,
        sender: None,
        action_type: None,
    }
}

fn seeded_store(ids: &[(&str, i64)]) -> Store {
    let mut gateway = SqliteNotificationGateway::new(open_db_in_memory().unwrap());
    gateway.sign_in("user-1");
    for (id, created_at) in ids {
        gateway.insert_notification(&new_row(id, *created_at)).unwrap();
    }
    let mut store = NotificationStore::new(gateway, CenterConfig::default());
    store.load().unwrap();
    store.take_notices();
    store
}

fn ids(store: &Store) -> Vec<String> {
    store.items().iter().map(|item| item.id.clone()).collect()
}

#[test]
fn load_replaces_list_newest_first() {
    let store = seeded_store(&[("a", 1_000), ("c", 3_000), ("b", 2_000)]);
    assert_eq!(ids(&store), vec!["c", "b", "a"]);
    assert!(!store.is_loading());
}

#[test]
fn failed_load_keeps_list_and_surfaces_error() {
    let mut store = seeded_store(&[("a", 1), ("b", 2)]);
    let before = store.items().to_vec();
    store.gateway_mut().set_offline(true);

    let err = store.load().unwrap_err();
    assert!(matches!(err, StoreError::Gateway(GatewayError::Transport(_))));
    assert_eq!(store.items(), before.as_slice());

    let notices = store.take_notices();
    assert_eq!(notices.len(), 1);
    assert!(notices[0].is_error());
    assert_eq!(
        notices[0].description.as_deref(),
        Some("Failed to load notifications")
    );
}

#[test]
fn mark_read_updates_local_and_remote_state() {
    let mut store = seeded_store(&[("a", 1), ("b", 2)]);
    store.mark_read("a").unwrap();

    assert!(store.get("a").unwrap().is_read);
    assert!(!store.get("b").unwrap().is_read);
    let remote = store.gateway().list_notifications().unwrap();
    assert!(remote.iter().find(|item| item.id == "a").unwrap().is_read);
}

#[test]
fn mark_read_with_empty_id_changes_nothing_and_surfaces_error() {
    let mut store = seeded_store(&[("a", 1)]);
    let before = store.state().clone();

    for raw in ["", "   "] {
        let err = store.mark_read(raw).unwrap_err();
        assert!(matches!(err, StoreError::InvalidId(_)));
    }

    assert_eq!(store.state(), &before);
    let notices = store.take_notices();
    assert_eq!(notices.len(), 2);
    assert!(notices.iter().all(|notice| notice.is_error()
        && notice.description.as_deref() == Some("Invalid notification ID")));
}

#[test]
fn mark_read_with_unknown_id_changes_nothing_and_surfaces_error() {
    let mut store = seeded_store(&[("a", 1)]);
    let before = store.state().clone();

    let err = store.mark_read("missing").unwrap_err();
    assert!(matches!(err, StoreError::NotFound(id) if id == "missing"));
    assert_eq!(store.state(), &before);
    assert!(store.take_notices()[0].is_error());
}

#[test]
fn remote_failure_does_not_roll_back_optimistic_read() {
    let mut store = seeded_store(&[("a", 1)]);
    store.gateway_mut().set_offline(true);

    let err = store.mark_read("a").unwrap_err();
    assert!(matches!(err, StoreError::Gateway(_)));
    assert!(store.get("a").unwrap().is_read);

    let notices = store.take_notices();
    assert!(notices[0]
        .description
        .as_deref()
        .unwrap()
        .starts_with("Failed to mark notification as read"));
}

#[test]
fn mark_all_read_marks_every_entry() {
    let mut store = seeded_store(&[("a", 1), ("b", 2), ("c", 3)]);
    store.mark_all_read().unwrap();

    assert_eq!(store.unread_count(), 0);
    assert!(store
        .gateway()
        .list_notifications()
        .unwrap()
        .iter()
        .all(|item| item.is_read));
    assert_eq!(
        store.take_notices()[0].title,
        "All notifications marked as read"
    );
}

#[test]
fn delete_by_id_removes_exactly_one_entry() {
    let mut store = seeded_store(&[("a", 1), ("b", 2), ("c", 3)]);
    store.delete_by_id("b").unwrap();

    assert_eq!(ids(&store), vec!["c", "a"]);
    assert_eq!(store.gateway().list_notifications().unwrap().len(), 2);
}

#[test]
fn delete_with_remote_failure_keeps_local_removal() {
    let mut store = seeded_store(&[("a", 1), ("b", 2)]);
    store.gateway_mut().set_offline(true);

    assert!(store.delete_by_id("a").is_err());
    assert_eq!(ids(&store), vec!["b"]);
}

#[test]
fn toggle_pin_is_local_only() {
    let mut store = seeded_store(&[("a", 1)]);

    assert!(store.toggle_pin("a").unwrap());
    assert!(store.get("a").unwrap().pinned);
    let remote = store.gateway().list_notifications().unwrap();
    assert!(!remote[0].pinned);

    assert!(!store.toggle_pin("a").unwrap());
    assert!(matches!(
        store.toggle_pin("").unwrap_err(),
        StoreError::InvalidId(_)
    ));
}

#[test]
fn add_sample_twice_prepends_two_distinct_unread_entries() {
    let mut store = seeded_store(&[("a", 1)]);

    let first = store.add_sample().unwrap();
    let second = store.add_sample().unwrap();

    assert_ne!(first, second);
    assert_eq!(ids(&store), vec![second.clone(), first.clone(), "a".to_string()]);
    assert!(!store.get(&first).unwrap().is_read);
    assert!(!store.get(&second).unwrap().is_read);
    assert_eq!(store.gateway().list_notifications().unwrap().len(), 3);
}

#[test]
fn add_sample_without_session_keeps_local_entry_and_surfaces_error() {
    let mut store = seeded_store(&[]);
    store.gateway_mut().sign_out();

    let err = store.add_sample().unwrap_err();
    assert!(matches!(err, StoreError::Gateway(GatewayError::Unauthorized)));
    assert_eq!(store.items().len(), 1);
    assert_eq!(
        store.take_notices()[0].description.as_deref(),
        Some("You must be logged in to add notifications")
    );
}

#[test]
fn add_sample_can_stay_local() {
    let gateway = SqliteNotificationGateway::new(open_db_in_memory().unwrap());
    let config = CenterConfig {
        mirror_samples_remotely: false,
        ..CenterConfig::default()
    };
    let mut store = NotificationStore::new(gateway, config);

    store.add_sample().unwrap();
    assert_eq!(store.items().len(), 1);
    assert!(store.gateway().list_notifications().unwrap().is_empty());
}

#[test]
fn remote_changes_are_reconciled() {
    let mut store = seeded_store(&[("a", 1), ("b", 2)]);
    store.connect().unwrap();
    assert!(store.is_live());

    store.gateway().insert_notification(&new_row("c", 3)).unwrap();
    store.gateway().update_read_state("a", true).unwrap();
    store.gateway().delete_notification("b").unwrap();

    assert_eq!(store.sync_remote(), 3);
    assert_eq!(ids(&store), vec!["c", "a"]);
    assert!(store.get("a").unwrap().is_read);

    let notices = store.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].title, "New notification received");
    assert_eq!(notices[0].description.as_deref(), Some("title c"));
}

#[test]
fn echoes_of_local_mutations_do_not_duplicate_entries() {
    let mut store = seeded_store(&[("a", 1)]);
    store.connect().unwrap();

    let sample = store.add_sample().unwrap();
    store.mark_read("a").unwrap();
    store.sync_remote();

    assert_eq!(store.items().len(), 2);
    assert_eq!(store.items()[0].id, sample);
    assert!(store.get("a").unwrap().is_read);
}

#[test]
fn remote_update_preserves_local_pin() {
    let mut store = seeded_store(&[("a", 1)]);
    store.connect().unwrap();
    store.toggle_pin("a").unwrap();

    store.gateway().update_read_state("a", true).unwrap();
    store.sync_remote();

    let item = store.get("a").unwrap();
    assert!(item.is_read);
    assert!(item.pinned);
}

#[test]
fn dropped_feed_marks_store_not_live() {
    let mut store = seeded_store(&[("a", 1)]);
    store.connect().unwrap();

    store.gateway().insert_notification(&new_row("b", 2)).unwrap();
    store.gateway().close_feed();

    assert_eq!(store.sync_remote(), 1);
    assert!(!store.is_live());

    store.gateway().insert_notification(&new_row("c", 3)).unwrap();
    assert_eq!(store.sync_remote(), 0);
    assert!(store.get("c").is_none());
}

#[test]
fn teardown_releases_subscription_and_rejects_further_calls() {
    let mut store = seeded_store(&[("a", 1)]);
    store.connect().unwrap();
    assert_eq!(store.gateway().feed().subscriber_count(), 1);

    store.teardown();
    assert_eq!(store.gateway().feed().subscriber_count(), 0);
    assert!(store.is_torn_down());

    store.gateway().insert_notification(&new_row("b", 2)).unwrap();
    assert_eq!(store.sync_remote(), 0);
    assert!(matches!(store.mark_read("a"), Err(StoreError::TornDown)));
    assert!(matches!(store.load(), Err(StoreError::TornDown)));
    assert_eq!(store.items().len(), 1);
}

#[test]
fn open_notification_marks_read_and_routes_onboarding() {
    let mut gateway = SqliteNotificationGateway::new(open_db_in_memory().unwrap());
    gateway.sign_in("user-1");
    let mut onboarding = new_row("onboard", 2);
    onboarding.action_type = Some(ActionType::UserOnboarding);
    gateway.insert_notification(&onboarding).unwrap();
    gateway.insert_notification(&new_row("plain", 1)).unwrap();
    let mut store = NotificationStore::new(gateway, CenterConfig::default());
    store.load().unwrap();

    let opened = store.open_notification("onboard").unwrap();
    assert_eq!(opened.route, NotificationRoute::Onboarding);
    assert!(opened.notification.is_read);

    let opened = store.open_notification("plain").unwrap();
    assert_eq!(opened.route, NotificationRoute::Detail);
}

#[test]
fn complete_onboarding_marks_source_read_and_welcomes_user() {
    let mut store = seeded_store(&[("onboard", 1)]);
    let mut data = OnboardingData::default();
    data.account.username = "ada".to_string();

    store.complete_onboarding("onboard", &data).unwrap();

    assert!(store.get("onboard").unwrap().is_read);
    let notices = store.take_notices();
    assert_eq!(notices[0].title, "Profile setup completed!");
    assert_eq!(
        notices[0].description.as_deref(),
        Some("Welcome ada! Your account is now fully configured.")
    );
}
