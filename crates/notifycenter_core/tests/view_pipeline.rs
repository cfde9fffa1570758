use notifycenter_core::{
    filter_and_sort, reduce, CategoryFilter, ListFilter, Notification, NotificationKind,
    NotificationListView, Pager, Priority, ReadFilter, StoreEvent, StoreState,
};

fn item(id: &str, kind: NotificationKind, created_at: i64) -> Notification {
    let mut notification = Notification::with_id(id, kind, format!("title {id}"), "body");
    notification.created_at = created_at;
    notification
}

fn state_of(items: Vec<Notification>) -> StoreState {
    StoreState { items, revision: 1 }
}

fn ordered_ids(items: &[Notification], filter: &ListFilter) -> Vec<String> {
    filter_and_sort(items, filter)
        .into_iter()
        .map(|item| item.id.clone())
        .collect()
}

#[test]
fn pinned_beats_unread_before_read() {
    let mut a = item("a", NotificationKind::Task, 1);
    a.priority = Some(Priority::Normal);
    let mut b = item("b", NotificationKind::Task, 0);
    b.is_read = true;
    b.pinned = true;
    b.priority = Some(Priority::Normal);

    assert_eq!(ordered_ids(&[a, b], &ListFilter::default()), vec!["b", "a"]);
}

#[test]
fn pinned_entries_always_precede_unpinned_ones() {
    let mut items = Vec::new();
    for index in 0..12_i64 {
        let mut notification = item(&format!("n{index}"), NotificationKind::Alert, index);
        notification.pinned = index % 3 == 0;
        notification.is_read = index % 2 == 0;
        if index % 4 == 0 {
            notification.priority = Some(Priority::High);
        }
        items.push(notification);
    }

    let derived = filter_and_sort(&items, &ListFilter::default());
    let first_unpinned = derived.iter().position(|item| !item.pinned).unwrap();
    assert!(derived[first_unpinned..].iter().all(|item| !item.pinned));
    assert!(derived[..first_unpinned].iter().all(|item| item.pinned));
}

#[test]
fn ties_fall_back_to_newest_first_then_input_order() {
    let mut high = item("high", NotificationKind::Task, 1);
    high.priority = Some(Priority::High);
    let items = vec![
        item("old", NotificationKind::Task, 1),
        item("tie-1", NotificationKind::Task, 5),
        high,
        item("tie-2", NotificationKind::Task, 5),
        item("newest", NotificationKind::Task, 9),
    ];

    assert_eq!(
        ordered_ids(&items, &ListFilter::default()),
        vec!["high", "newest", "tie-1", "tie-2", "old"]
    );
}

#[test]
fn category_text_and_read_filters_combine() {
    let mut read_task = item("read-task", NotificationKind::Task, 3);
    read_task.is_read = true;
    let mut message = item("msg", NotificationKind::Message, 2);
    message.message = "Quarterly REPORT attached".to_string();
    let items = vec![
        read_task,
        message,
        item("task", NotificationKind::Task, 1),
    ];

    let by_category = ListFilter {
        category: CategoryFilter::Only(NotificationKind::Task),
        ..ListFilter::default()
    };
    assert_eq!(ordered_ids(&items, &by_category), vec!["task", "read-task"]);

    let by_text = ListFilter {
        query: "  report ".to_string(),
        ..ListFilter::default()
    };
    assert_eq!(ordered_ids(&items, &by_text), vec!["msg"]);

    let unread_tasks = ListFilter {
        category: CategoryFilter::Only(NotificationKind::Task),
        read_state: ReadFilter::Unread,
        ..ListFilter::default()
    };
    assert_eq!(ordered_ids(&items, &unread_tasks), vec!["task"]);

    let read_only = ListFilter {
        read_state: ReadFilter::Read,
        ..ListFilter::default()
    };
    assert_eq!(ordered_ids(&items, &read_only), vec!["read-task"]);
}

#[test]
fn invalid_records_are_never_rendered() {
    let items = vec![
        item("", NotificationKind::Task, 2),
        item("ok", NotificationKind::Task, 1),
    ];
    assert_eq!(ordered_ids(&items, &ListFilter::default()), vec!["ok"]);
}

#[test]
fn filter_values_parse_from_strings() {
    assert_eq!(CategoryFilter::parse("all"), Some(CategoryFilter::All));
    assert_eq!(
        CategoryFilter::parse("alert"),
        Some(CategoryFilter::Only(NotificationKind::Alert))
    );
    assert_eq!(CategoryFilter::parse("info"), None);
    assert_eq!(ReadFilter::parse("unread"), Some(ReadFilter::Unread));
    assert_eq!(ReadFilter::parse("seen"), None);
}

#[test]
fn pager_reveals_windows_and_stops_at_end() {
    let mut pager = Pager::new(10);
    assert_eq!(pager.visible_len(25), 10);

    assert!(pager.load_more(25));
    assert!(pager.has_more());
    assert!(pager.load_more(25));

    assert_eq!(pager.page(), 3);
    assert_eq!(pager.visible_len(25), 25);
    assert!(!pager.has_more());
    assert!(!pager.load_more(25));
    assert_eq!(pager.page(), 3);
}

#[test]
fn view_scenario_twenty_five_entries_two_signals() {
    let items = (0..25)
        .map(|index| item(&format!("n{index}"), NotificationKind::Update, index))
        .collect::<Vec<_>>();
    let state = state_of(items);
    let mut view = NotificationListView::new(10);

    assert_eq!(view.snapshot(&state).items.len(), 10);
    view.load_more(&state);
    view.load_more(&state);

    let snapshot = view.snapshot(&state);
    assert_eq!(snapshot.items.len(), 25);
    assert_eq!(snapshot.filtered_total, 25);
    assert!(!snapshot.has_more);
}

#[test]
fn filter_change_resets_pagination() {
    let items = (0..25)
        .map(|index| item(&format!("n{index}"), NotificationKind::Update, index))
        .collect::<Vec<_>>();
    let state = state_of(items);
    let mut view = NotificationListView::new(10);
    view.load_more(&state);
    view.load_more(&state);
    assert!(!view.snapshot(&state).has_more);

    view.set_query("title");
    let snapshot = view.snapshot(&state);
    assert_eq!(snapshot.page, 1);
    assert!(snapshot.has_more);
    assert_eq!(snapshot.items.len(), 10);

    view.load_more(&state);
    view.set_category(CategoryFilter::Only(NotificationKind::Update));
    assert_eq!(view.pager().page(), 1);

    view.load_more(&state);
    view.set_read_filter(ReadFilter::Unread);
    assert_eq!(view.pager().page(), 1);
    assert!(view.pager().has_more());
}

#[test]
fn setting_the_same_filter_value_keeps_the_page() {
    let items = (0..25)
        .map(|index| item(&format!("n{index}"), NotificationKind::Update, index))
        .collect::<Vec<_>>();
    let state = state_of(items);
    let mut view = NotificationListView::new(10);
    view.load_more(&state);

    view.set_query("");
    view.set_read_filter(ReadFilter::All);
    assert_eq!(view.pager().page(), 2);
}

#[test]
fn changed_result_set_rearms_has_more() {
    let items = (0..5)
        .map(|index| item(&format!("n{index}"), NotificationKind::Alert, index))
        .collect::<Vec<_>>();
    let mut state = state_of(items);
    let mut view = NotificationListView::new(10);

    assert!(!view.load_more(&state));
    assert!(!view.snapshot(&state).has_more);

    state = reduce(
        state,
        StoreEvent::Inserted(item("fresh", NotificationKind::Alert, 99)),
    );
    let snapshot = view.snapshot(&state);
    assert!(snapshot.has_more);
    assert_eq!(snapshot.items[0].id, "fresh");
    assert_eq!(snapshot.unread_count, 6);
    assert_eq!(snapshot.total, 6);
}

#[test]
fn reordering_the_same_result_set_keeps_has_more_off() {
    let items = vec![
        item("a", NotificationKind::Task, 3),
        item("b", NotificationKind::Task, 2),
        item("c", NotificationKind::Task, 1),
    ];
    let mut state = state_of(items);
    let mut view = NotificationListView::new(2);

    assert!(view.load_more(&state));
    assert!(!view.snapshot(&state).has_more);

    state = reduce(state, StoreEvent::LocallyPinned("c".to_string()));
    state = reduce(state, StoreEvent::LocallyMarkedRead("a".to_string()));
    let snapshot = view.snapshot(&state);
    assert_eq!(snapshot.items[0].id, "c");
    assert_eq!(snapshot.items.len(), 3);
    assert!(!snapshot.has_more);
    assert!(!view.load_more(&state));
}
