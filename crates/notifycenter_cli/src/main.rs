//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `notifycenter_core` linkage.
//! - Drive one in-memory center end to end and print the first page.

use notifycenter_core::db::open_db_in_memory;
use notifycenter_core::{
    CenterConfig, NotificationListView, NotificationStore, SqliteNotificationGateway,
};
use std::process::ExitCode;

const SAMPLE_COUNT: usize = 3;

fn main() -> ExitCode {
    println!("notifycenter_core ping={}", notifycenter_core::ping());
    println!("notifycenter_core version={}", notifycenter_core::core_version());

    let conn = match open_db_in_memory() {
        Ok(conn) => conn,
        Err(err) => {
            eprintln!("db open failed: {err}");
            return ExitCode::FAILURE;
        }
    };
    let mut gateway = SqliteNotificationGateway::new(conn);
    gateway.sign_in("cli-probe");

    let config = CenterConfig::default();
    let mut view = NotificationListView::new(config.page_size);
    let mut store = NotificationStore::new(gateway, config);
    if store.load().is_err() || store.connect().is_err() {
        eprintln!("center start failed");
        return ExitCode::FAILURE;
    }
    for _ in 0..SAMPLE_COUNT {
        if let Err(err) = store.add_sample() {
            eprintln!("add_sample failed: {err}");
            return ExitCode::FAILURE;
        }
    }
    let applied = store.sync_remote();

    let snapshot = view.snapshot(store.state());
    println!(
        "notifications total={} unread={} echoes_applied={applied}",
        snapshot.total, snapshot.unread_count
    );
    for item in &snapshot.items {
        println!(
            "  [{}] {} priority={} {}",
            item.kind.as_str(),
            item.title,
            item.effective_priority().as_str(),
            item.id
        );
    }
    store.teardown();
    ExitCode::SUCCESS
}
