use std::sync::Arc;

use iso_console_core::{LogKind, Poller};
use tokio::time::{sleep, Duration};

mod common;
use common::fake_api::{record, FakeApi};
use common::{console_over, init_test_logging};

#[tokio::test(start_paused = true)]
async fn polls_immediately_then_on_every_interval() {
    init_test_logging();
    let api = Arc::new(FakeApi::with_connections(vec![record("srv1", 5000, false)]));
    let console = console_over(&api);

    let poller = Poller::spawn(console.store().clone(), Duration::from_secs(5));
    // Let the first (immediate) tick run.
    sleep(Duration::from_millis(1)).await;
    assert_eq!(api.list_calls(), 1);
    assert_eq!(console.store().snapshot().await.len(), 1);

    sleep(Duration::from_secs(5)).await;
    assert_eq!(api.list_calls(), 2);
    sleep(Duration::from_secs(10)).await;
    assert_eq!(api.list_calls(), 4);

    poller.stop().await;
    sleep(Duration::from_secs(30)).await;
    assert_eq!(api.list_calls(), 4, "no polls after stop");
}

#[tokio::test(start_paused = true)]
async fn poll_picks_up_remote_changes() {
    init_test_logging();
    let api = Arc::new(FakeApi::with_connections(vec![record("srv1", 5000, false)]));
    let console = console_over(&api);
    let poller = Poller::spawn(console.store().clone(), Duration::from_secs(10));
    sleep(Duration::from_millis(1)).await;

    api.set_remote(vec![record("srv1", 5000, true), record("srv2", 5001, false)]);
    sleep(Duration::from_secs(10)).await;

    let snapshot = console.store().snapshot().await;
    assert_eq!(snapshot.len(), 2);
    assert!(snapshot[0].connected);
    poller.stop().await;
}

#[tokio::test(start_paused = true)]
async fn failed_poll_is_logged_and_polling_continues() {
    init_test_logging();
    let api = Arc::new(FakeApi::with_connections(vec![record("srv1", 5000, false)]));
    let console = console_over(&api);
    api.fail_next_list();

    let poller = Poller::spawn(console.store().clone(), Duration::from_secs(5));
    sleep(Duration::from_millis(1)).await;
    assert!(console.store().snapshot().await.is_empty());

    sleep(Duration::from_secs(5)).await;
    assert_eq!(console.store().snapshot().await.len(), 1);

    let errors = console
        .log()
        .entries()
        .await
        .into_iter()
        .filter(|e| e.kind == LogKind::Error)
        .count();
    assert_eq!(errors, 1);
    poller.stop().await;
}

#[tokio::test(start_paused = true)]
async fn zero_interval_disables_polling() {
    init_test_logging();
    let api = Arc::new(FakeApi::new());
    let console = iso_console_core::Console::new(api.clone(), Duration::ZERO);

    assert!(console.start_polling().is_none());
    sleep(Duration::from_secs(60)).await;
    assert_eq!(api.list_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn dropping_the_handle_ends_the_task() {
    init_test_logging();
    let api = Arc::new(FakeApi::new());
    let console = console_over(&api);

    let poller = console.start_polling().expect("5s interval polls");
    assert_eq!(poller.interval(), Duration::from_secs(5));
    drop(poller);

    sleep(Duration::from_secs(60)).await;
    assert!(api.list_calls() <= 1, "at most the immediate tick ran");
}
