#![allow(dead_code)]

pub mod fake_api;

use std::sync::Arc;
use std::time::Duration;

use iso_console_core::Console;
use log::LevelFilter;

use fake_api::FakeApi;

/// Logs will appear only when you run with `-- --nocapture`
/// or when the test fails.
pub fn init_test_logging() {
    let _ = env_logger::Builder::from_default_env()
        .filter_level(LevelFilter::Debug)
        .is_test(true)
        .try_init();
}

/// A console wired to `api` with the default poll interval (not started).
pub fn console_over(api: &Arc<FakeApi>) -> Console {
    Console::new(api.clone(), Duration::from_secs(5))
}
