//! Common test utilities, fixtures, and mocks
//! This module contains shared functionality used across different test categories

#![allow(dead_code)]

pub mod fixtures;
pub mod mocks;

use std::sync::Once;
use std::time::Duration;
use tracing::Level;

static INIT: Once = Once::new();

/// Initialize tracing for tests
pub fn init() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(Level::DEBUG)
            .with_test_writer()
            .init();
    });
}

/// Let spawned session tasks (completion driver, watchdog) catch up
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(10)).await;
}

/// Sleep until `secs` seconds have elapsed since `start` (paused clock)
pub async fn sleep_until_secs(start: tokio::time::Instant, secs: f64) {
    tokio::time::sleep_until(start + Duration::from_secs_f64(secs)).await;
}
