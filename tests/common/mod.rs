#![allow(dead_code)]

use std::sync::Once;
use stride::engine::TaskEngine;
use stride::storage::SqliteStorage;

pub mod fixtures;

static INIT: Once = Once::new();

pub fn init_test_logging() {
    INIT.call_once(|| {
        stride::logging::init_test_logging();
    });
}

pub fn test_storage() -> SqliteStorage {
    init_test_logging();
    SqliteStorage::open_memory().expect("Failed to create test database")
}

pub fn test_engine() -> TaskEngine {
    TaskEngine::new(test_storage())
}
