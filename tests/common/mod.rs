#![allow(dead_code)]

use std::{
    path::{Path, PathBuf},
    sync::Mutex,
};

use chrono::NaiveDate;
use expense_tracker::{storage::JsonFileStore, ExpenseDraft, ExpenseStore};
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Creates a unique data directory that outlives the calling test.
pub fn temp_data_dir() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

/// Opens a file-backed store rooted at `dir`.
pub fn file_store(dir: &Path) -> ExpenseStore {
    let storage = JsonFileStore::new(dir.to_path_buf()).expect("create json file store");
    ExpenseStore::open(Box::new(storage))
}

pub fn day(raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").expect("valid test date")
}

pub fn draft(description: &str, amount: f64, category: &str, date: &str) -> ExpenseDraft {
    ExpenseDraft::new(description, amount, category, day(date))
}
