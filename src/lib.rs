#![doc(test(attr(deny(warnings))))]

//! Expense Tracker keeps a list of expenses in a single durable slot and
//! derives the filtered, date-sorted views a list screen renders.

pub mod config;
pub mod core;
pub mod domain;
pub mod errors;
pub mod storage;
pub mod utils;

pub use crate::core::{
    CategoryFilter, Clock, ExpenseForm, ExpenseStore, FixedClock, FormField, Submission,
    SystemClock, ValidationErrors,
};
pub use crate::domain::{Expense, ExpenseDraft};
pub use crate::errors::{StoreError, StoreResult};

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!(
            version = utils::build_info::current().version,
            "Expense Tracker tracing initialized."
        );
    });
}
