//! Expense state management, form validation, and view derivation.

pub mod expense_store;
pub mod time;
pub mod validation;
pub mod view;

pub use expense_store::{ExpenseStore, Submission};
pub use time::{Clock, FixedClock, SystemClock};
pub use validation::{ExpenseForm, FormField, ValidationErrors};
pub use view::CategoryFilter;
