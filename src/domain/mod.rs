//! Expense domain models and shared entity traits. No I/O.

pub mod category;
pub mod common;
pub mod expense;

pub use category::{is_known_category, DEFAULT_CATEGORIES};
pub use common::{Amounted, Identifiable};
pub use expense::{Expense, ExpenseDraft};
