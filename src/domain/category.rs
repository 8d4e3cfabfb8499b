//! The category vocabulary offered when recording an expense.
//!
//! Categories stay open-ended at the data layer: stored expenses may carry any
//! label, and the vocabulary below is only what the form offers.

/// Categories offered by the expense form, in display order.
pub const DEFAULT_CATEGORIES: [&str; 6] =
    ["Food", "Transport", "Utilities", "Medicals", "Rent", "Other"];

/// Returns `true` when `name` is part of the offered vocabulary (case-sensitive).
pub fn is_known_category(name: &str) -> bool {
    DEFAULT_CATEGORIES.contains(&name)
}
