//! Pure projections of the expense list into what a list view renders.
//!
//! Nothing here mutates its input; callers re-run these functions whenever the
//! store or the filter selection changes.

use std::{collections::HashSet, fmt};

use crate::domain::{is_known_category, Amounted, Expense, DEFAULT_CATEGORIES};

/// Label of the wildcard filter entry.
pub const ALL_CATEGORIES: &str = "All";

/// Category filter selection held by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Category(String),
}

impl CategoryFilter {
    /// Interprets a selection label; `"All"` selects the wildcard.
    pub fn from_label(label: &str) -> Self {
        if label == ALL_CATEGORIES {
            CategoryFilter::All
        } else {
            CategoryFilter::Category(label.to_string())
        }
    }

    pub fn matches(&self, expense: &Expense) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Category(name) => expense.category == *name,
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryFilter::All => f.write_str(ALL_CATEGORIES),
            CategoryFilter::Category(name) => f.write_str(name),
        }
    }
}

/// Returns `"All"` followed by each distinct category in first-seen order.
pub fn derive_categories(expenses: &[Expense]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut categories = vec![ALL_CATEGORIES.to_string()];
    for expense in expenses {
        if seen.insert(expense.category.as_str()) {
            categories.push(expense.category.clone());
        }
    }
    categories
}

/// Filter choices: the offered vocabulary, then ad-hoc categories found in the data.
pub fn category_options(expenses: &[Expense]) -> Vec<String> {
    let mut options: Vec<String> = DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect();
    for category in derive_categories(expenses).into_iter().skip(1) {
        if !is_known_category(&category) {
            options.push(category);
        }
    }
    options
}

/// Returns the records matching `filter`, in their original order.
pub fn apply_filter<'a>(expenses: &'a [Expense], filter: &CategoryFilter) -> Vec<&'a Expense> {
    expenses.iter().filter(|expense| filter.matches(expense)).collect()
}

/// Stable sort, most recent date first.
pub fn sort_by_date_descending(expenses: &mut [&Expense]) {
    expenses.sort_by(|a, b| b.date.cmp(&a.date));
}

/// Filters, then sorts; the list a view shows for the current selection.
pub fn visible_expenses<'a>(expenses: &'a [Expense], filter: &CategoryFilter) -> Vec<&'a Expense> {
    let mut visible = apply_filter(expenses, filter);
    sort_by_date_descending(&mut visible);
    visible
}

/// Sums the amounts of the given records.
pub fn total<'a, I, T>(items: I) -> f64
where
    I: IntoIterator<Item = &'a T>,
    T: Amounted + 'a,
{
    items.into_iter().map(|item| item.amount()).sum()
}
