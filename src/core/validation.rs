//! Form input validation performed before an expense reaches the store.

use std::fmt;

use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::{Expense, ExpenseDraft};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Fields of the expense form that can carry a validation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FormField {
    Description,
    Amount,
    Date,
    Category,
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FormField::Description => "description",
            FormField::Amount => "amount",
            FormField::Date => "date",
            FormField::Category => "category",
        };
        f.write_str(label)
    }
}

/// Per-field messages collected by [`ExpenseForm::validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{}", render(.errors))]
pub struct ValidationErrors {
    errors: Vec<(FormField, String)>,
}

impl ValidationErrors {
    fn push(&mut self, field: FormField, message: &str) {
        self.errors.push((field, message.to_string()));
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Message for `field`, if that field failed.
    pub fn get(&self, field: FormField) -> Option<&str> {
        self.errors
            .iter()
            .find(|(candidate, _)| *candidate == field)
            .map(|(_, message)| message.as_str())
    }

    pub fn fields(&self) -> impl Iterator<Item = FormField> + '_ {
        self.errors.iter().map(|(field, _)| *field)
    }
}

fn render(errors: &[(FormField, String)]) -> String {
    errors
        .iter()
        .map(|(field, message)| format!("{field}: {message}"))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Raw, unvalidated form input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpenseForm {
    pub description: String,
    pub amount: String,
    pub category: String,
    pub date: String,
}

impl ExpenseForm {
    /// Empty form with the date preset to `today`.
    pub fn blank(today: NaiveDate) -> Self {
        Self {
            date: today.format(DATE_FORMAT).to_string(),
            ..Self::default()
        }
    }

    /// Form pre-filled from an existing expense, used when editing.
    pub fn from_expense(expense: &Expense) -> Self {
        Self {
            description: expense.description.clone(),
            amount: expense.amount.to_string(),
            category: expense.category.clone(),
            date: expense.date.format(DATE_FORMAT).to_string(),
        }
    }

    /// Checks every field and returns a draft only when all of them pass.
    pub fn validate(&self, today: NaiveDate) -> Result<ExpenseDraft, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let description = self.description.trim();
        if description.is_empty() {
            errors.push(FormField::Description, "Description is required.");
        }

        let amount = parse_amount(&self.amount);
        if amount.is_none() {
            errors.push(FormField::Amount, "Amount must be a positive number.");
        }

        let date = NaiveDate::parse_from_str(self.date.trim(), DATE_FORMAT).ok();
        match date {
            None => errors.push(FormField::Date, "Date must be a valid date."),
            Some(date) if date > today => {
                errors.push(FormField::Date, "Date cannot be in the future.")
            }
            Some(_) => {}
        }

        let category = self.category.trim();
        if category.is_empty() {
            errors.push(FormField::Category, "Category is required.");
        }

        match (amount, date) {
            (Some(amount), Some(date)) if errors.is_empty() => Ok(ExpenseDraft {
                description: description.to_string(),
                amount,
                category: category.to_string(),
                date,
            }),
            _ => Err(errors),
        }
    }
}

fn parse_amount(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite() && *value > 0.0)
}
