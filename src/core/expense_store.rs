//! The expense store: canonical list, editing pointer, and slot persistence.

use std::collections::HashSet;

use serde_json::Value;
use uuid::Uuid;

use crate::config::Config;
use crate::core::time::Clock;
use crate::core::validation::{ExpenseForm, ValidationErrors};
use crate::domain::{Expense, ExpenseDraft, Identifiable};
use crate::errors::{StoreError, StoreResult};
use crate::storage::{JsonFileStore, KeyValueStore, DEFAULT_SLOT_KEY};

/// Which operation a successful form submission performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    Added(Uuid),
    Updated(Uuid),
    /// The expense being edited was deleted before the form was submitted.
    Missing(Uuid),
}

/// Owns the expense list and writes the whole list back to its slot after
/// every mutation.
pub struct ExpenseStore {
    expenses: Vec<Expense>,
    editing: Option<Expense>,
    slot_key: String,
    storage: Box<dyn KeyValueStore>,
}

impl ExpenseStore {
    /// Opens the store on the default `expenses` slot.
    pub fn open(storage: Box<dyn KeyValueStore>) -> Self {
        Self::open_slot(storage, DEFAULT_SLOT_KEY)
    }

    /// Opens the store on `slot_key`, starting empty when the slot is missing or unreadable.
    pub fn open_slot(storage: Box<dyn KeyValueStore>, slot_key: impl Into<String>) -> Self {
        let slot_key = slot_key.into();
        let expenses = load_slot(storage.as_ref(), &slot_key);
        tracing::info!(slot = %slot_key, count = expenses.len(), "expense store opened");
        Self {
            expenses,
            editing: None,
            slot_key,
            storage,
        }
    }

    /// Opens a file-backed store in the data directory resolved from `config`.
    pub fn open_with_config(config: &Config) -> StoreResult<Self> {
        let storage = JsonFileStore::new(config.resolve_data_dir())?;
        Ok(Self::open_slot(Box::new(storage), config.slot_key.clone()))
    }

    pub fn storage(&self) -> &dyn KeyValueStore {
        self.storage.as_ref()
    }

    pub fn slot_key(&self) -> &str {
        &self.slot_key
    }

    /// Expenses in store order: newest addition first.
    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    pub fn get(&self, id: Uuid) -> Option<&Expense> {
        self.expenses.iter().find(|expense| expense.id == id)
    }

    pub fn len(&self) -> usize {
        self.expenses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expenses.is_empty()
    }

    /// The expense currently loaded for modification, if any.
    pub fn editing(&self) -> Option<&Expense> {
        self.editing.as_ref()
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    /// Prepends a new expense with a fresh identifier and returns that identifier.
    ///
    /// Non-finite amounts are rejected because they cannot be stored as JSON numbers.
    pub fn add(&mut self, draft: ExpenseDraft) -> StoreResult<Uuid> {
        ensure_finite(draft.amount)?;
        Ok(self.insert(draft))
    }

    /// Replaces the expense sharing `expense.id` in place and leaves edit mode.
    ///
    /// Returns `false` when no expense has that id; the list is left unchanged.
    /// A non-finite amount is rejected before anything changes.
    pub fn update(&mut self, expense: Expense) -> StoreResult<bool> {
        ensure_finite(expense.amount)?;
        Ok(self.replace(expense))
    }

    fn insert(&mut self, draft: ExpenseDraft) -> Uuid {
        let mut id = Uuid::new_v4();
        while self.get(id).is_some() {
            id = Uuid::new_v4();
        }
        self.expenses.insert(0, Expense::with_id(id, draft));
        tracing::debug!(%id, "expense added");
        self.sync();
        id
    }

    fn replace(&mut self, expense: Expense) -> bool {
        let id = expense.id;
        let replaced = match self.expenses.iter_mut().find(|existing| existing.id == id) {
            Some(slot) => {
                *slot = expense;
                true
            }
            None => false,
        };
        if replaced {
            tracing::debug!(%id, "expense updated");
        } else {
            tracing::debug!(%id, "update ignored: unknown expense");
        }
        self.editing = None;
        self.sync();
        replaced
    }

    /// Removes the expense with `id`, returning it. Repeated calls are no-ops.
    pub fn delete(&mut self, id: Uuid) -> Option<Expense> {
        let removed = self
            .expenses
            .iter()
            .position(|expense| expense.id == id)
            .map(|index| self.expenses.remove(index));
        if removed.is_some() {
            tracing::debug!(%id, "expense deleted");
        } else {
            tracing::debug!(%id, "delete ignored: unknown expense");
        }
        self.sync();
        removed
    }

    /// Loads a copy of `expense` as the edit target, replacing any previous one.
    pub fn select_for_edit(&mut self, expense: &Expense) {
        self.editing = Some(expense.clone());
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Validates `form` against `clock`'s date and either updates the edit target
    /// or adds a new expense.
    ///
    /// On validation failure nothing changes and the per-field errors are returned.
    pub fn submit(
        &mut self,
        form: &ExpenseForm,
        clock: &dyn Clock,
    ) -> Result<Submission, ValidationErrors> {
        // Validated drafts always carry a finite, positive amount.
        let draft = form.validate(clock.today())?;
        let submission = match self.editing.as_ref().map(|target| target.id) {
            Some(id) => {
                if self.replace(Expense::with_id(id, draft)) {
                    Submission::Updated(id)
                } else {
                    Submission::Missing(id)
                }
            }
            None => Submission::Added(self.insert(draft)),
        };
        Ok(submission)
    }

    /// Serializes the full list and overwrites the slot.
    pub fn persist(&self) -> StoreResult<()> {
        let json = serde_json::to_string(&self.expenses)?;
        self.storage.set(&self.slot_key, &json)
    }

    fn sync(&self) {
        if let Err(err) = self.persist() {
            tracing::error!(slot = %self.slot_key, error = %err, "failed to persist expenses");
        }
    }
}

fn ensure_finite(amount: f64) -> StoreResult<()> {
    if amount.is_finite() {
        Ok(())
    } else {
        Err(StoreError::InvalidAmount(amount))
    }
}

fn load_slot(storage: &dyn KeyValueStore, key: &str) -> Vec<Expense> {
    let raw = match storage.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(err) => {
            tracing::warn!(slot = %key, error = %err, "failed to read expenses; starting empty");
            return Vec::new();
        }
    };
    let records = match serde_json::from_str::<Vec<Value>>(&raw) {
        Ok(records) => records,
        Err(err) => {
            tracing::warn!(slot = %key, error = %err, "failed to parse expenses; starting empty");
            return Vec::new();
        }
    };
    let mut expenses = Vec::with_capacity(records.len());
    for (index, record) in records.into_iter().enumerate() {
        match serde_json::from_value::<Expense>(record) {
            Ok(expense) => expenses.push(expense),
            Err(err) => tracing::warn!(
                slot = %key,
                index,
                error = %err,
                "skipping malformed expense record"
            ),
        }
    }
    dedupe_ids(expenses)
}

/// Keeps the first record for each id so loaded state honours id uniqueness.
fn dedupe_ids(expenses: Vec<Expense>) -> Vec<Expense> {
    let mut seen = HashSet::new();
    let mut unique = Vec::with_capacity(expenses.len());
    for expense in expenses {
        if seen.insert(expense.id()) {
            unique.push(expense);
        } else {
            tracing::warn!(id = %expense.id, "dropping expense with duplicate id");
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::time::FixedClock;
    use crate::storage::MemoryStore;
    use chrono::NaiveDate;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn store_with_handle() -> (ExpenseStore, MemoryStore) {
        let slots = MemoryStore::new();
        let store = ExpenseStore::open(Box::new(slots.clone()));
        (store, slots)
    }

    fn stored(slots: &MemoryStore) -> Vec<Expense> {
        let raw = slots
            .get(DEFAULT_SLOT_KEY)
            .unwrap()
            .expect("slot written");
        serde_json::from_str(&raw).unwrap()
    }

    #[test]
    fn add_prepends_and_persists() {
        let (mut store, slots) = store_with_handle();
        let lunch = store
            .add(ExpenseDraft::new("Lunch", 10.0, "Food", date(1)))
            .expect("add expense");
        let bus = store
            .add(ExpenseDraft::new("Bus", 5.0, "Transport", date(2)))
            .expect("add expense");

        let ids: Vec<_> = store.expenses().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![bus, lunch]);
        assert_eq!(stored(&slots), store.expenses());
    }

    #[test]
    fn update_keeps_position_and_clears_editing() {
        let (mut store, slots) = store_with_handle();
        let first = store
            .add(ExpenseDraft::new("Lunch", 10.0, "Food", date(1)))
            .expect("add expense");
        store.add(ExpenseDraft::new("Bus", 5.0, "Transport", date(2))).expect("add expense");

        let target = store.get(first).cloned().unwrap();
        store.select_for_edit(&target);
        assert!(store.is_editing());

        let mut changed = target.clone();
        changed.amount = 12.0;
        assert!(store.update(changed).expect("finite amount"));
        assert!(store.editing().is_none());
        assert_eq!(store.expenses()[1].id, first);
        assert_eq!(store.expenses()[1].amount, 12.0);
        assert_eq!(stored(&slots)[1].amount, 12.0);
    }

    #[test]
    fn update_of_unknown_id_leaves_list_unchanged() {
        let (mut store, _slots) = store_with_handle();
        store.add(ExpenseDraft::new("Lunch", 10.0, "Food", date(1))).expect("add expense");
        let before = store.expenses().to_vec();

        let stranger = Expense::from_draft(ExpenseDraft::new("Ghost", 1.0, "Other", date(1)));
        assert!(!store.update(stranger).expect("finite amount"));
        assert_eq!(store.expenses(), before.as_slice());
    }

    #[test]
    fn add_and_delete_leave_editing_pointer_alone() {
        let (mut store, _slots) = store_with_handle();
        let keep = store
            .add(ExpenseDraft::new("Lunch", 10.0, "Food", date(1)))
            .expect("add expense");
        let removed_id = store
            .add(ExpenseDraft::new("Bus", 5.0, "Transport", date(2)))
            .expect("add expense");
        let target = store.get(keep).cloned().unwrap();
        store.select_for_edit(&target);

        store.add(ExpenseDraft::new("Rent", 500.0, "Rent", date(3))).expect("add expense");
        assert!(store.delete(removed_id).is_some());
        assert_eq!(store.editing().map(|e| e.id), Some(keep));
    }

    #[test]
    fn delete_is_idempotent() {
        let (mut store, _slots) = store_with_handle();
        let id = store.add(ExpenseDraft::new("Lunch", 10.0, "Food", date(1))).expect("add expense");
        assert!(store.delete(id).is_some());
        assert!(store.delete(id).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn unparseable_slot_starts_empty() {
        let slots = MemoryStore::with_slot(DEFAULT_SLOT_KEY, "{not json");
        let store = ExpenseStore::open(Box::new(slots));
        assert!(store.is_empty());
    }

    #[test]
    fn duplicate_ids_in_slot_are_dropped_on_load() {
        let original = Expense::from_draft(ExpenseDraft::new("Lunch", 10.0, "Food", date(1)));
        let mut copy = original.clone();
        copy.description = "Copy".into();
        let raw = serde_json::to_string(&vec![original.clone(), copy]).unwrap();

        let store = ExpenseStore::open(Box::new(MemoryStore::with_slot(DEFAULT_SLOT_KEY, raw)));
        assert_eq!(store.expenses(), &[original]);
    }

    #[test]
    fn failed_writes_do_not_roll_back_memory() {
        let (mut store, slots) = store_with_handle();
        slots.set_reject_writes(true);
        store.add(ExpenseDraft::new("Lunch", 10.0, "Food", date(1))).expect("add expense");
        assert_eq!(store.len(), 1);
        assert!(store.persist().is_err());
        assert!(slots.get(DEFAULT_SLOT_KEY).unwrap().is_none());
    }

    #[test]
    fn submit_adds_when_idle_and_updates_when_editing() {
        let (mut store, _slots) = store_with_handle();
        let clock = FixedClock::new(date(10));
        let form = ExpenseForm {
            description: "Lunch".into(),
            amount: "10".into(),
            category: "Food".into(),
            date: "2024-01-05".into(),
        };
        let Submission::Added(id) = store.submit(&form, &clock).unwrap() else {
            panic!("expected an add");
        };

        let target = store.get(id).cloned().unwrap();
        store.select_for_edit(&target);
        let mut edit = ExpenseForm::from_expense(&target);
        edit.amount = "11".into();
        assert_eq!(store.submit(&edit, &clock).unwrap(), Submission::Updated(id));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(id).map(|e| e.amount), Some(11.0));
        assert!(!store.is_editing());
    }

    #[test]
    fn invalid_submit_changes_nothing() {
        let (mut store, slots) = store_with_handle();
        let errors = store
            .submit(&ExpenseForm::blank(date(10)), &FixedClock::new(date(10)))
            .expect_err("blank form must fail");
        assert!(!errors.is_empty());
        assert!(store.is_empty());
        assert!(slots.get(DEFAULT_SLOT_KEY).unwrap().is_none());
    }

    #[test]
    fn submit_reports_missing_edit_target() {
        let (mut store, _slots) = store_with_handle();
        let id = store.add(ExpenseDraft::new("Lunch", 10.0, "Food", date(1))).expect("add expense");
        let target = store.get(id).cloned().unwrap();
        store.select_for_edit(&target);
        store.delete(id);

        let form = ExpenseForm::from_expense(&target);
        let clock = FixedClock::new(date(10));
        assert_eq!(store.submit(&form, &clock).unwrap(), Submission::Missing(id));
        assert!(store.is_empty());
        assert!(!store.is_editing());
    }

    #[test]
    fn non_finite_amounts_are_rejected_before_any_change() {
        let (mut store, slots) = store_with_handle();
        let id = store
            .add(ExpenseDraft::new("Lunch", 10.0, "Food", date(1)))
            .expect("add expense");
        let before = stored(&slots);

        let err = store
            .add(ExpenseDraft::new("Bad", f64::NAN, "Food", date(2)))
            .expect_err("NaN must be rejected");
        assert!(matches!(err, StoreError::InvalidAmount(amount) if amount.is_nan()));

        let mut edited = store.get(id).cloned().unwrap();
        edited.amount = f64::INFINITY;
        store.select_for_edit(&edited);
        assert!(store.update(edited).is_err());

        assert!(store.is_editing());
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(id).map(|e| e.amount), Some(10.0));
        assert_eq!(stored(&slots), before);
    }

    #[test]
    fn malformed_records_are_skipped_on_load() {
        let good = Expense::from_draft(ExpenseDraft::new("Lunch", 10.0, "Food", date(1)));
        let mut raw: Vec<serde_json::Value> = vec![serde_json::to_value(&good).unwrap()];
        let mut broken = raw[0].clone();
        broken["id"] = serde_json::json!(Uuid::new_v4());
        broken["amount"] = serde_json::Value::Null;
        raw.insert(0, broken);
        raw.push(serde_json::json!({"description": "no id"}));

        let slots = MemoryStore::with_slot(DEFAULT_SLOT_KEY, serde_json::to_string(&raw).unwrap());
        let mut store = ExpenseStore::open(Box::new(slots.clone()));
        assert_eq!(store.expenses(), &[good.clone()]);

        store
            .add(ExpenseDraft::new("Bus", 5.0, "Transport", date(2)))
            .expect("add expense");
        assert_eq!(stored(&slots).len(), 2);
        assert_eq!(stored(&slots)[1], good);
    }

    #[test]
    fn reselecting_switches_the_edit_target() {
        let (mut store, _slots) = store_with_handle();
        let lunch = store
            .add(ExpenseDraft::new("Lunch", 10.0, "Food", date(1)))
            .expect("add expense");
        let bus = store
            .add(ExpenseDraft::new("Bus", 5.0, "Transport", date(2)))
            .expect("add expense");
        let lunch_before = store.get(lunch).cloned().unwrap();
        let bus_before = store.get(bus).cloned().unwrap();

        store.select_for_edit(&lunch_before);
        store.select_for_edit(&bus_before);
        assert_eq!(store.editing().map(|e| e.id), Some(bus));

        let mut form = ExpenseForm::from_expense(&bus_before);
        form.description = "Night bus".into();
        let clock = FixedClock::new(date(10));
        assert_eq!(store.submit(&form, &clock).unwrap(), Submission::Updated(bus));

        assert_eq!(store.len(), 2);
        assert_eq!(store.get(bus).map(|e| e.description.as_str()), Some("Night bus"));
        assert_eq!(store.get(lunch), Some(&lunch_before));
        assert!(!store.is_editing());
    }
}
