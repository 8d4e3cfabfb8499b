pub mod json_backend;
pub mod memory;

use crate::errors::StoreResult;

/// Key under which the expense list is persisted unless configured otherwise.
pub const DEFAULT_SLOT_KEY: &str = "expenses";

/// Abstraction over a durable key-value store holding whole-value text slots.
///
/// Writes overwrite the entire slot; there are no partial updates.
pub trait KeyValueStore: Send + Sync {
    /// Returns the slot contents, or `None` when the key has never been written.
    fn get(&self, key: &str) -> StoreResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;
}

pub use json_backend::JsonFileStore;
pub use memory::MemoryStore;
