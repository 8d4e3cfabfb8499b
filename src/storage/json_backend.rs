use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use crate::errors::{StoreError, StoreResult};
use crate::utils::persistence::replace_file;

use super::KeyValueStore;

const SLOT_EXTENSION: &str = "json";

/// Filesystem-backed slots: each key lives in `<root>/<key>.json`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    pub fn new(root: PathBuf) -> StoreResult<Self> {
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn slot_path(&self, key: &str) -> PathBuf {
        self.root
            .join(format!("{}.{}", canonical_key(key), SLOT_EXTENSION))
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        match fs::read_to_string(self.slot_path(key)) {
            Ok(data) => Ok(Some(data)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        if canonical_key(key).is_empty() {
            return Err(StoreError::Storage(format!("invalid slot key `{}`", key)));
        }
        replace_file(&self.slot_path(key), value)?;
        Ok(())
    }
}

fn canonical_key(key: &str) -> String {
    key.trim()
        .chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' => c,
            _ => '_',
        })
        .collect()
}
