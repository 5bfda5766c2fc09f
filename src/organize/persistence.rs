use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde_yaml::Value;

use super::error::StoreError;
use super::types::{Category, Task, LAST_RESET_DAY_KEY};

/// String-keyed local storage. Every `set` replaces the whole value.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
    read_only: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `set` fail, the way a full disk would.
    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        if self.read_only {
            return Err(StoreError::Storage(format!("store is read-only, cannot write '{key}'")));
        }
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}

/// All keys kept as one YAML mapping in a single file.
#[derive(Debug, Clone)]
pub struct YamlFileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl YamlFileStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let entries = match std::fs::read_to_string(&path) {
            Ok(contents) if contents.trim().is_empty() => BTreeMap::new(),
            Ok(contents) => serde_yaml::from_str(&contents).map_err(|e| {
                StoreError::Storage(format!("failed to parse '{}': {e}", path.display()))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "data file not found, starting empty");
                BTreeMap::new()
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueStore for YamlFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        let mut entries = self.entries.clone();
        entries.insert(key.to_string(), value);
        let contents = serde_yaml::to_string(&entries)?;
        // Write beside the target and rename over it, so a crash never leaves a half-written file.
        let staging = self.path.with_extension("yaml.tmp");
        std::fs::write(&staging, contents)?;
        std::fs::rename(&staging, &self.path)?;
        self.entries = entries;
        Ok(())
    }
}

/// Category-level access to stored tasks, so the task store never sees raw keys.
pub trait TaskRepository {
    fn load(&self, category: Category) -> Vec<Task>;
    fn save(&mut self, category: Category, tasks: &[Task]) -> Result<(), StoreError>;
    fn last_reset_day(&self) -> Option<String>;
    fn set_last_reset_day(&mut self, code: &str) -> Result<(), StoreError>;
}

#[derive(Debug, Clone, Default)]
pub struct KvTaskRepository<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> KvTaskRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }
}

impl<S: KeyValueStore> TaskRepository for KvTaskRepository<S> {
    fn load(&self, category: Category) -> Vec<Task> {
        let key = category.storage_key();
        match self.store.get(&key) {
            Ok(Some(raw)) => decode_tasks(&key, &raw),
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "failed to read tasks, treating as empty");
                Vec::new()
            }
        }
    }

    fn save(&mut self, category: Category, tasks: &[Task]) -> Result<(), StoreError> {
        let key = category.storage_key();
        let raw = serde_yaml::to_string(tasks)?;
        self.store.set(&key, raw)
    }

    fn last_reset_day(&self) -> Option<String> {
        match self.store.get(LAST_RESET_DAY_KEY) {
            Ok(marker) => marker,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read last reset day");
                None
            }
        }
    }

    fn set_last_reset_day(&mut self, code: &str) -> Result<(), StoreError> {
        self.store.set(LAST_RESET_DAY_KEY, code.to_string())
    }
}

/// Decodes a stored collection, dropping every record that does not form a valid task.
pub fn decode_tasks(key: &str, raw: &str) -> Vec<Task> {
    let records = match serde_yaml::from_str::<Value>(raw) {
        Ok(Value::Sequence(records)) => records,
        Ok(Value::Null) => return Vec::new(),
        Ok(_) => {
            tracing::warn!(key = %key, "stored value is not a list of tasks, ignoring it");
            return Vec::new();
        }
        Err(e) => {
            tracing::warn!(key = %key, error = %e, "stored value is not valid yaml, ignoring it");
            return Vec::new();
        }
    };

    records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| match serde_yaml::from_value::<Task>(record) {
            Ok(task) => Some(task),
            Err(e) => {
                tracing::warn!(key = %key, index, error = %e, "dropping malformed task record");
                None
            }
        })
        .collect()
}
