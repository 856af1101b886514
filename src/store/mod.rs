//! Settings Store
//!
//! Layers locally tracked typed overrides (integers and strings keyed by
//! name) over the opaque state dictionary owned by a collaborating
//! subsystem. On save the two sources are merged, with overrides winning,
//! canonically encoded and atomically written. On load the decoded tree is
//! handed back to the subsystem and registered override keys are restored
//! into the typed maps.
//!
//! Not safe for concurrent use; the caller serializes access.

pub mod persistence;

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::codec::value::{Dict, Value};
use crate::codec::{decode, encode};
use crate::error::StoreError;
use crate::store::persistence::{backup_path, load_file, save_file};

/// Producer and consumer of the opaque state tree.
///
/// The owning subsystem recomputes its full state dictionary from scratch on
/// every `produce_state` call; locally tracked overrides survive because the
/// store re-applies them on top during every save.
pub trait StateProvider {
    /// Current opaque state as a dictionary. Infallible: internal errors are
    /// represented inside the tree, e.g. by omitting the affected keys.
    fn produce_state(&self) -> Dict;

    /// Accept a previously saved state dictionary. Unknown and missing keys
    /// must be tolerated; unrecognized values are ignored.
    fn consume_state(&mut self, state: &Dict);
}

/// Persistent settings store bound to one file and one state provider.
///
/// The provider is injected at construction; the store never reaches for
/// process-wide state.
pub struct SettingsStore<P> {
    provider: P,
    path: PathBuf,
    ints: HashMap<String, i64>,
    strings: HashMap<String, String>,
    registered_ints: BTreeSet<String>,
    registered_strings: BTreeSet<String>,
}

impl<P: StateProvider> SettingsStore<P> {
    pub fn new(path: impl Into<PathBuf>, provider: P) -> Self {
        Self {
            provider,
            path: path.into(),
            ints: HashMap::new(),
            strings: HashMap::new(),
            registered_ints: BTreeSet::new(),
            registered_strings: BTreeSet::new(),
        }
    }

    /// Path of the settings file this store reads and writes.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn provider_mut(&mut self) -> &mut P {
        &mut self.provider
    }

    /// Set an integer override. A value of `0` removes the key; absent keys
    /// read back as `0`.
    pub fn set_int(&mut self, key: &str, value: i64) {
        self.registered_ints.insert(key.to_string());
        if value == 0 {
            self.ints.remove(key);
        } else {
            self.ints.insert(key.to_string(), value);
        }
    }

    /// Set a string override. An empty value removes the key; absent keys
    /// read back as `""`.
    pub fn set_str(&mut self, key: &str, value: impl Into<String>) {
        self.registered_strings.insert(key.to_string());
        let value = value.into();
        if value.is_empty() {
            self.strings.remove(key);
        } else {
            self.strings.insert(key.to_string(), value);
        }
    }

    pub fn get_int(&self, key: &str) -> i64 {
        self.ints.get(key).copied().unwrap_or(0)
    }

    pub fn get_str(&self, key: &str) -> &str {
        self.strings.get(key).map(String::as_str).unwrap_or("")
    }

    /// Declare an integer key eligible for restore on `load` without giving
    /// it a value. Lets a fresh process recover overrides it has not set in
    /// its own lifetime.
    pub fn register_int_key(&mut self, key: &str) {
        self.registered_ints.insert(key.to_string());
    }

    /// Declare a string key eligible for restore on `load`.
    pub fn register_str_key(&mut self, key: &str) {
        self.registered_strings.insert(key.to_string());
    }

    /// Merge overrides into the provider's current state, encode, and write
    /// atomically. Overrides win over identically named opaque keys. Always
    /// writes; settings are small and saved rarely, so there is no dirty
    /// tracking.
    pub fn save(&self) -> Result<(), StoreError> {
        let mut root = self.provider.produce_state();

        for (key, value) in &self.ints {
            root.insert(key.as_bytes().to_vec(), Value::Integer(*value));
        }
        for (key, value) in &self.strings {
            root.insert(key.as_bytes().to_vec(), Value::from(value.as_str()));
        }

        let encoded = encode(&Value::Dict(root));
        save_file(&self.path, &encoded)?;
        debug!(
            path = %self.path.display(),
            bytes = encoded.len(),
            "settings saved"
        );
        Ok(())
    }

    /// Read and decode the settings file, falling back to the backup when
    /// the primary is missing, unreadable, or malformed. The decoded
    /// dictionary goes to the provider, then registered override keys with
    /// matching tags are restored into the typed maps. In-memory state is
    /// untouched unless a full decode succeeds.
    pub fn load(&mut self) -> Result<(), StoreError> {
        let dict = match Self::read_and_decode(&self.path) {
            Ok(dict) => dict,
            Err(primary) => {
                let backup = backup_path(&self.path);
                match Self::read_and_decode(&backup) {
                    Ok(dict) => {
                        warn!(
                            path = %self.path.display(),
                            backup = %backup.display(),
                            error = %primary,
                            "recovered settings from backup"
                        );
                        dict
                    }
                    Err(_) => return Err(primary),
                }
            }
        };

        let restored_ints: Vec<(String, i64)> = self
            .registered_ints
            .iter()
            .filter_map(|key| {
                dict.get(key.as_bytes())
                    .and_then(Value::as_int)
                    .map(|value| (key.clone(), value))
            })
            .collect();

        // Tag mismatches and non-UTF-8 byte strings are skipped, not fatal
        let restored_strings: Vec<(String, String)> = self
            .registered_strings
            .iter()
            .filter_map(|key| {
                dict.get(key.as_bytes())
                    .and_then(Value::as_str)
                    .map(|value| (key.clone(), value.to_string()))
            })
            .collect();

        self.provider.consume_state(&dict);

        // Route through the setters so the deletion rule also applies to
        // zero and empty values coming off disk
        for (key, value) in &restored_ints {
            self.set_int(key, *value);
        }
        for (key, value) in &restored_strings {
            self.set_str(key, value.as_str());
        }

        debug!(
            path = %self.path.display(),
            restored_ints = restored_ints.len(),
            restored_strings = restored_strings.len(),
            "settings loaded"
        );
        Ok(())
    }

    fn read_and_decode(path: &Path) -> Result<Dict, StoreError> {
        let bytes = load_file(path)?;
        let value = decode(&bytes).map_err(|source| StoreError::Malformed {
            path: path.to_path_buf(),
            source,
        })?;
        match value {
            Value::Dict(dict) => Ok(dict),
            _ => Err(StoreError::NotADictionary {
                path: path.to_path_buf(),
            }),
        }
    }
}
