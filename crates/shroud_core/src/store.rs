//! Durable key-value storage for the settings blob.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[cfg(feature = "tracing")]
use tracing::{debug, warn};

use crate::error::SettingsError;
use crate::fs_util::atomic_write;
use crate::settings::RedactionSettings;

/// Key under which the settings blob is stored.
pub const SETTINGS_KEY: &str = "redaction-settings";

/// A string-valued store addressed by key.
pub trait KeyValueStore {
    /// Returns the value stored under `key`, or `None` if nothing is stored.
    fn get(&self, key: &str) -> Result<Option<String>, SettingsError>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> Result<(), SettingsError>;

    /// Deletes the value under `key`. Deleting a missing key is not an error.
    fn remove(&mut self, key: &str) -> Result<(), SettingsError>;
}

/// In-memory store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, SettingsError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        self.entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), SettingsError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Directory-backed store holding one `<key>.json` file per key.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Creates a store rooted at `dir`. The directory is created on first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the store directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the file backing `key`.
    #[must_use]
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, SettingsError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(SettingsError::Read { path, source }),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        let path = self.path_for(key);
        atomic_write(&path, value).map_err(|source| SettingsError::Write { path, source })
    }

    fn remove(&mut self, key: &str) -> Result<(), SettingsError> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(SettingsError::Write { path, source }),
        }
    }
}

/// Loads and saves [`RedactionSettings`] through a [`KeyValueStore`].
#[derive(Debug, Clone, Default)]
pub struct SettingsStore<S> {
    store: S,
}

impl<S: KeyValueStore> SettingsStore<S> {
    /// Wraps a key-value store.
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns the underlying store.
    pub const fn inner(&self) -> &S {
        &self.store
    }

    /// Consumes the wrapper and returns the underlying store.
    pub fn into_inner(self) -> S {
        self.store
    }

    /// Reads the persisted settings merged over the defaults.
    ///
    /// Returns the defaults when nothing has been saved yet.
    pub fn try_load(&self) -> Result<RedactionSettings, SettingsError> {
        match self.store.get(SETTINGS_KEY)? {
            Some(blob) => RedactionSettings::from_json(&blob),
            None => Ok(RedactionSettings::default()),
        }
    }

    /// Reads the persisted settings, falling back to the defaults if the blob
    /// cannot be read or parsed.
    pub fn load(&self) -> RedactionSettings {
        match self.try_load() {
            Ok(settings) => settings,
            Err(_e) => {
                #[cfg(feature = "tracing")]
                warn!(error = %_e, "unreadable settings blob, using defaults");
                RedactionSettings::default()
            }
        }
    }

    /// Serialises and persists the complete settings record.
    pub fn save(&mut self, settings: &RedactionSettings) -> Result<(), SettingsError> {
        let blob = settings.to_json()?;
        self.store.set(SETTINGS_KEY, &blob)?;

        #[cfg(feature = "tracing")]
        debug!(bytes = blob.len(), "settings saved");

        Ok(())
    }

    /// Deletes the persisted blob so the next load returns the defaults.
    pub fn reset(&mut self) -> Result<(), SettingsError> {
        self.store.remove(SETTINGS_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{PatternEntry, RevealBehavior};

    fn customised() -> RedactionSettings {
        let mut settings = RedactionSettings {
            reveal_behavior: RevealBehavior::Click,
            block_style: true,
            ..RedactionSettings::default()
        };
        settings.add_custom_pattern("confidential");
        settings.add_exclude_term("example.com");
        settings
    }

    #[test]
    fn load_without_saved_blob_returns_defaults() {
        let store = SettingsStore::new(MemoryStore::new());
        assert_eq!(store.load(), RedactionSettings::default());
    }

    #[test]
    fn save_then_load_round_trips() {
        let mut store = SettingsStore::new(MemoryStore::new());
        store.save(&customised()).unwrap();
        assert_eq!(store.try_load().unwrap(), customised());
    }

    #[test]
    fn malformed_blob_falls_back_to_defaults() {
        let mut memory = MemoryStore::new();
        memory.set(SETTINGS_KEY, "{\"enabled\": tru").unwrap();
        let store = SettingsStore::new(memory);

        assert!(store.try_load().is_err());
        assert_eq!(store.load(), RedactionSettings::default());
    }

    #[test]
    fn partial_blob_is_merged_over_defaults() {
        let mut memory = MemoryStore::new();
        memory
            .set(SETTINGS_KEY, r#"{"version":1,"excludeTerms":["acme"]}"#)
            .unwrap();
        let settings = SettingsStore::new(memory).load();

        assert_eq!(settings.exclude_terms, vec!["acme"]);
        assert!(settings.auto_redact_pii);
    }

    #[test]
    fn legacy_blob_with_serialised_regex_keeps_user_settings() {
        let mut memory = MemoryStore::new();
        memory
            .set(
                SETTINGS_KEY,
                r#"{"customPatterns":["confidential",{}],"excludeTerms":["acme.com"],"blockStyle":true}"#,
            )
            .unwrap();
        let settings = SettingsStore::new(memory).load();

        assert_eq!(settings.custom_patterns, vec![PatternEntry::from("confidential")]);
        assert_eq!(settings.exclude_terms, vec!["acme.com"]);
        assert!(settings.block_style);
    }

    #[test]
    fn file_store_writes_one_json_file_per_key() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SettingsStore::new(FileStore::new(dir.path()));
        store.save(&customised()).unwrap();

        let path = store.inner().path_for(SETTINGS_KEY);
        assert!(path.ends_with("redaction-settings.json"));
        assert!(fs::read_to_string(&path).unwrap().contains("\"blockStyle\": true"));
        assert_eq!(store.load(), customised());
    }

    #[test]
    fn file_store_missing_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("absent"));
        assert_eq!(store.get(SETTINGS_KEY).unwrap(), None);
    }

    #[test]
    fn reset_removes_saved_blob() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SettingsStore::new(FileStore::new(dir.path()));
        store.save(&customised()).unwrap();

        store.reset().unwrap();
        store.reset().unwrap();
        assert_eq!(store.load(), RedactionSettings::default());
    }
}
