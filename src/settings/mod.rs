//! Persistent key-value settings.
//!
//! The engine persists exactly one value (the global disable flag), but the
//! store is a general boolean key-value capability so hosts can plug in
//! whatever backs their preferences.

mod error;

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

pub use error::SettingsError;

/// Directory name used under the platform config directory.
pub const APP_DIR_NAME: &str = "soundpool";

/// File name of the JSON settings file.
pub const SETTINGS_FILE_NAME: &str = "settings.json";

/// Boolean key-value storage.
pub trait SettingsStore: Send + Sync {
    /// Reads a value. `Ok(None)` means the key was never written.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be read.
    fn get_bool(&self, key: &str) -> Result<Option<bool>, SettingsError>;

    /// Writes a value immediately.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn set_bool(&self, key: &str, value: bool) -> Result<(), SettingsError>;
}

/// In-memory store, lost on drop.
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    values: Mutex<HashMap<String, bool>>,
}

impl MemorySettingsStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with one value.
    #[must_use]
    pub fn with_value(key: impl Into<String>, value: bool) -> Self {
        let store = Self::new();
        store.values.lock().insert(key.into(), value);
        store
    }
}

impl SettingsStore for MemorySettingsStore {
    fn get_bool(&self, key: &str) -> Result<Option<bool>, SettingsError> {
        Ok(self.values.lock().get(key).copied())
    }

    fn set_bool(&self, key: &str, value: bool) -> Result<(), SettingsError> {
        self.values.lock().insert(key.to_string(), value);
        Ok(())
    }
}

/// Store backed by a flat JSON object on disk.
///
/// Every write re-reads the file, updates one key and writes it back, so
/// keys written by other processes are preserved.
#[derive(Debug)]
pub struct JsonFileSettingsStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process
    write_lock: Mutex<()>,
}

impl JsonFileSettingsStore {
    /// Store at an explicit path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Store at `<config dir>/soundpool/settings.json`.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::ConfigDirNotFound` if the platform has no
    /// config directory.
    pub fn default_location() -> Result<Self, SettingsError> {
        Ok(Self::new(default_settings_path()?))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, serde_json::Value>, SettingsError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(contents) => serde_json::from_str(&contents).map_err(SettingsError::Parse),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(SettingsError::Read(e)),
        }
    }
}

impl SettingsStore for JsonFileSettingsStore {
    fn get_bool(&self, key: &str) -> Result<Option<bool>, SettingsError> {
        let values = self.read_all()?;
        Ok(values.get(key).and_then(serde_json::Value::as_bool))
    }

    fn set_bool(&self, key: &str, value: bool) -> Result<(), SettingsError> {
        let _guard = self.write_lock.lock();
        let mut values = self.read_all()?;
        values.insert(key.to_string(), serde_json::Value::Bool(value));

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(SettingsError::DirectoryCreation)?;
        }
        let json = serde_json::to_string_pretty(&values).map_err(SettingsError::Serialize)?;
        fs::write(&self.path, json).map_err(SettingsError::Write)?;

        tracing::debug!("Setting {} = {} written to {:?}", key, value, self.path);
        Ok(())
    }
}

/// Returns `<config dir>/soundpool/settings.json`.
///
/// # Errors
///
/// Returns `SettingsError::ConfigDirNotFound` if the platform has no config
/// directory.
pub fn default_settings_path() -> Result<PathBuf, SettingsError> {
    let config_dir = dirs::config_dir().ok_or(SettingsError::ConfigDirNotFound)?;
    Ok(config_dir.join(APP_DIR_NAME).join(SETTINGS_FILE_NAME))
}
