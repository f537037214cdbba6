//! JSON-backed settings store.
//!
//! Settings are held in memory and, when a path is configured, written
//! through to a JSON file after every change. The file is replaced by
//! rename so readers never observe a half-written document.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::error_handling::SettingsError;

use super::store::{DownloadErrorEntry, Setting, SettingsStore};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SettingsData {
    #[serde(default)]
    flags: BTreeMap<String, bool>,
    #[serde(default)]
    download_error_count: u32,
    #[serde(default)]
    download_error_log: Vec<DownloadErrorEntry>,
}

/// Settings store persisted as a JSON document.
#[derive(Debug, Default)]
pub struct JsonSettings {
    path: Option<PathBuf>,
    data: RwLock<SettingsData>,
}

impl JsonSettings {
    /// Settings that live only as long as this value.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Opens a settings file, starting empty if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SettingsError> {
        let path = path.into();
        let data = match std::fs::read_to_string(&path) {
            Ok(content) => {
                serde_json::from_str(&content).map_err(|source| SettingsError::Parse {
                    path: path.clone(),
                    source,
                })?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("Settings file {} not found, starting empty", path.display());
                SettingsData::default()
            }
            Err(source) => return Err(SettingsError::Io { path, source }),
        };

        Ok(Self {
            path: Some(path),
            data: RwLock::new(data),
        })
    }

    /// Backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn read<T>(&self, f: impl FnOnce(&SettingsData) -> T) -> Result<T, SettingsError> {
        let data = self.data.read().map_err(|_| SettingsError::LockPoisoned)?;
        Ok(f(&data))
    }

    fn update<T>(&self, f: impl FnOnce(&mut SettingsData) -> T) -> Result<T, SettingsError> {
        let mut data = self.data.write().map_err(|_| SettingsError::LockPoisoned)?;
        let result = f(&mut data);
        if let Some(path) = &self.path {
            persist(path, &data)?;
        }
        Ok(result)
    }
}

fn persist(path: &Path, data: &SettingsData) -> Result<(), SettingsError> {
    let io_error = |source| SettingsError::Io {
        path: path.to_path_buf(),
        source,
    };

    let content = serde_json::to_string_pretty(data).map_err(|source| SettingsError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(io_error)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(io_error)?;
    tmp.write_all(content.as_bytes()).map_err(io_error)?;
    tmp.persist(path).map_err(|e| io_error(e.error))?;
    Ok(())
}

impl SettingsStore for JsonSettings {
    fn get_flag(&self, setting: Setting) -> Result<Option<bool>, SettingsError> {
        let key = setting.key();
        self.read(|data| data.flags.get(&key).copied())
    }

    fn set_flag(&self, setting: Setting, value: bool) -> Result<(), SettingsError> {
        let key = setting.key();
        self.update(|data| {
            data.flags.insert(key, value);
        })
    }

    fn download_error_count(&self) -> Result<u32, SettingsError> {
        self.read(|data| data.download_error_count)
    }

    fn download_error_log(&self) -> Result<Vec<DownloadErrorEntry>, SettingsError> {
        self.read(|data| data.download_error_log.clone())
    }

    fn record_download_error(&self, entry: DownloadErrorEntry) -> Result<u32, SettingsError> {
        self.update(|data| {
            data.download_error_count = data.download_error_count.saturating_add(1);
            data.download_error_log.push(entry);
            data.download_error_count
        })
    }

    fn reset_download_errors(&self) -> Result<(), SettingsError> {
        self.update(|data| {
            data.download_error_count = 0;
            data.download_error_log.clear();
        })
    }
}
