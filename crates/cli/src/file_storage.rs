//! JSON file slot storage.
//!
//! The file holds one JSON object mapping slot keys to their string values,
//! so several slots can share a file:
//!
//! ```json
//! { "strivo_cart": "{\"version\":1,\"next_line_id\":2,\"lines\":[...]}" }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use strivo_core::{SlotStorage, StorageError};

/// Slot storage backed by a JSON file on disk.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every slot. A missing or blank file has no slots.
    fn read_slots(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e.into()),
        };
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&raw).map_err(|e| {
            StorageError::Backend(format!("{} is not a slot file: {e}", self.path.display()))
        })
    }

    /// Slots to start a write from. A corrupt file is replaced rather than
    /// blocking every later write.
    fn slots_for_write(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match self.read_slots() {
            Err(StorageError::Backend(reason)) => {
                tracing::warn!(%reason, "Overwriting unreadable slot file");
                Ok(BTreeMap::new())
            }
            other => other,
        }
    }

    /// Sibling temp file for this process, so concurrent writers never share one.
    fn temp_path(&self) -> PathBuf {
        self.path
            .with_extension(format!("json.{}.tmp", std::process::id()))
    }

    /// Write through a sibling temp file so a crash never leaves half a file.
    fn write_slots(&self, slots: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(slots)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.temp_path();
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl SlotStorage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read_slots()?.remove(key))
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut slots = self.slots_for_write()?;
        slots.insert(key.to_string(), value.to_string());
        self.write_slots(&slots)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let mut slots = self.slots_for_write()?;
        if slots.remove(key).is_some() {
            self.write_slots(&slots)?;
        }
        Ok(())
    }
}
