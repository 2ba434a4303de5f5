//! Persistence for the two entity lists.
//!
//! Each list lives in its own string-keyed slot and is always written whole.
//! Loading never fails: a missing, unreadable or malformed slot comes back as
//! an empty list.

use crate::error::{Result, TrackerError};
use crate::schema::{Commission, Installment, StoredData};
use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

pub const COMMISSIONS_KEY: &str = "comissio_commissions";
pub const INSTALLMENTS_KEY: &str = "comissio_installments";

const SLOT_EXTENSION: &str = "json";
const TMP_SUFFIX: &str = "tmp";

/// A flat string-keyed slot store.
pub trait KeyValueStore {
    /// `Ok(None)` when nothing has been written under `key`.
    fn read(&self, key: &str) -> Result<Option<String>>;
    fn write(&self, key: &str, value: &str) -> Result<()>;
}

/// One `<key>.json` file per slot inside a directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn slot_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", canonical_key(key), SLOT_EXTENSION))
    }
}

impl KeyValueStore for JsonFileStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.slot_path(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        let path = self.slot_path(key);
        let tmp = tmp_path(&path);
        write_atomic(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

/// Process-local slots, for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let slots = self
            .slots
            .read()
            .map_err(|_| TrackerError::Storage("memory store lock poisoned".to_string()))?;
        Ok(slots.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        let mut slots = self
            .slots
            .write()
            .map_err(|_| TrackerError::Storage("memory store lock poisoned".to_string()))?;
        slots.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn read(&self, key: &str) -> Result<Option<String>> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        (**self).write(key, value)
    }
}

pub fn load_commissions(store: &impl KeyValueStore) -> Vec<Commission> {
    load_slot(store, COMMISSIONS_KEY, Commission::integrity_problem)
}

pub fn load_installments(store: &impl KeyValueStore) -> Vec<Installment> {
    load_slot(store, INSTALLMENTS_KEY, Installment::integrity_problem)
}

pub fn save_commissions(store: &impl KeyValueStore, commissions: &[Commission]) -> Result<()> {
    save_slot(store, COMMISSIONS_KEY, commissions)
}

pub fn save_installments(store: &impl KeyValueStore, installments: &[Installment]) -> Result<()> {
    save_slot(store, INSTALLMENTS_KEY, installments)
}

/// JSON Schema covering both slots.
pub fn stored_schema() -> Result<String> {
    Ok(StoredData::schema_as_json()?)
}

fn load_slot<T, F>(store: &impl KeyValueStore, key: &str, integrity_problem: F) -> Vec<T>
where
    T: DeserializeOwned,
    F: Fn(&T) -> Option<String>,
{
    let raw = match store.read(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            debug!("Slot '{}' is empty; starting with no records", key);
            return Vec::new();
        }
        Err(e) => {
            warn!("Could not read slot '{}': {}; starting empty", key, e);
            return Vec::new();
        }
    };

    let records: Vec<T> = match serde_json::from_str(&raw) {
        Ok(records) => records,
        Err(e) => {
            warn!("Slot '{}' does not match the stored schema: {}; starting empty", key, e);
            return Vec::new();
        }
    };

    if let Some(problem) = records.iter().find_map(integrity_problem) {
        warn!("Slot '{}' failed integrity check: {}; starting empty", key, problem);
        return Vec::new();
    }

    info!("Loaded {} records from slot '{}'", records.len(), key);
    records
}

fn save_slot<T: Serialize>(store: &impl KeyValueStore, key: &str, records: &[T]) -> Result<()> {
    let json = serde_json::to_string_pretty(records)?;
    store.write(key, &json)?;
    debug!("Saved {} records to slot '{}'", records.len(), key);
    Ok(())
}

fn canonical_key(key: &str) -> String {
    let sanitized: String = key
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' | '-' => c,
            _ => '_',
        })
        .collect();
    if sanitized.trim_matches('_').is_empty() {
        "slot".into()
    } else {
        sanitized
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}
