//! Durable storage for the serialized application state
//!
//! The whole [`AppState`] is one named JSON blob. It is read once at startup
//! and overwritten after every mutation.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::store::AppState;

/// Current on-disk record version
pub const RECORD_VERSION: u32 = 1;

/// Backend holding the serialized state blob
#[cfg_attr(test, mockall::automock)]
pub trait Storage: Send + Sync {
    /// Read the stored blob, `None` if nothing was stored yet
    fn load(&self) -> Result<Option<String>>;

    /// Overwrite the stored blob
    fn save(&self, blob: &str) -> Result<()>;

    /// Move an unreadable blob aside so the next save cannot destroy it
    ///
    /// Returns where the copy now lives, `None` if there was nothing to move.
    fn quarantine(&self) -> Result<Option<String>>;

    /// Where the blob lives, for status output
    fn describe(&self) -> String;
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedRecord {
    state: AppState,
    #[serde(default)]
    version: u32,
}

/// Serialize the state into the stored record format
pub fn encode(state: &AppState) -> Result<String> {
    let record = PersistedRecord {
        state: state.clone(),
        version: RECORD_VERSION,
    };
    serde_json::to_string_pretty(&record).context("Failed to serialize application state")
}

/// Parse a stored record back into state
pub fn decode(blob: &str) -> Result<AppState> {
    let record: PersistedRecord =
        serde_json::from_str(blob).context("Failed to parse stored application state")?;
    Ok(record.state)
}

/// JSON file on local disk
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File location from config: explicit path, else `<data dir>/<key>.json`
    pub fn from_config(config: &crate::config::Config) -> Result<Self> {
        let path = match &config.storage.path {
            Some(path) => path.clone(),
            None => crate::config::data_dir()?.join(format!("{}.json", config.storage.key)),
        };
        Ok(Self::new(path))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Where an unreadable blob is kept: `<file>.corrupt` next to it
    pub fn quarantine_path(&self) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(".corrupt");
        PathBuf::from(name)
    }
}

impl Storage for FileStorage {
    fn load(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        Ok(Some(contents))
    }

    fn save(&self, blob: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create storage directory")?;
        }
        std::fs::write(&self.path, blob)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        Ok(())
    }

    fn quarantine(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let target = self.quarantine_path();
        std::fs::rename(&self.path, &target).with_context(|| {
            format!("Failed to move {} to {}", self.path.display(), target.display())
        })?;
        Ok(Some(target.display().to_string()))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Process-local storage, used for demo runs and tests
#[derive(Default)]
pub struct MemoryStorage {
    blob: Mutex<Option<String>>,
    quarantined: Mutex<Option<String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing blob
    pub fn with_blob(blob: impl Into<String>) -> Self {
        Self {
            blob: Mutex::new(Some(blob.into())),
            quarantined: Mutex::new(None),
        }
    }

    /// Blob moved aside by [`Storage::quarantine`]
    pub fn quarantined(&self) -> Option<String> {
        self.quarantined.lock().ok().and_then(|guard| guard.clone())
    }
}

impl Storage for MemoryStorage {
    fn load(&self) -> Result<Option<String>> {
        let guard = self
            .blob
            .lock()
            .map_err(|_| anyhow::anyhow!("Memory storage lock poisoned"))?;
        Ok(guard.clone())
    }

    fn save(&self, blob: &str) -> Result<()> {
        let mut guard = self
            .blob
            .lock()
            .map_err(|_| anyhow::anyhow!("Memory storage lock poisoned"))?;
        *guard = Some(blob.to_string());
        Ok(())
    }

    fn quarantine(&self) -> Result<Option<String>> {
        let mut blob = self
            .blob
            .lock()
            .map_err(|_| anyhow::anyhow!("Memory storage lock poisoned"))?;
        let Some(contents) = blob.take() else {
            return Ok(None);
        };
        let mut quarantined = self
            .quarantined
            .lock()
            .map_err(|_| anyhow::anyhow!("Memory storage lock poisoned"))?;
        *quarantined = Some(contents);
        Ok(Some("in-memory (quarantined)".to_string()))
    }

    fn describe(&self) -> String {
        "in-memory".to_string()
    }
}
