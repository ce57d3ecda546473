//! Save-slot backends for the run history.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use hypercube_core::RunRecord;
use thiserror::Error;

/// Slot name the game stores its history under.
pub const DEFAULT_SLOT: &str = "RunDataSaveSlot";

/// Failures raised while reading or writing a save slot.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The slot file could not be read, written or removed.
    #[error("failed to access save slot {path}")]
    Io {
        /// Location of the slot file.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The slot file exists but does not hold a run history.
    #[error("save slot {path} is corrupt")]
    Corrupt {
        /// Location of the slot file.
        path: PathBuf,
        /// Underlying decoding failure.
        #[source]
        source: serde_json::Error,
    },
    /// The history could not be encoded.
    #[error("failed to encode run history")]
    Encode(#[source] serde_json::Error),
}

/// Key-value save store holding the ordered run history.
pub trait RunHistoryStore {
    /// Loads the saved history, `Ok(None)` when nothing was saved yet.
    fn load(&self) -> Result<Option<Vec<RunRecord>>, StoreError>;

    /// Replaces the saved history.
    fn save(&mut self, records: &[RunRecord]) -> Result<(), StoreError>;

    /// Deletes the saved history.
    fn clear(&mut self) -> Result<(), StoreError>;
}

/// Stores the history as pretty-printed JSON in `<dir>/<slot>.json`.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Creates a store for the named slot inside `dir`.
    #[must_use]
    pub fn new(dir: impl AsRef<Path>, slot: &str) -> Self {
        Self {
            path: dir.as_ref().join(format!("{slot}.json")),
        }
    }

    /// Location of the slot file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl RunHistoryStore for JsonFileStore {
    fn load(&self) -> Result<Option<Vec<RunRecord>>, StoreError> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                log::info!("no run history at {}", self.path.display());
                return Ok(None);
            }
            Err(error) => return Err(self.io_error(error)),
        };
        let records: Vec<RunRecord> =
            serde_json::from_str(&json).map_err(|source| StoreError::Corrupt {
                path: self.path.clone(),
                source,
            })?;
        log::info!("total level walkthroughs: {}", records.len());
        Ok(Some(records))
    }

    fn save(&mut self, records: &[RunRecord]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|error| self.io_error(error))?;
        }
        let json = serde_json::to_string_pretty(records).map_err(StoreError::Encode)?;
        fs::write(&self.path, json).map_err(|error| self.io_error(error))
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(self.io_error(error)),
        }
    }
}

/// In-memory store for hosts without a filesystem and for tests.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    records: Option<Vec<RunRecord>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds a history.
    #[must_use]
    pub fn with_records(records: Vec<RunRecord>) -> Self {
        Self {
            records: Some(records),
        }
    }

    /// Currently stored history.
    #[must_use]
    pub fn records(&self) -> Option<&[RunRecord]> {
        self.records.as_deref()
    }
}

impl RunHistoryStore for MemoryStore {
    fn load(&self) -> Result<Option<Vec<RunRecord>>, StoreError> {
        Ok(self.records.clone())
    }

    fn save(&mut self, records: &[RunRecord]) -> Result<(), StoreError> {
        self.records = Some(records.to_vec());
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        self.records = None;
        Ok(())
    }
}
