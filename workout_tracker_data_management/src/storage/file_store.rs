use std::{
    fs,
    io::ErrorKind,
    path::PathBuf,
};

use tracing::debug;

use crate::DataManagerError;

use super::SlotStore;

const SLOT_EXTENSION: &str = "json";

/// One `<key>.json` file per slot inside a data directory.
#[derive(Debug, Clone)]
pub struct FileSlotStore {
    dir: PathBuf,
}

impl FileSlotStore {
    /// Creates the directory if it doesn't exist.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, DataManagerError> {
        let dir = dir.into();
        if !dir.exists() {
            fs::create_dir_all(&dir)
                .map_err(|e| DataManagerError::Storage(format!("Failed to create data directory {:?}: {}", dir, e)))?;
        }

        Ok(Self { dir })
    }

    pub fn slot_path(&self, key: &str) -> PathBuf {
        self.dir.join(key).with_extension(SLOT_EXTENSION)
    }
}

impl SlotStore for FileSlotStore {
    fn get(&self, key: &str) -> Result<Option<String>, DataManagerError> {
        let path = self.slot_path(key);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(DataManagerError::Storage(format!("Failed to read slot file {:?}: {}", path, e))),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), DataManagerError> {
        let path = self.slot_path(key);
        // Write beside the slot, then rename over it, so a crash never leaves half a snapshot
        let tmp_path = path.with_extension("json.tmp");

        fs::write(&tmp_path, value)
            .map_err(|e| DataManagerError::Storage(format!("Failed to write slot file {:?}: {}", tmp_path, e)))?;
        fs::rename(&tmp_path, &path)
            .map_err(|e| DataManagerError::Storage(format!("Failed to replace slot file {:?}: {}", path, e)))?;

        debug!("Wrote {} bytes to slot {}", value.len(), key);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), DataManagerError> {
        let path = self.slot_path(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DataManagerError::Storage(format!("Failed to remove slot file {:?}: {}", path, e))),
        }
    }
}
