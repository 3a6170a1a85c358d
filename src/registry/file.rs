//! JSON file key registry
//!
//! Every change is written to a temporary file next to the registry and
//! renamed over it.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::debug;

use super::table::KeyTable;
use super::KeyRegistry;
use crate::error::{KeySyncError, Result};
use crate::keys::PublicKey;

/// Registry persisted as a single JSON document.
///
/// Changes are serialized within one process only. Each change reloads the
/// file before applying itself, so processes taking turns see each other's
/// records, but two processes writing at the same moment can still lose one
/// of the changes.
#[derive(Debug)]
pub struct FileRegistry {
    path: PathBuf,
    table: Mutex<KeyTable>,
}

impl FileRegistry {
    /// Open the registry; a missing file is an empty registry
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let table = load(&path)?;

        Ok(Self {
            path,
            table: Mutex::new(table),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Apply `change` to the table as it is on disk and keep the result only
    /// once it is saved
    fn commit<T>(&self, change: impl FnOnce(&mut KeyTable) -> Result<T>) -> Result<T> {
        let mut table = self.table.lock();
        let mut next = load(&self.path)?;
        let out = change(&mut next)?;
        self.save(&next)?;
        *table = next;
        Ok(out)
    }

    fn save(&self, table: &KeyTable) -> Result<()> {
        let dir = self.path.parent().ok_or_else(|| {
            KeySyncError::InvalidConfig(format!("{}: no parent directory", self.path.display()))
        })?;
        if !dir.exists() {
            fs::create_dir_all(dir)?;
        }

        let json = serde_json::to_vec_pretty(table)?;

        // tempfile creates the file with mode 0600
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(&json)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;

        debug!(path = %self.path.display(), "registry saved");
        Ok(())
    }
}

fn load(path: &Path) -> Result<KeyTable> {
    if !path.exists() {
        return Ok(KeyTable::default());
    }
    let data = fs::read(path)?;
    Ok(serde_json::from_slice(&data)?)
}

impl KeyRegistry for FileRegistry {
    fn exists(&self, owner_id: i64, name: &str) -> Result<bool> {
        Ok(self.table.lock().exists(owner_id, name))
    }

    fn exists_by_fingerprint(&self, fingerprint: &str) -> Result<bool> {
        Ok(self.table.lock().exists_by_fingerprint(fingerprint))
    }

    fn insert(&self, key: PublicKey) -> Result<PublicKey> {
        self.commit(|table| table.insert(key))
    }

    fn delete(&self, id: i64) -> Result<()> {
        self.commit(|table| table.delete(id).map(|_| ()))
    }

    fn update(&self, key: &PublicKey) -> Result<()> {
        self.commit(|table| table.update(key))
    }

    fn get_by_id(&self, id: i64) -> Result<PublicKey> {
        self.table.lock().get(id)
    }

    fn list_by_owner(&self, owner_id: i64) -> Result<Vec<PublicKey>> {
        Ok(self.table.lock().list_by_owner(owner_id))
    }

    fn iterate_all(&self, visit: &mut dyn FnMut(&PublicKey) -> Result<()>) -> Result<()> {
        let table = self.table.lock();
        for key in table.iter() {
            visit(key)?;
        }
        Ok(())
    }
}
