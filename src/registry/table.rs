//! Key table shared by the registry stores

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{KeySyncError, Result};
use crate::keys::PublicKey;

/// Keys ordered by id. Ids only grow, so id order is insertion order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct KeyTable {
    next_id: i64,
    keys: BTreeMap<i64, PublicKey>,
}

impl KeyTable {
    pub fn exists(&self, owner_id: i64, name: &str) -> bool {
        self.keys
            .values()
            .any(|k| k.owner_id == owner_id && k.name == name)
    }

    pub fn exists_by_fingerprint(&self, fingerprint: &str) -> bool {
        self.keys.values().any(|k| k.fingerprint == fingerprint)
    }

    pub fn insert(&mut self, mut key: PublicKey) -> Result<PublicKey> {
        if self.exists(key.owner_id, &key.name) {
            return Err(KeySyncError::KeyNameTaken {
                owner: key.owner_id,
                name: key.name,
            });
        }
        if self.exists_by_fingerprint(&key.fingerprint) {
            return Err(KeySyncError::KeyAlreadyExists);
        }

        self.next_id += 1;
        key.id = self.next_id;
        self.keys.insert(key.id, key.clone());
        Ok(key)
    }

    pub fn delete(&mut self, id: i64) -> Result<PublicKey> {
        self.keys.remove(&id).ok_or(KeySyncError::KeyNotFound(id))
    }

    pub fn update(&mut self, key: &PublicKey) -> Result<()> {
        if !self.keys.contains_key(&key.id) {
            return Err(KeySyncError::KeyNotFound(key.id));
        }
        let name_taken = self
            .keys
            .values()
            .any(|k| k.id != key.id && k.owner_id == key.owner_id && k.name == key.name);
        if name_taken {
            return Err(KeySyncError::KeyNameTaken {
                owner: key.owner_id,
                name: key.name.clone(),
            });
        }

        self.keys.insert(key.id, key.clone());
        Ok(())
    }

    pub fn get(&self, id: i64) -> Result<PublicKey> {
        self.keys.get(&id).cloned().ok_or(KeySyncError::KeyNotFound(id))
    }

    pub fn list_by_owner(&self, owner_id: i64) -> Vec<PublicKey> {
        self.keys
            .values()
            .filter(|k| k.owner_id == owner_id)
            .cloned()
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PublicKey> {
        self.keys.values()
    }
}
