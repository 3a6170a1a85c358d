//! Key acceptance, deletion and rebuild
//!
//! The registry and `authorized_keys` are separate stores, so every change is
//! a two-step saga: registry first, then the file. A failed file append
//! undoes the registry insert. If a crash or a failed undo leaves the two
//! apart, `rewrite_all_public_keys` restores the file from the registry.

use chrono::Utc;
use tracing::{error, info, warn};

use crate::authorized::AuthorizedKeys;
use crate::error::{KeySyncError, Result};
use crate::keys::{self, PublicKey};
use crate::oracle::KeyInspector;
use crate::registry::KeyRegistry;

/// A submitted key that passed parsing, the size policy and fingerprinting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckedKey {
    /// Algorithm name embedded in the key
    pub key_type: String,
    /// Canonical single-line form
    pub content: String,
    pub fingerprint: String,
}

pub struct KeyService {
    registry: Box<dyn KeyRegistry>,
    inspector: Box<dyn KeyInspector>,
    authorized: AuthorizedKeys,
}

impl KeyService {
    pub fn new(
        registry: Box<dyn KeyRegistry>,
        inspector: Box<dyn KeyInspector>,
        authorized: AuthorizedKeys,
    ) -> Self {
        Self {
            registry,
            inspector,
            authorized,
        }
    }

    pub fn registry(&self) -> &dyn KeyRegistry {
        self.registry.as_ref()
    }

    pub fn authorized(&self) -> &AuthorizedKeys {
        &self.authorized
    }

    /// Parse, validate and fingerprint a submitted key without storing it
    pub fn check_key(&self, raw: &str) -> Result<CheckedKey> {
        let parsed = keys::parse_key_string(raw)?;
        let content = parsed.to_canonical();

        keys::check_public_key_string(self.inspector.as_ref(), &content)?;
        let fingerprint = keys::calculate_fingerprint(self.inspector.as_ref(), &content)?;

        Ok(CheckedKey {
            key_type: parsed.key_type,
            content,
            fingerprint,
        })
    }

    /// Register a new key for `owner_id` and grant it access
    pub fn add_public_key(&self, owner_id: i64, name: &str, raw: &str) -> Result<PublicKey> {
        report(self.try_add(owner_id, name, raw), "add public key")
    }

    fn try_add(&self, owner_id: i64, name: &str, raw: &str) -> Result<PublicKey> {
        if self.registry.exists(owner_id, name)? {
            return Err(KeySyncError::KeyNameTaken {
                owner: owner_id,
                name: name.to_string(),
            });
        }

        let checked = self.check_key(raw)?;
        if self.registry.exists_by_fingerprint(&checked.fingerprint)? {
            return Err(KeySyncError::KeyAlreadyExists);
        }

        let key = self.registry.insert(
            PublicKey::new(owner_id, name, checked.content).with_fingerprint(checked.fingerprint),
        )?;

        if let Err(write) = self.authorized.add(std::slice::from_ref(&key)) {
            warn!(id = key.id, error = %write, "authorized_keys append failed, rolling back");
            if let Err(rollback) = self.registry.delete(key.id) {
                return Err(KeySyncError::Inconsistent {
                    write: Box::new(write),
                    rollback: Box::new(rollback),
                });
            }
            return Err(write);
        }

        info!(id = key.id, owner = owner_id, fingerprint = %key.fingerprint, "public key added");
        Ok(key)
    }

    pub fn get_public_key(&self, id: i64) -> Result<PublicKey> {
        self.registry.get_by_id(id)
    }

    /// Keys of one owner, with usage flags filled in
    pub fn list_public_keys(&self, owner_id: i64) -> Result<Vec<PublicKey>> {
        let now = Utc::now();
        let mut keys = self.registry.list_by_owner(owner_id)?;
        for key in &mut keys {
            key.refresh_activity(now);
        }
        Ok(keys)
    }

    /// Update key metadata. Content, fingerprint and owner are fixed at
    /// creation; changing them is refused.
    pub fn update_public_key(&self, key: &PublicKey) -> Result<PublicKey> {
        let mut stored = self.registry.get_by_id(key.id)?;
        if key.content != stored.content {
            return Err(KeySyncError::ImmutableField("content"));
        }
        if key.fingerprint != stored.fingerprint {
            return Err(KeySyncError::ImmutableField("fingerprint"));
        }
        if key.owner_id != stored.owner_id {
            return Err(KeySyncError::ImmutableField("owner_id"));
        }

        stored.name = key.name.clone();
        stored.updated = Utc::now();
        self.registry.update(&stored)?;
        Ok(stored)
    }

    /// Record that a key was just used to log in
    pub fn touch_public_key(&self, id: i64) -> Result<()> {
        let mut stored = self.registry.get_by_id(id)?;
        stored.updated = Utc::now();
        self.registry.update(&stored)
    }

    /// Remove a key from the registry and revoke its access
    pub fn delete_public_key(&self, id: i64) -> Result<PublicKey> {
        report(self.try_delete(id), "delete public key")
    }

    fn try_delete(&self, id: i64) -> Result<PublicKey> {
        let key = self.registry.get_by_id(id)?;
        self.registry.delete(id)?;

        if !self.authorized.remove(&key)? {
            warn!(id, "no authorized_keys line found for deleted key");
        }

        info!(id, owner = key.owner_id, "public key deleted");
        Ok(key)
    }

    /// Regenerate `authorized_keys` from the registry
    pub fn rewrite_all_public_keys(&self) -> Result<usize> {
        report(
            self.authorized.rewrite_all(self.registry.as_ref()),
            "rewrite authorized_keys",
        )
    }
}

/// Log operational failures once, at the service boundary
fn report<T>(result: Result<T>, operation: &str) -> Result<T> {
    if let Err(e) = &result {
        if !e.is_user_error() {
            error!(operation, error = %e, "operation failed");
        }
    }
    result
}
