//! Key registry
//!
//! The registry is the authoritative record of which keys exist;
//! `authorized_keys` is derived from it and can be rebuilt at any time.

mod file;
mod memory;
mod table;

use crate::error::Result;
use crate::keys::PublicKey;

pub use file::FileRegistry;
pub use memory::MemoryRegistry;

/// Storage for key records. Each call is atomic on its own; callers get no
/// cross-call transactions.
pub trait KeyRegistry: Send + Sync {
    /// Whether `owner_id` already has a key called `name`
    fn exists(&self, owner_id: i64, name: &str) -> Result<bool>;

    /// Whether any key has this fingerprint
    fn exists_by_fingerprint(&self, fingerprint: &str) -> Result<bool>;

    /// Store a new key and return it with its assigned id
    fn insert(&self, key: PublicKey) -> Result<PublicKey>;

    /// Remove a key by id
    fn delete(&self, id: i64) -> Result<()>;

    /// Replace the stored record with the same id
    fn update(&self, key: &PublicKey) -> Result<()>;

    fn get_by_id(&self, id: i64) -> Result<PublicKey>;

    fn list_by_owner(&self, owner_id: i64) -> Result<Vec<PublicKey>>;

    /// Visit every key in id order, stopping at the first error
    fn iterate_all(&self, visit: &mut dyn FnMut(&PublicKey) -> Result<()>) -> Result<()>;
}
