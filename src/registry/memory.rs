//! In-memory registry, used by tests and embedders that bring their own
//! persistence

use parking_lot::RwLock;

use super::table::KeyTable;
use super::KeyRegistry;
use crate::error::Result;
use crate::keys::PublicKey;

#[derive(Debug, Default)]
pub struct MemoryRegistry {
    table: RwLock<KeyTable>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.table.read().iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyRegistry for MemoryRegistry {
    fn exists(&self, owner_id: i64, name: &str) -> Result<bool> {
        Ok(self.table.read().exists(owner_id, name))
    }

    fn exists_by_fingerprint(&self, fingerprint: &str) -> Result<bool> {
        Ok(self.table.read().exists_by_fingerprint(fingerprint))
    }

    fn insert(&self, key: PublicKey) -> Result<PublicKey> {
        self.table.write().insert(key)
    }

    fn delete(&self, id: i64) -> Result<()> {
        self.table.write().delete(id).map(|_| ())
    }

    fn update(&self, key: &PublicKey) -> Result<()> {
        self.table.write().update(key)
    }

    fn get_by_id(&self, id: i64) -> Result<PublicKey> {
        self.table.read().get(id)
    }

    fn list_by_owner(&self, owner_id: i64) -> Result<Vec<PublicKey>> {
        Ok(self.table.read().list_by_owner(owner_id))
    }

    fn iterate_all(&self, visit: &mut dyn FnMut(&PublicKey) -> Result<()>) -> Result<()> {
        let table = self.table.read();
        for key in table.iter() {
            visit(key)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_registry_contract() {
        let registry = MemoryRegistry::new();
        crate::registry::tests::exercise(&registry);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_memory_registry_starts_empty() {
        assert!(MemoryRegistry::new().is_empty());
    }
}
