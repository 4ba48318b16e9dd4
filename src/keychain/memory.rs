//! In-memory secret store

use super::{KeychainError, SecretStore};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use zeroize::Zeroizing;

type Entries = HashMap<(String, String), Zeroizing<String>>;

/// Process-local store, lost on exit
///
/// Clones share the same entries.
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<Entries>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Entries>, KeychainError> {
        self.entries
            .lock()
            .map_err(|_| KeychainError::Unavailable("memory store lock poisoned".to_string()))
    }
}

impl SecretStore for MemoryStore {
    fn get(&self, service: &str, account: &str) -> Result<Option<String>, KeychainError> {
        let entries = self.lock()?;
        Ok(entries
            .get(&(service.to_string(), account.to_string()))
            .map(|s| s.to_string()))
    }

    fn set(&self, service: &str, account: &str, secret: &str) -> Result<(), KeychainError> {
        let mut entries = self.lock()?;
        entries.insert(
            (service.to_string(), account.to_string()),
            Zeroizing::new(secret.to_string()),
        );
        Ok(())
    }

    fn delete(&self, service: &str, account: &str) -> Result<(), KeychainError> {
        let mut entries = self.lock()?;
        entries.remove(&(service.to_string(), account.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_delete() {
        let store = MemoryStore::new();
        assert_eq!(store.get("svc", "password").unwrap(), None);

        store.set("svc", "password", "one").unwrap();
        store.set("svc", "password", "two").unwrap();
        assert_eq!(store.get("svc", "password").unwrap().as_deref(), Some("two"));

        store.delete("svc", "password").unwrap();
        assert_eq!(store.get("svc", "password").unwrap(), None);
    }

    #[test]
    fn test_delete_missing_is_ok() {
        let store = MemoryStore::new();
        assert!(store.delete("svc", "privateKey").is_ok());
    }

    #[test]
    fn test_clones_share_entries() {
        let store = MemoryStore::new();
        let clone = store.clone();
        clone.set("svc", "username", "alice").unwrap();
        assert_eq!(store.get("svc", "username").unwrap().as_deref(), Some("alice"));
    }

    #[test]
    fn test_entries_are_scoped_by_service() {
        let store = MemoryStore::new();
        store.set("a", "password", "pw-a").unwrap();
        assert_eq!(store.get("b", "password").unwrap(), None);
    }
}
