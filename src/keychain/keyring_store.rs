//! OS keychain backend
//!
//! Uses the `keyring` crate: macOS Keychain, Windows Credential Manager,
//! Linux Secret Service.

use super::{KeychainError, SecretStore};
use keyring::Entry;
use tracing::{debug, warn};

pub struct KeyringStore;

impl KeyringStore {
    pub fn new() -> Self {
        Self
    }
}

impl Default for KeyringStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SecretStore for KeyringStore {
    fn get(&self, service: &str, account: &str) -> Result<Option<String>, KeychainError> {
        let entry = Entry::new(service, account)?;
        match entry.get_password() {
            Ok(secret) => {
                debug!("Keychain hit: service={}, account={}", service, account);
                Ok(Some(secret))
            }
            Err(keyring::Error::NoEntry) => {
                debug!("Keychain miss: service={}, account={}", service, account);
                Ok(None)
            }
            Err(e) => {
                warn!(
                    "Keychain read failed: service={}, account={}, error={}",
                    service, account, e
                );
                Err(KeychainError::AccessError(e))
            }
        }
    }

    fn set(&self, service: &str, account: &str, secret: &str) -> Result<(), KeychainError> {
        let entry = Entry::new(service, account)?;
        entry.set_password(secret)?;
        debug!("Keychain store: service={}, account={}", service, account);
        Ok(())
    }

    fn delete(&self, service: &str, account: &str) -> Result<(), KeychainError> {
        let entry = Entry::new(service, account)?;
        match entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(KeychainError::AccessError(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keychain::PASSWORD_ACCOUNT;

    // Talks to the real system keychain
    #[test]
    #[ignore]
    fn test_keyring_round_trip() {
        let store = KeyringStore::new();
        let service = "vpn-auth-agent-Auth-keyring-test";

        store.set(service, PASSWORD_ACCOUNT, "test-secret").unwrap();
        assert_eq!(
            store.get(service, PASSWORD_ACCOUNT).unwrap().as_deref(),
            Some("test-secret")
        );

        store.delete(service, PASSWORD_ACCOUNT).unwrap();
        assert_eq!(store.get(service, PASSWORD_ACCOUNT).unwrap(), None);
        // Deleting twice is fine
        store.delete(service, PASSWORD_ACCOUNT).unwrap();
    }
}
