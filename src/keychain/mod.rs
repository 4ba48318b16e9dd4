//! Secret storage for profile credentials
//!
//! The agent talks to the OS keychain through the [`SecretStore`] trait so
//! the backend can be swapped (the in-memory store backs the tests).
//!
//! Entries are keyed by a per-profile service name plus a fixed account:
//!
//! | Account | Auth mode | Contents |
//! |---------|-----------|----------|
//! | `username` | password | Username |
//! | `password` | password | Password |
//! | `privateKey` | private key | Key passphrase |

mod keyring_store;
mod memory;

pub use keyring_store::KeyringStore;
pub use memory::MemoryStore;

use thiserror::Error;

/// Prefix of every service name this crate writes to the keychain
pub const SERVICE_PREFIX: &str = "vpn-auth-agent";

pub const USERNAME_ACCOUNT: &str = "username";
pub const PASSWORD_ACCOUNT: &str = "password";
pub const PRIVATE_KEY_ACCOUNT: &str = "privateKey";

#[derive(Error, Debug)]
pub enum KeychainError {
    #[error("Keychain access failed: {0}")]
    AccessError(#[from] keyring::Error),
    #[error("Keychain unavailable: {0}")]
    Unavailable(String),
}

/// Platform-agnostic secret store
///
/// A missing entry is not an error: `get` returns `Ok(None)` and `delete`
/// succeeds.
pub trait SecretStore: Send + Sync {
    fn get(&self, service: &str, account: &str) -> Result<Option<String>, KeychainError>;
    fn set(&self, service: &str, account: &str, secret: &str) -> Result<(), KeychainError>;
    fn delete(&self, service: &str, account: &str) -> Result<(), KeychainError>;

    fn exists(&self, service: &str, account: &str) -> Result<bool, KeychainError> {
        Ok(self.get(service, account)?.is_some())
    }
}

/// Keychain service name for a profile
pub fn service_name(config_name: &str) -> String {
    format!("{}-Auth-{}", SERVICE_PREFIX, config_name)
}

/// Get the OS keychain store
pub fn get_secret_store() -> Box<dyn SecretStore> {
    Box::new(KeyringStore::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_name() {
        assert_eq!(service_name("office"), "vpn-auth-agent-Auth-office");
        assert_eq!(service_name("my vpn"), "vpn-auth-agent-Auth-my vpn");
    }

    #[test]
    fn test_keychain_error_display() {
        let err = KeychainError::Unavailable("locked".to_string());
        assert_eq!(err.to_string(), "Keychain unavailable: locked");

        let err = KeychainError::from(keyring::Error::NoEntry);
        assert!(err.to_string().starts_with("Keychain access failed:"));
    }

    #[test]
    fn test_exists_default_impl() {
        let store = MemoryStore::new();
        assert!(!store.exists("svc", PASSWORD_ACCOUNT).unwrap());
        store.set("svc", PASSWORD_ACCOUNT, "pw").unwrap();
        assert!(store.exists("svc", PASSWORD_ACCOUNT).unwrap());
        assert!(!store.exists("svc", USERNAME_ACCOUNT).unwrap());
    }
}
