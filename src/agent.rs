//! Per-profile credential agent
//!
//! A [`CredentialAgent`] obtains the secret a VPN profile needs before a
//! tunnel can come up: a username/password pair, or the passphrase that
//! unlocks the profile's private key. Secrets come from the keychain when
//! the profile opts into it, otherwise from an interactive prompt.
//!
//! Secrets live in the agent only between [`CredentialAgent::perform_authentication`]
//! and [`CredentialAgent::clear`] (or drop). They are held in
//! [`Zeroizing`] buffers so the memory is wiped either way.

use crate::config::{Config, ProfileConfig};
use crate::keychain::{
    service_name, KeychainError, SecretStore, PASSWORD_ACCOUNT, PRIVATE_KEY_ACCOUNT,
    USERNAME_ACCOUNT,
};
use crate::prompt::{PromptError, Prompter};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
    #[error("Authentication cancelled by user")]
    AuthenticationCancelled,
    #[error("Keychain access failed: {0}")]
    KeychainAccessError(#[from] KeychainError),
    #[error("Credentials requested before authentication succeeded")]
    NotAuthenticatedError,
    #[error("Prompt unavailable: {0}")]
    PromptUnavailable(#[from] PromptError),
}

/// Which secret a profile needs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMode {
    /// Username and password
    Password,
    /// Passphrase for the private key
    PrivateKey,
}

impl AuthMode {
    /// Realm name OpenVPN uses for this secret on the management interface
    pub fn realm(&self) -> &'static str {
        match self {
            AuthMode::Password => "Auth",
            AuthMode::PrivateKey => "Private Key",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AuthMode::Password => "password",
            AuthMode::PrivateKey => "private_key",
        }
    }

    /// Keychain account holding the secret for this mode
    fn secret_account(&self) -> &'static str {
        match self {
            AuthMode::Password => PASSWORD_ACCOUNT,
            AuthMode::PrivateKey => PRIVATE_KEY_ACCOUNT,
        }
    }
}

impl fmt::Display for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthMode {
    type Err = AgentError;

    /// Accepts config names and management realm names
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "password" | "Auth" => Ok(AuthMode::Password),
            "private_key" | "privateKey" | "Private Key" => Ok(AuthMode::PrivateKey),
            _ => Err(AgentError::ConfigurationError(format!(
                "Unknown auth mode: {}",
                s
            ))),
        }
    }
}

pub struct CredentialAgent {
    auth_mode: AuthMode,
    config_name: String,
    service: String,
    save_in_keychain: bool,
    default_username: Option<String>,
    store: Box<dyn SecretStore>,
    prompter: Box<dyn Prompter>,
    username: Option<String>,
    password: Option<Zeroizing<String>>,
    passphrase: Option<Zeroizing<String>>,
}

impl CredentialAgent {
    /// Bind an agent to the named profile in `config`
    ///
    /// Fails with [`AgentError::ConfigurationError`] if the name is empty or
    /// no such profile exists.
    pub fn new(
        config_name: &str,
        config: &Config,
        store: Box<dyn SecretStore>,
        prompter: Box<dyn Prompter>,
    ) -> Result<Self, AgentError> {
        let name = config_name.trim();
        if name.is_empty() {
            return Err(AgentError::ConfigurationError(
                "Profile name cannot be empty".to_string(),
            ));
        }

        let profile = config.profile(name).ok_or_else(|| {
            AgentError::ConfigurationError(format!("No profile named '{}'", name))
        })?;

        Ok(Self::with_profile(name, profile, store, prompter))
    }

    /// Bind an agent to an already resolved profile
    pub fn with_profile(
        config_name: &str,
        profile: &ProfileConfig,
        store: Box<dyn SecretStore>,
        prompter: Box<dyn Prompter>,
    ) -> Self {
        debug!(
            "Creating agent for '{}' (mode={}, keychain={})",
            config_name, profile.auth_mode, profile.save_in_keychain
        );
        Self {
            auth_mode: profile.auth_mode,
            config_name: config_name.to_string(),
            service: service_name(config_name),
            save_in_keychain: profile.save_in_keychain,
            default_username: profile.username.clone(),
            store,
            prompter,
            username: None,
            password: None,
            passphrase: None,
        }
    }

    pub fn auth_mode(&self) -> AuthMode {
        self.auth_mode
    }

    pub fn set_auth_mode(&mut self, mode: AuthMode) {
        if mode != self.auth_mode {
            debug!("'{}': auth mode {} -> {}", self.config_name, self.auth_mode, mode);
            self.auth_mode = mode;
        }
    }

    pub fn config_name(&self) -> &str {
        &self.config_name
    }

    /// Whether the profile reads and writes its secrets in the keychain
    pub fn save_in_keychain(&self) -> bool {
        self.save_in_keychain
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn set_username(&mut self, username: Option<String>) {
        self.username = username;
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_ref().map(|p| p.as_str())
    }

    pub fn set_password(&mut self, password: Option<String>) {
        self.password = password.map(Zeroizing::new);
    }

    pub fn passphrase(&self) -> Option<&str> {
        self.passphrase.as_ref().map(|p| p.as_str())
    }

    pub fn set_passphrase(&mut self, passphrase: Option<String>) {
        self.passphrase = passphrase.map(Zeroizing::new);
    }

    /// Whether the keychain holds the secret for the current auth mode
    ///
    /// Store failures are logged and reported as `false`.
    pub fn keychain_has_passphrase(&self) -> bool {
        let account = self.auth_mode.secret_account();
        match self.store.exists(&self.service, account) {
            Ok(found) => found,
            Err(e) => {
                warn!(
                    "Could not query keychain for '{}' ({}): {}",
                    self.config_name, account, e
                );
                false
            }
        }
    }

    /// Obtain the secret the current auth mode needs
    pub fn perform_authentication(&mut self) -> Result<(), AgentError> {
        info!(
            "Authenticating profile '{}' (mode={})",
            self.config_name, self.auth_mode
        );
        match self.auth_mode {
            AuthMode::Password => self.perform_password_authentication(),
            AuthMode::PrivateKey => self.perform_private_key_authentication(),
        }
    }

    /// Obtain a username and password, from the keychain or a prompt
    pub fn perform_password_authentication(&mut self) -> Result<(), AgentError> {
        self.clear();
        self.auth_mode = AuthMode::Password;

        let stored_username = if self.save_in_keychain {
            self.store.get(&self.service, USERNAME_ACCOUNT)?
        } else {
            None
        };

        if let Some(username) = &stored_username {
            if let Some(password) = self.store.get(&self.service, PASSWORD_ACCOUNT)? {
                info!("Using keychain credentials for '{}'", self.config_name);
                self.username = Some(username.clone());
                self.password = Some(Zeroizing::new(password));
                return Ok(());
            }
        }

        let (username, password) = self.ask_credentials(stored_username.as_deref())?;

        if self.save_in_keychain {
            if let Err(e) = self.store_credentials(&username, &password) {
                warn!(
                    "Could not save credentials for '{}' to keychain: {}",
                    self.config_name, e
                );
            }
        }

        self.username = Some(username);
        self.password = Some(password);
        Ok(())
    }

    /// Obtain the private key passphrase, from the keychain or a prompt
    pub fn perform_private_key_authentication(&mut self) -> Result<(), AgentError> {
        self.clear();
        self.auth_mode = AuthMode::PrivateKey;

        if self.save_in_keychain {
            if let Some(passphrase) = self.store.get(&self.service, PRIVATE_KEY_ACCOUNT)? {
                info!("Using keychain passphrase for '{}'", self.config_name);
                self.passphrase = Some(Zeroizing::new(passphrase));
                return Ok(());
            }
        }

        let passphrase = self.ask_passphrase()?;

        if self.save_in_keychain {
            if let Err(e) = self.store_passphrase(&passphrase) {
                warn!(
                    "Could not save passphrase for '{}' to keychain: {}",
                    self.config_name, e
                );
            }
        }

        self.passphrase = Some(passphrase);
        Ok(())
    }

    /// The `(username, secret)` pair for the tunnel
    ///
    /// The username is empty in private key mode.
    pub fn get_auth(&self) -> Result<(String, Zeroizing<String>), AgentError> {
        match self.auth_mode {
            AuthMode::Password => match (&self.username, &self.password) {
                (Some(username), Some(password)) => Ok((username.clone(), password.clone())),
                _ => Err(AgentError::NotAuthenticatedError),
            },
            AuthMode::PrivateKey => self
                .passphrase
                .as_ref()
                .map(|p| (String::new(), p.clone()))
                .ok_or(AgentError::NotAuthenticatedError),
        }
    }

    fn ask_credentials(
        &self,
        stored_username: Option<&str>,
    ) -> Result<(String, Zeroizing<String>), AgentError> {
        self.prompter.ready()?;
        let hint = stored_username.or(self.default_username.as_deref());
        self.prompter
            .prompt_credentials(&self.config_name, hint)
            .ok_or(AgentError::AuthenticationCancelled)
    }

    fn ask_passphrase(&self) -> Result<Zeroizing<String>, AgentError> {
        self.prompter.ready()?;
        self.prompter
            .prompt_passphrase(&self.config_name)
            .ok_or(AgentError::AuthenticationCancelled)
    }

    /// Prompt for the current mode's secret and save it to the keychain
    ///
    /// Nothing is kept in memory. Works whatever the profile's keychain
    /// preference.
    pub fn prompt_and_store(&self) -> Result<(), AgentError> {
        match self.auth_mode {
            AuthMode::Password => {
                let stored_username = self.store.get(&self.service, USERNAME_ACCOUNT)?;
                let (username, password) = self.ask_credentials(stored_username.as_deref())?;
                self.store_credentials(&username, &password)
            }
            AuthMode::PrivateKey => {
                let passphrase = self.ask_passphrase()?;
                self.store_passphrase(&passphrase)
            }
        }
    }

    /// Save a username and password for this profile
    ///
    /// The pair is written as a unit: if either write fails, the entries
    /// that were there before are put back.
    pub fn store_credentials(&self, username: &str, password: &str) -> Result<(), AgentError> {
        let old_password = self.store.get(&self.service, PASSWORD_ACCOUNT)?.map(Zeroizing::new);

        self.store.set(&self.service, PASSWORD_ACCOUNT, password)?;
        if let Err(e) = self.store.set(&self.service, USERNAME_ACCOUNT, username) {
            let restored = match &old_password {
                Some(old) => self.store.set(&self.service, PASSWORD_ACCOUNT, old),
                None => self.store.delete(&self.service, PASSWORD_ACCOUNT),
            };
            if let Err(rollback) = restored {
                // Never leave a password paired with someone else's username
                warn!(
                    "Could not restore keychain password for '{}': {}",
                    self.config_name, rollback
                );
                let _ = self.store.delete(&self.service, PASSWORD_ACCOUNT);
                let _ = self.store.delete(&self.service, USERNAME_ACCOUNT);
            }
            return Err(e.into());
        }

        debug!("Saved credentials for '{}' to keychain", self.config_name);
        Ok(())
    }

    /// Save a private key passphrase for this profile
    pub fn store_passphrase(&self, passphrase: &str) -> Result<(), AgentError> {
        self.store.set(&self.service, PRIVATE_KEY_ACCOUNT, passphrase)?;
        debug!("Saved passphrase for '{}' to keychain", self.config_name);
        Ok(())
    }

    /// Remove the stored secret for the current auth mode
    ///
    /// In password mode the stored username is kept so the next prompt can
    /// offer it. Deleting an absent entry succeeds.
    pub fn delete_passphrase_from_keychain(&self) -> Result<(), AgentError> {
        let account = self.auth_mode.secret_account();
        self.store.delete(&self.service, account)?;
        info!(
            "Removed {} for '{}' from keychain",
            account, self.config_name
        );
        Ok(())
    }

    /// Drop every secret held in memory
    pub fn clear(&mut self) {
        self.username = None;
        self.password = None;
        self.passphrase = None;
    }
}

impl fmt::Debug for CredentialAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialAgent")
            .field("config_name", &self.config_name)
            .field("auth_mode", &self.auth_mode)
            .field("save_in_keychain", &self.save_in_keychain)
            .field("username", &self.username)
            .field("has_password", &self.password.is_some())
            .field("has_passphrase", &self.passphrase.is_some())
            .finish()
    }
}
