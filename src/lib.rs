//! VPN auth agent - credential handling for VPN connection profiles
//!
//! Obtains the username/password or private key passphrase a VPN profile
//! needs, from the OS keychain or an interactive prompt, and hands it to
//! OpenVPN over its management interface.
//!
//! # Architecture
//!
//! - `agent`: Per-profile credential agent (`CredentialAgent`)
//! - `config`: Configuration file handling (TOML)
//! - `keychain`: Secret store trait, OS keychain and in-memory backends
//! - `prompt`: Interactive prompts (terminal or native dialog)
//! - `dialog`: Native dialogs (macOS, Linux, Windows)
//! - `management`: OpenVPN management interface client
//!
//! # Usage
//!
//! Start OpenVPN with a management interface that queries passwords:
//! ```bash
//! openvpn --config office.ovpn --management 127.0.0.1 7505 \
//!   --management-query-passwords --management-hold
//! vpn-auth serve office
//! ```

pub mod agent;
pub mod config;
pub mod dialog;
pub mod keychain;
pub mod management;
pub mod prompt;

pub use agent::{AgentError, AuthMode, CredentialAgent};
pub use config::Config;
pub use keychain::{MemoryStore, SecretStore};
pub use prompt::Prompter;
