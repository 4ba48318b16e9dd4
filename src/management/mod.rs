//! OpenVPN management interface integration
//!
//! OpenVPN started with `--management <host> <port> --management-query-passwords`
//! asks for credentials over a line-oriented TCP protocol instead of the
//! terminal. This module answers those requests with a
//! [`CredentialAgent`](crate::agent::CredentialAgent).
//!
//! # Lifecycle
//!
//! - `>HOLD`: reply `hold release`
//! - `>PASSWORD:Need '<realm>'`: authenticate, reply `username`/`password`
//! - `>PASSWORD:Verification Failed`: forget the rejected keychain secret
//! - connection closed: done

pub mod client;
pub mod protocol;

pub use client::ManagementClient;
pub use protocol::{parse_line, ManagementEvent};

use crate::agent::AgentError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ManagementError {
    #[error("Management connection failed: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Authentication failed: {0}")]
    AuthError(#[from] AgentError),
    #[error("Authentication task failed: {0}")]
    TaskError(#[from] tokio::task::JoinError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_management_error_display() {
        let err = ManagementError::AuthError(AgentError::AuthenticationCancelled);
        assert_eq!(
            err.to_string(),
            "Authentication failed: Authentication cancelled by user"
        );

        let err = ManagementError::IoError(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "refused",
        ));
        assert_eq!(err.to_string(), "Management connection failed: refused");
    }
}
