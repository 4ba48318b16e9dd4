//! Management interface client
//!
//! Connects to a running OpenVPN and answers its credential requests with
//! a [`CredentialAgent`].

use super::protocol::{self, ManagementEvent};
use super::ManagementError;
use crate::agent::{AuthMode, CredentialAgent};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tracing::{debug, info, warn};

pub struct ManagementClient {
    lines: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
}

impl ManagementClient {
    pub async fn connect(host: &str, port: u16) -> Result<Self, ManagementError> {
        info!("Connecting to OpenVPN management interface at {}:{}", host, port);
        let stream = TcpStream::connect((host, port)).await?;
        Ok(Self::from_stream(stream))
    }

    pub fn from_stream(stream: TcpStream) -> Self {
        let (reader, writer) = stream.into_split();
        Self {
            lines: BufReader::new(reader).lines(),
            writer,
        }
    }

    /// Answer credential requests until OpenVPN closes the connection
    ///
    /// A failed authentication (cancelled prompt, keychain error) sends
    /// `signal SIGTERM` to abort the connection attempt, then returns the error.
    pub async fn serve(mut self, mut agent: CredentialAgent) -> Result<(), ManagementError> {
        while let Some(line) = self.lines.next_line().await? {
            match protocol::parse_line(&line) {
                ManagementEvent::NeedPassword { realm } => {
                    agent = self.answer(agent, &realm).await?;
                }
                ManagementEvent::VerificationFailed { realm } => {
                    warn!("OpenVPN rejected credentials for realm '{}'", realm);
                    forget_rejected(&mut agent, &realm);
                }
                ManagementEvent::Hold => {
                    debug!("Releasing management hold");
                    self.send(protocol::HOLD_RELEASE).await?;
                }
                ManagementEvent::Info(info) => debug!("OpenVPN: {}", info),
                ManagementEvent::Success(msg) => debug!("OpenVPN accepted: {}", msg),
                ManagementEvent::Error(msg) => warn!("OpenVPN error: {}", msg),
                ManagementEvent::Other(line) => debug!("Ignoring: {}", line),
            }
        }

        info!("Management connection closed");
        Ok(())
    }

    async fn answer(
        &mut self,
        mut agent: CredentialAgent,
        realm: &str,
    ) -> Result<CredentialAgent, ManagementError> {
        let mode = match realm.parse::<AuthMode>() {
            Ok(mode) => mode,
            Err(_) => {
                warn!("Unsupported credential realm '{}', ignoring request", realm);
                return Ok(agent);
            }
        };
        agent.set_auth_mode(mode);

        // Prompts block, keep them off the reactor
        let (mut agent, result) = tokio::task::spawn_blocking(move || {
            let result = agent.perform_authentication();
            (agent, result)
        })
        .await?;

        let auth = result.and_then(|()| agent.get_auth());
        let (username, secret) = match auth {
            Ok(pair) => pair,
            Err(e) => {
                warn!("Aborting connection for '{}': {}", agent.config_name(), e);
                self.send(protocol::ABORT).await?;
                return Err(e.into());
            }
        };

        if mode == AuthMode::Password {
            self.send(&protocol::username_command(realm, &username)).await?;
        }
        self.send(&protocol::password_command(realm, &secret)).await?;
        agent.clear();

        info!("Sent {} credentials for '{}'", mode, agent.config_name());
        Ok(agent)
    }

    async fn send(&mut self, command: &str) -> Result<(), ManagementError> {
        self.writer.write_all(command.as_bytes()).await?;
        self.writer.flush().await?;
        Ok(())
    }
}

/// Drop a rejected secret so the retry prompts instead of replaying it
///
/// Profiles that do not use the keychain never read it during
/// authentication, so their stored entries are left alone.
fn forget_rejected(agent: &mut CredentialAgent, realm: &str) {
    agent.clear();
    if !agent.save_in_keychain() {
        return;
    }
    if let Ok(mode) = realm.parse::<AuthMode>() {
        agent.set_auth_mode(mode);
        if let Err(e) = agent.delete_passphrase_from_keychain() {
            warn!("Could not remove rejected secret from keychain: {}", e);
        }
    }
}
