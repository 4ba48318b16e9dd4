//! Terminal prompts (stdin for usernames, `rpassword` for secrets)

use super::Prompter;
use std::io::{self, BufRead, Write};
use tracing::debug;
use zeroize::Zeroizing;

pub struct TerminalPrompter;

impl TerminalPrompter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TerminalPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompter for TerminalPrompter {
    fn prompt_credentials(
        &self,
        config_name: &str,
        username_hint: Option<&str>,
    ) -> Option<(String, Zeroizing<String>)> {
        eprintln!("Credentials required for VPN profile '{}'", config_name);
        match username_hint {
            Some(hint) => eprint!("Username [{}]: ", hint),
            None => eprint!("Username: "),
        }
        let _ = io::stderr().flush();

        let stdin = io::stdin();
        let username = read_username(&mut stdin.lock(), username_hint)?;
        let password = read_secret("Password: ")?;
        Some((username, password))
    }

    fn prompt_passphrase(&self, config_name: &str) -> Option<Zeroizing<String>> {
        read_secret(&format!("Private key passphrase for '{}': ", config_name))
    }
}

/// Read a username line; an empty line takes the hint
///
/// Returns `None` on EOF, read failure, or an empty answer with no hint.
fn read_username<R: BufRead>(reader: &mut R, hint: Option<&str>) -> Option<String> {
    let mut line = String::new();
    match reader.read_line(&mut line) {
        Ok(0) | Err(_) => return None,
        Ok(_) => {}
    }

    let username = line.trim();
    if !username.is_empty() {
        return Some(username.to_string());
    }
    hint.filter(|h| !h.is_empty()).map(str::to_string)
}

fn read_secret(prompt: &str) -> Option<Zeroizing<String>> {
    match rpassword::prompt_password(prompt) {
        Ok(secret) => {
            let secret = Zeroizing::new(secret);
            if secret.is_empty() {
                None
            } else {
                Some(secret)
            }
        }
        Err(e) => {
            debug!("Secret prompt aborted: {}", e);
            None
        }
    }
}
