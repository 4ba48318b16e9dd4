//! Interactive secret prompts
//!
//! [`Prompter`] is what the agent calls when a secret is not in the
//! keychain. Returning `None` means the user cancelled.

mod native;
mod terminal;

pub use native::DialogPrompter;
pub use terminal::TerminalPrompter;

use thiserror::Error;
use zeroize::Zeroizing;

#[derive(Error, Debug)]
pub enum PromptError {
    #[error("Cannot prompt from this thread: {0}")]
    WrongThread(String),
}

pub trait Prompter: Send + Sync {
    /// Ask for a username and password
    ///
    /// `username_hint` pre-fills the username when known; the user can
    /// still change it.
    fn prompt_credentials(
        &self,
        config_name: &str,
        username_hint: Option<&str>,
    ) -> Option<(String, Zeroizing<String>)>;

    /// Ask for the passphrase protecting the profile's private key
    fn prompt_passphrase(&self, config_name: &str) -> Option<Zeroizing<String>>;

    /// Whether a prompt can be shown from the calling thread
    fn ready(&self) -> Result<(), PromptError> {
        Ok(())
    }
}

/// Pick a prompter: native dialogs when requested and available, else the terminal
pub fn get_prompter(prefer_dialog: bool) -> Box<dyn Prompter> {
    if prefer_dialog {
        if crate::dialog::is_available() {
            return Box::new(DialogPrompter::new());
        }
        tracing::warn!("Native dialogs unavailable, falling back to terminal prompts");
    }
    Box::new(TerminalPrompter::new())
}
