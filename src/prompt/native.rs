//! Native dialog prompts

use super::{PromptError, Prompter};
use crate::dialog;
use zeroize::Zeroizing;

const DIALOG_TITLE: &str = "VPN Authentication";

pub struct DialogPrompter;

impl DialogPrompter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DialogPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompter for DialogPrompter {
    fn prompt_credentials(
        &self,
        config_name: &str,
        username_hint: Option<&str>,
    ) -> Option<(String, Zeroizing<String>)> {
        let message = format!("Enter your username and password for '{}'", config_name);
        let hint = username_hint.filter(|u| !u.is_empty());
        let (username, password) = dialog::prompt_credentials(DIALOG_TITLE, &message, hint)?;
        Some((username, Zeroizing::new(password)))
    }

    fn prompt_passphrase(&self, config_name: &str) -> Option<Zeroizing<String>> {
        dialog::prompt_passphrase(DIALOG_TITLE, config_name).map(Zeroizing::new)
    }

    fn ready(&self) -> Result<(), PromptError> {
        if dialog::requires_main_thread() && !dialog::on_main_thread() {
            return Err(PromptError::WrongThread(
                "native dialogs must run on the main thread".to_string(),
            ));
        }
        Ok(())
    }
}
