//! Cross-platform native dialogs for credential prompts
//!
//! macOS uses NSAlert with secure text fields, Linux shells out to
//! zenity/kdialog, Windows uses CredUI. osascript is avoided on macOS
//! because it gets SIGKILL'd when prompting for passwords from background
//! threads.

#[cfg(target_os = "macos")]
mod mac;
#[cfg(target_os = "windows")]
mod windows;
#[cfg(target_os = "linux")]
mod linux;

/// Prompt for VPN credentials (username + password)
///
/// `username` pre-fills an editable username field. Returns
/// `Some((username, password))` if the user provided credentials,
/// or `None` if cancelled.
///
/// On macOS, this must be called from the main thread.
pub fn prompt_credentials(
    title: &str,
    message: &str,
    username: Option<&str>,
) -> Option<(String, String)> {
    #[cfg(target_os = "macos")]
    return mac::prompt_credentials(title, message, username);

    #[cfg(target_os = "windows")]
    return windows::prompt_credentials(title, message, username);

    #[cfg(target_os = "linux")]
    return linux::prompt_credentials(title, message, username);

    #[cfg(not(any(target_os = "macos", target_os = "windows", target_os = "linux")))]
    {
        let _ = (title, message, username);
        None
    }
}

/// Prompt for a private key passphrase
///
/// On macOS, this must be called from the main thread.
pub fn prompt_passphrase(title: &str, config_name: &str) -> Option<String> {
    #[cfg(target_os = "macos")]
    return mac::prompt_passphrase(title, config_name);

    #[cfg(target_os = "windows")]
    return windows::prompt_passphrase(title, config_name);

    #[cfg(target_os = "linux")]
    return linux::prompt_passphrase(title, config_name);

    #[cfg(not(any(target_os = "macos", target_os = "windows", target_os = "linux")))]
    {
        let _ = (title, config_name);
        None
    }
}

/// Show a simple message dialog
pub fn show_message(title: &str, message: &str, is_error: bool) {
    #[cfg(target_os = "macos")]
    mac::show_message(title, message, is_error);

    #[cfg(target_os = "windows")]
    windows::show_message(title, message, is_error);

    #[cfg(target_os = "linux")]
    linux::show_message(title, message, is_error);

    #[cfg(not(any(target_os = "macos", target_os = "windows", target_os = "linux")))]
    {
        if is_error {
            tracing::error!("{}: {}", title, message);
        } else {
            tracing::info!("{}: {}", title, message);
        }
    }
}

/// Check if native dialogs are available
///
/// On Linux, this checks if zenity or kdialog is installed.
/// On macOS and Windows, this always returns true.
pub fn is_available() -> bool {
    #[cfg(any(target_os = "macos", target_os = "windows"))]
    return true;

    #[cfg(target_os = "linux")]
    return linux::is_available();

    #[cfg(not(any(target_os = "macos", target_os = "windows", target_os = "linux")))]
    {
        false
    }
}

/// Whether dialogs can only be shown from the main thread
pub fn requires_main_thread() -> bool {
    cfg!(target_os = "macos")
}

/// Whether the calling thread is the process's main thread
pub fn on_main_thread() -> bool {
    #[cfg(target_os = "macos")]
    return mac::on_main_thread();

    #[cfg(not(target_os = "macos"))]
    {
        std::thread::current().name() == Some("main")
    }
}

/// Text shown above the passphrase field
pub(crate) fn passphrase_message(config_name: &str) -> String {
    format!("Enter the private key passphrase for '{}'", config_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawned_thread_is_not_main() {
        let handle = std::thread::spawn(on_main_thread);
        assert!(!handle.join().unwrap());
    }

    #[test]
    fn test_passphrase_message() {
        assert_eq!(
            passphrase_message("office"),
            "Enter the private key passphrase for 'office'"
        );
    }
}
