//! Native Linux dialogs using zenity/kdialog
//!
//! Linux doesn't have the same security restrictions as macOS,
//! so command-line dialog tools work fine from background threads.

use super::passphrase_message;
use std::process::Command;

/// Check if any dialog tool is available
pub fn is_available() -> bool {
    has_tool("zenity") || has_tool("kdialog")
}

fn has_tool(name: &str) -> bool {
    Command::new("which")
        .arg(name)
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Run a dialog tool and return what it printed, minus the final newline
///
/// A non-zero exit (Cancel, Escape, window closed), an empty answer or
/// output that is not UTF-8 is `None`. Other whitespace is kept, so
/// secrets come back exactly as typed.
fn run_dialog(tool: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(tool)
        .args(args)
        .output()
        .ok()
        .filter(|o| o.status.success())?;

    let mut answer = match String::from_utf8(output.stdout) {
        Ok(answer) => answer,
        Err(_) => {
            tracing::warn!("{} returned non UTF-8 input, treating as cancelled", tool);
            return None;
        }
    };
    if answer.ends_with('\n') {
        answer.pop();
    }
    if answer.is_empty() { None } else { Some(answer) }
}

/// Like [`run_dialog`], for a username field
fn run_entry(tool: &str, args: &[&str]) -> Option<String> {
    run_dialog(tool, args)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Arguments for a username entry, pre-filled with `username` when known
fn username_args<'a>(
    tool: &str,
    title: &'a str,
    text: &'a str,
    username: Option<&'a str>,
) -> Vec<&'a str> {
    let mut args = match tool {
        "kdialog" => vec!["--title", title, "--inputbox", text],
        _ => vec!["--entry", "--title", title, "--text", text],
    };
    if let Some(username) = username {
        if tool != "kdialog" {
            args.push("--entry-text");
        }
        args.push(username);
    }
    args
}

/// Prompt for a username, then a password
pub fn prompt_credentials(
    title: &str,
    message: &str,
    username: Option<&str>,
) -> Option<(String, String)> {
    let text = format!("{}\n\nUsername:", message);

    for tool in ["zenity", "kdialog"] {
        if has_tool(tool) {
            let username = run_entry(tool, &username_args(tool, title, &text, username))?;
            let password = secret_dialog(tool, title, &format!("Password for {}:", username))?;
            return Some((username, password));
        }
    }

    tracing::warn!("No dialog tool available (zenity or kdialog)");
    None
}

/// Prompt for a private key passphrase
pub fn prompt_passphrase(title: &str, config_name: &str) -> Option<String> {
    let message = passphrase_message(config_name);

    for tool in ["zenity", "kdialog"] {
        if has_tool(tool) {
            return secret_dialog(tool, title, &message);
        }
    }

    tracing::warn!("No dialog tool available (zenity or kdialog)");
    None
}

fn secret_dialog(tool: &str, title: &str, message: &str) -> Option<String> {
    match tool {
        "kdialog" => run_dialog(tool, &["--title", title, "--password", message]),
        _ => run_dialog(tool, &["--password", "--title", title, "--text", message]),
    }
}

/// Show a message dialog
pub fn show_message(title: &str, message: &str, is_error: bool) {
    if has_tool("zenity") {
        let icon = if is_error { "--error" } else { "--info" };
        let _ = Command::new("zenity")
            .args([icon, "--title", title, "--text", message])
            .status();
    } else if has_tool("kdialog") {
        let cmd = if is_error { "--error" } else { "--msgbox" };
        let _ = Command::new("kdialog")
            .args(["--title", title, cmd, message])
            .status();
    } else if is_error {
        tracing::error!("{}: {}", title, message);
    } else {
        tracing::info!("{}: {}", title, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_dialog_success() {
        assert_eq!(run_dialog("echo", &["alice"]), Some("alice".to_string()));
    }

    #[test]
    fn test_run_dialog_keeps_secret_whitespace() {
        assert_eq!(
            run_dialog("printf", &["%s\n", "  pass word  "]),
            Some("  pass word  ".to_string())
        );
    }

    #[test]
    fn test_run_dialog_strips_one_newline() {
        assert_eq!(
            run_dialog("printf", &["%s\n\n", "secret"]),
            Some("secret\n".to_string())
        );
    }

    #[test]
    fn test_run_dialog_rejects_invalid_utf8() {
        assert_eq!(run_dialog("printf", &["\\377\\376\n"]), None);
    }

    #[test]
    fn test_run_entry_trims_username() {
        assert_eq!(run_entry("echo", &["  alice  "]), Some("alice".to_string()));
        assert_eq!(run_entry("echo", &["   "]), None);
    }

    #[test]
    fn test_run_dialog_failure_is_cancel() {
        assert_eq!(run_dialog("false", &[]), None);
    }

    #[test]
    fn test_run_dialog_empty_is_cancel() {
        assert_eq!(run_dialog("true", &[]), None);
    }

    #[test]
    fn test_run_dialog_missing_tool() {
        assert_eq!(run_dialog("definitely-not-a-dialog-tool", &[]), None);
    }

    #[test]
    fn test_username_args_prefill_zenity() {
        let args = username_args("zenity", "VPN", "User:", Some("alice"));
        assert_eq!(
            args,
            vec!["--entry", "--title", "VPN", "--text", "User:", "--entry-text", "alice"]
        );
    }

    #[test]
    fn test_username_args_prefill_kdialog() {
        let args = username_args("kdialog", "VPN", "User:", Some("alice"));
        assert_eq!(args, vec!["--title", "VPN", "--inputbox", "User:", "alice"]);
    }

    #[test]
    fn test_username_args_without_hint() {
        let args = username_args("zenity", "VPN", "User:", None);
        assert!(!args.contains(&"--entry-text"));
    }
}
