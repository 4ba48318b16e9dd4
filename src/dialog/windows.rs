//! Native Windows dialogs via CredUI

use super::passphrase_message;
use windows::core::{HSTRING, PCWSTR};
use windows::Win32::Foundation::{BOOL, HWND};
use windows::Win32::Security::Credentials::{
    CredUIPromptForCredentialsW, CREDUI_FLAGS_ALWAYS_SHOW_UI, CREDUI_FLAGS_DO_NOT_PERSIST,
    CREDUI_FLAGS_GENERIC_CREDENTIALS, CREDUI_FLAGS_KEEP_USERNAME, CREDUI_INFOW,
};
use windows::Win32::UI::WindowsAndMessaging::{
    MessageBoxW, MB_ICONERROR, MB_ICONINFORMATION, MB_OK,
};

/// CREDUI_MAX_USERNAME_LENGTH + 1
const USERNAME_BUF_LEN: usize = 514;
const PASSWORD_BUF_LEN: usize = 514;

/// Username shown (read-only) in the passphrase dialog
const PASSPHRASE_USERNAME: &str = "Private Key";

/// Prompt for credentials; a known username is pre-filled but stays editable
pub fn prompt_credentials(
    title: &str,
    message: &str,
    username: Option<&str>,
) -> Option<(String, String)> {
    credui_prompt(title, message, username, false)
}

pub fn prompt_passphrase(title: &str, config_name: &str) -> Option<String> {
    credui_prompt(
        title,
        &passphrase_message(config_name),
        Some(PASSPHRASE_USERNAME),
        true,
    )
    .map(|(_, passphrase)| passphrase)
}

fn to_wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

fn from_wide(buf: &[u16]) -> String {
    let end = buf.iter().position(|&c| c == 0).unwrap_or(buf.len());
    String::from_utf16_lossy(&buf[..end])
}

fn credui_prompt(
    title: &str,
    message: &str,
    username: Option<&str>,
    lock_username: bool,
) -> Option<(String, String)> {
    let mut username_buf = [0u16; USERNAME_BUF_LEN];
    let mut password_buf = [0u16; PASSWORD_BUF_LEN];
    let mut save = BOOL(0);

    if let Some(user) = username {
        let user_wide = to_wide(user);
        if user_wide.len() <= username_buf.len() {
            username_buf[..user_wide.len()].copy_from_slice(&user_wide);
        }
    }

    let message_h = HSTRING::from(message);
    let title_h = HSTRING::from(title);

    let info = CREDUI_INFOW {
        cbSize: std::mem::size_of::<CREDUI_INFOW>() as u32,
        hwndParent: HWND::default(),
        pszMessageText: if message.is_empty() {
            PCWSTR::null()
        } else {
            PCWSTR::from_raw(message_h.as_ptr())
        },
        pszCaptionText: PCWSTR::from_raw(title_h.as_ptr()),
        hbmBanner: Default::default(),
    };

    let mut flags = CREDUI_FLAGS_GENERIC_CREDENTIALS
        | CREDUI_FLAGS_ALWAYS_SHOW_UI
        | CREDUI_FLAGS_DO_NOT_PERSIST;
    if lock_username {
        flags |= CREDUI_FLAGS_KEEP_USERNAME;
    }

    let result = unsafe {
        CredUIPromptForCredentialsW(
            Some(&info),
            PCWSTR::null(),
            None,
            0,
            Some(&mut username_buf),
            Some(&mut password_buf),
            Some(&mut save),
            flags,
        )
    };

    // Anything but NO_ERROR (ERROR_CANCELLED included) counts as cancel
    if result != 0 {
        return None;
    }

    let username = from_wide(&username_buf).trim().to_string();
    let password = from_wide(&password_buf);
    password_buf.fill(0);

    if password.is_empty() || (!lock_username && username.is_empty()) {
        return None;
    }
    Some((username, password))
}

/// Show a message dialog
pub fn show_message(title: &str, message: &str, is_error: bool) {
    let title = HSTRING::from(title);
    let message = HSTRING::from(message);

    let icon = if is_error {
        MB_ICONERROR
    } else {
        MB_ICONINFORMATION
    };

    unsafe {
        MessageBoxW(
            HWND::default(),
            PCWSTR::from_raw(message.as_ptr()),
            PCWSTR::from_raw(title.as_ptr()),
            MB_OK | icon,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wide_round_trip() {
        let mut buf = [0u16; 16];
        let wide = to_wide("alice");
        buf[..wide.len()].copy_from_slice(&wide);
        assert_eq!(from_wide(&buf), "alice");
    }

    #[test]
    fn test_from_wide_without_terminator() {
        let buf: Vec<u16> = "bob".encode_utf16().collect();
        assert_eq!(from_wide(&buf), "bob");
    }
}
