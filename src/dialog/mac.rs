//! Native macOS dialogs using Cocoa/AppKit
//!
//! Uses NSAlert with NSSecureTextField for secret prompts,
//! avoiding osascript which gets SIGKILL'd when called from background threads.

use super::passphrase_message;
use objc2::{MainThreadMarker, MainThreadOnly};
use objc2_app_kit::{NSAlert, NSAlertStyle, NSApplication, NSSecureTextField, NSTextField, NSView};
use objc2_foundation::{NSPoint, NSRect, NSSize, NSString};

/// NSAlertFirstButtonReturn
const NS_ALERT_FIRST_BUTTON_RETURN: isize = 1000;

pub fn on_main_thread() -> bool {
    MainThreadMarker::new().is_some()
}

fn main_thread(caller: &str) -> Option<MainThreadMarker> {
    let mtm = MainThreadMarker::new();
    if mtm.is_none() {
        tracing::error!("{} must be called from the main thread", caller);
    }
    mtm
}

fn new_alert(mtm: MainThreadMarker, title: &str, message: &str) -> objc2::rc::Retained<NSAlert> {
    let _app = NSApplication::sharedApplication(mtm);

    let alert = NSAlert::new(mtm);
    alert.setAlertStyle(NSAlertStyle::Informational);
    alert.setMessageText(&NSString::from_str(title));
    alert.setInformativeText(&NSString::from_str(message));

    // First button = default/Enter, second = Cancel/Escape
    alert.addButtonWithTitle(&NSString::from_str("OK"));
    alert.addButtonWithTitle(&NSString::from_str("Cancel"));
    alert
}

/// Prompt for username and password using an NSAlert accessory view
///
/// Must be called from the main thread on macOS.
pub fn prompt_credentials(
    title: &str,
    message: &str,
    username: Option<&str>,
) -> Option<(String, String)> {
    let mtm = main_thread("prompt_credentials")?;
    let alert = new_alert(mtm, title, message);

    let container_frame = NSRect::new(NSPoint::new(0.0, 0.0), NSSize::new(300.0, 54.0));
    let container = NSView::initWithFrame(NSView::alloc(mtm), container_frame);

    let username_frame = NSRect::new(NSPoint::new(0.0, 30.0), NSSize::new(300.0, 22.0));
    let username_field = NSTextField::initWithFrame(NSTextField::alloc(mtm), username_frame);
    username_field.setPlaceholderString(Some(&NSString::from_str("Username")));
    if let Some(username) = username {
        username_field.setStringValue(&NSString::from_str(username));
    }
    container.addSubview(&username_field);

    let password_frame = NSRect::new(NSPoint::new(0.0, 0.0), NSSize::new(300.0, 22.0));
    let password_field =
        NSSecureTextField::initWithFrame(NSSecureTextField::alloc(mtm), password_frame);
    password_field.setPlaceholderString(Some(&NSString::from_str("Password")));
    container.addSubview(&password_field);

    alert.setAccessoryView(Some(&container));
    if username.is_some() {
        alert.window().setInitialFirstResponder(Some(&password_field));
    } else {
        alert.window().setInitialFirstResponder(Some(&username_field));
    }

    if alert.runModal() != NS_ALERT_FIRST_BUTTON_RETURN {
        return None;
    }

    let username = username_field.stringValue().to_string().trim().to_string();
    let password = password_field.stringValue().to_string();
    if username.is_empty() || password.is_empty() {
        return None;
    }
    Some((username, password))
}

/// Prompt for a private key passphrase
pub fn prompt_passphrase(title: &str, config_name: &str) -> Option<String> {
    let mtm = main_thread("prompt_passphrase")?;
    prompt_secret(mtm, title, &passphrase_message(config_name), "Passphrase")
}

fn prompt_secret(
    mtm: MainThreadMarker,
    title: &str,
    message: &str,
    placeholder: &str,
) -> Option<String> {
    let alert = new_alert(mtm, title, message);

    let frame = NSRect::new(NSPoint::new(0.0, 0.0), NSSize::new(300.0, 22.0));
    let secret_field = NSSecureTextField::initWithFrame(NSSecureTextField::alloc(mtm), frame);
    secret_field.setPlaceholderString(Some(&NSString::from_str(placeholder)));

    alert.setAccessoryView(Some(&secret_field));
    alert.window().setInitialFirstResponder(Some(&secret_field));

    if alert.runModal() != NS_ALERT_FIRST_BUTTON_RETURN {
        return None;
    }

    let secret = secret_field.stringValue().to_string();
    if secret.is_empty() { None } else { Some(secret) }
}

/// Show a simple message dialog
pub fn show_message(title: &str, message: &str, is_error: bool) {
    let Some(mtm) = MainThreadMarker::new() else {
        // Off the main thread, log instead
        if is_error {
            tracing::error!("{}: {}", title, message);
        } else {
            tracing::info!("{}: {}", title, message);
        }
        return;
    };

    let _app = NSApplication::sharedApplication(mtm);

    let alert = NSAlert::new(mtm);
    alert.setAlertStyle(if is_error {
        NSAlertStyle::Critical
    } else {
        NSAlertStyle::Informational
    });
    alert.setMessageText(&NSString::from_str(title));
    alert.setInformativeText(&NSString::from_str(message));
    alert.addButtonWithTitle(&NSString::from_str("OK"));

    alert.runModal();
}
