//! OpenVPN management interface line protocol
//!
//! Only the parts needed to answer credential requests are modelled:
//!
//! | Line | Meaning |
//! |------|---------|
//! | `>PASSWORD:Need 'Auth' username/password` | Username + password wanted |
//! | `>PASSWORD:Need 'Private Key' password` | Key passphrase wanted |
//! | `>PASSWORD:Verification Failed: 'Auth'` | Server rejected the last answer |
//! | `>HOLD:Waiting for hold release` | OpenVPN paused until `hold release` |

use zeroize::Zeroizing;

/// Sent in reply to `>HOLD`
pub const HOLD_RELEASE: &str = "hold release\n";

/// Sent to abort the connection attempt
pub const ABORT: &str = "signal SIGTERM\n";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManagementEvent {
    /// OpenVPN needs the secret for `realm`
    NeedPassword { realm: String },
    /// The secret supplied for `realm` was rejected
    VerificationFailed { realm: String },
    Hold,
    Info(String),
    Success(String),
    Error(String),
    Other(String),
}

/// Parse one line received from the management interface
pub fn parse_line(line: &str) -> ManagementEvent {
    let line = line.trim_end_matches(['\r', '\n']);

    if let Some(rest) = line.strip_prefix(">PASSWORD:") {
        if let Some(rest) = rest.strip_prefix("Need ") {
            if let Some(realm) = quoted_realm(rest) {
                return ManagementEvent::NeedPassword { realm };
            }
        } else if let Some(rest) = rest.strip_prefix("Verification Failed:") {
            if let Some(realm) = quoted_realm(rest.trim_start()) {
                return ManagementEvent::VerificationFailed { realm };
            }
        }
        return ManagementEvent::Other(line.to_string());
    }

    if line.starts_with(">HOLD:") {
        return ManagementEvent::Hold;
    }
    if let Some(rest) = line.strip_prefix(">INFO:") {
        return ManagementEvent::Info(rest.to_string());
    }
    if let Some(rest) = line.strip_prefix("SUCCESS:") {
        return ManagementEvent::Success(rest.trim().to_string());
    }
    if let Some(rest) = line.strip_prefix("ERROR:") {
        return ManagementEvent::Error(rest.trim().to_string());
    }

    ManagementEvent::Other(line.to_string())
}

/// Extract `X` from a string starting with `'X'`
fn quoted_realm(s: &str) -> Option<String> {
    let rest = s.strip_prefix('\'')?;
    let end = rest.find('\'')?;
    Some(rest[..end].to_string())
}

/// Double-quote a value, backslash-escaping `\` and `"`
pub fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        if c == '\\' || c == '"' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

pub fn username_command(realm: &str, username: &str) -> String {
    format!("username {} {}\n", quote(realm), quote(username))
}

pub fn password_command(realm: &str, secret: &str) -> Zeroizing<String> {
    let quoted = Zeroizing::new(quote(secret));
    Zeroizing::new(format!("password {} {}\n", quote(realm), quoted.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_need_auth() {
        assert_eq!(
            parse_line(">PASSWORD:Need 'Auth' username/password\r\n"),
            ManagementEvent::NeedPassword {
                realm: "Auth".to_string()
            }
        );
    }

    #[test]
    fn test_parse_need_private_key() {
        assert_eq!(
            parse_line(">PASSWORD:Need 'Private Key' password"),
            ManagementEvent::NeedPassword {
                realm: "Private Key".to_string()
            }
        );
    }

    #[test]
    fn test_parse_need_with_static_challenge() {
        assert_eq!(
            parse_line(">PASSWORD:Need 'Auth' username/password SC:1,Enter PIN"),
            ManagementEvent::NeedPassword {
                realm: "Auth".to_string()
            }
        );
    }

    #[test]
    fn test_parse_verification_failed() {
        assert_eq!(
            parse_line(">PASSWORD:Verification Failed: 'Auth'"),
            ManagementEvent::VerificationFailed {
                realm: "Auth".to_string()
            }
        );
    }

    #[test]
    fn test_parse_other_password_message() {
        assert!(matches!(
            parse_line(">PASSWORD:Auth-Token:abc"),
            ManagementEvent::Other(_)
        ));
        assert!(matches!(
            parse_line(">PASSWORD:Need Auth"),
            ManagementEvent::Other(_)
        ));
    }

    #[test]
    fn test_parse_misc() {
        assert_eq!(
            parse_line(">HOLD:Waiting for hold release:0"),
            ManagementEvent::Hold
        );
        assert_eq!(
            parse_line(">INFO:OpenVPN Management Interface Version 5"),
            ManagementEvent::Info("OpenVPN Management Interface Version 5".to_string())
        );
        assert_eq!(
            parse_line("SUCCESS: password is correct"),
            ManagementEvent::Success("password is correct".to_string())
        );
        assert_eq!(
            parse_line("ERROR: unknown command"),
            ManagementEvent::Error("unknown command".to_string())
        );
        assert_eq!(
            parse_line(">STATE:1700000000,CONNECTED"),
            ManagementEvent::Other(">STATE:1700000000,CONNECTED".to_string())
        );
    }

    #[test]
    fn test_quote_escapes() {
        assert_eq!(quote("plain"), "\"plain\"");
        assert_eq!(quote("has space"), "\"has space\"");
        assert_eq!(quote(r#"a"b\c"#), r#""a\"b\\c""#);
        assert_eq!(quote(""), "\"\"");
    }

    #[test]
    fn test_commands() {
        assert_eq!(username_command("Auth", "alice"), "username \"Auth\" \"alice\"\n");
        assert_eq!(
            password_command("Private Key", "p\"w").as_str(),
            "password \"Private Key\" \"p\\\"w\"\n"
        );
    }
}
