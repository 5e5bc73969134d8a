//! Dialog Notification Module
//!
//! This module shows a report summary in a native OS dialog by shelling out
//! to the platform's dialog command (osascript on macOS, zenity on Linux, a
//! PowerShell message box on Windows). The core pipeline only depends on the
//! [`Notifier`] trait; a dialog failure is reported as an error for the
//! caller to log, never a panic.

use crate::error::{ReportError, Result};
use std::process::Command;

/// Delivers a rendered summary to the user outside stdout.
pub trait Notifier {
    fn notify(&self, summary: &str) -> Result<()>;
}

/// Escapes text for embedding inside a double-quoted command string:
/// backslashes are doubled first, then double quotes are escaped.
pub fn quote_escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Shows the summary in a native dialog window.
pub struct DialogNotifier;

impl Notifier for DialogNotifier {
    fn notify(&self, summary: &str) -> Result<()> {
        let status = dialog_command(summary).status()?;
        if !status.success() {
            return Err(ReportError::Dialog(format!(
                "dialog command exited with {}",
                status
            )));
        }
        Ok(())
    }
}

#[cfg(target_os = "macos")]
fn dialog_command(summary: &str) -> Command {
    let script = format!(
        "display dialog \"{}\" with title \"DMARC Report\" buttons {{\"OK\"}}",
        quote_escape(summary)
    );
    let mut cmd = Command::new("osascript");
    cmd.arg("-e").arg(script);
    cmd
}

#[cfg(target_os = "windows")]
fn dialog_command(summary: &str) -> Command {
    let script = format!(
        "Add-Type -AssemblyName PresentationFramework; \
         [System.Windows.MessageBox]::Show(\"{}\", \"DMARC Report\") | Out-Null",
        quote_escape(summary)
    );
    let mut cmd = Command::new("powershell");
    cmd.args(["-NoProfile", "-Command"]).arg(script);
    cmd
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn dialog_command(summary: &str) -> Command {
    // zenity takes the text as a plain argument, so no escaping is required.
    let mut cmd = Command::new("zenity");
    cmd.args(["--info", "--title", "DMARC Report", "--text"])
        .arg(summary);
    cmd
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_escape_plain_text_unchanged() {
        assert_eq!(quote_escape("All clear"), "All clear");
    }

    #[test]
    fn test_quote_escape_quotes_and_backslashes() {
        assert_eq!(quote_escape(r#"say "hi""#), r#"say \"hi\""#);
        assert_eq!(quote_escape(r"a\b"), r"a\\b");
        // Backslashes are doubled before quotes are escaped.
        assert_eq!(quote_escape(r#"\""#), r#"\\\""#);
    }
}
