//! Destructive-action confirmation seam
//!
//! Every delete in the client goes through a `ConfirmAction` before any
//! request is issued. The CLI implementation asks on stdin; embedders
//! supply their own dialog.

/// Capability to confirm a destructive action described in plain words
/// (e.g. `delete subject "Biology"`).
pub trait ConfirmAction {
    fn confirm(&self, description: &str) -> bool;
}

/// Interactive stdin prompt.
pub struct StdinConfirm;

impl ConfirmAction for StdinConfirm {
    fn confirm(&self, description: &str) -> bool {
        use std::io::Write;

        print!("Really {}? [y/N] ", description);
        let _ = std::io::stdout().flush();

        let mut line = String::new();
        if std::io::stdin().read_line(&mut line).is_err() {
            return false;
        }
        matches!(line.trim(), "y" | "Y" | "yes")
    }
}

/// Non-interactive approval, for `--yes` runs.
pub struct AssumeYes;

impl ConfirmAction for AssumeYes {
    fn confirm(&self, _description: &str) -> bool {
        true
    }
}

/// Always declines. Used in tests.
pub struct Decline;

impl ConfirmAction for Decline {
    fn confirm(&self, _description: &str) -> bool {
        false
    }
}
