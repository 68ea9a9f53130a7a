//! Implements PrompterPort. Inquire-based interactive prompts for Telegram login.

use crate::domain::DomainError;
use crate::ports::PrompterPort;
use inquire::{Password, PasswordDisplayMode, Text};

/// TUI adapter. Inquire prompts.
#[derive(Debug, Default)]
pub struct TuiPrompter;

impl TuiPrompter {
    pub fn new() -> Self {
        Self
    }
}

impl PrompterPort for TuiPrompter {
    fn login_code(&self, phone: &str) -> Result<String, DomainError> {
        Text::new("Login code:")
            .with_help_message(&format!("Telegram sent a code to {}", phone))
            .prompt()
            .map_err(|e| DomainError::Auth(e.to_string()))
    }

    fn password(&self, hint: Option<&str>) -> Result<String, DomainError> {
        let help = match hint {
            Some(h) => format!("2FA is enabled (hint: {})", h),
            None => "2FA is enabled".to_string(),
        };
        Password::new("Password:")
            .with_display_mode(PasswordDisplayMode::Masked)
            .without_confirmation()
            .with_help_message(&help)
            .prompt()
            .map_err(|e| DomainError::Auth(e.to_string()))
    }
}
