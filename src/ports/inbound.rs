//! Inbound port. UI (adapter) supplies interactive input to the application.

use crate::domain::DomainError;

/// Prompts the operator during Telegram login.
pub trait PrompterPort: Send + Sync {
    /// Ask for the login code Telegram just sent.
    fn login_code(&self, phone: &str) -> Result<String, DomainError>;

    /// Ask for the 2FA password. `hint` is the account's password hint, if any.
    fn password(&self, hint: Option<&str>) -> Result<String, DomainError>;
}
