//! Login / 2FA flow. Runs before any channel I/O.
//!
//! The session itself is persisted by the Telegram adapter, so this only
//! prompts on the first run (or after the session was revoked).

use crate::domain::{DomainError, SignInResult};
use crate::ports::{AuthPort, PrompterPort};
use std::sync::Arc;
use tracing::info;

pub struct AuthService {
    auth: Arc<dyn AuthPort>,
    prompter: Arc<dyn PrompterPort>,
    phone: String,
    api_hash: String,
}

impl AuthService {
    pub fn new(
        auth: Arc<dyn AuthPort>,
        prompter: Arc<dyn PrompterPort>,
        phone: String,
        api_hash: String,
    ) -> Self {
        Self {
            auth,
            prompter,
            phone,
            api_hash,
        }
    }

    /// Ensure the session is authorized (phone -> code -> 2FA if needed).
    pub async fn ensure_authorized(&self) -> Result<(), DomainError> {
        if self.auth.is_authorized().await? {
            info!("Telegram session already authorized");
            return Ok(());
        }

        info!(phone = %mask(&self.phone), "requesting Telegram login code");
        self.auth
            .request_login_code(&self.phone, &self.api_hash)
            .await?;
        let code = self.prompter.login_code(&self.phone)?;

        match self.auth.sign_in(code.trim()).await? {
            SignInResult::Success => {}
            SignInResult::PasswordRequired { hint } => {
                let password = self.prompter.password(hint.as_deref())?;
                self.auth.check_password(password.as_bytes()).await?;
            }
        }
        info!("signed in to Telegram");
        Ok(())
    }
}

/// Keep the first and last few characters of a secret for logs.
pub fn mask(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..3].iter().collect();
    let tail: String = chars[chars.len() - 3..].iter().collect();
    format!("{}...{}", head, tail)
}
