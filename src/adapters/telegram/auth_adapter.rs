//! AuthPort over a grammers Client. Shares its session with the channel gateway.

use crate::domain::{DomainError, SignInResult};
use crate::ports::AuthPort;
use async_trait::async_trait;
use grammers_client::client::{LoginToken, PasswordToken};
use grammers_client::{Client, SignInError};
use tokio::sync::Mutex;
use tracing::debug;

/// Where the login flow currently stands. Each token is consumed by the next step.
#[derive(Default)]
enum LoginStage {
    #[default]
    Idle,
    CodeSent(LoginToken),
    AwaitingPassword(PasswordToken),
}

impl LoginStage {
    fn name(&self) -> &'static str {
        match self {
            LoginStage::Idle => "idle",
            LoginStage::CodeSent(_) => "code_sent",
            LoginStage::AwaitingPassword(_) => "awaiting_password",
        }
    }
}

pub struct GrammersAuthAdapter {
    client: Client,
    stage: Mutex<LoginStage>,
}

impl GrammersAuthAdapter {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            stage: Mutex::new(LoginStage::Idle),
        }
    }
}

fn out_of_order(expected: &str, stage: &LoginStage) -> DomainError {
    DomainError::Auth(format!(
        "login step out of order: expected {}, flow is {}",
        expected,
        stage.name()
    ))
}

#[async_trait]
impl AuthPort for GrammersAuthAdapter {
    async fn is_authorized(&self) -> Result<bool, DomainError> {
        self.client
            .is_authorized()
            .await
            .map_err(|e| DomainError::Auth(format!("session check: {}", e)))
    }

    async fn request_login_code(&self, phone: &str, api_hash: &str) -> Result<(), DomainError> {
        let token = self
            .client
            .request_login_code(phone, api_hash)
            .await
            .map_err(|e| DomainError::Auth(format!("login code request failed: {}", e)))?;
        *self.stage.lock().await = LoginStage::CodeSent(token);
        debug!("login code sent");
        Ok(())
    }

    async fn sign_in(&self, code: &str) -> Result<SignInResult, DomainError> {
        let mut stage = self.stage.lock().await;
        let token = match std::mem::take(&mut *stage) {
            LoginStage::CodeSent(token) => token,
            other => {
                let err = out_of_order("code_sent", &other);
                *stage = other;
                return Err(err);
            }
        };
        match self.client.sign_in(&token, code).await {
            Ok(_) => Ok(SignInResult::Success),
            Err(SignInError::PasswordRequired(pt)) => {
                let hint = pt.hint().map(String::from);
                *stage = LoginStage::AwaitingPassword(pt);
                Ok(SignInResult::PasswordRequired { hint })
            }
            Err(SignInError::InvalidCode) => {
                Err(DomainError::Auth("the login code was rejected".into()))
            }
            Err(SignInError::SignUpRequired) => Err(DomainError::Auth(
                "this phone number has no Telegram account".into(),
            )),
            Err(e) => Err(DomainError::Auth(format!("sign in failed: {}", e))),
        }
    }

    async fn check_password(&self, password: &[u8]) -> Result<(), DomainError> {
        let mut stage = self.stage.lock().await;
        let pt = match std::mem::take(&mut *stage) {
            LoginStage::AwaitingPassword(pt) => pt,
            other => {
                let err = out_of_order("awaiting_password", &other);
                *stage = other;
                return Err(err);
            }
        };
        self.client
            .check_password(pt, password)
            .await
            .map(|_| ())
            .map_err(|e| DomainError::Auth(format!("two-step password rejected: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_order_names_both_stages() {
        let err = out_of_order("awaiting_password", &LoginStage::Idle).to_string();
        assert!(err.contains("awaiting_password"));
        assert!(err.contains("idle"));
    }
}
