//! Application configuration. API credentials, provider and digest settings.

use crate::adapters::ai::anthropic_adapter::{DEFAULT_API_URL, DEFAULT_MODEL};
use crate::adapters::image::replicate::DEFAULT_POLL_ATTEMPTS;
use crate::adapters::tools::imagemagick::DEFAULT_CONVERT_BIN;
use crate::domain::{DomainError, ImageModel, Locale};
use crate::usecases::rate_limiter::DEFAULT_REQUESTS_PER_MINUTE;
use crate::usecases::DigestStyle;
use serde::Deserialize;
use std::path::PathBuf;

/// Raw configuration as read from `DIGEST_*` env vars (and optional file).
#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    pub api_id: Option<i32>,
    pub api_hash: Option<String>,
    pub phone_number: Option<String>,
    /// Source channel username. Read from DIGEST_CHANNEL_USERNAME or CHANNEL_USERNAME.
    pub channel_username: Option<String>,
    pub session_path: Option<String>,

    // ─────────────────────────────────────────────────────────────────────────
    // Providers
    // ─────────────────────────────────────────────────────────────────────────
    /// Anthropic API key. Read from DIGEST_CLAUDE_API_KEY or CLAUDE_API_KEY.
    #[serde(default)]
    pub claude_api_key: Option<String>,

    #[serde(default)]
    pub claude_api_url: Option<String>,

    #[serde(default)]
    pub claude_model: Option<String>,

    /// Replicate token. Read from DIGEST_REPLICATE_API_TOKEN or REPLICATE_API_TOKEN.
    #[serde(default)]
    pub replicate_api_token: Option<String>,

    /// flux | flux-lora | redpanda
    #[serde(default)]
    pub image_model: Option<String>,

    /// Text-provider quota; also sets the throttle interval (60 / n seconds).
    #[serde(default)]
    pub requests_per_minute: Option<u32>,

    #[serde(default)]
    pub image_poll_attempts: Option<u32>,

    // ─────────────────────────────────────────────────────────────────────────
    // Output
    // ─────────────────────────────────────────────────────────────────────────
    /// Directory for the two temporary image files.
    #[serde(default)]
    pub work_dir: Option<String>,

    #[serde(default)]
    pub convert_bin: Option<String>,

    #[serde(default)]
    pub locale: Option<String>,

    #[serde(default)]
    pub digest_title: Option<String>,

    #[serde(default)]
    pub digest_footer: Option<String>,

    #[serde(default)]
    pub digest_language: Option<String>,
}

/// Validated configuration. Passed explicitly to the wiring in `main`.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_id: i32,
    pub api_hash: String,
    pub phone_number: String,
    pub channel_username: String,
    pub session_path: PathBuf,
    pub claude_api_key: String,
    pub claude_api_url: String,
    pub claude_model: String,
    pub replicate_api_token: String,
    pub image_model: ImageModel,
    pub requests_per_minute: u32,
    pub image_poll_attempts: u32,
    pub work_dir: PathBuf,
    pub convert_bin: String,
    pub digest_style: DigestStyle,
}

impl AppConfig {
    /// Expects `.env` to be loaded already (see `main`).
    pub fn load() -> Result<Self, config::ConfigError> {
        let mut c = config::Config::builder();
        c = c.add_source(config::Environment::with_prefix("DIGEST"));
        if let Ok(path) = std::env::var("DIGEST_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        let mut cfg: Self = c.build()?.try_deserialize()?;
        cfg.apply_legacy_env(|key| std::env::var(key).ok());
        Ok(cfg)
    }

    /// Fill unset fields from the unprefixed variable names
    /// (API_ID, API_HASH, PHONE_NUMBER, CHANNEL_USERNAME, CLAUDE_API_KEY, REPLICATE_API_TOKEN).
    pub fn apply_legacy_env(&mut self, get: impl Fn(&str) -> Option<String>) {
        if self.api_id.is_none() {
            self.api_id = get("API_ID").and_then(|s| s.trim().parse().ok());
        }
        fill(&mut self.api_hash, get("API_HASH"));
        fill(&mut self.phone_number, get("PHONE_NUMBER"));
        fill(&mut self.channel_username, get("CHANNEL_USERNAME"));
        fill(&mut self.claude_api_key, get("CLAUDE_API_KEY"));
        fill(&mut self.replicate_api_token, get("REPLICATE_API_TOKEN"));
    }

    /// Check required settings and apply defaults.
    ///
    /// Fails with every missing key listed. The Claude key is optional on dry runs.
    pub fn validate(&self, dry_run: bool) -> Result<Settings, DomainError> {
        let mut missing = Vec::new();
        let mut require = |name: &'static str, value: &Option<String>| -> String {
            match value.as_deref().map(str::trim) {
                Some(v) if !v.is_empty() => v.to_string(),
                _ => {
                    missing.push(name);
                    String::new()
                }
            }
        };

        let api_hash = require("api_hash", &self.api_hash);
        let phone_number = require("phone_number", &self.phone_number);
        let channel_username = require("channel_username", &self.channel_username);
        let replicate_api_token = require("replicate_api_token", &self.replicate_api_token);
        let claude_api_key = if dry_run {
            self.claude_api_key.clone().unwrap_or_default()
        } else {
            require("claude_api_key", &self.claude_api_key)
        };
        let api_id = match self.api_id {
            Some(id) if id != 0 => id,
            _ => {
                missing.push("api_id");
                0
            }
        };

        if !missing.is_empty() {
            return Err(DomainError::Config(format!(
                "missing required settings: {} (set DIGEST_<NAME> or the legacy variable in .env)",
                missing.join(", ")
            )));
        }

        let requests_per_minute = self
            .requests_per_minute
            .unwrap_or(DEFAULT_REQUESTS_PER_MINUTE);
        if requests_per_minute == 0 {
            return Err(DomainError::Config(
                "requests_per_minute must be at least 1".into(),
            ));
        }

        let image_model = match self.image_model.as_deref() {
            Some(s) => s.parse::<ImageModel>()?,
            None => ImageModel::default(),
        };
        let locale = match self.locale.as_deref() {
            Some(s) => s.parse::<Locale>()?,
            None => Locale::default(),
        };
        let defaults = DigestStyle::default();

        Ok(Settings {
            api_id,
            api_hash,
            phone_number,
            channel_username: channel_username.trim_start_matches('@').to_string(),
            session_path: PathBuf::from(self.session_path.as_deref().unwrap_or("./session.db")),
            claude_api_key,
            claude_api_url: self
                .claude_api_url
                .clone()
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            claude_model: self
                .claude_model
                .clone()
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            replicate_api_token,
            image_model,
            requests_per_minute,
            image_poll_attempts: self.image_poll_attempts.unwrap_or(DEFAULT_POLL_ATTEMPTS),
            work_dir: PathBuf::from(self.work_dir.as_deref().unwrap_or(".")),
            convert_bin: self
                .convert_bin
                .clone()
                .unwrap_or_else(|| DEFAULT_CONVERT_BIN.to_string()),
            digest_style: DigestStyle {
                title: self.digest_title.clone().unwrap_or(defaults.title),
                // Env files cannot hold raw newlines; accept the escaped form.
                footer: self
                    .digest_footer
                    .as_deref()
                    .map(|f| f.replace("\\n", "\n"))
                    .unwrap_or(defaults.footer),
                language: self.digest_language.clone().unwrap_or(defaults.language),
                locale,
            },
        })
    }
}

fn fill(slot: &mut Option<String>, fallback: Option<String>) {
    if slot.is_none() {
        *slot = fallback;
    }
}
