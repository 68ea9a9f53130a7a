//! Domain entities. Pure data structures for the digest pipeline.
//!
//! No Telegram/HTTP types here — adapters map into these.

use super::errors::DomainError;
use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime, TimeDelta, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Placeholder digest returned when the reporting period has no messages.
pub const NO_MESSAGES_SENTINEL: &str = "No messages were found to create a digest.";

const MONTHS_RU: [&str; 12] = [
    "января", "февраля", "марта", "апреля", "мая", "июня",
    "июля", "августа", "сентября", "октября", "ноября", "декабря",
];

const MONTHS_EN: [&str; 12] = [
    "January", "February", "March", "April", "May", "June",
    "July", "August", "September", "October", "November", "December",
];

/// Language of month names in the digest date label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Ru,
    En,
}

impl Locale {
    /// Month name for a 1-based month number (genitive case for Russian).
    pub fn month_name(self, month: u32) -> &'static str {
        let idx = month.clamp(1, 12) as usize - 1;
        match self {
            Locale::Ru => MONTHS_RU[idx],
            Locale::En => MONTHS_EN[idx],
        }
    }
}

impl FromStr for Locale {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ru" => Ok(Locale::Ru),
            "en" => Ok(Locale::En),
            other => Err(DomainError::Config(format!("unknown locale '{}'", other))),
        }
    }
}

/// Reporting period. Invariant: `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl DateRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, DomainError> {
        if start > end {
            return Err(DomainError::InvalidRange(format!(
                "start {} is after end {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// Whole days: `start` at 00:00:00, `end` at 23:59:59.999999 (UTC).
    pub fn from_dates(start: NaiveDate, end: NaiveDate) -> Result<Self, DomainError> {
        Self::new(start_of_day(start), end_of_day(end))
    }

    /// Parse `YYYY-MM-DD` strings (as passed on the command line).
    pub fn parse(start: &str, end: &str) -> Result<Self, DomainError> {
        let parse = |s: &str| {
            NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|e| {
                DomainError::InvalidRange(format!("'{}' is not a YYYY-MM-DD date: {}", s, e))
            })
        };
        Self::from_dates(parse(start)?, parse(end)?)
    }

    /// Explicit dates when both are given, the previous week when neither is.
    pub fn resolve(
        start: Option<&str>,
        end: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        match (start, end) {
            (Some(s), Some(e)) => Self::parse(s, e),
            (None, None) => Ok(Self::previous_week(now)),
            _ => Err(DomainError::Config(
                "--start-date and --end-date must be given together".into(),
            )),
        }
    }

    /// Most recent complete Monday–Sunday week relative to `now`.
    ///
    /// On a Sunday the current week counts as complete (Monday through today).
    pub fn previous_week(now: DateTime<Utc>) -> Self {
        let today = now.date_naive();
        let sunday = if today.weekday() == Weekday::Sun {
            today
        } else {
            today - Days::new(u64::from(today.weekday().number_from_monday()))
        };
        let monday = sunday - Days::new(6);
        Self {
            start: start_of_day(monday),
            end: end_of_day(sunday),
        }
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.start <= ts && ts <= self.end
    }

    /// Human-readable label: `"3-9 марта"` within one month,
    /// `"30 марта - 2 апреля"` across months.
    pub fn label(&self, locale: Locale) -> String {
        let (s, e) = (self.start, self.end);
        if s.month() == e.month() && s.year() == e.year() {
            format!("{}-{} {}", s.day(), e.day(), locale.month_name(e.month()))
        } else {
            format!(
                "{} {} - {} {}",
                s.day(),
                locale.month_name(s.month()),
                e.day(),
                locale.month_name(e.month())
            )
        }
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} .. {}",
            self.start.format("%Y-%m-%d %H:%M:%S"),
            self.end.format("%Y-%m-%d %H:%M:%S")
        )
    }
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    start_of_day(date) + TimeDelta::days(1) - TimeDelta::microseconds(1)
}

/// A single channel post with its permanent link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceMessage {
    pub id: i32,
    pub date: DateTime<Utc>,
    pub text: String,
    pub link: String,
}

impl SourceMessage {
    pub fn has_body(&self) -> bool {
        !self.text.trim().is_empty()
    }

    /// One entry of the LLM message log.
    pub fn log_entry(&self) -> String {
        format!(
            "{} - {}\nMessage link: {}",
            self.date.format("%Y-%m-%d %H:%M"),
            self.text,
            self.link
        )
    }
}

/// Joins messages into the chronological log embedded in the digest prompt.
pub fn message_log(messages: &[SourceMessage]) -> String {
    messages
        .iter()
        .map(SourceMessage::log_entry)
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Finished digest markdown. Always normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestDocument {
    markdown: String,
}

impl DigestDocument {
    pub fn new(markdown: &str) -> Self {
        Self {
            markdown: super::markdown::normalize(markdown),
        }
    }

    pub fn sentinel() -> Self {
        Self {
            markdown: NO_MESSAGES_SENTINEL.to_string(),
        }
    }

    pub fn is_sentinel(&self) -> bool {
        self.markdown == NO_MESSAGES_SENTINEL
    }

    pub fn markdown(&self) -> &str {
        &self.markdown
    }
}

/// Text-to-image model variants available on Replicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImageModel {
    /// black-forest-labs/flux-pro
    #[default]
    Flux,
    /// flux-dev with the Retro-Collage-Art LoRA
    FluxLora,
    /// recraft-ai/recraft-v3 ("red panda"); takes a style tag
    #[serde(rename = "redpanda")]
    RedPanda,
}

impl ImageModel {
    /// Advisory length of the image description, in characters.
    pub fn prompt_char_target(self) -> usize {
        match self {
            ImageModel::Flux | ImageModel::FluxLora => 512,
            ImageModel::RedPanda => 1000,
        }
    }

    /// Model name as it appears in the image-prompt instructions.
    pub fn display_name(self) -> &'static str {
        match self {
            ImageModel::Flux => "FLUX 1 PRO",
            ImageModel::FluxLora => "FLUX 1 DEV",
            ImageModel::RedPanda => "Recraft V3",
        }
    }
}

impl FromStr for ImageModel {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "flux" => Ok(ImageModel::Flux),
            "flux-lora" | "flux_lora" => Ok(ImageModel::FluxLora),
            "redpanda" | "red-panda" | "recraft" => Ok(ImageModel::RedPanda),
            other => Err(DomainError::Config(format!(
                "unknown image model '{}' (expected flux, flux-lora or redpanda)",
                other
            ))),
        }
    }
}

impl fmt::Display for ImageModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ImageModel::Flux => "flux",
            ImageModel::FluxLora => "flux-lora",
            ImageModel::RedPanda => "redpanda",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Webp,
    Png,
    Jpeg,
}

impl ImageFormat {
    /// Infer from the URL path extension; providers default to webp.
    pub fn from_url(url: &str) -> Self {
        let path = url.split(['?', '#']).next().unwrap_or(url);
        let ext = path.rsplit_once('.').map(|(_, e)| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("png") => ImageFormat::Png,
            Some("jpg") | Some("jpeg") => ImageFormat::Jpeg,
            _ => ImageFormat::Webp,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Webp => "webp",
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
        }
    }
}

/// Image on disk, ready to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    pub path: PathBuf,
    pub format: ImageFormat,
}

/// Result of submitting a Telegram login code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignInResult {
    Success,
    /// Account has 2FA enabled; `check_password` must follow.
    PasswordRequired { hint: Option<String> },
}

/// Terminal state of one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineOutcome {
    Delivered { with_image: bool },
    NoMessages,
    DigestFailed,
}
