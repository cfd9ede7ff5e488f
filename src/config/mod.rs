//! Configuration loaded once at startup (env + `.env`).
//!
//! The three secrets are optional at load time. A missing credential is sent
//! as an empty value, and the remote service rejects it with an
//! authentication or not-found error.

use std::fmt;
use std::time::Duration;

use bon::Builder;

use crate::error::ClimaError;

pub const DEFAULT_ASSISTANT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_WEATHER_BASE_URL: &str = "https://api.openweathermap.org";

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);
const DEFAULT_MAX_WAIT: Duration = Duration::from_secs(120);

/// How the driver waits on a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Builder)]
pub struct PollSettings {
    /// Delay between two status fetches.
    #[builder(default = DEFAULT_POLL_INTERVAL)]
    pub interval: Duration,
    /// Upper bound on the whole wait; exceeding it is a timeout.
    #[builder(default = DEFAULT_MAX_WAIT)]
    pub max_wait: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_wait: DEFAULT_MAX_WAIT,
        }
    }
}

/// Process-wide configuration, passed by reference into the clients and driver.
#[derive(Clone)]
pub struct ClimaConfig {
    pub assistant_api_key: Option<String>,
    pub assistant_id: Option<String>,
    pub weather_api_key: Option<String>,
    pub assistant_base_url: String,
    pub weather_base_url: String,
    pub poll: PollSettings,
}

impl fmt::Debug for ClimaConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClimaConfig")
            .field("assistant_api_key", &self.assistant_api_key.as_ref().map(|_| ".."))
            .field("assistant_id", &self.assistant_id)
            .field("weather_api_key", &self.weather_api_key.as_ref().map(|_| ".."))
            .field("assistant_base_url", &self.assistant_base_url)
            .field("weather_base_url", &self.weather_base_url)
            .field("poll", &self.poll)
            .finish()
    }
}

impl Default for ClimaConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ClimaConfig {
    /// Empty config pointing at the public endpoints.
    pub fn new() -> Self {
        Self {
            assistant_api_key: None,
            assistant_id: None,
            weather_api_key: None,
            assistant_base_url: DEFAULT_ASSISTANT_BASE_URL.to_string(),
            weather_base_url: DEFAULT_WEATHER_BASE_URL.to_string(),
            poll: PollSettings::default(),
        }
    }

    /// Load from environment variables, reading `.env` first if present.
    pub fn from_env() -> Result<Self, ClimaError> {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ClimaError> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mut config = Self::new();
        config.assistant_api_key = non_empty("OPENAI_API_KEY");
        config.assistant_id = non_empty("ASSISTANT_ID");
        config.weather_api_key = non_empty("WEATHER_API_KEY");

        if let Some(url) = non_empty("OPENAI_BASE_URL") {
            config.assistant_base_url = url;
        }
        if let Some(url) = non_empty("WEATHER_BASE_URL") {
            config.weather_base_url = url;
        }

        if let Some(raw) = non_empty("CLIMA_POLL_INTERVAL_MS") {
            config.poll.interval = Duration::from_millis(parse_number("CLIMA_POLL_INTERVAL_MS", &raw)?);
        }
        if let Some(raw) = non_empty("CLIMA_MAX_WAIT_SECS") {
            config.poll.max_wait = Duration::from_secs(parse_number("CLIMA_MAX_WAIT_SECS", &raw)?);
        }

        Ok(config)
    }

    pub fn with_assistant_api_key(mut self, key: impl Into<String>) -> Self {
        self.assistant_api_key = Some(key.into());
        self
    }

    pub fn with_assistant_id(mut self, id: impl Into<String>) -> Self {
        self.assistant_id = Some(id.into());
        self
    }

    pub fn with_weather_api_key(mut self, key: impl Into<String>) -> Self {
        self.weather_api_key = Some(key.into());
        self
    }

    pub fn with_assistant_base_url(mut self, url: impl Into<String>) -> Self {
        self.assistant_base_url = url.into();
        self
    }

    pub fn with_weather_base_url(mut self, url: impl Into<String>) -> Self {
        self.weather_base_url = url.into();
        self
    }

    pub fn with_poll(mut self, poll: PollSettings) -> Self {
        self.poll = poll;
        self
    }

    /// Names of the secrets that were not supplied.
    pub fn missing_secrets(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.assistant_api_key.is_none() {
            missing.push("OPENAI_API_KEY");
        }
        if self.assistant_id.is_none() {
            missing.push("ASSISTANT_ID");
        }
        if self.weather_api_key.is_none() {
            missing.push("WEATHER_API_KEY");
        }
        missing
    }
}

fn parse_number(key: &str, raw: &str) -> Result<u64, ClimaError> {
    raw.trim()
        .parse()
        .map_err(|_| ClimaError::Configuration(format!("{key} must be a whole number, got '{raw}'")))
}
