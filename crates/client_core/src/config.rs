use std::{fs, time::Duration};

use anyhow::Context;
use thiserror::Error;
use url::Url;

pub const SETTINGS_FILE: &str = "events.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub api_url: String,
    pub request_timeout_secs: u64,
    pub navigation_delay_ms: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:10000/api/v1".into(),
            request_timeout_secs: 10,
            navigation_delay_ms: 1500,
        }
    }
}

impl ClientSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn navigation_delay(&self) -> Duration {
        Duration::from_millis(self.navigation_delay_ms)
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("invalid api url '{url}': {source}")]
    InvalidApiUrl {
        url: String,
        source: url::ParseError,
    },
    #[error("api url '{0}' must use http or https")]
    UnsupportedScheme(String),
    #[error("failed to build http client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

/// Defaults, then `events.toml` in the working directory, then environment.
pub fn load_settings() -> anyhow::Result<ClientSettings> {
    let mut settings = ClientSettings::default();

    if let Ok(raw) = fs::read_to_string(SETTINGS_FILE) {
        apply_file_overrides(&mut settings, &raw)
            .with_context(|| format!("failed to read settings from {SETTINGS_FILE}"))?;
    }

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());

    settings.api_url = normalize_api_url(&settings.api_url)?;
    Ok(settings)
}

pub fn apply_file_overrides(settings: &mut ClientSettings, raw: &str) -> anyhow::Result<()> {
    let table: toml::Table = toml::from_str(raw)?;

    if let Some(v) = table.get("api_url").and_then(toml::Value::as_str) {
        settings.api_url = v.to_string();
    }
    if let Some(v) = table.get("request_timeout_secs") {
        settings.request_timeout_secs = toml_u64(v).context("request_timeout_secs")?;
    }
    if let Some(v) = table.get("navigation_delay_ms") {
        settings.navigation_delay_ms = toml_u64(v).context("navigation_delay_ms")?;
    }

    Ok(())
}

fn toml_u64(value: &toml::Value) -> anyhow::Result<u64> {
    let raw = value
        .as_integer()
        .with_context(|| format!("expected an integer, got {value}"))?;
    u64::try_from(raw).with_context(|| format!("expected a non-negative integer, got {raw}"))
}

/// `lookup` resolves an environment variable; injected so tests stay hermetic.
pub fn apply_env_overrides(
    settings: &mut ClientSettings,
    lookup: impl Fn(&str) -> Option<String>,
) {
    if let Some(v) = lookup("API_URL") {
        settings.api_url = v;
    }
    if let Some(v) = lookup("EVENTS_API_URL") {
        settings.api_url = v;
    }

    if let Some(v) = lookup("EVENTS_REQUEST_TIMEOUT_SECS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.request_timeout_secs = parsed;
        }
    }

    if let Some(v) = lookup("EVENTS_NAVIGATION_DELAY_MS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.navigation_delay_ms = parsed;
        }
    }
}

pub fn normalize_api_url(raw: &str) -> Result<String, SettingsError> {
    parse_api_url(raw)?;
    Ok(raw.trim().trim_end_matches('/').to_string())
}

/// Parses an http(s) base url with any trailing slash removed.
pub fn parse_api_url(raw: &str) -> Result<Url, SettingsError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let parsed = Url::parse(trimmed).map_err(|source| SettingsError::InvalidApiUrl {
        url: trimmed.to_string(),
        source,
    })?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(SettingsError::UnsupportedScheme(trimmed.to_string()));
    }

    Ok(parsed)
}
