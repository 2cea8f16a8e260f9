use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;
use client_core::{
    ClientConfig, MockMealClient, DEFAULT_ARTIFICIAL_DELAY, DEFAULT_BASE_URL, DEFAULT_CATEGORY,
};
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "desktop.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub base_url: String,
    pub category: String,
    pub request_timeout_secs: Option<u64>,
    pub slow_delay_ms: u64,
    pub fixture_path: Option<PathBuf>,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            category: DEFAULT_CATEGORY.into(),
            request_timeout_secs: Some(30),
            slow_delay_ms: DEFAULT_ARTIFICIAL_DELAY.as_millis() as u64,
            fixture_path: None,
            log_filter: "info".into(),
        }
    }
}

impl Settings {
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.base_url.clone(),
            category: self.category.clone(),
            request_timeout: self.request_timeout_secs.map(Duration::from_secs),
        }
    }

    pub fn slow_delay(&self) -> Duration {
        Duration::from_millis(self.slow_delay_ms)
    }

    /// Uses `fixture_path` when set. Otherwise falls back to the crate's
    /// bundled sample, which only exists next to the source tree.
    pub fn mock_client(&self) -> MockMealClient {
        match &self.fixture_path {
            Some(path) => MockMealClient::new(path),
            None => MockMealClient::bundled(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    base_url: Option<String>,
    category: Option<String>,
    request_timeout_secs: Option<u64>,
    slow_delay_ms: Option<u64>,
    fixture_path: Option<PathBuf>,
    log_filter: Option<String>,
}

/// Defaults, then the config file, then `APP__*` environment variables.
///
/// An explicitly named file must exist; the default `desktop.toml` is optional.
/// A request timeout of 0 disables the transport timeout.
pub fn load_settings(explicit_path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    let path = explicit_path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
    match fs::read_to_string(path) {
        Ok(raw) => {
            let file_cfg = parse_file_settings(&raw)
                .with_context(|| format!("invalid config file '{}'", path.display()))?;
            apply_file_settings(&mut settings, file_cfg);
        }
        Err(err) if explicit_path.is_none() && err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read config file '{}'", path.display()));
        }
    }

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok())?;
    Ok(settings)
}

fn parse_file_settings(raw: &str) -> anyhow::Result<FileSettings> {
    Ok(toml::from_str(raw)?)
}

fn apply_file_settings(settings: &mut Settings, file_cfg: FileSettings) {
    if let Some(v) = file_cfg.base_url {
        settings.base_url = v;
    }
    if let Some(v) = file_cfg.category {
        settings.category = v;
    }
    if let Some(v) = file_cfg.request_timeout_secs {
        settings.request_timeout_secs = (v > 0).then_some(v);
    }
    if let Some(v) = file_cfg.slow_delay_ms {
        settings.slow_delay_ms = v;
    }
    if let Some(v) = file_cfg.fixture_path {
        settings.fixture_path = Some(v);
    }
    if let Some(v) = file_cfg.log_filter {
        settings.log_filter = v;
    }
}

fn apply_env_overrides(
    settings: &mut Settings,
    lookup: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<()> {
    if let Some(v) = lookup("APP__BASE_URL") {
        settings.base_url = v;
    }
    if let Some(v) = lookup("APP__CATEGORY") {
        settings.category = v;
    }
    if let Some(v) = lookup("APP__REQUEST_TIMEOUT_SECS") {
        let secs = parse_number(&v, "APP__REQUEST_TIMEOUT_SECS")?;
        settings.request_timeout_secs = (secs > 0).then_some(secs);
    }
    if let Some(v) = lookup("APP__SLOW_DELAY_MS") {
        settings.slow_delay_ms = parse_number(&v, "APP__SLOW_DELAY_MS")?;
    }
    if let Some(v) = lookup("APP__FIXTURE_PATH") {
        settings.fixture_path = Some(PathBuf::from(v));
    }
    if let Some(v) = lookup("APP__LOG_FILTER") {
        settings.log_filter = v;
    }
    Ok(())
}

fn parse_number(raw: &str, key: &str) -> anyhow::Result<u64> {
    raw.trim()
        .parse::<u64>()
        .with_context(|| format!("{key} must be a non-negative integer, got '{raw}'"))
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
