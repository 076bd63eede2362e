use std::{fs, path::Path, time::Duration};

use anyhow::Context;
use client_core::NetworkProfile;
use serde::Deserialize;
use storage::DEFAULT_DATABASE_URL;
use tracing::warn;

pub const SETTINGS_FILE: &str = "eventvista.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub database_url: String,
    pub latency_ms: u64,
    pub contact_latency_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        let network = NetworkProfile::default();
        Self {
            database_url: DEFAULT_DATABASE_URL.into(),
            latency_ms: network.latency.as_millis() as u64,
            contact_latency_ms: network.contact_latency.as_millis() as u64,
        }
    }
}

impl Settings {
    pub fn network(&self) -> NetworkProfile {
        NetworkProfile {
            latency: Duration::from_millis(self.latency_ms),
            contact_latency: Duration::from_millis(self.contact_latency_ms),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    database_url: Option<String>,
    latency_ms: Option<u64>,
    contact_latency_ms: Option<u64>,
}

/// Defaults, then `eventvista.toml` in the working directory, then the
/// environment.
pub fn load_settings() -> anyhow::Result<Settings> {
    load_settings_from(Path::new(SETTINGS_FILE), |key| std::env::var(key).ok())
}

pub fn load_settings_from(
    path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    if path.exists() {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file '{}'", path.display()))?;
        let file_cfg: FileSettings = toml::from_str(&raw)
            .with_context(|| format!("invalid settings file '{}'", path.display()))?;

        if let Some(v) = file_cfg.database_url {
            settings.database_url = v;
        }
        if let Some(v) = file_cfg.latency_ms {
            settings.latency_ms = v;
        }
        if let Some(v) = file_cfg.contact_latency_ms {
            settings.contact_latency_ms = v;
        }
    }

    if let Some(v) = env("EVENTVISTA_DATABASE_URL") {
        settings.database_url = v;
    }
    if let Some(v) = env("APP__DATABASE_URL") {
        settings.database_url = v;
    }

    if let Some(v) = env("APP__LATENCY_MS") {
        match v.parse::<u64>() {
            Ok(parsed) => settings.latency_ms = parsed,
            Err(_) => warn!(value = %v, "ignoring non-numeric APP__LATENCY_MS"),
        }
    }
    if let Some(v) = env("APP__CONTACT_LATENCY_MS") {
        match v.parse::<u64>() {
            Ok(parsed) => settings.contact_latency_ms = parsed,
            Err(_) => warn!(value = %v, "ignoring non-numeric APP__CONTACT_LATENCY_MS"),
        }
    }

    Ok(settings)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
