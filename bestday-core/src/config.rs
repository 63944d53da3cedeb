use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fs, path::PathBuf, time::Duration};

use crate::{geocode::FALLBACK_CITY, source::ServiceId};

const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Per-service settings. Both fields are optional: NASA POWER and Nominatim
/// need no key, and `base_url` only overrides the public endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// City planned for when none is given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_city: Option<String>,

    /// Per-request timeout for every external call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// Example TOML:
    /// [providers.visualcrossing]
    /// api_key = "..."
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

impl Config {
    pub fn default_city(&self) -> &str {
        self.default_city
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(FALLBACK_CITY)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    pub fn provider_config(&self, id: ServiceId) -> Option<&ProviderConfig> {
        self.providers.get(id.as_str())
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("Invalid configuration TOML")
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "bestday", "bestday")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Set or replace a provider API key.
    pub fn upsert_provider_api_key(&mut self, id: ServiceId, api_key: String) {
        self.providers.entry(id.as_str().to_string()).or_default().api_key = Some(api_key);
    }

    /// Point a provider at a different endpoint (mirrors, test servers).
    pub fn set_base_url(&mut self, id: ServiceId, base_url: impl Into<String>) {
        self.providers.entry(id.as_str().to_string()).or_default().base_url =
            Some(base_url.into());
    }

    /// Returns API key for a provider, if present and non-empty.
    pub fn provider_api_key(&self, id: ServiceId) -> Option<&str> {
        self.provider_config(id)
            .and_then(|cfg| cfg.api_key.as_deref())
            .filter(|key| !key.is_empty())
    }

    pub fn base_url(&self, id: ServiceId) -> String {
        self.provider_config(id)
            .and_then(|cfg| cfg.base_url.clone())
            .unwrap_or_else(|| id.default_base_url().to_string())
    }

    pub fn is_provider_configured(&self, id: ServiceId) -> bool {
        !id.requires_api_key() || self.provider_api_key(id).is_some()
    }

    /// Services that need a key but have none; they will report no data.
    pub fn unconfigured_providers(&self) -> Vec<ServiceId> {
        ServiceId::all()
            .iter()
            .copied()
            .filter(|id| !self.is_provider_configured(*id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_a_file() {
        let cfg = Config::default();

        assert_eq!(cfg.default_city(), "Cairo");
        assert_eq!(cfg.timeout(), Duration::from_secs(10));
        assert_eq!(cfg.base_url(ServiceId::NasaPower), "https://power.larc.nasa.gov");
        assert!(cfg.provider_api_key(ServiceId::VisualCrossing).is_none());
    }

    #[test]
    fn set_api_key_for_provider() {
        let mut cfg = Config::default();

        cfg.upsert_provider_api_key(ServiceId::VisualCrossing, "VC_KEY".into());

        assert_eq!(cfg.provider_api_key(ServiceId::VisualCrossing), Some("VC_KEY"));
        assert!(cfg.is_provider_configured(ServiceId::VisualCrossing));
        assert!(!cfg.is_provider_configured(ServiceId::OpenWeather));
    }

    #[test]
    fn keyless_providers_count_as_configured() {
        let cfg = Config::default();
        assert!(cfg.is_provider_configured(ServiceId::NasaPower));
        assert!(cfg.is_provider_configured(ServiceId::Nominatim));
    }

    #[test]
    fn upsert_keeps_base_url() {
        let mut cfg = Config::default();

        cfg.set_base_url(ServiceId::OpenWeather, "http://localhost:9000");
        cfg.upsert_provider_api_key(ServiceId::OpenWeather, "OW".into());

        assert_eq!(cfg.base_url(ServiceId::OpenWeather), "http://localhost:9000");
        assert_eq!(cfg.provider_api_key(ServiceId::OpenWeather), Some("OW"));
    }

    #[test]
    fn unconfigured_providers_lists_missing_keys() {
        let mut cfg = Config::default();
        assert_eq!(
            cfg.unconfigured_providers(),
            vec![ServiceId::VisualCrossing, ServiceId::OpenWeather]
        );

        cfg.upsert_provider_api_key(ServiceId::VisualCrossing, "VC".into());
        assert_eq!(cfg.unconfigured_providers(), vec![ServiceId::OpenWeather]);

        cfg.upsert_provider_api_key(ServiceId::OpenWeather, "OW".into());
        assert!(cfg.unconfigured_providers().is_empty());
    }

    #[test]
    fn empty_key_is_not_configured() {
        let mut cfg = Config::default();
        cfg.upsert_provider_api_key(ServiceId::VisualCrossing, String::new());
        assert!(!cfg.is_provider_configured(ServiceId::VisualCrossing));
    }

    #[test]
    fn parses_toml() {
        let cfg = Config::from_toml(
            r#"
            default_city = "Luxor"
            timeout_secs = 3

            [providers.visualcrossing]
            api_key = "abc"

            [providers.nominatim]
            base_url = "http://127.0.0.1:8080"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.default_city(), "Luxor");
        assert_eq!(cfg.timeout(), Duration::from_secs(3));
        assert_eq!(cfg.provider_api_key(ServiceId::VisualCrossing), Some("abc"));
        assert_eq!(cfg.base_url(ServiceId::Nominatim), "http://127.0.0.1:8080");
    }

    #[test]
    fn toml_roundtrip_keeps_providers() {
        let mut cfg = Config::default();
        cfg.upsert_provider_api_key(ServiceId::OpenWeather, "OW".into());

        let text = toml::to_string_pretty(&cfg).unwrap();
        let back = Config::from_toml(&text).unwrap();
        assert_eq!(back.provider_api_key(ServiceId::OpenWeather), Some("OW"));
    }
}
