//! Storefront configuration.
//!
//! Read from `grocer.toml` (or a JSON file with the same shape), then
//! overridden by `GROCER_*` environment variables.

use crate::StorefrontError;
use grocer_commerce::checkout::ShippingPolicy;
use grocer_commerce::Currency;
use grocer_observability::{AnalyticsConfig, LoggingConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// File names searched for, in order, in each directory.
pub const CONFIG_NAMES: [&str; 3] = ["grocer.toml", ".grocer.toml", "grocer.json"];

/// Full storefront configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorefrontConfig {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub analytics: AnalyticsConfig,
}

/// Marketplace REST API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:3000/api".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Hosted identity provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anon_key: Option<String>,

    /// Page that password-recovery emails link back to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
}

/// Shop-wide settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Must be a currency without a minor unit; see [`StorefrontConfig::validate`].
    #[serde(default)]
    pub currency: Currency,

    #[serde(default)]
    pub shipping: ShippingPolicy,

    /// Number that receives order messages, e.g. "+225 07 08 09 10 11".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_phone: Option<String>,
}

/// Local storage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Where the saved cart and session live. Defaults to the platform data
    /// directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

impl StorefrontConfig {
    /// Load a config file; `.json` files are parsed as JSON, anything else as
    /// TOML.
    pub fn load(path: &Path) -> Result<Self, StorefrontError> {
        let content = std::fs::read_to_string(path).map_err(|source| StorefrontError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;

        if is_json(path) {
            serde_json::from_str(&content)
                .map_err(|e| StorefrontError::Config(format!("{}: {}", path.display(), e)))
        } else {
            toml::from_str(&content)
                .map_err(|e| StorefrontError::Config(format!("{}: {}", path.display(), e)))
        }
    }

    /// Write the config to `path` in the format its extension names.
    pub fn save(&self, path: &Path) -> Result<(), StorefrontError> {
        let content = if is_json(path) {
            serde_json::to_string_pretty(self).map_err(|e| StorefrontError::Config(e.to_string()))?
        } else {
            toml::to_string_pretty(self).map_err(|e| StorefrontError::Config(e.to_string()))?
        };

        std::fs::write(path, content).map_err(|source| StorefrontError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Search `start` and its ancestors for a config file.
    ///
    /// Returns the first readable file's path and contents. Files that fail to
    /// parse are skipped.
    pub fn find(start: &Path) -> Option<(PathBuf, Self)> {
        let mut current = start.to_path_buf();
        loop {
            for name in CONFIG_NAMES {
                let candidate = current.join(name);
                if candidate.is_file() {
                    match Self::load(&candidate) {
                        Ok(config) => return Some((candidate, config)),
                        Err(e) => {
                            tracing::warn!(path = %candidate.display(), error = %e, "skipping config file")
                        }
                    }
                }
            }

            if !current.pop() {
                return None;
            }
        }
    }

    /// Apply `GROCER_*` overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    /// Apply `GROCER_*` overrides from `lookup`. Empty values are ignored.
    pub fn apply_env_with(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get("GROCER_API_URL") {
            self.api.base_url = url;
        }
        if let Some(url) = get("GROCER_AUTH_URL") {
            self.auth.url = Some(url);
        }
        if let Some(key) = get("GROCER_AUTH_KEY") {
            self.auth.anon_key = Some(key);
        }
        if let Some(id) = get("GROCER_ANALYTICS_ID") {
            self.analytics.measurement_id = Some(id);
            self.analytics.enabled = true;
        }
        if let Some(phone) = get("GROCER_CHAT_PHONE") {
            self.store.chat_phone = Some(phone);
        }
        if let Some(dir) = get("GROCER_DATA_DIR") {
            self.storage.data_dir = Some(PathBuf::from(dir));
        }
    }

    /// Check the URLs before any client is built.
    pub fn validate(&self) -> Result<(), StorefrontError> {
        url::Url::parse(&self.api.base_url)
            .map_err(|e| StorefrontError::Config(format!("api.base_url: {}", e)))?;
        if let Some(auth_url) = &self.auth.url {
            url::Url::parse(auth_url)
                .map_err(|e| StorefrontError::Config(format!("auth.url: {}", e)))?;
            if self.auth.anon_key.is_none() {
                return Err(StorefrontError::Config(
                    "auth.anon_key is required when auth.url is set".to_string(),
                ));
            }
        }
        if self.api.timeout_secs == 0 {
            return Err(StorefrontError::Config(
                "api.timeout_secs must be positive".to_string(),
            ));
        }
        // Catalog prices, order totals and shipping tiers are whole units.
        let currency = self.store.currency;
        if currency.decimal_places() != 0 {
            return Err(StorefrontError::Config(format!(
                "store.currency: {} has a minor unit; prices are whole units, use XOF, XAF or JPY",
                currency
            )));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }

    /// Directory for persisted state.
    pub fn data_dir(&self) -> Result<PathBuf, StorefrontError> {
        if let Some(dir) = &self.storage.data_dir {
            return Ok(dir.clone());
        }
        directories::ProjectDirs::from("", "grocer", "grocer")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or_else(|| {
                StorefrontError::Config("could not resolve a home directory for storage".to_string())
            })
    }

    /// Starter TOML written by `grocer config init`.
    pub fn template() -> String {
        r#"[api]
base_url = "http://localhost:3000/api"
timeout_secs = 30

[auth]
# url = "https://your-project.supabase.co"
# anon_key = "public-anon-key"
# redirect_url = "https://shop.example/reset-password"

[store]
currency = "XOF"
# chat_phone = "+225 07 08 09 10 11"

[store.shipping]
standard_fee = 4000
reduced_fee = 2000
reduced_from = 30000
free_from = 50000

[logging]
level = "info"
format = "text"

[analytics]
enabled = false
"#
        .to_string()
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_template_parses_to_defaults() {
        let config: StorefrontConfig = toml::from_str(&StorefrontConfig::template()).unwrap();
        assert_eq!(config.api, ApiConfig::default());
        assert_eq!(config.store.currency, Currency::XOF);
        assert_eq!(config.store.shipping, ShippingPolicy::default());
        assert!(!config.analytics.enabled);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("GROCER_API_URL", "https://api.shop.test"),
            ("GROCER_AUTH_KEY", "anon"),
            ("GROCER_ANALYTICS_ID", "G-TEST"),
            ("GROCER_CHAT_PHONE", ""),
        ]
        .into_iter()
        .collect();

        let mut config = StorefrontConfig::default();
        config.apply_env_with(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.api.base_url, "https://api.shop.test");
        assert_eq!(config.auth.anon_key.as_deref(), Some("anon"));
        assert!(config.analytics.enabled);
        assert_eq!(config.store.chat_phone, None);
    }

    #[test]
    fn test_find_walks_up() {
        let root = tempfile::tempdir().unwrap();
        std::fs::write(
            root.path().join("grocer.toml"),
            "[store]\ncurrency = \"XAF\"\n",
        )
        .unwrap();
        let nested = root.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        let (path, config) = StorefrontConfig::find(&nested).unwrap();
        assert_eq!(path, root.path().join("grocer.toml"));
        assert_eq!(config.store.currency, Currency::XAF);
    }

    #[test]
    fn test_json_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grocer.json");
        let mut config = StorefrontConfig::default();
        config.store.chat_phone = Some("+2250708091011".to_string());
        config.save(&path).unwrap();
        assert_eq!(StorefrontConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_validate_requires_anon_key() {
        let mut config = StorefrontConfig::default();
        config.auth.url = Some("https://id.test".to_string());
        assert!(config.validate().is_err());
        config.auth.anon_key = Some("anon".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_minor_unit_currency() {
        let mut config = StorefrontConfig::default();
        config.store.currency = Currency::EUR;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("store.currency"));

        config.store.currency = Currency::XAF;
        assert!(config.validate().is_ok());
    }
}
