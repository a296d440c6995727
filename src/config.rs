use std::env;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_CONFIG_PATH: &str = "config/botchat.json";
pub const DEFAULT_STORAGE_PATH: &str = "data/session.db";
pub const DEFAULT_SESSION_CACHE_PATH: &str = "data/auth_session.json";

/// Static settings for the identity provider and the bot runtime.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub user_pool_id: String,
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub identity_pool_id: String,
    #[serde(default)]
    pub bot_id: String,
    #[serde(default)]
    pub bot_alias_id: String,
    #[serde(default)]
    pub bot_locale_id: String,
    #[serde(default)]
    pub storage_path: Option<String>,
    #[serde(default)]
    pub session_cache_path: Option<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing configuration values: {}", .0.join(", "))]
    Missing(Vec<&'static str>),
}

impl AppConfig {
    /// Overlay values from the environment (`.env` is loaded by `main`).
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let fields: [(&str, &mut String); 7] = [
            ("COGNITO_REGION", &mut self.region),
            ("COGNITO_USER_POOL_ID", &mut self.user_pool_id),
            ("COGNITO_CLIENT_ID", &mut self.client_id),
            ("COGNITO_IDENTITY_POOL_ID", &mut self.identity_pool_id),
            ("BOT_ID", &mut self.bot_id),
            ("BOT_ALIAS_ID", &mut self.bot_alias_id),
            ("BOT_LOCALE_ID", &mut self.bot_locale_id),
        ];

        for (key, field) in fields {
            if let Some(value) = lookup(key).filter(|value| !value.trim().is_empty()) {
                *field = value.trim().to_string();
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("region", &self.region),
            ("user_pool_id", &self.user_pool_id),
            ("client_id", &self.client_id),
            ("identity_pool_id", &self.identity_pool_id),
            ("bot_id", &self.bot_id),
            ("bot_alias_id", &self.bot_alias_id),
            ("bot_locale_id", &self.bot_locale_id),
        ];

        let missing: Vec<&'static str> = required
            .iter()
            .filter(|(_, value)| value.is_empty())
            .map(|(name, _)| *name)
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Missing(missing))
        }
    }

    /// Provider name used as the key of the identity pool `Logins` map.
    pub fn user_pool_provider(&self) -> String {
        format!(
            "cognito-idp.{}.amazonaws.com/{}",
            self.region, self.user_pool_id
        )
    }

    pub fn storage_path(&self) -> &str {
        self.storage_path.as_deref().unwrap_or(DEFAULT_STORAGE_PATH)
    }

    pub fn session_cache_path(&self) -> &str {
        self.session_cache_path
            .as_deref()
            .unwrap_or(DEFAULT_SESSION_CACHE_PATH)
    }
}

pub fn load_config(path: &str) -> AppConfig {
    let path = Path::new(path);
    match fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str::<AppConfig>(&content) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("Failed to parse config file {}: {err}", path.display());
                AppConfig::default()
            }
        },
        Err(err) => {
            log::info!(
                "Config file {} not found ({err}); using environment only",
                path.display()
            );
            AppConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn complete() -> AppConfig {
        AppConfig {
            region: "eu-west-2".into(),
            user_pool_id: "eu-west-2_abc".into(),
            client_id: "client".into(),
            identity_pool_id: "eu-west-2:pool".into(),
            bot_id: "BOT".into(),
            bot_alias_id: "ALIAS".into(),
            bot_locale_id: "en_GB".into(),
            ..AppConfig::default()
        }
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = load_config("does/not/exist.json");
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        let config = load_config(path.to_str().unwrap());
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn file_values_are_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"region":"us-east-1","bot_id":"B1"}"#).unwrap();

        let config = load_config(path.to_str().unwrap());
        assert_eq!(config.region, "us-east-1");
        assert_eq!(config.bot_id, "B1");
        assert_eq!(config.storage_path(), DEFAULT_STORAGE_PATH);
    }

    #[test]
    fn env_overrides_replace_non_empty_values() {
        let vars: HashMap<&str, &str> = [("COGNITO_REGION", "ap-south-1"), ("BOT_ID", "  ")]
            .into_iter()
            .collect();
        let mut config = complete();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.region, "ap-south-1");
        assert_eq!(config.bot_id, "BOT");
    }

    #[test]
    fn validate_lists_missing_fields() {
        assert!(complete().validate().is_ok());

        let mut config = complete();
        config.bot_alias_id.clear();
        config.region.clear();
        assert_eq!(
            config.validate(),
            Err(ConfigError::Missing(vec!["region", "bot_alias_id"]))
        );
    }

    #[test]
    fn user_pool_provider_key() {
        assert_eq!(
            complete().user_pool_provider(),
            "cognito-idp.eu-west-2.amazonaws.com/eu-west-2_abc"
        );
    }
}
