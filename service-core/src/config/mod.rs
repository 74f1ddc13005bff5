use crate::error::AppError;
use config::{Config as Cfg, File};
use serde::Deserialize;
use std::env;

/// Settings shared by every service in this workspace.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    8080
}

impl Config {
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let config = Cfg::builder()
            .add_source(File::with_name("analysis").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

/// True under `ENVIRONMENT=prod`; anything else (including unset) is dev.
pub fn is_prod() -> bool {
    env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod"
}

/// Environment lookup for service settings: in production a missing key is
/// a hard configuration error; elsewhere the default applies.
pub fn require_env(key: &str, default: Option<&str>) -> Result<String, AppError> {
    lookup(key, default, is_prod())
}

fn lookup(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_value_wins_over_default() {
        std::env::set_var("CORE_CONFIG_TEST_SET", "from-env");
        assert_eq!(
            lookup("CORE_CONFIG_TEST_SET", Some("fallback"), false).unwrap(),
            "from-env"
        );
        assert_eq!(
            lookup("CORE_CONFIG_TEST_SET", Some("fallback"), true).unwrap(),
            "from-env"
        );
    }

    #[test]
    fn default_applies_outside_prod_only() {
        std::env::remove_var("CORE_CONFIG_TEST_UNSET");
        assert_eq!(
            lookup("CORE_CONFIG_TEST_UNSET", Some("fallback"), false).unwrap(),
            "fallback"
        );
        assert!(lookup("CORE_CONFIG_TEST_UNSET", Some("fallback"), true).is_err());
    }

    #[test]
    fn missing_key_without_default_is_an_error() {
        std::env::remove_var("CORE_CONFIG_TEST_MISSING");
        assert!(lookup("CORE_CONFIG_TEST_MISSING", None, false).is_err());
    }
}
