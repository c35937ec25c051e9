use std::path::Path;

use crate::config::AppConfig;
use anyhow::Result;
use figment::{
    providers::{Env, Format, Json, Serialized, Toml},
    Figment,
};

pub const CONFIG_FILE: &str = "config/Config.toml";
pub const ENV_PREFIX: &str = "OIPULSE_";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads configuration by layering defaults, TOML, a sibling JSON file
    /// (`config/Config.json`) and environment variables.
    ///
    /// Nested keys come from the environment as `OIPULSE_RISK__VIX_WARNING=30`.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration files cannot be read or parsed.
    pub fn load() -> Result<AppConfig> {
        Self::load_from(CONFIG_FILE)
    }

    /// Loads configuration from an explicit TOML path. A JSON file with the
    /// same stem is merged over it when present.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load_from(path: &str) -> Result<AppConfig> {
        let config: AppConfig = Self::base(path, None).extract()?;
        tracing::debug!(path, "Configuration loaded");
        Ok(config)
    }

    /// Loads configuration with a profile overlay (`config/Config.{profile}.toml`).
    ///
    /// # Errors
    ///
    /// Returns an error if configuration files cannot be read or parsed.
    pub fn load_with_profile(profile: &str) -> Result<AppConfig> {
        let config: AppConfig = Self::base(CONFIG_FILE, Some(profile)).extract()?;
        tracing::debug!(profile, "Configuration loaded");
        Ok(config)
    }

    fn base(path: &str, profile: Option<&str>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(path))
            .merge(Json::file(Path::new(path).with_extension("json")));
        if let Some(profile) = profile {
            figment = figment.merge(Toml::file(format!("config/Config.{profile}.toml")));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }
}
