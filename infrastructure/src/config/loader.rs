//! Configuration loader with file and environment merging.

use std::path::PathBuf;

use figment::{
    Figment,
    providers::{Format, Serialized, Toml},
};

use super::file_config::ServiceConfig;

/// Configuration loader that handles file discovery and merging.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority.
    ///
    /// Priority (highest to lowest):
    /// 1. Environment overrides (`OPENAI_API_KEY`, `TRIVIAD_CRON_KEY`,
    ///    `TRIVIAD_ADDR`)
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./triviad.toml` or `./.triviad.toml`
    /// 4. Default values
    pub fn load(config_path: Option<&PathBuf>) -> Result<ServiceConfig, Box<figment::Error>> {
        let mut figment = Figment::new().merge(Serialized::defaults(ServiceConfig::default()));

        for filename in &["triviad.toml", ".triviad.toml"] {
            let path = PathBuf::from(filename);
            if path.exists() {
                figment = figment.merge(Toml::file(&path));
                break;
            }
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        let mut config: ServiceConfig = figment.extract().map_err(Box::new)?;
        Self::apply_env_overrides(&mut config);
        Ok(config)
    }

    fn apply_env_overrides(config: &mut ServiceConfig) {
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            if !key.is_empty() {
                config.openai.api_key = key;
            }
        }
        if let Ok(key) = std::env::var("TRIVIAD_CRON_KEY") {
            if !key.is_empty() {
                config.server.cron_key = key;
            }
        }
        if let Ok(addr) = std::env::var("TRIVIAD_ADDR") {
            if !addr.is_empty() {
                config.server.addr = addr;
            }
        }
    }
}
