use serde::{Deserialize, Serialize};

use crate::configs::*;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
  #[serde(default)]
  pub server: ServerConfig,
  pub logging: Option<LoggingConfig>,
  #[serde(default)]
  pub fetch: FetchSettings,
  #[serde(default)]
  pub rate_limit: RateLimitConfig,
  #[serde(default)]
  pub sources: SourcesConfig,
  #[serde(default)]
  pub catalog: Option<CatalogConfig>,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      server: ServerConfig::default(),
      logging: None,
      fetch: FetchSettings::default(),
      rate_limit: RateLimitConfig::default(),
      sources: SourcesConfig::default(),
      catalog: None,
    }
  }
}

use crate::common::AnyResult;

impl Config {
  pub fn load() -> AnyResult<Self> {
    let config_path = if std::path::Path::new("config.toml").exists() {
      "config.toml"
    } else if std::path::Path::new("config.default.toml").exists() {
      "config.default.toml"
    } else {
      return Err("config.toml or config.default.toml not found".into());
    };

    eprintln!("Loading configuration from: {}", config_path);

    let config_str = std::fs::read_to_string(config_path)?;
    if config_str.is_empty() {
      return Err(format!("{} is empty", config_path).into());
    }

    let config: Config = toml::from_str(&config_str)?;
    Ok(config)
  }
}
