use discograph_config::{ConfigBackend, ConfigError, TomlConfigBackend};
use discograph_core::services::SessionSettings;
use discograph_core::services::session::DEFAULT_BUDGET;
use serde::{Deserialize, Serialize};

/// `[crawler]` section of `discograph.toml`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
  /// Result cap per request and recursion depth of each seed.
  pub budget: u32,
}

impl Default for CrawlerConfig {
  fn default() -> Self {
    Self { budget: DEFAULT_BUDGET }
  }
}

impl CrawlerConfig {
  pub fn load(backend: &TomlConfigBackend) -> Result<Self, ConfigError> {
    let cfg = backend.load_section_with_default("crawler")?;
    backend.save_section("crawler", &cfg)?;
    Ok(cfg)
  }
}

impl From<CrawlerConfig> for SessionSettings {
  fn from(cfg: CrawlerConfig) -> Self {
    SessionSettings { budget: cfg.budget }
  }
}
