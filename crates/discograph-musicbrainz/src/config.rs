use std::time::Duration;

use discograph_config::{ConfigBackend, ConfigError, TomlConfigBackend};
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://musicbrainz.org";
pub const DEFAULT_USER_AGENT: &str = concat!("discograph/", env!("CARGO_PKG_VERSION"));

/// `[musicbrainz]` section of `discograph.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MusicBrainzConfig {
  pub base_url: String,
  /// Sent with every request. MusicBrainz asks for `app/version ( contact )`.
  pub user_agent: String,
  pub timeout_secs: u64,
  /// Minimum spacing between two outbound requests.
  pub min_interval_ms: u64,
  pub max_retries: u32,
  /// Backoff before retry `n` is `n * retry_backoff_ms`.
  pub retry_backoff_ms: u64,
}

impl Default for MusicBrainzConfig {
  fn default() -> Self {
    Self {
      base_url: DEFAULT_BASE_URL.to_string(),
      user_agent: DEFAULT_USER_AGENT.to_string(),
      timeout_secs: 10,
      min_interval_ms: 1000,
      max_retries: 2,
      retry_backoff_ms: 2000,
    }
  }
}

impl MusicBrainzConfig {
  pub fn load(backend: &TomlConfigBackend) -> Result<Self, ConfigError> {
    let cfg = backend.load_section_with_default("musicbrainz")?;
    backend.save_section("musicbrainz", &cfg)?;
    Ok(cfg)
  }

  pub fn timeout(&self) -> Duration {
    Duration::from_secs(self.timeout_secs)
  }

  pub fn min_interval(&self) -> Duration {
    Duration::from_millis(self.min_interval_ms)
  }

  pub fn backoff(&self, retry: u32) -> Duration {
    Duration::from_millis(self.retry_backoff_ms.saturating_mul(u64::from(retry)))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use discograph_config::DiscographPaths;
  use tempfile::tempdir;

  #[test]
  fn partial_section_keeps_other_defaults() {
    let tmp = tempdir().unwrap();
    let backend = TomlConfigBackend::new(DiscographPaths::rooted_at(tmp.path()).unwrap());
    std::fs::write(
      backend.config_file(),
      "[musicbrainz]\nbase_url = \"http://localhost:5000\"\nmax_retries = 0\n",
    )
    .unwrap();

    let cfg = MusicBrainzConfig::load(&backend).unwrap();

    assert_eq!(cfg.base_url, "http://localhost:5000");
    assert_eq!(cfg.max_retries, 0);
    assert_eq!(cfg.min_interval_ms, 1000);
    assert_eq!(cfg.user_agent, DEFAULT_USER_AGENT);
  }

  #[test]
  fn backoff_grows_linearly() {
    let cfg = MusicBrainzConfig { retry_backoff_ms: 500, ..Default::default() };

    assert_eq!(cfg.backoff(1), Duration::from_millis(500));
    assert_eq!(cfg.backoff(3), Duration::from_millis(1500));
  }
}
