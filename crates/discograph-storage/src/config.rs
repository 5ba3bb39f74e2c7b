use discograph_config::{ConfigBackend, ConfigError, DiscographPaths, TomlConfigBackend};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `[storage]` section of `discograph.toml`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct StorageConfig {
  pub snapshot_path: PathBuf,
  pub html_path: PathBuf,
}

impl StorageConfig {
  pub fn defaults_for(paths: &DiscographPaths) -> Self {
    StorageConfig {
      snapshot_path: paths.data_dir.join("graph.bin"),
      html_path: paths.data_dir.join("graph.html"),
    }
  }

  /// Reads the section, writing the defaults back on first run so they can
  /// be edited by hand.
  pub fn load(backend: &TomlConfigBackend) -> Result<Self, ConfigError> {
    let cfg = backend.load_section_or_else("storage", || Self::defaults_for(backend.paths()))?;
    backend.save_section("storage", &cfg)?;
    Ok(cfg)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::tempdir;

  #[test]
  fn first_load_persists_defaults_under_data_dir() {
    let tmp = tempdir().unwrap();
    let backend = TomlConfigBackend::new(DiscographPaths::rooted_at(tmp.path()).unwrap());

    let cfg = StorageConfig::load(&backend).unwrap();

    assert_eq!(cfg.snapshot_path, tmp.path().join("data").join("graph.bin"));
    assert_eq!(cfg.html_path, tmp.path().join("data").join("graph.html"));
    let written = std::fs::read_to_string(backend.config_file()).unwrap();
    assert!(written.contains("[storage]"));
  }

  #[test]
  fn edited_paths_win_over_defaults() {
    let tmp = tempdir().unwrap();
    let backend = TomlConfigBackend::new(DiscographPaths::rooted_at(tmp.path()).unwrap());
    let custom = StorageConfig {
      snapshot_path: tmp.path().join("elsewhere.bin"),
      html_path: tmp.path().join("elsewhere.html"),
    };
    backend.save_section("storage", &custom).unwrap();

    assert_eq!(StorageConfig::load(&backend).unwrap(), custom);
  }
}
