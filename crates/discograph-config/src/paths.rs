use directories::ProjectDirs;
use std::path::PathBuf;
use thiserror::Error;

/// Overrides every per-user directory with `<value>/{config,data}`.
pub const BASE_DIR_ENV: &str = "DISCOGRAPH_BASE_DIR";

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
  #[error("toml error: {0}")]
  Toml(#[from] toml::de::Error),
  #[error("directories error: could not determine home directory")]
  Directories,
  #[error("other: {0}")]
  Other(String),
}

#[derive(Debug, Clone)]
pub struct DiscographPaths {
  pub config_dir: PathBuf,
  pub data_dir: PathBuf,
}

impl DiscographPaths {
  pub fn new() -> Result<Self, ConfigError> {
    let (config_dir, data_dir);

    if let Ok(env_base) = std::env::var(BASE_DIR_ENV) {
      let base = PathBuf::from(env_base);
      config_dir = base.join("config");
      data_dir = base.join("data");
    } else {
      let proj_dirs =
        ProjectDirs::from("org", "discograph", "discograph").ok_or(ConfigError::Directories)?;
      config_dir = proj_dirs.config_dir().to_path_buf();
      data_dir = proj_dirs.data_dir().to_path_buf();
    }

    std::fs::create_dir_all(&config_dir)?;
    std::fs::create_dir_all(&data_dir)?;

    Ok(Self { config_dir, data_dir })
  }

  /// Paths rooted at an explicit directory, ignoring the environment.
  pub fn rooted_at(base: impl Into<PathBuf>) -> Result<Self, ConfigError> {
    let base = base.into();
    let paths = Self { config_dir: base.join("config"), data_dir: base.join("data") };

    std::fs::create_dir_all(&paths.config_dir)?;
    std::fs::create_dir_all(&paths.data_dir)?;

    Ok(paths)
  }

  pub fn detect() -> Result<Self, ConfigError> {
    Self::new()
  }

  pub fn config_file(&self) -> PathBuf {
    self.config_dir.join("discograph.toml")
  }
}
