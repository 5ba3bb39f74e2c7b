use crate::paths::{ConfigError, DiscographPaths};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// toml_edit keeps comments and layout of hand-edited files on write.
use toml_edit::{DocumentMut, Item};

pub trait ConfigBackend {
  fn load_section<T: DeserializeOwned>(&self, section: &str) -> Result<T, ConfigError>;
  fn save_section<T: Serialize>(&self, section: &str, value: &T) -> Result<(), ConfigError>;
}

pub struct TomlConfigBackend {
  paths: DiscographPaths,
  file: PathBuf,
}

impl TomlConfigBackend {
  pub fn new(paths: DiscographPaths) -> Self {
    let file = paths.config_file();
    Self { paths, file }
  }

  pub fn paths(&self) -> &DiscographPaths {
    &self.paths
  }

  pub fn config_file(&self) -> &Path {
    &self.file
  }

  /// Like [`ConfigBackend::load_section`], but a missing file or section
  /// yields `T::default()`.
  pub fn load_section_with_default<T>(&self, section: &str) -> Result<T, ConfigError>
  where
    T: DeserializeOwned + Default,
  {
    self.load_section_or_else(section, T::default)
  }

  /// Like [`Self::load_section_with_default`] for sections whose defaults
  /// depend on runtime state such as [`DiscographPaths`].
  pub fn load_section_or_else<T, F>(&self, section: &str, fallback: F) -> Result<T, ConfigError>
  where
    T: DeserializeOwned,
    F: FnOnce() -> T,
  {
    match self.read_table()? {
      Some(table) => match table.get(section) {
        Some(value) => decode(section, value),
        None => Ok(fallback()),
      },
      None => Ok(fallback()),
    }
  }

  fn read_table(&self) -> Result<Option<toml::Table>, ConfigError> {
    let content = match fs::read_to_string(&self.file) {
      Ok(c) => c,
      Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
      Err(e) => return Err(e.into()),
    };

    Ok(Some(toml::from_str(&content)?))
  }
}

fn decode<T: DeserializeOwned>(section: &str, value: &toml::Value) -> Result<T, ConfigError> {
  value
    .clone()
    .try_into()
    .map_err(|e| ConfigError::Other(format!("decode section [{section}]: {e}")))
}

impl ConfigBackend for TomlConfigBackend {
  fn load_section<T: DeserializeOwned>(&self, section: &str) -> Result<T, ConfigError> {
    let table = self.read_table()?.ok_or_else(|| {
      ConfigError::Other(format!("config file {} not found", self.file.display()))
    })?;

    let value = table.get(section).ok_or_else(|| {
      ConfigError::Other(format!("missing section [{section}] in {}", self.file.display()))
    })?;

    decode(section, value)
  }

  fn save_section<T: Serialize>(&self, section: &str, value: &T) -> Result<(), ConfigError> {
    let mut doc: DocumentMut = match fs::read_to_string(&self.file) {
      Ok(content) => content
        .parse::<DocumentMut>()
        .map_err(|e| ConfigError::Other(format!("parse toml_edit doc: {e}")))?,
      Err(e) if e.kind() == ErrorKind::NotFound => DocumentMut::new(),
      Err(e) => return Err(e.into()),
    };

    // Serialized without a header, e.g. "budget = 10\n".
    let section_str = toml::to_string(value)
      .map_err(|e| ConfigError::Other(format!("encode section [{section}]: {e}")))?;

    let section_doc = section_str
      .parse::<DocumentMut>()
      .map_err(|e| ConfigError::Other(format!("parse section as doc: {e}")))?;

    doc[section] = Item::Table(section_doc.as_table().clone());

    discograph_fs::atomic_write_str(&self.file, &doc.to_string())?;

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde::Deserialize;
  use tempfile::tempdir;

  #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
  struct Crawler {
    budget: u32,
  }

  fn backend(dir: &Path) -> TomlConfigBackend {
    TomlConfigBackend::new(DiscographPaths::rooted_at(dir).unwrap())
  }

  #[test]
  fn missing_file_falls_back_to_default() {
    let tmp = tempdir().unwrap();
    let backend = backend(tmp.path());

    let loaded: Crawler = backend.load_section_with_default("crawler").unwrap();
    assert_eq!(loaded, Crawler::default());

    let loaded = backend.load_section_or_else("crawler", || Crawler { budget: 7 }).unwrap();
    assert_eq!(loaded.budget, 7);

    assert!(backend.load_section::<Crawler>("crawler").is_err());
  }

  #[test]
  fn save_then_load_section() {
    let tmp = tempdir().unwrap();
    let backend = backend(tmp.path());

    backend.save_section("crawler", &Crawler { budget: 25 }).unwrap();

    let loaded: Crawler = backend.load_section("crawler").unwrap();
    assert_eq!(loaded.budget, 25);
  }

  #[test]
  fn save_preserves_comments_and_other_sections() {
    let tmp = tempdir().unwrap();
    let backend = backend(tmp.path());
    fs::write(
      backend.config_file(),
      "# hand written\n[storage]\nhtml_path = \"/tmp/g.html\"\n\n[crawler]\nbudget = 3\n",
    )
    .unwrap();

    backend.save_section("crawler", &Crawler { budget: 4 }).unwrap();

    let content = fs::read_to_string(backend.config_file()).unwrap();
    assert!(content.contains("# hand written"));
    assert!(content.contains("html_path = \"/tmp/g.html\""));
    assert!(content.contains("budget = 4"));
  }

  #[test]
  fn bad_section_type_is_reported() {
    let tmp = tempdir().unwrap();
    let backend = backend(tmp.path());
    fs::write(backend.config_file(), "[crawler]\nbudget = \"many\"\n").unwrap();

    let err = backend.load_section_with_default::<Crawler>("crawler").unwrap_err();
    assert!(matches!(err, ConfigError::Other(msg) if msg.contains("[crawler]")));
  }

  #[test]
  fn malformed_file_is_a_toml_error() {
    let tmp = tempdir().unwrap();
    let backend = backend(tmp.path());
    fs::write(backend.config_file(), "[crawler\n").unwrap();

    let err = backend.load_section_with_default::<Crawler>("crawler").unwrap_err();
    assert!(matches!(err, ConfigError::Toml(_)));
  }
}
