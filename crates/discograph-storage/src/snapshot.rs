use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use discograph_core::domain::{GraphSnapshot, SNAPSHOT_FORMAT_VERSION};
use discograph_core::ports::{GraphStore, StoreError};

/// Suffix given to a snapshot that could not be decoded.
pub const QUARANTINE_SUFFIX: &str = "corrupt";

/// Single-file bincode snapshot of the entity graph.
///
/// The file starts with the format version so that a snapshot written by a
/// different layout is rejected before its body is touched.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
  path: PathBuf,
}

impl SnapshotStore {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }
}

pub fn encode(snapshot: &GraphSnapshot) -> Result<Vec<u8>, StoreError> {
  bincode::serde::encode_to_vec(snapshot, bincode::config::standard())
    .map_err(|e| StoreError::Encode(e.to_string()))
}

pub fn decode(bytes: &[u8]) -> Result<GraphSnapshot, StoreError> {
  let (version, _): (u32, _) =
    bincode::serde::decode_from_slice(bytes, bincode::config::standard())
      .map_err(|e| StoreError::Decode(format!("snapshot header: {e}")))?;

  if version != SNAPSHOT_FORMAT_VERSION {
    return Err(StoreError::UnsupportedVersion {
      found: version,
      expected: SNAPSHOT_FORMAT_VERSION,
    });
  }

  let (snapshot, read): (GraphSnapshot, usize) =
    bincode::serde::decode_from_slice(bytes, bincode::config::standard())
      .map_err(|e| StoreError::Decode(e.to_string()))?;

  if read != bytes.len() {
    return Err(StoreError::Decode(format!(
      "{} trailing bytes after snapshot",
      bytes.len() - read
    )));
  }

  Ok(snapshot)
}

impl GraphStore for SnapshotStore {
  fn load(&self) -> Result<Option<GraphSnapshot>, StoreError> {
    let bytes = match fs::read(&self.path) {
      Ok(bytes) => bytes,
      Err(e) if e.kind() == ErrorKind::NotFound => {
        debug!("no snapshot at {}", self.path.display());
        return Ok(None);
      }
      Err(e) => return Err(StoreError::Io(e.to_string())),
    };

    decode(&bytes).map(Some)
  }

  fn save(&self, snapshot: &GraphSnapshot) -> Result<(), StoreError> {
    let bytes = encode(snapshot)?;
    discograph_fs::atomic_write(&self.path, &bytes).map_err(|e| StoreError::Io(e.to_string()))?;
    debug!("snapshot written to {} ({} bytes)", self.path.display(), bytes.len());
    Ok(())
  }

  fn quarantine(&self) -> Result<(), StoreError> {
    let moved = discograph_fs::move_aside(&self.path, QUARANTINE_SUFFIX)
      .map_err(|e| StoreError::Io(e.to_string()))?;
    warn!("unreadable snapshot moved to {}", moved.display());
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use discograph_core::domain::{Attributes, EntityGraph, EntityKind};
  use tempfile::tempdir;

  fn sample_graph() -> EntityGraph {
    let mut graph = EntityGraph::new();
    let mut attrs = Attributes::new();
    attrs.insert("country".into(), "GB".into());
    graph.add_node("a1", "Radiohead", EntityKind::Artist, attrs);
    graph.add_node("s1", "Creep", EntityKind::Song, Attributes::new());
    graph.add_node("l1", "Parlophone", EntityKind::Label, Attributes::new());
    graph.add_edge("a1", "s1");
    graph.add_edge("s1", "l1");
    graph
  }

  #[test]
  fn missing_file_is_an_empty_store() {
    let tmp = tempdir().unwrap();
    let store = SnapshotStore::new(tmp.path().join("graph.bin"));

    assert!(store.load().unwrap().is_none());
  }

  #[test]
  fn save_then_load_restores_graph() {
    let tmp = tempdir().unwrap();
    let store = SnapshotStore::new(tmp.path().join("nested").join("graph.bin"));
    let graph = sample_graph();

    graph.save_to(&store).unwrap();
    let restored = EntityGraph::read_from(&store).unwrap().unwrap();

    assert_eq!(restored.to_snapshot(), graph.to_snapshot());
    assert_eq!(restored.node("a1").unwrap().attribute("country"), Some("GB"));
    assert!(restored.has_edge("l1", "s1"));
  }

  #[test]
  fn unchanged_graph_writes_identical_bytes() {
    let tmp = tempdir().unwrap();
    let store = SnapshotStore::new(tmp.path().join("graph.bin"));
    let graph = sample_graph();

    graph.save_to(&store).unwrap();
    let first = fs::read(store.path()).unwrap();
    graph.save_to(&store).unwrap();
    let second = fs::read(store.path()).unwrap();

    assert_eq!(first, second);
    assert!(!tmp.path().join("graph.bin.tmp").exists());
  }

  #[test]
  fn garbage_is_a_decode_error() {
    let tmp = tempdir().unwrap();
    let store = SnapshotStore::new(tmp.path().join("graph.bin"));
    fs::write(store.path(), [1u8, 0xff, 0xff, 0xff]).unwrap();

    assert!(matches!(store.load(), Err(StoreError::Decode(_))));
  }

  #[test]
  fn other_version_is_rejected() {
    let tmp = tempdir().unwrap();
    let store = SnapshotStore::new(tmp.path().join("graph.bin"));
    let snapshot = GraphSnapshot { version: 99, ..GraphSnapshot::default() };
    fs::write(store.path(), encode(&snapshot).unwrap()).unwrap();

    assert!(matches!(
      store.load(),
      Err(StoreError::UnsupportedVersion { found: 99, expected: SNAPSHOT_FORMAT_VERSION })
    ));
  }

  #[test]
  fn corrupt_snapshot_is_quarantined_on_writer_load() {
    let tmp = tempdir().unwrap();
    let store = SnapshotStore::new(tmp.path().join("graph.bin"));
    fs::write(store.path(), b"not a snapshot").unwrap();

    let graph = EntityGraph::load_from(&store);

    assert!(graph.is_empty());
    assert!(!store.path().exists());
    assert_eq!(fs::read(tmp.path().join("graph.bin.corrupt")).unwrap(), b"not a snapshot");
  }
}
