use crate::domain::GraphSnapshot;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
  #[error("io error: {0}")]
  Io(String),

  #[error("encode error: {0}")]
  Encode(String),

  #[error("decode error: {0}")]
  Decode(String),

  #[error("unsupported snapshot version {found} (expected {expected})")]
  UnsupportedVersion { found: u32, expected: u32 },
}

/// Port over the single persisted snapshot of the graph.
///
/// There is one writer (the crawl session); read-only consumers only call
/// [`GraphStore::load`].
pub trait GraphStore {
  /// `Ok(None)` when nothing has been saved yet.
  fn load(&self) -> Result<Option<GraphSnapshot>, StoreError>;

  /// Replaces the whole snapshot. Implementations must never leave a
  /// half-written snapshot behind, even if the process dies mid-write.
  fn save(&self, snapshot: &GraphSnapshot) -> Result<(), StoreError>;

  /// Moves an unreadable snapshot out of the way so it survives for
  /// inspection instead of being overwritten by the next save.
  fn quarantine(&self) -> Result<(), StoreError>;
}
