use serde::{Deserialize, Serialize};

use crate::domain::Node;

/// Current layout of [`GraphSnapshot`]. Bump when the serialized shape changes.
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// Plain, serializable image of an [`EntityGraph`](crate::domain::EntityGraph).
///
/// Nodes are sorted by id and every undirected edge appears once as
/// `(smaller id, larger id)`, so an unchanged graph always produces the same
/// snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSnapshot {
  pub version: u32,
  pub nodes: Vec<Node>,
  pub edges: Vec<(String, String)>,
}

impl Default for GraphSnapshot {
  fn default() -> Self {
    Self { version: SNAPSHOT_FORMAT_VERSION, nodes: Vec::new(), edges: Vec::new() }
  }
}
