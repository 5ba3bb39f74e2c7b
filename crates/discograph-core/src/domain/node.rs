use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::EntityKind;

/// Kind-specific key/value pairs attached to a node (e.g. `country` and
/// `gender` for artists).
///
/// Ordered so that two snapshots of the same graph serialize identically.
pub type Attributes = BTreeMap<String, String>;

/// A vertex of the entity graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
  /// Identifier assigned by the remote metadata service.
  pub id: String,

  /// Display name. Unique within a graph, compared case-insensitively.
  pub label: String,

  pub kind: EntityKind,

  pub attributes: Attributes,
}

impl Node {
  pub fn new(
    id: impl Into<String>,
    label: impl Into<String>,
    kind: EntityKind,
    attributes: Attributes,
  ) -> Self {
    Self { id: id.into(), label: label.into(), kind, attributes }
  }

  pub fn attribute(&self, key: &str) -> Option<&str> {
    self.attributes.get(key).map(String::as_str)
  }
}
