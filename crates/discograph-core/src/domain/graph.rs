use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use log::{debug, info, warn};

use crate::domain::{Attributes, EntityKind, GraphSnapshot, Node, SNAPSHOT_FORMAT_VERSION};
use crate::errors::CoreError;
use crate::ports::GraphStore;

/// Outcome of [`EntityGraph::add_node`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Insertion {
  /// A new node was created under the proposed id.
  Inserted(String),
  /// A node already matched by id or by label. Holds its canonical id.
  Existing(String),
}

impl Insertion {
  /// Canonical id of the node, whether or not it was just created.
  pub fn id(&self) -> &str {
    match self {
      Insertion::Inserted(id) | Insertion::Existing(id) => id,
    }
  }

  pub fn into_id(self) -> String {
    match self {
      Insertion::Inserted(id) | Insertion::Existing(id) => id,
    }
  }

  pub fn is_new(&self) -> bool {
    matches!(self, Insertion::Inserted(_))
  }
}

fn fold_label(label: &str) -> String {
  label.to_lowercase()
}

/// In-memory, undirected, simple graph of artists, songs, albums and labels.
///
/// Identity rules:
/// - a node id is inserted at most once;
/// - no two nodes share a case-insensitively equal label. Proposing a node
///   whose label is already taken returns the id of the node that took it
///   first, and the proposed id is discarded.
///
/// The graph has exactly one owner at a time. Callers pass it by `&mut` to
/// whatever mutates it (the crawler) and by `&` to read-only consumers.
#[derive(Debug, Clone, Default)]
pub struct EntityGraph {
  nodes: BTreeMap<String, Node>,
  adjacency: BTreeMap<String, BTreeSet<String>>,
  /// Folded label -> id of the first node seen with that label.
  labels: HashMap<String, String>,
  edge_count: usize,
}

impl EntityGraph {
  pub fn new() -> Self {
    Self::default()
  }

  /// Inserts a node unless one with the same id or an equal label exists.
  ///
  /// Resolution order:
  /// 1. `id` already present: returns it untouched (attributes are not merged).
  /// 2. a node whose label matches `label` case-insensitively: returns that
  ///    node's id.
  /// 3. otherwise the node is inserted under `id`.
  pub fn add_node(
    &mut self,
    id: &str,
    label: &str,
    kind: EntityKind,
    attributes: Attributes,
  ) -> Insertion {
    if self.nodes.contains_key(id) {
      return Insertion::Existing(id.to_string());
    }

    let folded = fold_label(label);
    if let Some(existing) = self.labels.get(&folded) {
      debug!("{kind} '{label}' ({id}) resolved to existing node {existing}");
      return Insertion::Existing(existing.clone());
    }

    self.labels.insert(folded, id.to_string());
    self.nodes.insert(id.to_string(), Node::new(id, label, kind, attributes));
    Insertion::Inserted(id.to_string())
  }

  /// Links two existing nodes. Returns `true` only if the edge is new.
  ///
  /// Self-loops and edges touching unknown ids are ignored.
  pub fn add_edge(&mut self, a: &str, b: &str) -> bool {
    if a == b {
      debug!("ignoring self-loop on {a}");
      return false;
    }

    if !self.nodes.contains_key(a) || !self.nodes.contains_key(b) {
      debug!("ignoring edge {a} -- {b}: unknown endpoint");
      return false;
    }

    if self.has_edge(a, b) {
      return false;
    }
    self.adjacency.entry(a.to_string()).or_default().insert(b.to_string());
    self.adjacency.entry(b.to_string()).or_default().insert(a.to_string());
    self.edge_count += 1;

    true
  }

  pub fn contains(&self, id: &str) -> bool {
    self.nodes.contains_key(id)
  }

  pub fn node(&self, id: &str) -> Option<&Node> {
    self.nodes.get(id)
  }

  /// Looks a node up by label, ignoring case.
  pub fn node_by_label(&self, label: &str) -> Option<&Node> {
    self.labels.get(&fold_label(label)).and_then(|id| self.nodes.get(id))
  }

  pub fn node_count(&self) -> usize {
    self.nodes.len()
  }

  pub fn edge_count(&self) -> usize {
    self.edge_count
  }

  pub fn is_empty(&self) -> bool {
    self.nodes.is_empty()
  }

  /// All nodes, ordered by id.
  pub fn nodes(&self) -> impl Iterator<Item = &Node> {
    self.nodes.values()
  }

  /// Every edge once, as `(smaller id, larger id)`, in lexicographic order.
  pub fn edges(&self) -> impl Iterator<Item = (&str, &str)> {
    self.adjacency.iter().flat_map(|(a, neighbors)| {
      neighbors.iter().filter(move |b| a < *b).map(move |b| (a.as_str(), b.as_str()))
    })
  }

  pub fn has_edge(&self, a: &str, b: &str) -> bool {
    self.adjacency.get(a).is_some_and(|neighbors| neighbors.contains(b))
  }

  /// Ids directly linked to `id`. Empty for unknown ids.
  pub fn neighbors(&self, id: &str) -> BTreeSet<&str> {
    self
      .adjacency
      .get(id)
      .map(|neighbors| neighbors.iter().map(String::as_str).collect())
      .unwrap_or_default()
  }

  /// Number of distinct neighbours.
  ///
  /// Used by the browse commands as a cheap relevance signal; it is a local
  /// count, not a centrality measure over the whole graph.
  pub fn degree(&self, id: &str) -> usize {
    self.adjacency.get(id).map_or(0, BTreeSet::len)
  }

  /// Case-insensitive substring search over labels.
  ///
  /// Best connected entities come first, ties are broken by label. A blank
  /// query matches nothing.
  pub fn search(&self, query: &str) -> Vec<&Node> {
    let needle = fold_label(query.trim());
    if needle.is_empty() {
      return Vec::new();
    }

    let mut hits: Vec<&Node> =
      self.nodes.values().filter(|node| fold_label(&node.label).contains(&needle)).collect();
    hits.sort_by_cached_key(|node| (Reverse(self.degree(&node.id)), node.label.clone()));
    hits
  }

  pub fn to_snapshot(&self) -> GraphSnapshot {
    GraphSnapshot {
      version: SNAPSHOT_FORMAT_VERSION,
      nodes: self.nodes.values().cloned().collect(),
      edges: self.edges().map(|(a, b)| (a.to_string(), b.to_string())).collect(),
    }
  }

  /// Rebuilds a graph by replaying the snapshot through `add_node` and
  /// `add_edge`, so a snapshot written by hand or by an older build still
  /// yields a graph that honours the identity rules.
  pub fn from_snapshot(snapshot: GraphSnapshot) -> Self {
    let mut graph = Self::new();
    // Ids dropped because their label collided with an earlier node.
    let mut merged: HashMap<String, String> = HashMap::new();

    for Node { id, label, kind, attributes } in snapshot.nodes {
      let canonical = graph.add_node(&id, &label, kind, attributes).into_id();
      if canonical != id {
        merged.insert(id, canonical);
      }
    }

    for (a, b) in snapshot.edges {
      let a = merged.get(&a).cloned().unwrap_or(a);
      let b = merged.get(&b).cloned().unwrap_or(b);
      graph.add_edge(&a, &b);
    }

    graph
  }

  /// Restores the graph for a writer session.
  ///
  /// Never fails: a missing snapshot is a first run, and an unreadable one is
  /// moved out of the way so the next save cannot overwrite it, then the
  /// session starts from an empty graph.
  pub fn load_from<S: GraphStore + ?Sized>(store: &S) -> Self {
    match store.load() {
      Ok(Some(snapshot)) => {
        let graph = Self::from_snapshot(snapshot);
        info!("loaded graph: {} nodes, {} edges", graph.node_count(), graph.edge_count());
        graph
      }
      Ok(None) => {
        info!("no snapshot found, starting with an empty graph");
        Self::new()
      }
      Err(e) => {
        warn!("snapshot unreadable, starting with an empty graph: {e}");
        if let Err(e) = store.quarantine() {
          warn!("could not move the unreadable snapshot aside: {e}");
        }
        Self::new()
      }
    }
  }

  /// Restores the graph for a read-only consumer. `Ok(None)` when no snapshot
  /// has been written yet.
  pub fn read_from<S: GraphStore + ?Sized>(store: &S) -> Result<Option<Self>, CoreError> {
    let snapshot = store.load().map_err(|e| CoreError::Persistence(e.to_string()))?;
    Ok(snapshot.map(Self::from_snapshot))
  }

  /// Writes the whole graph through `store`. Failures must reach the operator.
  pub fn save_to<S: GraphStore + ?Sized>(&self, store: &S) -> Result<(), CoreError> {
    store.save(&self.to_snapshot()).map_err(|e| CoreError::Persistence(e.to_string()))?;
    debug!("snapshot saved: {} nodes, {} edges", self.node_count(), self.edge_count());
    Ok(())
  }
}
