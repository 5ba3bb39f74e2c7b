//! Read-only views over the saved graph. Nothing here writes the snapshot.

use std::io::{self, Write};

use anyhow::{Context, Result, bail};
use log::info;

use discograph_core::domain::{EntityGraph, EntityKind, Node};
use discograph_storage::SnapshotStore;

use crate::cli::{SearchArgs, ShowArgs};

fn open(store: &SnapshotStore) -> Result<Option<EntityGraph>> {
  let graph = EntityGraph::read_from(store)
    .with_context(|| format!("reading snapshot {}", store.path().display()))?;
  match graph {
    Some(graph) if !graph.is_empty() => Ok(Some(graph)),
    _ => {
      info!("no graph saved at {} yet, run `discograph crawl` first", store.path().display());
      Ok(None)
    }
  }
}

pub fn search(store: &SnapshotStore, args: &SearchArgs) -> Result<()> {
  let Some(graph) = open(store)? else {
    return Ok(());
  };
  let stdout = io::stdout();
  let found = write_matches(&graph, &args.query, args.kind, args.limit, &mut stdout.lock())?;
  if found == 0 {
    info!("no entity matches {:?}", args.query);
  }
  Ok(())
}

pub fn show(store: &SnapshotStore, args: &ShowArgs) -> Result<()> {
  let Some(graph) = open(store)? else {
    return Ok(());
  };
  let stdout = io::stdout();
  if !write_node(&graph, &args.id, &mut stdout.lock())? {
    bail!("no entity with id or name {}", args.id);
  }
  Ok(())
}

/// One `kind  label  id` line per match, best connected first. Returns the
/// total number of matches, which may exceed `limit`.
pub fn write_matches(
  graph: &EntityGraph,
  query: &str,
  kind: Option<EntityKind>,
  limit: usize,
  out: &mut dyn Write,
) -> io::Result<usize> {
  let matches: Vec<&Node> =
    graph.search(query).into_iter().filter(|node| kind.is_none_or(|k| node.kind == k)).collect();
  for node in matches.iter().take(limit) {
    writeln!(out, "{:<6}  {}  {}", node.kind, node.label, node.id)?;
  }
  if matches.len() > limit {
    writeln!(out, "... {} more", matches.len() - limit)?;
  }
  Ok(matches.len())
}

/// Resolves `key` as an id, then as a label. Returns `false` when neither
/// matches.
pub fn write_node(graph: &EntityGraph, key: &str, out: &mut dyn Write) -> io::Result<bool> {
  let Some(node) = graph.node(key).or_else(|| graph.node_by_label(key)) else {
    return Ok(false);
  };
  let id = node.id.as_str();

  writeln!(out, "{} ({})", node.label, node.kind)?;
  writeln!(out, "  id: {}", node.id)?;
  writeln!(out, "  degree: {}", graph.degree(id))?;
  for (key, value) in &node.attributes {
    writeln!(out, "  {key}: {value}")?;
  }

  let neighbors = graph.neighbors(id);
  if !neighbors.is_empty() {
    writeln!(out, "  neighbours:")?;
    for neighbor in neighbors.into_iter().filter_map(|n| graph.node(n)) {
      writeln!(out, "    {:<6}  {}  {}", neighbor.kind, neighbor.label, neighbor.id)?;
    }
  }
  Ok(true)
}
