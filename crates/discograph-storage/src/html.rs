use std::path::PathBuf;

use log::debug;
use serde::Serialize;

use discograph_core::domain::{Attributes, EntityGraph, EntityKind};
use discograph_core::ports::{ExportError, GraphExporter};

const VIS_NETWORK_JS: &str =
  "https://unpkg.com/vis-network@9.1.9/standalone/umd/vis-network.min.js";

#[derive(Serialize)]
struct VisNode<'a> {
  id: &'a str,
  label: &'a str,
  group: &'a str,
  color: &'a str,
  title: String,
}

#[derive(Serialize)]
struct VisEdge<'a> {
  from: &'a str,
  to: &'a str,
}

/// Writes the graph as a standalone vis-network page.
#[derive(Debug, Clone)]
pub struct HtmlExporter {
  path: PathBuf,
}

impl HtmlExporter {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }
}

/// Embeds JSON inside a `<script>` element.
fn script_safe(json: String) -> String {
  json.replace("</", "<\\/")
}

fn tooltip(kind: EntityKind, attributes: &Attributes) -> String {
  let mut title = kind.to_string();
  for (key, value) in attributes {
    title.push_str(&format!("\n{key}: {value}"));
  }
  title
}

pub fn render(graph: &EntityGraph) -> Result<String, ExportError> {
  let nodes: Vec<VisNode<'_>> = graph
    .nodes()
    .map(|node| VisNode {
      id: &node.id,
      label: &node.label,
      group: node.kind.as_str(),
      color: node.kind.color(),
      title: tooltip(node.kind, &node.attributes),
    })
    .collect();
  let edges: Vec<VisEdge<'_>> = graph.edges().map(|(from, to)| VisEdge { from, to }).collect();

  let nodes_json =
    serde_json::to_string(&nodes).map_err(|e| ExportError::Render(format!("nodes: {e}")))?;
  let edges_json =
    serde_json::to_string(&edges).map_err(|e| ExportError::Render(format!("edges: {e}")))?;

  let mut legend = String::new();
  for kind in EntityKind::ALL {
    legend.push_str(&format!(
      "<span style=\"color:{}\">&#9679; {}</span> ",
      kind.color(),
      kind.as_str()
    ));
  }

  Ok(format!(
    r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>discograph</title>
<script src="{VIS_NETWORK_JS}"></script>
<style>
  html, body {{ margin: 0; height: 100%; font-family: sans-serif; }}
  #legend {{ position: absolute; top: 8px; left: 8px; z-index: 1; background: #fff; padding: 4px 8px; }}
  #graph {{ width: 100%; height: 100%; }}
</style>
</head>
<body>
<div id="legend">{legend}| {node_count} nodes, {edge_count} edges</div>
<div id="graph"></div>
<script>
  const nodes = new vis.DataSet({nodes});
  const edges = new vis.DataSet({edges});
  new vis.Network(document.getElementById("graph"), {{ nodes, edges }}, {{
    nodes: {{ shape: "dot", size: 12 }},
    physics: {{ stabilization: false, barnesHut: {{ gravitationalConstant: -8000 }} }},
  }});
</script>
</body>
</html>
"#,
    node_count = graph.node_count(),
    edge_count = graph.edge_count(),
    nodes = script_safe(nodes_json),
    edges = script_safe(edges_json),
  ))
}

impl GraphExporter for HtmlExporter {
  fn export(&self, graph: &EntityGraph) -> Result<(), ExportError> {
    let page = render(graph)?;
    discograph_fs::atomic_write_str(&self.path, &page).map_err(|e| ExportError::Io(e.to_string()))?;
    debug!("visualization written to {}", self.path.display());
    Ok(())
  }
}
