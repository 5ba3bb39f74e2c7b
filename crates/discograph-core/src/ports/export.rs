use crate::domain::EntityGraph;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
  #[error("io error: {0}")]
  Io(String),

  #[error("render error: {0}")]
  Render(String),
}

/// Port for the human-facing rendering of the graph, regenerated after every
/// snapshot write.
pub trait GraphExporter {
  fn export(&self, graph: &EntityGraph) -> Result<(), ExportError>;
}
