use thiserror::Error;

/// Errors surfaced by the Discograph core to its callers.
///
/// Only the failures that must reach the operator live here. API failures and
/// malformed records are absorbed by the crawler and never become a
/// `CoreError`.
#[derive(Debug, Error)]
pub enum CoreError {
  /// The snapshot could not be written. The in-memory graph is still intact.
  #[error("persistence error: {0}")]
  Persistence(String),

  /// The snapshot was written but the HTML visualization was not regenerated.
  #[error("export error: {0}")]
  Export(String),
}
