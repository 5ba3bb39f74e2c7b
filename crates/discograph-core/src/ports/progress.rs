use crate::domain::Node;
use crate::ports::metadata::{ApiFailure, SearchKind};

/// Receives crawl events as they happen.
///
/// The CLI implements this to echo discoveries to the operator. Every method
/// has an empty default so implementations only pick what they show.
pub trait CrawlObserver {
  /// A node was created. `depth` is 0 for the seed artist's own releases and
  /// grows by one per credited-artist hop.
  fn on_node_added(&self, _node: &Node, _depth: usize) {}

  /// A metadata request failed and was treated as an empty result.
  fn on_request_failed(&self, _kind: SearchKind, _query: &str, _error: &ApiFailure) {}
}

/// Observer that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl CrawlObserver for NoopObserver {}
