use log::{LevelFilter, info};

use discograph_core::domain::Node;
use discograph_core::ports::CrawlObserver;

/// Installs `colog` as the `log` backend. Call once, before anything logs.
pub fn init(verbose: bool) {
  let level = if verbose { LevelFilter::Debug } else { LevelFilter::Info };

  let mut clog = colog::default_builder();
  clog.filter(None, level);
  clog.init();
}

/// Narrates a crawl, one line per discovered entity, indented by recursion
/// depth. Request failures are already logged by the crawler.
pub struct LogObserver;

impl CrawlObserver for LogObserver {
  fn on_node_added(&self, node: &Node, depth: usize) {
    info!("{}+ {} {}", "  ".repeat(depth), node.kind, node.label);
  }
}
