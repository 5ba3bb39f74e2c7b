use log::{info, warn};

use crate::domain::EntityGraph;
use crate::errors::CoreError;
use crate::ports::{CrawlObserver, GraphExporter, GraphStore, MetadataClient};
use crate::services::crawler::{CancelFlag, CrawlReport, Crawler};

/// Traversal budget handed to every seed crawl unless configured otherwise.
pub const DEFAULT_BUDGET: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSettings {
  /// Per-request result cap and recursion budget of each seed crawl.
  pub budget: u32,
}

impl Default for SessionSettings {
  fn default() -> Self {
    Self { budget: DEFAULT_BUDGET }
  }
}

/// A writer session over the persisted graph.
///
/// Owns the graph for its whole lifetime: loads it on open, lets the crawler
/// grow it one seed at a time, and writes it back at each checkpoint. Only
/// one session should run against a given snapshot at a time.
pub struct SessionService<M, S, E>
where
  M: MetadataClient,
  S: GraphStore,
  E: GraphExporter,
{
  client: M,
  store: S,
  exporter: E,
  graph: EntityGraph,
  settings: SessionSettings,
  cancel: CancelFlag,
}

impl<M, S, E> SessionService<M, S, E>
where
  M: MetadataClient,
  S: GraphStore,
  E: GraphExporter,
{
  /// Restores the graph from `store` (empty on first run or unreadable
  /// snapshot) and wires the adapters together.
  pub fn open(client: M, store: S, exporter: E, settings: SessionSettings) -> Self {
    let graph = EntityGraph::load_from(&store);
    Self { client, store, exporter, graph, settings, cancel: CancelFlag::new() }
  }

  pub fn graph(&self) -> &EntityGraph {
    &self.graph
  }

  /// Shares `cancel` with other parties, such as an adapter that should stop
  /// retrying once the crawl is interrupted.
  pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
    self.cancel = cancel;
    self
  }

  /// Handle for an interrupt handler. Raising it stops the current crawl at
  /// the next record boundary.
  pub fn cancel_flag(&self) -> CancelFlag {
    self.cancel.clone()
  }

  pub fn is_cancelled(&self) -> bool {
    self.cancel.is_cancelled()
  }

  /// Crawls one seed artist with the session budget.
  pub fn crawl_seed(&mut self, name: &str, observer: &dyn CrawlObserver) -> CrawlReport {
    let name = name.trim();
    info!("loading artist: {name}");

    let mut crawler = Crawler::new(&self.client, &mut self.graph, observer)
      .with_cancel_flag(self.cancel.clone());
    crawler.load_artist_by_name(name, self.settings.budget);
    let report = crawler.into_report();

    info!(
      "{name}: {} nodes added, {} edges added, {} requests ({} failed)",
      report.nodes_added, report.edges_added, report.requests, report.failed_requests
    );
    report
  }

  /// Writes the snapshot, then regenerates the visualization from it.
  ///
  /// A failed save aborts the checkpoint. A failed export is reported after
  /// the snapshot is already safe on disk.
  pub fn checkpoint(&self) -> Result<(), CoreError> {
    self.graph.save_to(&self.store)?;
    info!(
      "graph saved: {} nodes, {} edges",
      self.graph.node_count(),
      self.graph.edge_count()
    );

    self.exporter.export(&self.graph).map_err(|e| {
      warn!("visualization export failed: {e}");
      CoreError::Export(e.to_string())
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::GraphSnapshot;
  use crate::ports::{
    ApiFailure, ArtistRecord, ExportError, NoopObserver, ReleaseRecord, SearchKind, SearchResults,
    StoreError,
  };
  use std::cell::RefCell;

  struct OneArtist;

  impl MetadataClient for OneArtist {
    fn search(&self, kind: SearchKind, _query: &str, _limit: u32) -> Result<SearchResults, ApiFailure> {
      Ok(match kind {
        SearchKind::Artist => SearchResults::Artists(vec![ArtistRecord {
          id: "a1".into(),
          name: "Portishead".into(),
          ..Default::default()
        }]),
        SearchKind::Release => SearchResults::Releases(vec![ReleaseRecord {
          id: "r1".into(),
          title: "Dummy".into(),
          ..Default::default()
        }]),
      })
    }
  }

  #[derive(Default)]
  struct Journal {
    events: RefCell<Vec<String>>,
    snapshot: RefCell<Option<GraphSnapshot>>,
  }

  struct JournalStore<'a> {
    journal: &'a Journal,
    fail: bool,
  }

  impl GraphStore for JournalStore<'_> {
    fn load(&self) -> Result<Option<GraphSnapshot>, StoreError> {
      Ok(self.journal.snapshot.borrow().clone())
    }

    fn save(&self, snapshot: &GraphSnapshot) -> Result<(), StoreError> {
      if self.fail {
        return Err(StoreError::Io("disk full".into()));
      }
      self.journal.events.borrow_mut().push("save".into());
      *self.journal.snapshot.borrow_mut() = Some(snapshot.clone());
      Ok(())
    }

    fn quarantine(&self) -> Result<(), StoreError> {
      Ok(())
    }
  }

  struct JournalExporter<'a> {
    journal: &'a Journal,
    fail: bool,
  }

  impl GraphExporter for JournalExporter<'_> {
    fn export(&self, graph: &EntityGraph) -> Result<(), ExportError> {
      if self.fail {
        return Err(ExportError::Io("permission denied".into()));
      }
      self.journal.events.borrow_mut().push(format!("export {}", graph.node_count()));
      Ok(())
    }
  }

  fn session<'a>(
    journal: &'a Journal,
    fail_save: bool,
    fail_export: bool,
  ) -> SessionService<OneArtist, JournalStore<'a>, JournalExporter<'a>> {
    SessionService::open(
      OneArtist,
      JournalStore { journal, fail: fail_save },
      JournalExporter { journal, fail: fail_export },
      SessionSettings::default(),
    )
  }

  #[test]
  fn checkpoint_saves_then_exports() {
    let journal = Journal::default();
    let mut session = session(&journal, false, false);

    let report = session.crawl_seed("  Portishead ", &NoopObserver);
    session.checkpoint().unwrap();

    assert_eq!(report.nodes_added, 2);
    assert_eq!(*journal.events.borrow(), vec!["save".to_string(), "export 2".to_string()]);
  }

  #[test]
  fn reopening_restores_saved_graph() {
    let journal = Journal::default();
    {
      let mut first = session(&journal, false, false);
      first.crawl_seed("Portishead", &NoopObserver);
      first.checkpoint().unwrap();
    }

    let mut second = session(&journal, false, false);
    assert_eq!(second.graph().node_count(), 2);

    let report = second.crawl_seed("Portishead", &NoopObserver);
    assert_eq!(report.nodes_added, 0);
  }

  #[test]
  fn failed_save_skips_export() {
    let journal = Journal::default();
    let mut session = session(&journal, true, false);
    session.crawl_seed("Portishead", &NoopObserver);

    assert!(matches!(session.checkpoint(), Err(CoreError::Persistence(_))));
    assert!(journal.events.borrow().is_empty());
  }

  #[test]
  fn failed_export_still_saves() {
    let journal = Journal::default();
    let mut session = session(&journal, false, true);
    session.crawl_seed("Portishead", &NoopObserver);

    assert!(matches!(session.checkpoint(), Err(CoreError::Export(_))));
    assert!(journal.snapshot.borrow().is_some());
  }

  #[test]
  fn cancel_flag_is_shared_with_crawls() {
    let journal = Journal::default();
    let mut session = session(&journal, false, false);

    session.cancel_flag().cancel();
    let report = session.crawl_seed("Portishead", &NoopObserver);

    assert!(session.is_cancelled());
    assert!(report.cancelled);
    assert!(session.graph().is_empty());
  }

  #[test]
  fn injected_cancel_flag_reaches_the_crawl() {
    let journal = Journal::default();
    let shared = CancelFlag::new();
    let mut session = session(&journal, false, false).with_cancel_flag(shared.clone());

    shared.cancel();
    let report = session.crawl_seed("Portishead", &NoopObserver);

    assert!(report.cancelled);
    assert!(session.cancel_flag().is_cancelled());
  }
}
