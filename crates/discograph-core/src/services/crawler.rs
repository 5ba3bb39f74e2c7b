use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, info, warn};

use crate::domain::{Attributes, EntityGraph, EntityKind, Insertion};
use crate::ports::metadata::{artist_query, releases_by_artist_query};
use crate::ports::{CrawlObserver, MetadataClient, ReleaseRecord, SearchKind, SearchResults};

/// Label name the metadata service uses for releases without a label.
pub const NO_LABEL: &str = "[no label]";

/// Release-group primary type that turns a release group into an album node.
const ALBUM_TYPE: &str = "Album";

/// Value stored for artist attributes the remote record leaves out.
const UNKNOWN: &str = "unknown";

/// Shared flag an interrupt handler raises to stop a running crawl.
///
/// The crawler polls it between requests and between records, so a raised
/// flag never leaves a half-processed node behind.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn cancel(&self) {
    self.0.store(true, Ordering::SeqCst);
  }

  pub fn is_cancelled(&self) -> bool {
    self.0.load(Ordering::SeqCst)
  }
}

/// Bookkeeping for one seed crawl.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlReport {
  pub nodes_added: usize,
  pub edges_added: usize,
  pub requests: usize,
  pub failed_requests: usize,
  /// The crawl stopped early because the cancel flag was raised.
  pub cancelled: bool,
}

/// Depth-first discovery of artists and everything released around them.
///
/// Each branch goes through the same steps: resolve the seed artist, expand
/// its releases into song / album / label nodes, then recurse into every
/// credited artist the graph has not seen yet. The `limit` handed to the
/// first call is both the per-request result cap and the budget of the whole
/// branch: it shrinks by one per hop, so the recursion is at most `limit`
/// levels deep.
pub struct Crawler<'a, C: MetadataClient> {
  client: &'a C,
  graph: &'a mut EntityGraph,
  observer: &'a dyn CrawlObserver,
  cancel: CancelFlag,
  report: CrawlReport,
}

impl<'a, C: MetadataClient> Crawler<'a, C> {
  pub fn new(client: &'a C, graph: &'a mut EntityGraph, observer: &'a dyn CrawlObserver) -> Self {
    Self { client, graph, observer, cancel: CancelFlag::new(), report: CrawlReport::default() }
  }

  pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
    self.cancel = cancel;
    self
  }

  pub fn into_report(self) -> CrawlReport {
    self.report
  }

  /// Resolves `name` to artist nodes and expands each one right away.
  pub fn load_artist_by_name(&mut self, name: &str, limit: u32) {
    let Some(results) = self.search(SearchKind::Artist, &artist_query(name), limit) else {
      return;
    };

    let artists = results.into_artists();
    if artists.is_empty() {
      info!("no artist matches '{name}'");
    }

    for record in artists {
      if self.stopped() {
        return;
      }

      let mut attributes = Attributes::new();
      attributes.insert("country".to_string(), record.country.unwrap_or_else(|| UNKNOWN.into()));
      attributes.insert("gender".to_string(), record.gender.unwrap_or_else(|| UNKNOWN.into()));

      let artist_id =
        self.add_node(&record.id, &record.name, EntityKind::Artist, attributes, 0).into_id();
      self.load_artist_songs(&artist_id, limit, 0);
    }
  }

  /// Expands the releases credited to `artist_id`, recursing into newly
  /// discovered credited artists while `limit` stays positive.
  pub fn load_artist_songs(&mut self, artist_id: &str, limit: u32, depth: usize) {
    let Some(results) = self.search(SearchKind::Release, &releases_by_artist_query(artist_id), limit)
    else {
      return;
    };

    for release in results.into_releases() {
      if self.stopped() {
        return;
      }
      self.expand_release(artist_id, release, limit, depth);
    }
  }

  fn expand_release(&mut self, artist_id: &str, release: ReleaseRecord, limit: u32, depth: usize) {
    debug!("{}release '{}' ({})", "  ".repeat(depth), release.title, release.id);

    let song_id = self
      .add_node(&release.id, &release.title, EntityKind::Song, Attributes::new(), depth)
      .into_id();
    self.add_edge(&song_id, artist_id);

    if let Some(group) = release.release_group {
      if group.primary_type.as_deref() == Some(ALBUM_TYPE) {
        let album_id = self
          .add_node(&group.id, &group.title, EntityKind::Album, Attributes::new(), depth)
          .into_id();
        self.add_edge(&album_id, artist_id);
      }
    }

    for label in release.labels {
      if label.name == NO_LABEL {
        continue;
      }
      let label_id = self
        .add_node(&label.id, &label.name, EntityKind::Label, Attributes::new(), depth)
        .into_id();
      self.add_edge(&label_id, artist_id);
    }

    for credit in release.credits {
      if self.stopped() {
        return;
      }
      if self.graph.contains(&credit.id) {
        continue;
      }

      // A new id whose name is already taken merges into the existing artist,
      // which is either being expanded or was expanded before.
      let credited =
        self.add_node(&credit.id, &credit.name, EntityKind::Artist, Attributes::new(), depth + 1);
      self.add_edge(&song_id, credited.id());

      if credited.is_new() && limit > 0 {
        self.load_artist_songs(credited.id(), limit - 1, depth + 1);
      }
    }
  }

  /// One outbound request. Failures are absorbed here: logged, counted,
  /// reported to the observer, and turned into `None`.
  fn search(&mut self, kind: SearchKind, query: &str, limit: u32) -> Option<SearchResults> {
    if self.stopped() {
      return None;
    }

    self.report.requests += 1;
    match self.client.search(kind, query, limit) {
      Ok(results) => Some(results),
      Err(e) => {
        self.report.failed_requests += 1;
        warn!("{kind} search {query} failed: {e}");
        self.observer.on_request_failed(kind, query, &e);
        None
      }
    }
  }

  fn add_node(
    &mut self,
    id: &str,
    label: &str,
    kind: EntityKind,
    attributes: Attributes,
    depth: usize,
  ) -> Insertion {
    let insertion = self.graph.add_node(id, label, kind, attributes);
    if insertion.is_new() {
      self.report.nodes_added += 1;
      if let Some(node) = self.graph.node(insertion.id()) {
        self.observer.on_node_added(node, depth);
      }
    }
    insertion
  }

  fn add_edge(&mut self, a: &str, b: &str) {
    if self.graph.add_edge(a, b) {
      self.report.edges_added += 1;
    }
  }

  fn stopped(&mut self) -> bool {
    if self.cancel.is_cancelled() {
      self.report.cancelled = true;
    }
    self.report.cancelled
  }
}
