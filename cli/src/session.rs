//! The crawl command: seeds in, checkpoints out, Ctrl-C handled.

use std::io::{BufRead, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use anyhow::{Context, Result};
use log::{info, warn};
use signal_hook::consts::SIGINT;
use signal_hook::iterator::{Handle, Signals};

use discograph_core::CoreError;
use discograph_core::ports::{CrawlObserver, GraphExporter, GraphStore, MetadataClient};
use discograph_core::services::{CancelFlag, SessionService};

/// Exit status after an interrupt, as a shell reports SIGINT.
pub const INTERRUPTED_EXIT_CODE: u8 = 130;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
  /// Every seed was crawled (or the operator typed `exit`).
  Finished,
  /// Ctrl-C stopped a crawl; the partial graph was saved.
  Interrupted,
}

/// Reads seeds from an interactive prompt until `exit` or end of input.
pub struct Prompt<R, W> {
  input: R,
  output: W,
}

impl<R: BufRead, W: Write> Prompt<R, W> {
  pub fn new(input: R, output: W) -> Self {
    Self { input, output }
  }
}

impl<R: BufRead, W: Write> Iterator for Prompt<R, W> {
  type Item = String;

  fn next(&mut self) -> Option<String> {
    loop {
      // Prompt display is best effort.
      let _ = write!(self.output, "artist> ");
      let _ = self.output.flush();

      let mut line = String::new();
      match self.input.read_line(&mut line) {
        Ok(0) => return None,
        Ok(_) => {}
        Err(e) => {
          warn!("could not read from stdin: {e}");
          return None;
        }
      }

      let seed = line.trim();
      if seed.eq_ignore_ascii_case("exit") {
        return None;
      }
      if !seed.is_empty() {
        return Some(seed.to_string());
      }
    }
  }
}

/// SIGINT routing: while a crawl runs the signal raises the cancel flag,
/// otherwise the process exits on the spot.
pub struct InterruptHandler {
  busy: Arc<AtomicBool>,
  handle: Handle,
  thread: Option<thread::JoinHandle<()>>,
}

impl InterruptHandler {
  pub fn install(cancel: CancelFlag) -> Result<Self> {
    let mut signals = Signals::new([SIGINT]).context("registering SIGINT handler")?;
    let handle = signals.handle();
    let busy = Arc::new(AtomicBool::new(false));

    let watched = Arc::clone(&busy);
    let thread = thread::Builder::new()
      .name("sigint".into())
      .spawn(move || {
        for _ in signals.forever() {
          if watched.load(Ordering::SeqCst) {
            warn!("interrupted, saving the graph before exiting");
            cancel.cancel();
          } else {
            // Idle at the prompt: the last seed is already saved.
            std::process::exit(i32::from(INTERRUPTED_EXIT_CODE));
          }
        }
      })
      .context("spawning signal thread")?;

    Ok(Self { busy, handle, thread: Some(thread) })
  }

  pub fn busy_flag(&self) -> &AtomicBool {
    &self.busy
  }
}

impl Drop for InterruptHandler {
  fn drop(&mut self) {
    self.handle.close();
    if let Some(thread) = self.thread.take() {
      let _ = thread.join();
    }
  }
}

/// Crawls each seed in turn and checkpoints after every one.
///
/// `busy` is raised for the crawl plus its checkpoint, so an interrupt in
/// that window is turned into a cancellation instead of an exit. A failed
/// save ends the session with an error; a failed export only warns.
pub fn drive<M, S, E>(
  session: &mut SessionService<M, S, E>,
  seeds: impl IntoIterator<Item = String>,
  busy: &AtomicBool,
  observer: &dyn CrawlObserver,
) -> Result<Outcome>
where
  M: MetadataClient,
  S: GraphStore,
  E: GraphExporter,
{
  for seed in seeds {
    busy.store(true, Ordering::SeqCst);
    let report = session.crawl_seed(&seed, observer);
    let saved = checkpoint(session);
    busy.store(false, Ordering::SeqCst);
    saved?;

    if report.cancelled || session.is_cancelled() {
      return Ok(Outcome::Interrupted);
    }
  }
  Ok(Outcome::Finished)
}

fn checkpoint<M, S, E>(session: &SessionService<M, S, E>) -> Result<()>
where
  M: MetadataClient,
  S: GraphStore,
  E: GraphExporter,
{
  match session.checkpoint() {
    Ok(()) => Ok(()),
    // Already logged by the session; the snapshot itself is on disk.
    Err(CoreError::Export(_)) => Ok(()),
    Err(e) => Err(e).context("saving the graph"),
  }
}

pub fn summary<M, S, E>(session: &SessionService<M, S, E>)
where
  M: MetadataClient,
  S: GraphStore,
  E: GraphExporter,
{
  let graph = session.graph();
  info!("graph now holds {} nodes and {} edges", graph.node_count(), graph.edge_count());
}

#[cfg(test)]
mod tests {
  use super::*;
  use discograph_core::domain::{EntityGraph, EntityKind};
  use discograph_core::ports::{
    ApiFailure, ArtistRecord, NoopObserver, ReleaseRecord, SearchKind, SearchResults,
  };
  use discograph_core::services::SessionSettings;
  use discograph_storage::{HtmlExporter, SnapshotStore};
  use std::io::Cursor;
  use tempfile::tempdir;

  /// Answers every artist search with one artist named after the query.
  struct EchoClient;

  impl MetadataClient for EchoClient {
    fn search(&self, kind: SearchKind, query: &str, _limit: u32) -> Result<SearchResults, ApiFailure> {
      Ok(match kind {
        SearchKind::Artist => {
          let name = query.trim_start_matches("artist:").trim_matches('"').to_string();
          SearchResults::Artists(vec![ArtistRecord {
            id: format!("id-{}", name.to_lowercase()),
            name,
            ..Default::default()
          }])
        }
        SearchKind::Release => SearchResults::Releases(vec![ReleaseRecord {
          id: format!("r-{query}"),
          title: format!("Song for {query}"),
          ..Default::default()
        }]),
      })
    }
  }

  fn session(
    dir: &std::path::Path,
  ) -> SessionService<EchoClient, SnapshotStore, HtmlExporter> {
    SessionService::open(
      EchoClient,
      SnapshotStore::new(dir.join("graph.bin")),
      HtmlExporter::new(dir.join("graph.html")),
      SessionSettings { budget: 2 },
    )
  }

  #[test]
  fn prompt_skips_blanks_and_stops_at_exit() {
    let input = Cursor::new("Radiohead\n\n   \n  Björk  \nexit\nPortishead\n");
    let mut shown = Vec::new();

    let seeds: Vec<String> = Prompt::new(input, &mut shown).collect();

    assert_eq!(seeds, vec!["Radiohead", "Björk"]);
    assert!(String::from_utf8(shown).unwrap().starts_with("artist> "));
  }

  #[test]
  fn prompt_ends_at_eof() {
    let seeds: Vec<String> = Prompt::new(Cursor::new("Radiohead"), Vec::new()).collect();

    assert_eq!(seeds, vec!["Radiohead"]);
  }

  #[test]
  fn every_seed_is_checkpointed() {
    let tmp = tempdir().unwrap();
    let mut session = session(tmp.path());
    let busy = AtomicBool::new(false);

    let outcome =
      drive(&mut session, ["Radiohead".to_string(), "Björk".to_string()], &busy, &NoopObserver)
        .unwrap();

    assert_eq!(outcome, Outcome::Finished);
    assert!(!busy.load(Ordering::SeqCst));

    let saved = EntityGraph::read_from(&SnapshotStore::new(tmp.path().join("graph.bin")))
      .unwrap()
      .unwrap();
    assert_eq!(saved.nodes().filter(|n| n.kind == EntityKind::Artist).count(), 2);
    assert!(tmp.path().join("graph.html").exists());
  }

  #[test]
  fn cancellation_saves_and_stops() {
    let tmp = tempdir().unwrap();
    let mut session = session(tmp.path());
    session.cancel_flag().cancel();
    let busy = AtomicBool::new(false);

    let outcome =
      drive(&mut session, ["Radiohead".to_string(), "Björk".to_string()], &busy, &NoopObserver)
        .unwrap();

    assert_eq!(outcome, Outcome::Interrupted);
    assert!(tmp.path().join("graph.bin").exists());
  }

  #[test]
  fn unwritable_snapshot_is_fatal() {
    let tmp = tempdir().unwrap();
    // A plain file where the snapshot directory should be.
    let blocker = tmp.path().join("blocker");
    std::fs::write(&blocker, b"x").unwrap();
    let mut session = SessionService::open(
      EchoClient,
      SnapshotStore::new(blocker.join("graph.bin")),
      HtmlExporter::new(tmp.path().join("graph.html")),
      SessionSettings { budget: 2 },
    );
    let busy = AtomicBool::new(false);

    let result = drive(&mut session, ["Radiohead".to_string()], &busy, &NoopObserver);

    assert!(result.is_err());
    assert!(!busy.load(Ordering::SeqCst));
    assert!(!tmp.path().join("graph.html").exists());
  }
}
