mod browse;
mod cli;
mod config;
mod logger;
mod session;

use std::io;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use discograph_config::{DiscographPaths, TomlConfigBackend};
use discograph_core::services::{CancelFlag, SessionService, SessionSettings};
use discograph_musicbrainz::{MusicBrainzClient, MusicBrainzConfig};
use discograph_storage::{HtmlExporter, SnapshotStore, StorageConfig};

use crate::cli::{Cli, Command, CrawlArgs};
use crate::config::CrawlerConfig;
use crate::logger::LogObserver;
use crate::session::{InterruptHandler, Outcome, Prompt};

fn main() -> Result<ExitCode> {
  let args = Cli::parse();
  logger::init(args.verbose);

  let paths = DiscographPaths::detect().context("resolving per-user directories")?;
  let backend = TomlConfigBackend::new(paths);
  let storage = StorageConfig::load(&backend).context("loading [storage] config")?;
  let store = SnapshotStore::new(&storage.snapshot_path);

  match args.command {
    Command::Crawl(crawl_args) => crawl(&backend, &storage, store, crawl_args),
    Command::Search(search_args) => {
      browse::search(&store, &search_args)?;
      Ok(ExitCode::SUCCESS)
    }
    Command::Show(show_args) => {
      browse::show(&store, &show_args)?;
      Ok(ExitCode::SUCCESS)
    }
  }
}

fn crawl(
  backend: &TomlConfigBackend,
  storage: &StorageConfig,
  store: SnapshotStore,
  args: CrawlArgs,
) -> Result<ExitCode> {
  let mb_config = MusicBrainzConfig::load(backend).context("loading [musicbrainz] config")?;
  let mut settings: SessionSettings =
    CrawlerConfig::load(backend).context("loading [crawler] config")?.into();
  if let Some(budget) = args.budget {
    settings.budget = budget;
  }

  let cancel = CancelFlag::new();
  let client = MusicBrainzClient::new(mb_config)
    .context("setting up the MusicBrainz client")?
    .with_cancel_flag(cancel.clone());
  let exporter = HtmlExporter::new(&storage.html_path);
  let mut service =
    SessionService::open(client, store, exporter, settings).with_cancel_flag(cancel);

  let interrupts = InterruptHandler::install(service.cancel_flag())?;
  let observer = LogObserver;

  let outcome = if args.seeds.is_empty() {
    info!("type an artist name to crawl it, `exit` to quit");
    let prompt = Prompt::new(io::stdin().lock(), io::stdout());
    session::drive(&mut service, prompt, interrupts.busy_flag(), &observer)?
  } else {
    session::drive(&mut service, args.seeds, interrupts.busy_flag(), &observer)?
  };

  session::summary(&service);
  info!("visualization: {}", storage.html_path.display());

  Ok(match outcome {
    Outcome::Finished => ExitCode::SUCCESS,
    Outcome::Interrupted => ExitCode::from(session::INTERRUPTED_EXIT_CODE),
  })
}
