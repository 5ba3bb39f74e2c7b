use clap::{Args, Parser, Subcommand};
use discograph_core::domain::EntityKind;

/// Crawls MusicBrainz into a browsable artist/song/album/label graph
#[derive(Parser, Debug)]
#[command(name = "discograph", version)]
pub struct Cli {
  /// Enable verbose logging (debug level)
  #[arg(short, long, global = true)]
  pub verbose: bool,

  #[command(subcommand)]
  pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
  /// Grow the graph from seed artists
  ///
  /// Without seeds, prompts for artist names until `exit` or end of input.
  /// The graph is saved after every seed and on Ctrl-C. Ctrl-C waits for
  /// the request in flight but skips pending retries.
  Crawl(CrawlArgs),

  /// Find entities whose name contains QUERY (case-insensitive)
  Search(SearchArgs),

  /// Print one entity with its attributes and neighbours
  ///
  /// ID is looked up as an entity id first, then as a name (ignoring case).
  Show(ShowArgs),
}

#[derive(Args, Debug)]
pub struct CrawlArgs {
  /// Artist names to crawl, in order
  #[arg(value_name = "SEED")]
  pub seeds: Vec<String>,

  /// Override the `[crawler] budget` from discograph.toml for this run
  #[arg(short, long)]
  pub budget: Option<u32>,
}

#[derive(Args, Debug)]
pub struct SearchArgs {
  #[arg(value_name = "QUERY")]
  pub query: String,

  /// Only list entities of this kind (artist, song, album, label)
  #[arg(short, long)]
  pub kind: Option<EntityKind>,

  /// Print at most this many matches
  #[arg(short, long, default_value_t = 25)]
  pub limit: usize,
}

#[derive(Args, Debug)]
pub struct ShowArgs {
  /// Entity id as stored in the graph, or its exact name
  #[arg(value_name = "ID")]
  pub id: String,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn crawl_without_seeds_is_interactive() {
    let cli = Cli::try_parse_from(["discograph", "crawl"]).unwrap();

    match cli.command {
      Command::Crawl(args) => {
        assert!(args.seeds.is_empty());
        assert!(args.budget.is_none());
      }
      other => panic!("unexpected command: {other:?}"),
    }
  }

  #[test]
  fn verbose_is_global() {
    let cli =
      Cli::try_parse_from(["discograph", "crawl", "Radiohead", "Björk", "-v", "--budget", "3"])
        .unwrap();

    assert!(cli.verbose);
    match cli.command {
      Command::Crawl(args) => {
        assert_eq!(args.seeds, vec!["Radiohead", "Björk"]);
        assert_eq!(args.budget, Some(3));
      }
      other => panic!("unexpected command: {other:?}"),
    }
  }

  #[test]
  fn search_requires_a_query() {
    assert!(Cli::try_parse_from(["discograph", "search"]).is_err());

    let cli = Cli::try_parse_from(["discograph", "search", "ok comp"]).unwrap();
    assert!(matches!(
      cli.command,
      Command::Search(SearchArgs { ref query, kind: None, limit: 25 }) if query == "ok comp"
    ));
  }

  #[test]
  fn kind_filter_parses_any_case() {
    let cli = Cli::try_parse_from(["discograph", "search", "ok", "--kind", "Album"]).unwrap();
    assert!(matches!(
      cli.command,
      Command::Search(SearchArgs { kind: Some(EntityKind::Album), .. })
    ));

    let err = Cli::try_parse_from(["discograph", "search", "ok", "-k", "podcast"]).unwrap_err();
    assert!(err.to_string().contains("unknown entity kind: podcast"));
  }
}
