use std::fmt;

/// Entity collections the remote metadata service can be searched on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchKind {
  Artist,
  Release,
}

impl SearchKind {
  /// Path segment of the search endpoint (`/ws/2/{segment}/`).
  pub fn path(&self) -> &'static str {
    match self {
      SearchKind::Artist => "artist",
      SearchKind::Release => "release",
    }
  }
}

impl fmt::Display for SearchKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.path())
  }
}

/// A metadata request that produced no usable answer.
///
/// Never fatal: the crawler logs it and carries on as if the search had
/// returned nothing.
#[derive(Debug, thiserror::Error)]
pub enum ApiFailure {
  /// Transport-level problem: DNS, connection, TLS, timeout.
  #[error("network error: {0}")]
  Network(String),

  /// The service answered with a non-success status.
  #[error("request rejected with status {status}")]
  Rejected { status: u16 },

  /// The body could not be read as the expected JSON document.
  #[error("invalid response: {0}")]
  Decode(String),
}

/// An artist as returned by an artist search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtistRecord {
  pub id: String,
  pub name: String,
  pub country: Option<String>,
  pub gender: Option<String>,
}

/// The release group a release belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleaseGroupRecord {
  pub id: String,
  pub title: String,
  /// `Album`, `Single`, `EP`... absent for unclassified groups.
  pub primary_type: Option<String>,
}

/// A label attached to a release. Names are kept verbatim, including the
/// service's placeholder for "no label".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelRecord {
  pub id: String,
  pub name: String,
}

/// An artist named in a release's credit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreditRecord {
  pub id: String,
  pub name: String,
}

/// A release as returned by a release search. Optional parts of the remote
/// record are normalized to `None` or empty lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleaseRecord {
  pub id: String,
  pub title: String,
  pub release_group: Option<ReleaseGroupRecord>,
  pub labels: Vec<LabelRecord>,
  pub credits: Vec<CreditRecord>,
}

/// Records returned by [`MetadataClient::search`], shaped by the searched kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchResults {
  Artists(Vec<ArtistRecord>),
  Releases(Vec<ReleaseRecord>),
}

impl SearchResults {
  pub fn len(&self) -> usize {
    match self {
      SearchResults::Artists(records) => records.len(),
      SearchResults::Releases(records) => records.len(),
    }
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Artist records, or nothing if these are release results.
  pub fn into_artists(self) -> Vec<ArtistRecord> {
    match self {
      SearchResults::Artists(records) => records,
      SearchResults::Releases(_) => Vec::new(),
    }
  }

  /// Release records, or nothing if these are artist results.
  pub fn into_releases(self) -> Vec<ReleaseRecord> {
    match self {
      SearchResults::Releases(records) => records,
      SearchResults::Artists(_) => Vec::new(),
    }
  }
}

/// Port over the remote music-metadata search API.
///
/// Implementations hold no graph state; every call is one outbound request
/// (plus whatever retry policy the adapter applies).
pub trait MetadataClient {
  /// Runs a field query (see [`artist_query`], [`releases_by_artist_query`])
  /// against `kind`, returning at most `limit` records.
  fn search(&self, kind: SearchKind, query: &str, limit: u32) -> Result<SearchResults, ApiFailure>;
}

impl<T: MetadataClient + ?Sized> MetadataClient for &T {
  fn search(&self, kind: SearchKind, query: &str, limit: u32) -> Result<SearchResults, ApiFailure> {
    (**self).search(kind, query, limit)
  }
}

/// Quotes a value for use inside a phrase query.
fn quote(value: &str) -> String {
  let mut quoted = String::with_capacity(value.len() + 2);
  quoted.push('"');
  for c in value.chars() {
    if c == '"' || c == '\\' {
      quoted.push('\\');
    }
    quoted.push(c);
  }
  quoted.push('"');
  quoted
}

/// `artist:"<name>"`
pub fn artist_query(name: &str) -> String {
  format!("artist:{}", quote(name))
}

/// `arid:"<artist id>"`: every release credited to the artist.
pub fn releases_by_artist_query(artist_id: &str) -> String {
  format!("arid:{}", quote(artist_id))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn builds_field_queries() {
    assert_eq!(artist_query("Radiohead"), r#"artist:"Radiohead""#);
    assert_eq!(
      releases_by_artist_query("a74b1b7f-71a5-4011-9441-d0b5e4122711"),
      r#"arid:"a74b1b7f-71a5-4011-9441-d0b5e4122711""#
    );
  }

  #[test]
  fn escapes_quotes_and_backslashes() {
    assert_eq!(artist_query(r#"The "Band" \o/"#), r#"artist:"The \"Band\" \\o/""#);
  }

  #[test]
  fn mismatched_result_kind_reads_as_empty() {
    let results = SearchResults::Artists(vec![ArtistRecord::default()]);

    assert_eq!(results.len(), 1);
    assert!(results.into_releases().is_empty());
    assert!(SearchResults::Releases(Vec::new()).is_empty());
  }
}
