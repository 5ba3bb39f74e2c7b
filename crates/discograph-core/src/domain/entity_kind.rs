use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// The kind of entity a graph node stands for.
///
/// The set is closed: the crawler only ever discovers these four kinds from
/// release records, so parsing an unknown name is an error rather than a
/// custom variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
  /// A performer, band or any other credited artist.
  Artist,
  /// A release, shown as a song in the graph.
  Song,
  /// A release group whose primary type is `Album`.
  Album,
  /// A record label.
  Label,
}

impl EntityKind {
  pub const ALL: [EntityKind; 4] =
    [EntityKind::Artist, EntityKind::Song, EntityKind::Album, EntityKind::Label];

  /// Lowercase name, as used in snapshots and by `search --kind`.
  pub fn as_str(&self) -> &'static str {
    match self {
      EntityKind::Artist => "artist",
      EntityKind::Song => "song",
      EntityKind::Album => "album",
      EntityKind::Label => "label",
    }
  }

  /// Colour used to paint nodes of this kind in the visualization.
  pub fn color(&self) -> &'static str {
    match self {
      EntityKind::Artist => "#1f78b4",
      EntityKind::Song => "#33a02c",
      EntityKind::Album => "#6a3d9a",
      EntityKind::Label => "#e31a1c",
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown entity kind: {0}")]
pub struct UnknownEntityKind(pub String);

impl FromStr for EntityKind {
  type Err = UnknownEntityKind;

  /// Parses a kind name, ignoring surrounding whitespace and case.
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let normalized = s.trim().to_lowercase();

    match normalized.as_str() {
      "artist" => Ok(EntityKind::Artist),
      "song" => Ok(EntityKind::Song),
      "album" => Ok(EntityKind::Album),
      "label" => Ok(EntityKind::Label),
      _ => Err(UnknownEntityKind(s.to_string())),
    }
  }
}

impl fmt::Display for EntityKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.pad(self.as_str())
  }
}
