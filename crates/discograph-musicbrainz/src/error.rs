use thiserror::Error;

/// Setup errors. Request failures are reported as
/// [`ApiFailure`](discograph_core::ports::ApiFailure) instead.
#[derive(Debug, Error)]
pub enum MusicBrainzError {
  #[error("invalid musicbrainz config: {0}")]
  InvalidConfig(String),
}
