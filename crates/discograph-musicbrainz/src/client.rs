use std::cell::Cell;
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, warn};

use discograph_core::ports::{ApiFailure, MetadataClient, SearchKind, SearchResults};
use discograph_core::services::CancelFlag;

use crate::config::MusicBrainzConfig;
use crate::dto::{ArtistSearchDto, ReleaseSearchDto};
use crate::error::MusicBrainzError;
use crate::mapping;

/// Largest page the search endpoints accept.
pub const MAX_LIMIT: u32 = 100;

/// Granularity at which sleeps notice a raised cancel flag.
const PAUSE_SLICE: Duration = Duration::from_millis(100);

/// Blocking client for the MusicBrainz search API.
///
/// Calls are spaced by at least `min_interval_ms`; `503` answers and
/// transport errors are retried with linear backoff. Each attempt, body
/// included, is bounded by `timeout_secs`.
pub struct MusicBrainzClient {
  http_client: ureq::Agent,
  config: MusicBrainzConfig,
  last_request: Cell<Option<Instant>>,
  cancel: CancelFlag,
}

impl MusicBrainzClient {
  pub fn new(config: MusicBrainzConfig) -> Result<Self, MusicBrainzError> {
    let base = config.base_url.trim_end_matches('/');
    if !(base.starts_with("http://") || base.starts_with("https://")) {
      return Err(MusicBrainzError::InvalidConfig(format!(
        "base_url must be an http(s) URL, got {:?}",
        config.base_url
      )));
    }
    if config.user_agent.trim().is_empty() {
      return Err(MusicBrainzError::InvalidConfig("user_agent must not be empty".into()));
    }
    if config.timeout_secs == 0 {
      return Err(MusicBrainzError::InvalidConfig("timeout_secs must be positive".into()));
    }

    let timeout = config.timeout();
    let http_client = ureq::AgentBuilder::new()
      .timeout_connect(timeout)
      .timeout(timeout)
      .user_agent(&config.user_agent)
      .build();

    Ok(Self { http_client, config, last_request: Cell::new(None), cancel: CancelFlag::new() })
  }

  /// Once `cancel` is raised, failed requests are no longer retried and
  /// pending waits end early.
  pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
    self.cancel = cancel;
    self
  }

  fn pause(&self, duration: Duration) {
    let deadline = Instant::now() + duration;
    loop {
      let now = Instant::now();
      if now >= deadline || self.cancel.is_cancelled() {
        return;
      }
      thread::sleep((deadline - now).min(PAUSE_SLICE));
    }
  }

  fn throttle(&self) {
    let now = Instant::now();
    let wait = wait_before_next(self.last_request.get(), now, self.config.min_interval());
    if !wait.is_zero() {
      debug!("rate limit: sleeping {} ms", wait.as_millis());
      self.pause(wait);
    }
    self.last_request.set(Some(Instant::now()));
  }

  fn get(&self, url: &str) -> Result<String, ApiFailure> {
    self.throttle();
    debug!("GET {url}");

    let response = self
      .http_client
      .get(url)
      .set("Accept", "application/json")
      .call()
      .map_err(|error| match error {
        ureq::Error::Status(status, _) => ApiFailure::Rejected { status },
        ureq::Error::Transport(transport) => ApiFailure::Network(transport.to_string()),
      })?;

    response
      .into_string()
      .map_err(|error| ApiFailure::Network(format!("failed to read response: {error}")))
  }
}

/// `{base}/ws/2/{kind}/?query=..&fmt=json&limit=..` with `limit` clamped to
/// `1..=MAX_LIMIT`.
pub fn search_url(base_url: &str, kind: SearchKind, query: &str, limit: u32) -> String {
  format!(
    "{}/ws/2/{}/?query={}&fmt=json&limit={}",
    base_url.trim_end_matches('/'),
    kind.path(),
    urlencoding::encode(query),
    limit.clamp(1, MAX_LIMIT)
  )
}

/// Time left before another request may go out.
pub fn wait_before_next(last: Option<Instant>, now: Instant, min_interval: Duration) -> Duration {
  match last {
    Some(last) => min_interval.saturating_sub(now.saturating_duration_since(last)),
    None => Duration::ZERO,
  }
}

/// Overload and transport failures are transient. Anything else would fail
/// the same way again.
pub fn is_retryable(failure: &ApiFailure) -> bool {
  match failure {
    ApiFailure::Network(_) => true,
    ApiFailure::Rejected { status } => *status == 503,
    ApiFailure::Decode(_) => false,
  }
}

pub fn parse_results(kind: SearchKind, body: &str) -> Result<SearchResults, ApiFailure> {
  let decode_error = |error: serde_json::Error| ApiFailure::Decode(format!("{kind} search: {error}"));
  match kind {
    SearchKind::Artist => {
      let dto: ArtistSearchDto = serde_json::from_str(body).map_err(decode_error)?;
      Ok(SearchResults::Artists(mapping::artists(dto)))
    }
    SearchKind::Release => {
      let dto: ReleaseSearchDto = serde_json::from_str(body).map_err(decode_error)?;
      Ok(SearchResults::Releases(mapping::releases(dto)))
    }
  }
}

impl MetadataClient for MusicBrainzClient {
  fn search(&self, kind: SearchKind, query: &str, limit: u32) -> Result<SearchResults, ApiFailure> {
    let url = search_url(&self.config.base_url, kind, query, limit);

    let mut retry = 0;
    let body = loop {
      match self.get(&url) {
        Ok(body) => break body,
        Err(failure)
          if is_retryable(&failure)
            && retry < self.config.max_retries
            && !self.cancel.is_cancelled() =>
        {
          retry += 1;
          let backoff = self.config.backoff(retry);
          warn!(
            "{kind} search failed ({failure}), retry {retry}/{} in {} ms",
            self.config.max_retries,
            backoff.as_millis()
          );
          self.pause(backoff);
        }
        Err(failure) => return Err(failure),
      }
    };

    let results = parse_results(kind, &body)?;
    debug!("{kind} search {query:?}: {} records", results.len());
    Ok(results)
  }
}
