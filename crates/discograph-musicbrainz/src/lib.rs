//! MusicBrainz adapter for the [`MetadataClient`](discograph_core::ports::MetadataClient) port.
//!
//! `dto` mirrors the JSON of the `/ws/2` search endpoints, `mapping` turns it
//! into core records, and `client` does the HTTP side (throttling, retries).

pub mod client;
pub mod config;
pub mod dto;
pub mod error;
pub mod mapping;

pub use client::MusicBrainzClient;
pub use config::MusicBrainzConfig;
pub use error::MusicBrainzError;
