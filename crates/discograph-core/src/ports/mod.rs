pub mod export;
pub mod graph_store;
pub mod metadata;
pub mod progress;

pub use export::{ExportError, GraphExporter};
pub use graph_store::{GraphStore, StoreError};
pub use metadata::{
  ApiFailure, ArtistRecord, CreditRecord, LabelRecord, MetadataClient, ReleaseGroupRecord,
  ReleaseRecord, SearchKind, SearchResults, artist_query, releases_by_artist_query,
};
pub use progress::{CrawlObserver, NoopObserver};
