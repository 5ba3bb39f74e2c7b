pub mod config;
pub mod html;
pub mod snapshot;

pub use config::StorageConfig;
pub use html::HtmlExporter;
pub use snapshot::SnapshotStore;
