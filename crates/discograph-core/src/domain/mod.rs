pub mod entity_kind;
pub mod graph;
pub mod node;
pub mod snapshot;

pub use entity_kind::{EntityKind, UnknownEntityKind};
pub use graph::{EntityGraph, Insertion};
pub use node::{Attributes, Node};
pub use snapshot::{GraphSnapshot, SNAPSHOT_FORMAT_VERSION};
