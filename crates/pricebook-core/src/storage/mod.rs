//! Storage layer: record types and the load/save boundary.

pub mod json_file;
pub mod traits;
pub mod types;

pub use json_file::JsonFileStore;
pub use traits::RecordStore;
pub use types::{HistoryEntry, Item, RecordSet};
