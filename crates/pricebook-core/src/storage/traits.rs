//! Record store trait definition.
//!
//! The `RecordStore` trait is the boundary between the in-memory catalog and
//! whatever holds the persisted collections. Only scalar fields cross it;
//! links are rebuilt by the catalog after every load.

use super::types::{HistoryEntry, Item, RecordSet};
use crate::error::Result;

/// Bulk load/save interface for the two flat collections.
///
/// Implementations must ensure:
/// - A failed load returns an error without partial results
/// - A failed save never leaves a half-written collection behind
/// - Records are saved in the order given
pub trait RecordStore {
    /// Read both collections.
    ///
    /// # Errors
    ///
    /// Returns `PricebookError::NotFound` if a collection does not exist,
    /// or `PricebookError::Parse` if its persisted form is malformed.
    fn load(&self) -> Result<RecordSet>;

    /// Replace both persisted collections.
    ///
    /// # Errors
    ///
    /// Returns `PricebookError::Storage` if either collection cannot be written.
    fn save(&self, items: &[&Item], history: &[&HistoryEntry]) -> Result<()>;
}
