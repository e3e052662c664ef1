//! Error types for annotation operations
//!
//! Every failure in the core is recoverable: the session turns these into
//! user notifications and leaves state either unchanged or aborted.

use crate::models::{CollectionId, MarkerId};
use thiserror::Error;

/// Top-level annotation error type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnnotationError {
    /// Marker fields failed pre-validation; nothing was sent to the store
    #[error("Invalid marker: {0}")]
    Validation(String),

    /// Requested range overlaps an existing marker in the same block
    #[error("Range {start}..={end} in block {block_index} overlaps marker {existing}")]
    Overlap {
        block_index: usize,
        start: usize,
        end: usize,
        existing: MarkerId,
    },

    /// No marker with this id in the current project
    #[error("Marker not found: {0}")]
    MarkerNotFound(MarkerId),

    /// Collection id does not resolve to a loaded collection
    #[error("Collection not found: {0}")]
    CollectionNotFound(CollectionId),

    /// Marker operations need a displayed collection
    #[error("No collection is currently displayed")]
    NoActiveCollection,

    /// Remote store rejected an upsert or delete
    #[error("Store write for marker {marker_id} failed: {reason}")]
    Persistence {
        marker_id: MarkerId,
        deleted: bool,
        reason: String,
    },
}
