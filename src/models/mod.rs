//! Models module for the LoopRead reader
//!
//! This module contains the data models shared by the annotation layers:
//! tagged ids, blocks and collections, markers, and the hidden-block set.

pub mod ids;
pub mod collection;
pub mod marker;
pub mod hidden_blocks;
pub mod serde_helpers;

// Re-export commonly used types
pub use ids::*;
pub use collection::{Block, Collection, CollectionDirectory};
pub use marker::{normalize_markers, sort_newest_first, Marker, TokenSpan};
pub use hidden_blocks::HiddenBlocks;
