//! Reader configuration
//!
//! Passed from JavaScript when a session is created. Every field has a
//! default, so an empty object (or `undefined`) yields a working config.

use serde::{Deserialize, Serialize};

/// Prefix for all device-local storage keys
pub const DEFAULT_STORAGE_PREFIX: &str = "loopread:loop-read:v1";

/// Session-wide configuration
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ReaderConfig {
    /// Prefix for localStorage keys (hidden blocks, last read, active project)
    pub storage_prefix: String,

    /// Label for blocks without a title; `{n}` is the 1-based block number
    pub default_block_label: String,

    /// User-visible notification texts
    pub messages: Messages,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            storage_prefix: DEFAULT_STORAGE_PREFIX.to_string(),
            default_block_label: "Block {n}".to_string(),
            messages: Messages::default(),
        }
    }
}

impl ReaderConfig {
    /// Label shown under a block (its title, or the numbered fallback)
    pub fn block_label(&self, title: &str, block_index: usize) -> String {
        let title = title.trim();
        if !title.is_empty() {
            return title.to_string();
        }
        self.default_block_label
            .replace("{n}", &(block_index + 1).to_string())
    }
}

/// Notification texts, overridable for localization
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Messages {
    pub overlap_conflict: String,
    pub invalid_marker: String,
    pub marker_save_failed: String,
    pub marker_delete_failed: String,
    pub marker_not_found: String,
    pub collection_not_found: String,
    pub no_active_collection: String,
    pub missing_excerpt: String,
    pub empty_note: String,
    /// Notes card title; `{c}` collection number (`?` if unknown), `{b}` block number
    pub marker_card_label: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            overlap_conflict: "This range overlaps an existing marker.".to_string(),
            invalid_marker: "Invalid marker.".to_string(),
            marker_save_failed: "Could not save marker.".to_string(),
            marker_delete_failed: "Could not delete marker.".to_string(),
            marker_not_found: "Marker not found.".to_string(),
            collection_not_found: "Collection not found.".to_string(),
            no_active_collection: "No collection is open.".to_string(),
            missing_excerpt: "(no excerpt)".to_string(),
            empty_note: "No note".to_string(),
            marker_card_label: "Collection {c} · Block {b}".to_string(),
        }
    }
}
