//! Shared types for the WASM API
//!
//! Input payloads accepted from JavaScript and the update envelope returned
//! by every call that changes what the reader shows.

use crate::models::{Block, Collection, CollectionId};
use crate::notify::Notification;
use crate::render::{block_html, DisplayList};
use crate::session::TapOutcome;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A collection as loaded from the store
#[derive(Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CollectionInput {
    pub id: String,
    #[serde(default)]
    pub blocks: Vec<Block>,
}

/// Everything `loadProject` needs
#[derive(Deserialize, Clone, Debug, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectPayload {
    pub project_id: String,
    /// In display order
    pub collections: Vec<CollectionInput>,
    /// Raw marker records; malformed entries are dropped on load
    pub markers: Vec<Value>,
}

impl ProjectPayload {
    /// Collections with usable ids (blank ids are skipped)
    pub fn collections(&self) -> Vec<Collection> {
        self.collections
            .iter()
            .filter_map(|c| CollectionId::new(&c.id).map(|id| Collection::new(id, c.blocks.clone())))
            .collect()
    }
}

/// Result of any call that changes the reader view
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ReaderUpdate<'a> {
    pub display: &'a DisplayList,
    /// One article per visible block, in display order
    pub html: Vec<String>,
    /// Queued notifications, drained by this call
    pub notifications: Vec<Notification>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tap: Option<TapOutcome>,
}

impl<'a> ReaderUpdate<'a> {
    pub fn new(display: &'a DisplayList, notifications: Vec<Notification>) -> Self {
        Self {
            display,
            html: display.blocks.iter().map(block_html).collect(),
            notifications,
            tap: None,
        }
    }

    pub fn with_tap(mut self, tap: TapOutcome) -> Self {
        self.tap = Some(tap);
        self
    }
}
