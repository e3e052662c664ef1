//! Persisted range markers
//!
//! A marker pins a note to a closed token range `[start, end]` inside one
//! block of one collection. The range is expressed in token indices of the
//! block as tokenized when the marker was created; `text` is a snapshot of
//! those tokens and is never refreshed.

use super::ids::{CollectionId, MarkerId};
use super::serde_helpers::{coerce_index, coerce_millis, coerce_string, coerce_text};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

/// Closed interval of token indices within one block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSpan {
    pub start: usize,
    pub end: usize,
}

impl TokenSpan {
    /// Build a span from two endpoints in either order
    pub fn new(a: usize, b: usize) -> Self {
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    pub fn contains(&self, token_index: usize) -> bool {
        token_index >= self.start && token_index <= self.end
    }

    /// Closed-interval overlap; touching endpoints count as overlap
    pub fn overlaps(&self, other: &TokenSpan) -> bool {
        !(self.end < other.start || self.start > other.end)
    }

    /// Number of tokens covered (never zero)
    pub fn token_count(&self) -> usize {
        self.end - self.start + 1
    }
}

/// A marker as stored in the project's marker collection
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    pub id: MarkerId,
    pub collection_id: CollectionId,
    pub block_index: usize,
    pub start: usize,
    pub end: usize,
    #[serde(default)]
    pub note: String,
    /// Space-joined token text at creation time
    #[serde(default)]
    pub text: String,
    /// Epoch milliseconds
    pub created_at: i64,
    pub updated_at: i64,
}

impl Marker {
    pub fn span(&self) -> TokenSpan {
        TokenSpan::new(self.start, self.end)
    }

    /// Whether this marker sits in the given collection and block
    pub fn is_in(&self, collection_id: &CollectionId, block_index: usize) -> bool {
        &self.collection_id == collection_id && self.block_index == block_index
    }

    pub fn covers(&self, collection_id: &CollectionId, block_index: usize, token_index: usize) -> bool {
        self.is_in(collection_id, block_index) && self.span().contains(token_index)
    }

    pub fn has_note(&self) -> bool {
        !self.note.trim().is_empty()
    }
}

/// Order markers newest `updated_at` first (stable for equal timestamps)
pub fn sort_newest_first(markers: &mut [Marker]) {
    markers.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
}

/// Clean up marker records loaded from the store
///
/// Skips records without an id, duplicate ids, records without a collection
/// id, and records whose numeric fields are not finite non-negative integers.
/// Reversed ranges are swapped. Missing timestamps default to `now`
/// (`updated_at` falls back to `created_at`). The result is newest first.
pub fn normalize_markers(records: &[Value], now: i64) -> Vec<Marker> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();

    for record in records {
        let Some(obj) = record.as_object() else {
            continue;
        };

        let Some(id) = MarkerId::new(coerce_string(obj.get("id"))) else {
            continue;
        };
        if seen.contains(&id) {
            continue;
        }

        let Some(collection_id) = CollectionId::new(coerce_string(obj.get("collectionId"))) else {
            continue;
        };

        let field = |name: &str| obj.get(name).and_then(coerce_index);
        let (Some(block_index), Some(start), Some(end)) = (field("blockIndex"), field("start"), field("end")) else {
            log::debug!("skipping marker {} with invalid range fields", id);
            continue;
        };

        let span = TokenSpan::new(start, end);
        let created_at = coerce_millis(obj.get("createdAt")).unwrap_or(now);
        let updated_at = coerce_millis(obj.get("updatedAt")).unwrap_or(created_at);

        seen.insert(id.clone());
        out.push(Marker {
            id,
            collection_id,
            block_index,
            start: span.start,
            end: span.end,
            note: coerce_text(obj.get("note")),
            text: coerce_text(obj.get("text")),
            created_at,
            updated_at,
        });
    }

    sort_newest_first(&mut out);
    out
}
