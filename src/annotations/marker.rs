//! Range markers with notes
//!
//! Two-tap range selection inside one block:
//!
//! - Idle: tapping a marked token opens that marker's note; tapping any
//!   other token records it as the pending start.
//! - Pending: tapping a token in the same block closes the range and tries
//!   to create a marker; tapping in another block restarts the selection
//!   there. Ranges never cross blocks.
//!
//! Overlap between markers of the same collection and block is rejected at
//! creation time with a closed-interval test.

use crate::error::AnnotationError;
use crate::models::{sort_newest_first, CollectionId, Marker, MarkerId, TokenAddress, TokenSpan};
use crate::render::{DisplayList, TokenIndex};
use crate::utils::IdSource;
use serde::Serialize;
use std::collections::HashSet;

/// Outcome of a tap with the marker tool active
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum MarkerTap {
    /// Idle → Pending
    PendingStarted { start: TokenAddress },
    /// Pending start moved to another block
    PendingRestarted {
        previous: TokenAddress,
        start: TokenAddress,
    },
    /// A marker was created and should be opened for note entry
    #[serde(rename_all = "camelCase")]
    Created { marker_id: MarkerId },
    /// The tapped token belongs to an existing marker
    #[serde(rename_all = "camelCase")]
    OpenNote { marker_id: MarkerId },
    /// Stale address or nothing to act on
    Ignored,
}

/// The project's markers plus in-progress selection state
#[derive(Clone, Debug, Default)]
pub struct MarkerLayer {
    /// Newest `updated_at` first
    markers: Vec<Marker>,
    pending_start: Option<TokenAddress>,
}

impl MarkerLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_markers(mut markers: Vec<Marker>) -> Self {
        sort_newest_first(&mut markers);
        Self {
            markers,
            pending_start: None,
        }
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn get(&self, id: &MarkerId) -> Option<&Marker> {
        self.markers.iter().find(|m| &m.id == id)
    }

    pub fn pending_start(&self) -> Option<TokenAddress> {
        self.pending_start
    }

    pub fn clear_pending(&mut self) {
        if let Some(addr) = self.pending_start.take() {
            log::debug!("pending marker start {} cleared", addr);
        }
    }

    /// Markers of one collection, newest first
    pub fn markers_for<'a>(&'a self, collection_id: &'a CollectionId) -> impl Iterator<Item = &'a Marker> + 'a {
        self.markers
            .iter()
            .filter(move |m| &m.collection_id == collection_id)
    }

    /// The marker covering a token of the given collection, if any
    pub fn marker_at(&self, collection_id: &CollectionId, address: TokenAddress) -> Option<&Marker> {
        self.markers
            .iter()
            .find(|m| m.covers(collection_id, address.block_index, address.token_index))
    }

    /// First existing marker in the same block whose range overlaps `span`
    pub fn find_overlap(&self, collection_id: &CollectionId, block_index: usize, span: TokenSpan) -> Option<&Marker> {
        self.markers
            .iter()
            .find(|m| m.is_in(collection_id, block_index) && m.span().overlaps(&span))
    }

    /// Advance the two-tap state machine
    ///
    /// The pending start is cleared before a creation attempt, so an overlap
    /// error always leaves the layer Idle.
    pub fn tap(
        &mut self,
        collection_id: &CollectionId,
        address: TokenAddress,
        tokens: &TokenIndex,
        now: i64,
        ids: &mut dyn IdSource,
    ) -> Result<MarkerTap, AnnotationError> {
        if tokens.get(address).is_none() {
            log::debug!("tap on stale token address {}", address);
            return Ok(MarkerTap::Ignored);
        }

        let Some(start) = self.pending_start else {
            if let Some(existing) = self.marker_at(collection_id, address) {
                return Ok(MarkerTap::OpenNote {
                    marker_id: existing.id.clone(),
                });
            }
            self.pending_start = Some(address);
            return Ok(MarkerTap::PendingStarted { start: address });
        };

        if !start.same_block(&address) {
            self.pending_start = Some(address);
            return Ok(MarkerTap::PendingRestarted {
                previous: start,
                start: address,
            });
        }

        self.pending_start = None;
        let span = TokenSpan::new(start.token_index, address.token_index);
        let marker = self.create_marker(collection_id, address.block_index, span, tokens, now, ids)?;
        Ok(MarkerTap::Created {
            marker_id: marker.id.clone(),
        })
    }

    /// Create a marker over `span` in one block
    ///
    /// Fails when the span runs past the block's last token or overlaps any
    /// marker of the same collection and block.
    /// The new marker is prepended and returned.
    pub fn create_marker(
        &mut self,
        collection_id: &CollectionId,
        block_index: usize,
        span: TokenSpan,
        tokens: &TokenIndex,
        now: i64,
        ids: &mut dyn IdSource,
    ) -> Result<&Marker, AnnotationError> {
        let span = TokenSpan::new(span.start, span.end);

        let token_count = tokens.block_tokens(block_index).len();
        if span.end >= token_count {
            return Err(AnnotationError::Validation(format!(
                "range {}..={} is outside block {} ({} tokens)",
                span.start, span.end, block_index, token_count
            )));
        }

        if let Some(existing) = self.find_overlap(collection_id, block_index, span) {
            return Err(AnnotationError::Overlap {
                block_index,
                start: span.start,
                end: span.end,
                existing: existing.id.clone(),
            });
        }

        let text = tokens.span_text(block_index, span).ok_or_else(|| {
            AnnotationError::Validation(format!("block {} has no rendered tokens", block_index))
        })?;

        let id = MarkerId::new(ids.next_id("m"))
            .ok_or_else(|| AnnotationError::Validation("generated marker id is empty".to_string()))?;

        log::info!(
            "marker {} created in {} block {} [{}, {}]",
            id,
            collection_id,
            block_index,
            span.start,
            span.end
        );

        self.markers.insert(
            0,
            Marker {
                id,
                collection_id: collection_id.clone(),
                block_index,
                start: span.start,
                end: span.end,
                note: String::new(),
                text,
                created_at: now,
                updated_at: now,
            },
        );
        Ok(&self.markers[0])
    }

    /// Replace a marker's note; the range and text snapshot never change
    pub fn update_note(&mut self, id: &MarkerId, note: &str, now: i64) -> Result<&Marker, AnnotationError> {
        let marker = self
            .markers
            .iter_mut()
            .find(|m| &m.id == id)
            .ok_or_else(|| AnnotationError::MarkerNotFound(id.clone()))?;

        marker.note = note.to_string();
        marker.updated_at = now;

        sort_newest_first(&mut self.markers);
        self.get(id)
            .ok_or_else(|| AnnotationError::MarkerNotFound(id.clone()))
    }

    pub fn remove(&mut self, id: &MarkerId) -> Option<Marker> {
        let pos = self.markers.iter().position(|m| &m.id == id)?;
        Some(self.markers.remove(pos))
    }

    /// Drop every marker of the given collections, returning the removed ids
    pub fn remove_for_collections(&mut self, collection_ids: &[CollectionId]) -> Vec<MarkerId> {
        let doomed: HashSet<&CollectionId> = collection_ids.iter().collect();
        let mut removed = Vec::new();
        self.markers.retain(|m| {
            if doomed.contains(&m.collection_id) {
                removed.push(m.id.clone());
                false
            } else {
                true
            }
        });
        removed
    }

    /// Keep only markers whose collection passes `keep`
    pub fn retain_collections(&mut self, keep: impl Fn(&CollectionId) -> bool) -> usize {
        let before = self.markers.len();
        self.markers.retain(|m| keep(&m.collection_id));
        before - self.markers.len()
    }

    pub fn clear(&mut self) {
        self.markers.clear();
        self.pending_start = None;
    }

    /// Stamp marker ids and the pending flag onto a display list
    ///
    /// With the tool disabled (or no collection displayed) every marker
    /// decoration is stripped; the markers themselves are untouched.
    pub fn apply_all(&self, list: &mut DisplayList, collection_id: Option<&CollectionId>, enabled: bool) {
        for block in list.blocks.iter_mut().filter(|b| b.token_count() > 0) {
            let block_index = block.block_index;
            for token in block.tokens_mut() {
                let address = TokenAddress::new(block_index, token.token_index);
                match collection_id {
                    Some(cid) if enabled => {
                        token.marker_id = self.marker_at(cid, address).map(|m| m.id.clone());
                        token.pending = self.pending_start == Some(address);
                    }
                    _ => {
                        token.marker_id = None;
                        token.pending = false;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::{tokenize_content, tokens};
    use crate::utils::SequentialIds;

    fn cid(raw: &str) -> CollectionId {
        CollectionId::new(raw).unwrap()
    }

    fn index_of(blocks: &[&str]) -> TokenIndex {
        let mut index = TokenIndex::new();
        for (i, content) in blocks.iter().enumerate() {
            index.insert_block(i, tokens(&tokenize_content(content)));
        }
        index
    }

    const TEN_WORDS: &str = "one two three four five six seven eight nine ten";

    #[test]
    fn test_two_taps_create_marker() {
        let index = index_of(&["The **quick** brown fox"]);
        let mut layer = MarkerLayer::new();
        let mut ids = SequentialIds::new();
        let c = cid("c_1");

        let first = layer.tap(&c, TokenAddress::new(0, 2), &index, 10, &mut ids).unwrap();
        assert_eq!(first, MarkerTap::PendingStarted { start: TokenAddress::new(0, 2) });

        let second = layer.tap(&c, TokenAddress::new(0, 1), &index, 10, &mut ids).unwrap();
        assert!(matches!(second, MarkerTap::Created { .. }));
        assert_eq!(layer.pending_start(), None);

        let m = &layer.markers()[0];
        assert_eq!((m.start, m.end), (1, 2));
        assert_eq!(m.text, "quick brown");
        assert_eq!((m.created_at, m.updated_at), (10, 10));
        assert_eq!(m.note, "");
    }

    #[test]
    fn test_overlap_rejected_adjacent_allowed() {
        let index = index_of(&["a", "b", TEN_WORDS]);
        let mut layer = MarkerLayer::new();
        let mut ids = SequentialIds::new();
        let c = cid("c_1");

        layer.create_marker(&c, 2, TokenSpan::new(3, 7), &index, 1, &mut ids).unwrap();

        let err = layer.create_marker(&c, 2, TokenSpan::new(5, 9), &index, 2, &mut ids).unwrap_err();
        assert!(matches!(err, AnnotationError::Overlap { start: 5, end: 9, .. }));
        assert_eq!(layer.len(), 1);

        layer.create_marker(&c, 2, TokenSpan::new(8, 9), &index, 3, &mut ids).unwrap();
        assert_eq!(layer.len(), 2);
        assert_eq!(layer.markers()[0].text, "nine ten");
    }

    #[test]
    fn test_overlap_scoped_to_collection_and_block() {
        let index = index_of(&[TEN_WORDS, TEN_WORDS]);
        let mut layer = MarkerLayer::new();
        let mut ids = SequentialIds::new();

        layer.create_marker(&cid("c_1"), 0, TokenSpan::new(0, 4), &index, 1, &mut ids).unwrap();
        layer.create_marker(&cid("c_2"), 0, TokenSpan::new(0, 4), &index, 1, &mut ids).unwrap();
        layer.create_marker(&cid("c_1"), 1, TokenSpan::new(0, 4), &index, 1, &mut ids).unwrap();
        assert_eq!(layer.len(), 3);
    }

    #[test]
    fn test_span_past_last_token_rejected() {
        let index = index_of(&["The **quick** brown fox"]);
        let mut layer = MarkerLayer::new();
        let mut ids = SequentialIds::new();
        let c = cid("c_1");

        let err = layer.create_marker(&c, 0, TokenSpan::new(2, 50), &index, 1, &mut ids).unwrap_err();
        assert!(matches!(err, AnnotationError::Validation(_)));

        let err = layer.create_marker(&c, 0, TokenSpan::new(0, usize::MAX), &index, 1, &mut ids).unwrap_err();
        assert!(matches!(err, AnnotationError::Validation(_)));

        let err = layer.create_marker(&c, 3, TokenSpan::new(0, 0), &index, 1, &mut ids).unwrap_err();
        assert!(matches!(err, AnnotationError::Validation(_)));
        assert!(layer.is_empty());

        let m = layer.create_marker(&c, 0, TokenSpan::new(2, 3), &index, 1, &mut ids).unwrap();
        assert_eq!((m.end, m.text.as_str()), (3, "brown fox"));
    }

    #[test]
    fn test_failed_creation_leaves_idle() {
        let index = index_of(&[TEN_WORDS]);
        let mut layer = MarkerLayer::new();
        let mut ids = SequentialIds::new();
        let c = cid("c_1");
        layer.create_marker(&c, 0, TokenSpan::new(4, 4), &index, 1, &mut ids).unwrap();

        layer.tap(&c, TokenAddress::new(0, 2), &index, 2, &mut ids).unwrap();
        let result = layer.tap(&c, TokenAddress::new(0, 6), &index, 2, &mut ids);

        assert!(result.is_err());
        assert_eq!(layer.pending_start(), None);
        assert_eq!(layer.len(), 1);
    }

    #[test]
    fn test_cross_block_tap_restarts_pending() {
        let index = index_of(&[TEN_WORDS, TEN_WORDS]);
        let mut layer = MarkerLayer::new();
        let mut ids = SequentialIds::new();
        let c = cid("c_1");

        layer.tap(&c, TokenAddress::new(0, 2), &index, 1, &mut ids).unwrap();
        let tap = layer.tap(&c, TokenAddress::new(1, 0), &index, 1, &mut ids).unwrap();

        assert_eq!(
            tap,
            MarkerTap::PendingRestarted {
                previous: TokenAddress::new(0, 2),
                start: TokenAddress::new(1, 0),
            }
        );
        assert!(layer.is_empty());
        assert_eq!(layer.pending_start(), Some(TokenAddress::new(1, 0)));
    }

    #[test]
    fn test_tap_on_marked_token_opens_note() {
        let index = index_of(&[TEN_WORDS]);
        let mut layer = MarkerLayer::new();
        let mut ids = SequentialIds::new();
        let c = cid("c_1");
        let id = layer.create_marker(&c, 0, TokenSpan::new(2, 4), &index, 1, &mut ids).unwrap().id.clone();

        let tap = layer.tap(&c, TokenAddress::new(0, 3), &index, 2, &mut ids).unwrap();

        assert_eq!(tap, MarkerTap::OpenNote { marker_id: id });
        assert_eq!(layer.pending_start(), None);
    }

    #[test]
    fn test_stale_address_ignored() {
        let index = index_of(&["two words"]);
        let mut layer = MarkerLayer::new();
        let mut ids = SequentialIds::new();

        let tap = layer.tap(&cid("c"), TokenAddress::new(0, 9), &index, 1, &mut ids).unwrap();
        assert_eq!(tap, MarkerTap::Ignored);
        assert_eq!(layer.pending_start(), None);
    }

    #[test]
    fn test_update_note_resorts() {
        let index = index_of(&[TEN_WORDS]);
        let mut layer = MarkerLayer::new();
        let mut ids = SequentialIds::new();
        let c = cid("c");
        let old = layer.create_marker(&c, 0, TokenSpan::new(0, 0), &index, 1, &mut ids).unwrap().id.clone();
        layer.create_marker(&c, 0, TokenSpan::new(1, 1), &index, 2, &mut ids).unwrap();

        let updated = layer.update_note(&old, "remember", 5).unwrap();
        assert_eq!((updated.start, updated.end, updated.text.as_str()), (0, 0, "one"));

        assert_eq!(layer.markers()[0].id, old);
        assert_eq!(layer.markers()[0].note, "remember");

        let missing = MarkerId::new("m_missing").unwrap();
        assert_eq!(
            layer.update_note(&missing, "x", 6).unwrap_err(),
            AnnotationError::MarkerNotFound(missing)
        );
    }

    #[test]
    fn test_remove_for_collections() {
        let index = index_of(&[TEN_WORDS]);
        let mut layer = MarkerLayer::new();
        let mut ids = SequentialIds::new();
        layer.create_marker(&cid("c_1"), 0, TokenSpan::new(0, 0), &index, 1, &mut ids).unwrap();
        layer.create_marker(&cid("c_2"), 0, TokenSpan::new(0, 0), &index, 1, &mut ids).unwrap();
        layer.create_marker(&cid("c_1"), 0, TokenSpan::new(1, 1), &index, 1, &mut ids).unwrap();

        let removed = layer.remove_for_collections(&[cid("c_1")]);

        assert_eq!(removed.len(), 2);
        assert_eq!(layer.len(), 1);
        assert_eq!(layer.markers()[0].collection_id, cid("c_2"));
    }
}
