//! Notes overview
//!
//! Marker cards for the notes list and the read-only collection preview
//! shown when a card is expanded.

use super::display_list::DisplayList;
use super::pass::RenderEngine;
use crate::config::ReaderConfig;
use crate::error::AnnotationError;
use crate::models::{CollectionDirectory, CollectionId, Marker, MarkerId};
use serde::Serialize;

/// One entry of the notes list
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MarkerCard {
    pub marker_id: MarkerId,
    pub collection_id: CollectionId,
    /// e.g. `Collection 2 · Block 1`
    pub label: String,
    /// Text snapshot, or the missing-excerpt placeholder
    pub excerpt: String,
    /// Note, or the empty-note placeholder
    pub note: String,
    pub has_note: bool,
    /// Whether the preview of this card is open
    pub expanded: bool,
    pub updated_at: i64,
}

/// Cards for every marker, in list order (newest first)
pub fn marker_cards(
    markers: &[Marker],
    directory: &CollectionDirectory,
    config: &ReaderConfig,
    expanded: Option<&MarkerId>,
) -> Vec<MarkerCard> {
    let messages = &config.messages;
    markers
        .iter()
        .map(|m| {
            let collection_no = directory
                .index_of(&m.collection_id)
                .map(|i| (i + 1).to_string())
                .unwrap_or_else(|| "?".to_string());
            let label = messages
                .marker_card_label
                .replace("{c}", &collection_no)
                .replace("{b}", &(m.block_index + 1).to_string());

            MarkerCard {
                marker_id: m.id.clone(),
                collection_id: m.collection_id.clone(),
                label,
                excerpt: if m.text.is_empty() {
                    messages.missing_excerpt.clone()
                } else {
                    m.text.clone()
                },
                note: if m.has_note() {
                    m.note.clone()
                } else {
                    messages.empty_note.clone()
                },
                has_note: m.has_note(),
                expanded: expanded == Some(&m.id),
                updated_at: m.updated_at,
            }
        })
        .collect()
}

/// The marker's whole collection, read-only, with the marker's tokens flagged
///
/// Hidden blocks are shown here; the preview is about context, not the
/// reader's layout.
pub fn marker_preview(
    marker: &Marker,
    directory: &CollectionDirectory,
    config: &ReaderConfig,
) -> Result<DisplayList, AnnotationError> {
    let collection = directory
        .get(&marker.collection_id)
        .ok_or_else(|| AnnotationError::CollectionNotFound(marker.collection_id.clone()))?;

    let mut list = RenderEngine::new(config).render_all(collection).list;
    list.collection_index = directory.index_of(&collection.id).unwrap_or(0);
    list.collection_count = directory.len();

    let span = marker.span();
    for block in list.blocks.iter_mut().filter(|b| b.block_index == marker.block_index) {
        for token in block.tokens_mut().filter(|t| span.contains(t.token_index)) {
            token.marker_id = Some(marker.id.clone());
        }
    }
    list.focus_marker_id = Some(marker.id.clone());
    Ok(list)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Block, Collection};

    fn marker(id: &str, collection: &str, block_index: usize, start: usize, end: usize) -> Marker {
        Marker {
            id: MarkerId::new(id).unwrap(),
            collection_id: CollectionId::new(collection).unwrap(),
            block_index,
            start,
            end,
            note: String::new(),
            text: String::new(),
            created_at: 1,
            updated_at: 1,
        }
    }

    fn directory() -> CollectionDirectory {
        CollectionDirectory::from_collections(vec![
            Collection::new(CollectionId::new("c_a").unwrap(), vec![Block::new("", "alpha beta")]),
            Collection::new(
                CollectionId::new("c_b").unwrap(),
                vec![Block::new("", "one two"), Block::new("", "three four five")],
            ),
        ])
    }

    #[test]
    fn test_card_labels_and_placeholders() {
        let mut with_note = marker("m_1", "c_b", 1, 0, 1);
        with_note.note = "look".to_string();
        with_note.text = "three four".to_string();
        let orphan = marker("m_2", "c_gone", 0, 0, 0);

        let config = ReaderConfig::default();
        let expanded = MarkerId::new("m_2").unwrap();
        let cards = marker_cards(&[with_note, orphan], &directory(), &config, Some(&expanded));

        assert_eq!(cards[0].label, "Collection 2 · Block 2");
        assert_eq!(cards[0].excerpt, "three four");
        assert_eq!(cards[0].note, "look");
        assert!(cards[0].has_note && !cards[0].expanded);

        assert_eq!(cards[1].label, "Collection ? · Block 1");
        assert_eq!(cards[1].excerpt, "(no excerpt)");
        assert_eq!(cards[1].note, "No note");
        assert!(cards[1].expanded);
    }

    #[test]
    fn test_preview_flags_marker_tokens() {
        let config = ReaderConfig::default();
        let m = marker("m_1", "c_b", 1, 1, 2);

        let list = marker_preview(&m, &directory(), &config).unwrap();

        assert_eq!(list.blocks.len(), 2);
        assert_eq!(list.collection_index, 1);
        let flagged: Vec<usize> = list.blocks[1]
            .tokens()
            .filter(|t| t.marker_id.is_some())
            .map(|t| t.token_index)
            .collect();
        assert_eq!(flagged, vec![1, 2]);
        assert_eq!(list.blocks[0].tokens().filter(|t| t.marker_id.is_some()).count(), 0);
    }

    #[test]
    fn test_preview_of_orphan_fails() {
        let config = ReaderConfig::default();
        let m = marker("m_1", "c_gone", 0, 0, 0);
        assert!(matches!(
            marker_preview(&m, &directory(), &config),
            Err(AnnotationError::CollectionNotFound(_))
        ));
    }
}
