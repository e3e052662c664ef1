//! Toggle highlighting by word
//!
//! Selections are keyed by normalized word, not by token position, so they
//! follow the word through re-renders, collection switches, and into other
//! blocks. Highlights are in-memory only.

use super::color::{color_for, HighlightColor};
use crate::render::DisplayList;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Color assignment for one selected word
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HighlightSelection {
    /// Order of first selection; never reused
    pub sequence_index: u32,
    pub color: HighlightColor,
}

/// Result of a toggle
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum HighlightToggle {
    Added { word: String, color: String },
    Removed { word: String },
}

/// Word-keyed highlight state
#[derive(Clone, Debug, Default)]
pub struct HighlightLayer {
    selections: HashMap<String, HighlightSelection>,
    next_sequence_index: u32,
}

impl HighlightLayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select or deselect a word key
    ///
    /// A deselected word's sequence slot is not reclaimed: selecting it
    /// again assigns a new, different color. Empty keys are ignored.
    pub fn toggle(&mut self, word_key: &str) -> Option<HighlightToggle> {
        if word_key.is_empty() {
            return None;
        }

        if self.selections.remove(word_key).is_some() {
            log::debug!("highlight removed: {}", word_key);
            return Some(HighlightToggle::Removed {
                word: word_key.to_string(),
            });
        }

        let sequence_index = self.next_sequence_index;
        self.next_sequence_index = self.next_sequence_index.saturating_add(1);
        let color = color_for(sequence_index);
        self.selections.insert(
            word_key.to_string(),
            HighlightSelection {
                sequence_index,
                color,
            },
        );
        log::debug!("highlight added: {} #{} {}", word_key, sequence_index, color);

        Some(HighlightToggle::Added {
            word: word_key.to_string(),
            color: color.to_css(),
        })
    }

    pub fn is_selected(&self, word_key: &str) -> bool {
        self.selections.contains_key(word_key)
    }

    pub fn selection(&self, word_key: &str) -> Option<&HighlightSelection> {
        self.selections.get(word_key)
    }

    pub fn next_sequence_index(&self) -> u32 {
        self.next_sequence_index
    }

    pub fn len(&self) -> usize {
        self.selections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selections.is_empty()
    }

    /// Selected words in order of first selection
    pub fn selections(&self) -> Vec<(&str, &HighlightSelection)> {
        let mut list: Vec<_> = self
            .selections
            .iter()
            .map(|(k, v)| (k.as_str(), v))
            .collect();
        list.sort_by_key(|(_, sel)| sel.sequence_index);
        list
    }

    /// Drop all selections and restart color assignment from the first color
    pub fn clear(&mut self) {
        self.selections.clear();
        self.next_sequence_index = 0;
    }

    /// Paint the current selections onto a display list
    ///
    /// Every token of a selected word gets that word's color; every other
    /// token loses any highlight left over from an earlier pass.
    pub fn apply_all(&self, list: &mut DisplayList) {
        for block in list.blocks.iter_mut().filter(|b| b.token_count() > 0) {
            for token in block.tokens_mut() {
                token.highlight = self.selections.get(&token.word).map(|s| s.color.to_css());
            }
        }
    }
}
