//! Display List for reader rendering
//!
//! This module defines the output structure returned from a render pass to
//! JavaScript. The DisplayList carries the tokenized pieces of every visible
//! block together with their decorations, so JavaScript only has to build
//! elements from it and never reads state back out of the DOM.

use crate::models::{CollectionId, MarkerId, TokenAddress};
use crate::session::ActiveTool;
use serde::{Deserialize, Serialize};

/// Why a render has no blocks to show
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum EmptyState {
    NoCollections,
    EmptyCollection,
    AllBlocksHidden,
}

/// Top-level display list for the reader view
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DisplayList {
    /// Displayed collection
    pub collection_id: Option<CollectionId>,

    /// 0-based position of the displayed collection
    pub collection_index: usize,

    pub collection_count: usize,

    /// Visible blocks in order (hidden blocks are absent)
    pub blocks: Vec<RenderBlock>,

    /// Set when `blocks` is empty
    pub empty: Option<EmptyState>,

    /// Marker to scroll into view once this list is painted
    pub focus_marker_id: Option<MarkerId>,

    pub active_tool: ActiveTool,
}

impl DisplayList {
    /// `"3/7"` style position label (`"0/0"` when there is nothing to read)
    pub fn position_label(&self) -> String {
        if self.collection_count == 0 {
            "0/0".to_string()
        } else {
            format!("{}/{}", self.collection_index + 1, self.collection_count)
        }
    }

    pub fn block(&self, block_index: usize) -> Option<&RenderBlock> {
        self.blocks.iter().find(|b| b.block_index == block_index)
    }

    pub fn token(&self, address: TokenAddress) -> Option<&RenderToken> {
        self.block(address.block_index)?
            .tokens()
            .find(|t| t.token_index == address.token_index)
    }

    pub fn token_count(&self) -> usize {
        self.blocks.iter().map(RenderBlock::token_count).sum()
    }
}

/// One visible block
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RenderBlock {
    /// Position of the block within its collection
    pub block_index: usize,

    /// Title, or the numbered fallback label
    pub label: String,

    pub pieces: Vec<RenderPiece>,
}

impl RenderBlock {
    pub fn tokens(&self) -> impl Iterator<Item = &RenderToken> {
        self.pieces.iter().filter_map(|p| match p {
            RenderPiece::Token(t) => Some(t),
            RenderPiece::Text { .. } => None,
        })
    }

    pub fn tokens_mut(&mut self) -> impl Iterator<Item = &mut RenderToken> {
        self.pieces.iter_mut().filter_map(|p| match p {
            RenderPiece::Token(t) => Some(t),
            RenderPiece::Text { .. } => None,
        })
    }

    pub fn token_count(&self) -> usize {
        self.tokens().count()
    }

    /// Concatenated surface text
    pub fn text(&self) -> String {
        self.pieces
            .iter()
            .map(|p| match p {
                RenderPiece::Token(t) => t.text.as_str(),
                RenderPiece::Text { text, .. } => text.as_str(),
            })
            .collect()
    }
}

/// Plain text or an addressable word
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RenderPiece {
    Text { text: String, bold: bool },
    Token(RenderToken),
}

/// A word token with its decorations
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RenderToken {
    pub token_index: usize,

    /// Surface text
    pub text: String,

    /// Highlight key
    pub word: String,

    pub bold: bool,

    /// CSS color when the word is highlighted
    #[serde(default)]
    pub highlight: Option<String>,

    /// Marker covering this token (only while the marker tool is active)
    #[serde(default)]
    pub marker_id: Option<MarkerId>,

    /// First endpoint of an in-progress range selection
    #[serde(default)]
    pub pending: bool,
}

impl RenderToken {
    pub fn is_decorated(&self) -> bool {
        self.highlight.is_some() || self.marker_id.is_some() || self.pending
    }
}
