//! In-memory token index
//!
//! Maps `(block_index, token_index)` to the token produced by the last render
//! pass. Taps, marker text extraction and overlap checks all resolve through
//! this index instead of querying rendered elements.

use crate::models::{TokenAddress, TokenSpan};
use crate::text::WordToken;
use std::collections::BTreeMap;

/// A token as recorded by the last render
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenRecord {
    pub address: TokenAddress,
    pub surface: String,
    pub word: String,
}

/// Tokens of the visible blocks, grouped by block
#[derive(Clone, Debug, Default)]
pub struct TokenIndex {
    blocks: BTreeMap<usize, Vec<TokenRecord>>,
}

impl TokenIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a block's tokens, stamping addresses in document order
    ///
    /// Blocks without tokens are not recorded.
    pub fn insert_block<'a>(&mut self, block_index: usize, tokens: impl IntoIterator<Item = &'a WordToken>) {
        let records: Vec<TokenRecord> = tokens
            .into_iter()
            .enumerate()
            .map(|(token_index, t)| TokenRecord {
                address: TokenAddress::new(block_index, token_index),
                surface: t.surface.clone(),
                word: t.word.clone(),
            })
            .collect();

        if records.is_empty() {
            self.blocks.remove(&block_index);
        } else {
            self.blocks.insert(block_index, records);
        }
    }

    pub fn clear(&mut self) {
        self.blocks.clear();
    }

    /// Resolve an address; stale addresses yield `None`
    pub fn get(&self, address: TokenAddress) -> Option<&TokenRecord> {
        self.blocks
            .get(&address.block_index)?
            .get(address.token_index)
    }

    pub fn contains_block(&self, block_index: usize) -> bool {
        self.blocks.contains_key(&block_index)
    }

    pub fn block_tokens(&self, block_index: usize) -> &[TokenRecord] {
        self.blocks
            .get(&block_index)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Total number of indexed tokens
    pub fn len(&self) -> usize {
        self.blocks.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Every token carrying a highlight key
    pub fn tokens_with_word<'a>(&'a self, word: &'a str) -> impl Iterator<Item = &'a TokenRecord> + 'a {
        self.blocks
            .values()
            .flat_map(|tokens| tokens.iter())
            .filter(move |t| t.word == word)
    }

    /// Surface texts of `span` in one block, joined by single spaces
    ///
    /// `None` when the span is not fully inside the block's tokens.
    pub fn span_text(&self, block_index: usize, span: TokenSpan) -> Option<String> {
        let tokens = self.blocks.get(&block_index)?.get(span.start..=span.end)?;
        let words: Vec<&str> = tokens.iter().map(|t| t.surface.as_str()).collect();
        Some(words.join(" "))
    }
}
