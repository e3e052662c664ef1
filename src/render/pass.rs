//! Render pass
//!
//! Turns the displayed collection into a DisplayList and the matching
//! TokenIndex. Hidden blocks are skipped before tokenization, so they
//! contribute no tokens and can never be decorated.

use super::display_list::*;
use super::token_index::TokenIndex;
use crate::config::ReaderConfig;
use crate::models::{Block, Collection, CollectionDirectory, HiddenBlocks};
use crate::text::{tokenize_content, Piece};

/// Result of one render pass
#[derive(Clone, Debug, Default)]
pub struct RenderOutput {
    pub list: DisplayList,
    pub index: TokenIndex,
}

/// Builds display lists for the reader and the notes preview
pub struct RenderEngine<'a> {
    config: &'a ReaderConfig,
}

impl<'a> RenderEngine<'a> {
    pub fn new(config: &'a ReaderConfig) -> Self {
        Self { config }
    }

    /// Render the directory's current collection
    ///
    /// Decorations are left blank; the annotation layers paint them next.
    pub fn render(&self, directory: &CollectionDirectory, hidden: &HiddenBlocks) -> RenderOutput {
        let mut output = RenderOutput::default();
        output.list.collection_count = directory.len();

        let Some(collection) = directory.current() else {
            output.list.empty = Some(EmptyState::NoCollections);
            return output;
        };

        output.list.collection_id = Some(collection.id.clone());
        output.list.collection_index = directory.current_index();

        if collection.blocks.is_empty() {
            output.list.empty = Some(EmptyState::EmptyCollection);
            return output;
        }

        self.render_blocks(collection, hidden, &mut output);

        if output.list.blocks.is_empty() {
            output.list.empty = Some(EmptyState::AllBlocksHidden);
        }

        log::debug!(
            "rendered collection {} ({}/{}): {} blocks, {} tokens",
            collection.id,
            output.list.collection_index + 1,
            output.list.collection_count,
            output.list.blocks.len(),
            output.index.len()
        );
        output
    }

    /// Render every block of a collection, ignoring the hidden set
    pub fn render_all(&self, collection: &Collection) -> RenderOutput {
        let mut output = RenderOutput::default();
        output.list.collection_id = Some(collection.id.clone());
        output.list.collection_count = 1;

        if collection.blocks.is_empty() {
            output.list.empty = Some(EmptyState::EmptyCollection);
            return output;
        }

        self.render_blocks(collection, &HiddenBlocks::new(), &mut output);
        output
    }

    fn render_blocks(&self, collection: &Collection, hidden: &HiddenBlocks, output: &mut RenderOutput) {
        for (block_index, block) in collection.blocks.iter().enumerate() {
            if hidden.contains(block_index) {
                continue;
            }
            let pieces = tokenize_content(&block.content);
            output
                .index
                .insert_block(block_index, pieces.iter().filter_map(Piece::as_token));
            output
                .list
                .blocks
                .push(self.render_block(block_index, block, pieces));
        }
    }

    /// Stamp token indices onto one block's pieces
    fn render_block(&self, block_index: usize, block: &Block, pieces: Vec<Piece>) -> RenderBlock {
        let mut token_index = 0;
        let pieces = pieces
            .into_iter()
            .map(|piece| match piece {
                Piece::Text(run) => RenderPiece::Text {
                    text: run.text,
                    bold: run.bold,
                },
                Piece::Token(token) => {
                    let rendered = RenderToken {
                        token_index,
                        text: token.surface,
                        word: token.word,
                        bold: token.bold,
                        highlight: None,
                        marker_id: None,
                        pending: false,
                    };
                    token_index += 1;
                    RenderPiece::Token(rendered)
                }
            })
            .collect();

        RenderBlock {
            block_index,
            label: self.config.block_label(&block.title, block_index),
            pieces,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CollectionId, TokenAddress};

    fn directory(blocks: &[(&str, &str)]) -> CollectionDirectory {
        let blocks = blocks.iter().map(|(t, c)| Block::new(*t, *c)).collect();
        CollectionDirectory::from_collections(vec![Collection::new(CollectionId::new("c_1").unwrap(), blocks)])
    }

    #[test]
    fn test_tokens_are_stamped_per_block() {
        let config = ReaderConfig::default();
        let dir = directory(&[("", "The **quick** brown fox"), ("Greek", "λόγος ἦν")]);

        let out = RenderEngine::new(&config).render(&dir, &HiddenBlocks::new());

        assert_eq!(out.list.blocks.len(), 2);
        assert_eq!(out.list.blocks[0].label, "Block 1");
        assert_eq!(out.list.blocks[1].label, "Greek");

        let words: Vec<&str> = out.list.blocks[0].tokens().map(|t| t.text.as_str()).collect();
        assert_eq!(words, vec!["The", "quick", "brown", "fox"]);
        let indices: Vec<usize> = out.list.blocks[0].tokens().map(|t| t.token_index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
        assert!(out.list.blocks[0].tokens().nth(1).unwrap().bold);

        assert_eq!(out.index.get(TokenAddress::new(1, 1)).unwrap().surface, "ἦν");
        assert_eq!(out.list.blocks[0].text(), "The quick brown fox");
    }

    #[test]
    fn test_hidden_blocks_produce_no_tokens() {
        let config = ReaderConfig::default();
        let dir = directory(&[("", "zero"), ("", "one two"), ("", "three")]);

        let out = RenderEngine::new(&config).render(&dir, &HiddenBlocks::from_indices([1]));

        let shown: Vec<usize> = out.list.blocks.iter().map(|b| b.block_index).collect();
        assert_eq!(shown, vec![0, 2]);
        assert!(!out.index.contains_block(1));
        assert!(out.index.get(TokenAddress::new(1, 0)).is_none());
    }

    #[test]
    fn test_empty_states() {
        let config = ReaderConfig::default();
        let engine = RenderEngine::new(&config);

        let none = engine.render(&CollectionDirectory::new(), &HiddenBlocks::new());
        assert_eq!(none.list.empty, Some(EmptyState::NoCollections));

        let empty = engine.render(&directory(&[]), &HiddenBlocks::new());
        assert_eq!(empty.list.empty, Some(EmptyState::EmptyCollection));

        let all_hidden = engine.render(&directory(&[("", "a")]), &HiddenBlocks::from_indices([0]));
        assert_eq!(all_hidden.list.empty, Some(EmptyState::AllBlocksHidden));
    }

    #[test]
    fn test_render_all_ignores_hidden_set() {
        let config = ReaderConfig::default();
        let dir = directory(&[("", "a"), ("", "b")]);

        let out = RenderEngine::new(&config).render_all(dir.current().unwrap());
        assert_eq!(out.list.blocks.len(), 2);
    }
}
