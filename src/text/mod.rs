//! Text layer: inline formatting and word tokenization
//!
//! This module knows nothing about annotations. It turns a block's raw
//! content into formatted runs and then into word tokens that the annotation
//! layers can address.
//!
//! ## Modules
//!
//! - `format`: `**bold**` parsing and HTML escaping
//! - `normalize`: highlight keys (NFKC + lowercase)
//! - `tokenizer`: Unicode-aware word segmentation

pub mod format;
pub mod normalize;
pub mod tokenizer;

// Re-exports for convenience
pub use format::{escape_html, parse_inline, InlineRun};
pub use normalize::normalize_word;
pub use tokenizer::{
    plain_text, tokenize_content, tokenize_pieces, tokenize_text, tokens, word_ranges, Piece, TextRun,
    WordToken,
};
