//! Unicode-aware word tokenizer
//!
//! A word is a maximal run of letters, combining marks, or digits. An
//! apostrophe (`'` or `’`), underscore, or hyphen between two such runs is
//! absorbed into the word, so "don't" and "co-op" are single tokens. Text
//! between words (whitespace, punctuation, symbols) is kept verbatim, so the
//! concatenation of all pieces always reproduces the input.
//!
//! Matching runs left to right over code points in one pass; mixed scripts
//! (Latin, Greek, Hebrew with points) need no special casing.

use super::format::{parse_inline, InlineRun};
use super::normalize::normalize_word;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::ops::Range;

static WORD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\p{L}\p{M}\p{N}]+(?:[’'_-][\p{L}\p{M}\p{N}]+)*")
        .expect("word pattern is a valid regex")
});

/// Non-word text between tokens
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct TextRun {
    pub text: String,
    pub bold: bool,
}

/// A word token; block and token indices are stamped later by the renderer
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct WordToken {
    /// Text exactly as it appears in the content
    pub surface: String,
    /// Highlight key (see `normalize_word`)
    pub word: String,
    pub bold: bool,
}

impl WordToken {
    pub fn new(surface: &str, bold: bool) -> Self {
        Self {
            surface: surface.to_string(),
            word: normalize_word(surface),
            bold,
        }
    }
}

/// One piece of tokenized content, in document order
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum Piece {
    Text(TextRun),
    Token(WordToken),
}

impl Piece {
    /// Surface text of the piece
    pub fn text(&self) -> &str {
        match self {
            Piece::Text(run) => &run.text,
            Piece::Token(token) => &token.surface,
        }
    }

    pub fn as_token(&self) -> Option<&WordToken> {
        match self {
            Piece::Token(token) => Some(token),
            Piece::Text(_) => None,
        }
    }
}

/// Byte ranges of all words in `text`, left to right
pub fn word_ranges(text: &str) -> impl Iterator<Item = Range<usize>> + '_ {
    WORD_RE.find_iter(text).map(|m| m.range())
}

/// Tokenize one run of text with uniform emphasis
pub fn tokenize_text(text: &str, bold: bool) -> Vec<Piece> {
    let mut pieces = Vec::new();
    let mut last = 0;

    for range in word_ranges(text) {
        if range.start > last {
            pieces.push(Piece::Text(TextRun {
                text: text[last..range.start].to_string(),
                bold,
            }));
        }
        pieces.push(Piece::Token(WordToken::new(&text[range.clone()], bold)));
        last = range.end;
    }

    if last < text.len() {
        pieces.push(Piece::Text(TextRun {
            text: text[last..].to_string(),
            bold,
        }));
    }

    pieces
}

/// Split every text piece into words; existing tokens pass through untouched
///
/// Running this over its own output is a no-op.
pub fn tokenize_pieces(pieces: Vec<Piece>) -> Vec<Piece> {
    let mut out = Vec::with_capacity(pieces.len());
    for piece in pieces {
        match piece {
            Piece::Token(token) => out.push(Piece::Token(token)),
            Piece::Text(run) => out.extend(tokenize_text(&run.text, run.bold)),
        }
    }
    out
}

/// Format and tokenize a block's raw content
pub fn tokenize_content(raw: &str) -> Vec<Piece> {
    let runs = parse_inline(raw)
        .into_iter()
        .map(|InlineRun { text, bold }| Piece::Text(TextRun { text, bold }))
        .collect();
    tokenize_pieces(runs)
}

/// Tokens of a piece list, in order
pub fn tokens(pieces: &[Piece]) -> impl Iterator<Item = &WordToken> {
    pieces.iter().filter_map(Piece::as_token)
}

/// Concatenated surface text of all pieces
pub fn plain_text(pieces: &[Piece]) -> String {
    pieces.iter().map(Piece::text).collect()
}
