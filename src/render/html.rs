//! HTML emission for rendered blocks
//!
//! Produces the markup the reader view inserts for each block. Token
//! elements carry their address and highlight key as data attributes so the
//! click handler can resolve taps without further lookups.

use super::display_list::{RenderBlock, RenderPiece, RenderToken};
use crate::text::escape_html;
use std::fmt::Write;

/// CSS class of every word token element
pub const TOKEN_CLASS: &str = "word-token";
pub const HIGHLIGHT_CLASS: &str = "word-highlight";
pub const MARKER_CLASS: &str = "marker-token";
pub const PENDING_CLASS: &str = "marker-pending";

/// Inner HTML of a block's content element
///
/// Consecutive bold pieces share one `<strong>` element.
pub fn content_html(block: &RenderBlock) -> String {
    let mut html = String::new();
    let mut in_bold = false;

    for piece in &block.pieces {
        let bold = match piece {
            RenderPiece::Text { bold, .. } => *bold,
            RenderPiece::Token(t) => t.bold,
        };
        if bold != in_bold {
            html.push_str(if bold { "<strong>" } else { "</strong>" });
            in_bold = bold;
        }
        match piece {
            RenderPiece::Text { text, .. } => html.push_str(&escape_html(text)),
            RenderPiece::Token(token) => push_token(&mut html, block.block_index, token),
        }
    }

    if in_bold {
        html.push_str("</strong>");
    }
    html
}

/// Full block article: content plus title footer
pub fn block_html(block: &RenderBlock) -> String {
    format!(
        "<article class=\"block\" data-block-index=\"{}\"><div class=\"block-content\">{}</div><div class=\"block-footer\"><div class=\"block-title-label\">{}</div></div><div class=\"block-sep\"></div></article>",
        block.block_index,
        content_html(block),
        escape_html(&block.label)
    )
}

fn push_token(html: &mut String, block_index: usize, token: &RenderToken) {
    let tag = if token.highlight.is_some() { "mark" } else { "span" };

    let mut class = String::from(TOKEN_CLASS);
    if token.highlight.is_some() {
        class.push(' ');
        class.push_str(HIGHLIGHT_CLASS);
    }
    if token.marker_id.is_some() {
        class.push(' ');
        class.push_str(MARKER_CLASS);
    }
    if token.pending {
        class.push(' ');
        class.push_str(PENDING_CLASS);
    }

    let _ = write!(
        html,
        "<{} class=\"{}\" data-word=\"{}\" data-block-index=\"{}\" data-token-index=\"{}\"",
        tag,
        class,
        escape_html(&token.word),
        block_index,
        token.token_index
    );
    if let Some(color) = &token.highlight {
        let _ = write!(html, " style=\"--hl-color: {}\"", escape_html(color));
    }
    if let Some(id) = &token.marker_id {
        let _ = write!(html, " data-marker-id=\"{}\"", escape_html(id.as_str()));
    }
    let _ = write!(html, ">{}</{}>", escape_html(&token.text), tag);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MarkerId;

    fn token(i: usize, text: &str, bold: bool) -> RenderPiece {
        RenderPiece::Token(RenderToken {
            token_index: i,
            text: text.to_string(),
            word: text.to_lowercase(),
            bold,
            highlight: None,
            marker_id: None,
            pending: false,
        })
    }

    fn space() -> RenderPiece {
        RenderPiece::Text {
            text: " ".to_string(),
            bold: false,
        }
    }

    #[test]
    fn test_plain_tokens() {
        let block = RenderBlock {
            block_index: 2,
            label: "A & B".to_string(),
            pieces: vec![token(0, "Hi", false), space(), token(1, "there", false)],
        };

        assert_eq!(
            content_html(&block),
            "<span class=\"word-token\" data-word=\"hi\" data-block-index=\"2\" data-token-index=\"0\">Hi</span> \
             <span class=\"word-token\" data-word=\"there\" data-block-index=\"2\" data-token-index=\"1\">there</span>"
        );
        assert!(block_html(&block).contains("<div class=\"block-title-label\">A &amp; B</div>"));
    }

    #[test]
    fn test_bold_run_wrapped_once() {
        let block = RenderBlock {
            block_index: 0,
            label: String::new(),
            pieces: vec![token(0, "a", true), RenderPiece::Text { text: " ".to_string(), bold: true }, token(1, "b", true), space()],
        };

        let html = content_html(&block);
        assert!(html.starts_with("<strong><span"));
        assert_eq!(html.matches("<strong>").count(), 1);
        assert!(html.ends_with("</strong> "));
    }

    #[test]
    fn test_decorations() {
        let mut piece = token(3, "Lux", false);
        if let RenderPiece::Token(t) = &mut piece {
            t.highlight = Some("hsl(0.0, 88%, 86%)".to_string());
            t.marker_id = MarkerId::new("m_1");
            t.pending = true;
        }
        let block = RenderBlock {
            block_index: 1,
            label: String::new(),
            pieces: vec![piece],
        };

        let html = content_html(&block);
        assert!(html.starts_with("<mark class=\"word-token word-highlight marker-token marker-pending\""));
        assert!(html.contains("style=\"--hl-color: hsl(0.0, 88%, 86%)\""));
        assert!(html.contains("data-marker-id=\"m_1\""));
        assert!(html.ends_with(">Lux</mark>"));
    }

    #[test]
    fn test_text_is_escaped() {
        let block = RenderBlock {
            block_index: 0,
            label: String::new(),
            pieces: vec![RenderPiece::Text { text: "<b>".to_string(), bold: false }],
        };
        assert_eq!(content_html(&block), "&lt;b&gt;");
    }
}
