//! Inline formatting for block content
//!
//! The only markup is `**bold**`. Parsing is forgiving: an opening `**`
//! without a closing partner, and everything after it, stays literal text.

use serde::{Deserialize, Serialize};

/// A run of content text with uniform emphasis
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct InlineRun {
    pub text: String,
    pub bold: bool,
}

impl InlineRun {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: false,
        }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: true,
        }
    }
}

const BOLD_MARK: &str = "**";

/// Split trimmed content into plain and bold runs (markers removed)
pub fn parse_inline(raw: &str) -> Vec<InlineRun> {
    let s = raw.trim();
    let mut runs = Vec::new();
    let mut i = 0;

    while i < s.len() {
        let Some(open) = s[i..].find(BOLD_MARK).map(|p| p + i) else {
            push_run(&mut runs, &s[i..], false);
            break;
        };
        let inner_start = open + BOLD_MARK.len();
        let Some(close) = s[inner_start..].find(BOLD_MARK).map(|p| p + inner_start) else {
            push_run(&mut runs, &s[i..], false);
            break;
        };

        push_run(&mut runs, &s[i..open], false);
        push_run(&mut runs, &s[inner_start..close], true);
        i = close + BOLD_MARK.len();
    }

    runs
}

fn push_run(runs: &mut Vec<InlineRun>, text: &str, bold: bool) {
    if !text.is_empty() {
        runs.push(InlineRun {
            text: text.to_string(),
            bold,
        });
    }
}

/// Escape text for safe insertion into HTML
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
