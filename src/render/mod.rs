//! Reader rendering
//!
//! This module turns the displayed collection into a DisplayList (what the
//! view paints) and a TokenIndex (what taps resolve against), and emits the
//! HTML for rendered blocks.

pub mod display_list;
pub mod html;
pub mod notes;
pub mod pass;
pub mod token_index;

pub use display_list::{DisplayList, EmptyState, RenderBlock, RenderPiece, RenderToken};
pub use html::{block_html, content_html};
pub use notes::{marker_cards, marker_preview, MarkerCard};
pub use pass::{RenderEngine, RenderOutput};
pub use token_index::{TokenIndex, TokenRecord};
