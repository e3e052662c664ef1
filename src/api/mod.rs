//! LoopRead Reader WASM API
//!
//! The JavaScript-facing surface of the reader. A page creates one
//! `LoopReader`, feeds it the project loaded from the store, forwards token
//! clicks and toolbar actions, and repaints from the returned updates.
//!
//! # Module Structure
//!
//! - `helpers`: Shared utilities for serialization, validation, error handling, and logging
//! - `types`: Input payloads and the update envelope
//! - `reader`: The `LoopReader` class and free functions

pub mod helpers;
pub mod types;
pub mod reader;

pub use reader::{color_for_index, normalize_word_js, tokenize_content_js, LoopReader};
pub use types::{ProjectPayload, ReaderUpdate};
