//! LoopRead Reader WASM Module
//!
//! Word tokenization and annotation engine for the LoopRead reader.
//! Block content is split into addressable word tokens, and two annotation
//! layers are painted on top of them: toggle highlights keyed by normalized
//! word and persisted range markers keyed by token position.

pub mod annotations;
pub mod api;
pub mod config;
pub mod error;
pub mod local_state;
pub mod models;
pub mod notify;
pub mod render;
pub mod session;
pub mod sync;
pub mod text;
pub mod utils;

// Re-export commonly used types
pub use config::ReaderConfig;
pub use error::AnnotationError;
pub use models::{Block, Collection, CollectionId, Marker, MarkerId, TokenAddress};
pub use session::ReaderSession;

use wasm_bindgen::prelude::*;

// This is like the `main` function, but for WASM modules.
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    #[cfg(feature = "console_log")]
    let _ = console_log::init_with_level(log::Level::Debug);

    log::info!("LoopRead reader WASM module initialized");
}
