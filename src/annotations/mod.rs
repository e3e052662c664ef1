//! Annotation layers painted over word tokens
//!
//! - `color`: deterministic highlight colors from a sequence index
//! - `highlight`: toggle highlights keyed by normalized word
//! - `marker`: persisted range markers keyed by token position
//!
//! Both layers keep their own key space and only meet at paint time, when
//! they decorate the tokens of a freshly rendered display list.

pub mod color;
pub mod highlight;
pub mod marker;

// Re-export all annotation types
pub use color::{color_for, HighlightColor};
pub use highlight::{HighlightLayer, HighlightSelection, HighlightToggle};
pub use marker::{MarkerLayer, MarkerTap};
