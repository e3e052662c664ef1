//! Utility modules for the LoopRead reader
//!
//! Time and id sources, kept behind traits so tests can pin them.

pub mod clock;
pub mod id_source;

// Re-export commonly used types
pub use clock::{Clock, FixedClock, SystemClock};
pub use id_source::{IdSource, SequentialIds, UuidIds};
