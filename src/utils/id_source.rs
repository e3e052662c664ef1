//! Opaque id generation for markers and collections

use uuid::Uuid;

/// Produces fresh, never-reused ids of the form `<prefix>_<suffix>`
pub trait IdSource {
    fn next_id(&mut self, prefix: &str) -> String;
}

/// Random v4 UUIDs (production)
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIds;

impl IdSource for UuidIds {
    fn next_id(&mut self, prefix: &str) -> String {
        format!("{}_{}", prefix, Uuid::new_v4().simple())
    }
}

/// Counter-based ids: `m_1`, `m_2`, ... (tests)
#[derive(Debug, Default, Clone)]
pub struct SequentialIds {
    next: u64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdSource for SequentialIds {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next += 1;
        format!("{}_{}", prefix, self.next)
    }
}
