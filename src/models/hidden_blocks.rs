//! Device-local set of hidden block positions
//!
//! A hidden position suppresses the block at that index in every collection.
//! Hidden blocks are skipped by tokenization, so their markers are simply not
//! drawn until the position is shown again.

use super::serde_helpers::coerce_index;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct HiddenBlocks(BTreeSet<usize>);

impl HiddenBlocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_indices(indices: impl IntoIterator<Item = usize>) -> Self {
        Self(indices.into_iter().collect())
    }

    /// Accept any JSON list; non-integer and negative entries are dropped
    pub fn normalize(values: &[Value]) -> Self {
        Self(values.iter().filter_map(coerce_index).collect())
    }

    /// Parse a stored JSON string, falling back to the empty set
    pub fn from_json(raw: Option<&str>) -> Self {
        match raw.map(serde_json::from_str::<Value>) {
            Some(Ok(Value::Array(values))) => Self::normalize(&values),
            _ => Self::new(),
        }
    }

    /// Sorted JSON array, as stored in localStorage
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.0).unwrap_or_else(|_| "[]".to_string())
    }

    pub fn contains(&self, block_index: usize) -> bool {
        self.0.contains(&block_index)
    }

    pub fn set_hidden(&mut self, block_index: usize, hidden: bool) {
        if hidden {
            self.0.insert(block_index);
        } else {
            self.0.remove(&block_index);
        }
    }

    /// Flip one position; returns whether it is now hidden
    pub fn toggle(&mut self, block_index: usize) -> bool {
        let hidden = !self.contains(block_index);
        self.set_hidden(block_index, hidden);
        hidden
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn to_vec(&self) -> Vec<usize> {
        self.0.iter().copied().collect()
    }
}
