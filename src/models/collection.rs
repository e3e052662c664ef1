//! Blocks, collections, and the id-indexed collection directory
//!
//! Collections are navigated by position but referenced by id. The directory
//! keeps both views consistent: every mutation rebuilds the id → index map,
//! so callers can always resolve a stored `CollectionId` to its current slot.

use super::ids::CollectionId;
use crate::utils::IdSource;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// One passage of a collection
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Block {
    pub title: String,
    /// Plain text with `**bold**` runs
    pub content: String,
}

impl Block {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }

    /// Copy with title and content trimmed (how blocks are stored)
    pub fn normalized(&self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            content: self.content.trim().to_string(),
        }
    }
}

/// An ordered sequence of blocks with its stable id
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id: CollectionId,
    #[serde(default)]
    pub blocks: Vec<Block>,
}

impl Collection {
    pub fn new(id: CollectionId, blocks: Vec<Block>) -> Self {
        Self { id, blocks }
    }

    pub fn block(&self, block_index: usize) -> Option<&Block> {
        self.blocks.get(block_index)
    }
}

/// The project's collections in display order, with the reading position
#[derive(Clone, Debug, Default)]
pub struct CollectionDirectory {
    collections: Vec<Collection>,
    index_by_id: HashMap<CollectionId, usize>,
    current_index: usize,
}

impl CollectionDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from loaded collections; later duplicates of an id are dropped
    pub fn from_collections(collections: Vec<Collection>) -> Self {
        let mut seen = HashSet::new();
        let collections = collections
            .into_iter()
            .filter(|c| seen.insert(c.id.clone()))
            .collect();

        let mut dir = Self {
            collections,
            index_by_id: HashMap::new(),
            current_index: 0,
        };
        dir.rebuild_index();
        dir
    }

    fn rebuild_index(&mut self) {
        self.index_by_id = self
            .collections
            .iter()
            .enumerate()
            .map(|(i, c)| (c.id.clone(), i))
            .collect();
    }

    pub fn len(&self) -> usize {
        self.collections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }

    pub fn collections(&self) -> &[Collection] {
        &self.collections
    }

    pub fn ids(&self) -> impl Iterator<Item = &CollectionId> {
        self.collections.iter().map(|c| &c.id)
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// The displayed collection, if any
    pub fn current(&self) -> Option<&Collection> {
        self.collections.get(self.current_index)
    }

    pub fn current_collection_id(&self) -> Option<&CollectionId> {
        self.current().map(|c| &c.id)
    }

    /// Current position of a collection; `None` for unknown ids
    pub fn index_of(&self, id: &CollectionId) -> Option<usize> {
        self.index_by_id.get(id).copied()
    }

    pub fn contains(&self, id: &CollectionId) -> bool {
        self.index_by_id.contains_key(id)
    }

    pub fn get(&self, id: &CollectionId) -> Option<&Collection> {
        self.index_of(id).and_then(|i| self.collections.get(i))
    }

    /// Keep the reading position inside `0..len` (0 when empty)
    pub fn clamp_index(&mut self) {
        let n = self.collections.len();
        if n == 0 {
            self.current_index = 0;
        } else if self.current_index >= n {
            self.current_index = n - 1;
        }
    }

    pub fn select_index(&mut self, index: usize) {
        self.current_index = index;
        self.clamp_index();
    }

    /// Select by id; unknown ids leave the position unchanged
    pub fn select_by_id(&mut self, id: &CollectionId) -> bool {
        match self.index_of(id) {
            Some(i) => {
                self.current_index = i;
                true
            }
            None => false,
        }
    }

    /// Advance with wrap-around; `false` when there is nothing to show
    pub fn goto_next(&mut self) -> bool {
        let n = self.collections.len();
        if n == 0 {
            return false;
        }
        self.current_index = (self.current_index + 1) % n;
        true
    }

    pub fn goto_prev(&mut self) -> bool {
        let n = self.collections.len();
        if n == 0 {
            return false;
        }
        self.current_index = (self.current_index + n - 1) % n;
        true
    }

    /// Append new collections with fresh ids; returns the ids in order
    pub fn append(&mut self, collections: Vec<Vec<Block>>, ids: &mut dyn IdSource) -> Vec<CollectionId> {
        let mut added = Vec::with_capacity(collections.len());
        for blocks in collections {
            let id = loop {
                // Generated ids are never blank, but never reuse an existing one either
                if let Some(id) = CollectionId::new(ids.next_id("c")) {
                    if !self.index_by_id.contains_key(&id) {
                        break id;
                    }
                }
            };
            let blocks = blocks.iter().map(Block::normalized).collect();
            self.collections.push(Collection::new(id.clone(), blocks));
            self.index_by_id.insert(id.clone(), self.collections.len() - 1);
            added.push(id);
        }
        self.clamp_index();
        added
    }

    /// Remove collections by id; returns the ids that were actually present
    pub fn remove_by_ids(&mut self, ids: &[CollectionId]) -> Vec<CollectionId> {
        let doomed: HashSet<&CollectionId> = ids.iter().filter(|id| self.contains(id)).collect();
        if doomed.is_empty() {
            return Vec::new();
        }

        let removed: Vec<CollectionId> = self
            .collections
            .iter()
            .filter(|c| doomed.contains(&c.id))
            .map(|c| c.id.clone())
            .collect();

        self.collections.retain(|c| !doomed.contains(&c.id));
        self.rebuild_index();
        self.clamp_index();
        removed
    }

    /// Remove collections selected by position
    ///
    /// Positions are resolved to ids before anything is removed, since every
    /// removal shifts the positions of the collections after it.
    pub fn remove_by_indices(&mut self, indices: &[usize]) -> Vec<CollectionId> {
        let ids: Vec<CollectionId> = indices
            .iter()
            .filter_map(|&i| self.collections.get(i).map(|c| c.id.clone()))
            .collect();
        self.remove_by_ids(&ids)
    }

    /// Largest block count of any collection (rows for the hide view)
    pub fn max_block_count(&self) -> usize {
        self.collections
            .iter()
            .map(|c| c.blocks.len())
            .max()
            .unwrap_or(0)
    }

    /// First non-empty title at a block position, preferring the current collection
    pub fn sample_title(&self, block_index: usize) -> Option<&str> {
        self.current()
            .and_then(|c| title_at(c, block_index))
            .or_else(|| {
                self.collections
                    .iter()
                    .find_map(|c| title_at(c, block_index))
            })
    }
}

fn title_at(collection: &Collection, block_index: usize) -> Option<&str> {
    collection
        .block(block_index)
        .map(|b| b.title.trim())
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::SequentialIds;

    fn cid(s: &str) -> CollectionId {
        CollectionId::new(s).unwrap()
    }

    fn directory(ids: &[&str]) -> CollectionDirectory {
        CollectionDirectory::from_collections(
            ids.iter()
                .map(|id| Collection::new(cid(id), vec![Block::new("", id.to_string())]))
                .collect(),
        )
    }

    #[test]
    fn test_index_of_resolves_ids() {
        let dir = directory(&["a", "b", "c"]);

        assert_eq!(dir.index_of(&cid("b")), Some(1));
        assert_eq!(dir.index_of(&cid("zzz")), None);
        assert_eq!(dir.current_collection_id(), Some(&cid("a")));
    }

    #[test]
    fn test_navigation_wraps() {
        let mut dir = directory(&["a", "b", "c"]);

        assert!(dir.goto_prev());
        assert_eq!(dir.current_index(), 2);
        assert!(dir.goto_next());
        assert_eq!(dir.current_index(), 0);

        let mut empty = CollectionDirectory::new();
        assert!(!empty.goto_next());
    }

    #[test]
    fn test_remove_by_indices_resolves_ids_first() {
        let mut dir = directory(&["a", "b", "c", "d"]);

        // Removing 1 first would shift "d" to index 2; the ids were fixed up front.
        let removed = dir.remove_by_indices(&[1, 3]);

        assert_eq!(removed, vec![cid("b"), cid("d")]);
        assert_eq!(dir.len(), 2);
        assert_eq!(dir.index_of(&cid("c")), Some(1));
        assert_eq!(dir.index_of(&cid("d")), None);
    }

    #[test]
    fn test_remove_clamps_current_index() {
        let mut dir = directory(&["a", "b", "c"]);
        dir.select_index(2);

        dir.remove_by_ids(&[cid("c")]);

        assert_eq!(dir.current_index(), 1);
        assert_eq!(dir.current_collection_id(), Some(&cid("b")));
    }

    #[test]
    fn test_append_assigns_fresh_ids_and_trims() {
        let mut dir = directory(&["c_1"]);
        let mut ids = SequentialIds::new();

        let added = dir.append(vec![vec![Block::new(" T ", "  body ")]], &mut ids);

        // "c_1" is taken, so the generator's second id is used
        assert_eq!(added, vec![cid("c_2")]);
        let block = &dir.get(&cid("c_2")).unwrap().blocks[0];
        assert_eq!(block, &Block::new("T", "body"));
    }

    #[test]
    fn test_duplicate_ids_dropped_on_load() {
        let dir = directory(&["a", "a", "b"]);
        assert_eq!(dir.len(), 2);
        assert_eq!(dir.index_of(&cid("b")), Some(1));
    }

    #[test]
    fn test_sample_title_prefers_current() {
        let mut dir = CollectionDirectory::from_collections(vec![
            Collection::new(cid("a"), vec![Block::new("", "x")]),
            Collection::new(cid("b"), vec![Block::new("Hebrew", "y")]),
        ]);

        assert_eq!(dir.sample_title(0), Some("Hebrew"));
        dir.select_by_id(&cid("b"));
        assert_eq!(dir.sample_title(0), Some("Hebrew"));
        assert_eq!(dir.sample_title(4), None);
        assert_eq!(dir.max_block_count(), 1);
    }
}
