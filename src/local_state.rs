//! Device-local UI state
//!
//! The active project, the hidden-block set and the last-read collection are
//! kept per browser, per user, per project. They never go to the remote
//! store. Reads of missing or malformed values fall back to defaults and
//! write failures are swallowed; losing this state only costs convenience.

use crate::models::{CollectionId, HiddenBlocks};
use std::collections::HashMap;

/// String key/value storage (`localStorage` in the browser)
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
    fn remove(&mut self, key: &str);
}

/// In-memory store for tests and non-browser hosts
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

/// `window.localStorage`; a missing or blocked storage behaves as empty
pub struct BrowserStorage {
    storage: Option<web_sys::Storage>,
}

impl BrowserStorage {
    /// Only call from wasm32: `web_sys::window` is a JS import
    pub fn new() -> Self {
        let storage = web_sys::window().and_then(|w| w.local_storage().ok().flatten());
        if storage.is_none() {
            log::warn!("localStorage unavailable; device-local state will not persist");
        }
        Self { storage }
    }
}

impl KeyValueStore for BrowserStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.as_ref()?.get_item(key).ok().flatten()
    }

    fn set(&mut self, key: &str, value: &str) {
        if let Some(storage) = &self.storage {
            if storage.set_item(key, value).is_err() {
                log::warn!("localStorage write failed for {}", key);
            }
        }
    }

    fn remove(&mut self, key: &str) {
        if let Some(storage) = &self.storage {
            let _ = storage.remove_item(key);
        }
    }
}

/// Storage keys for one signed-in user
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocalKeys {
    prefix: String,
    uid: String,
}

impl LocalKeys {
    pub fn new(prefix: &str, uid: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            uid: uid.to_string(),
        }
    }

    fn join(&self, parts: &[&str]) -> String {
        let mut key = format!("{}:uid:{}", self.prefix, self.uid);
        for part in parts {
            key.push(':');
            key.push_str(part);
        }
        key
    }

    pub fn active_project_id(&self) -> String {
        self.join(&["activeProjectId"])
    }

    pub fn hidden_blocks(&self, project_id: &str) -> String {
        self.join(&["project", project_id, "hiddenBlocks"])
    }

    pub fn last_read_collection_id(&self, project_id: &str) -> String {
        self.join(&["project", project_id, "lastReadCollectionId"])
    }
}

/// Loads and saves device-local state, writing only what changed
pub struct LocalUiState {
    store: Box<dyn KeyValueStore>,
    keys: Option<LocalKeys>,
    last_saved_hidden: Option<String>,
    last_saved_last_read: Option<CollectionId>,
}

impl LocalUiState {
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self {
            store,
            keys: None,
            last_saved_hidden: None,
            last_saved_last_read: None,
        }
    }

    /// Switch user; `None` (signed out) disables all reads and writes
    pub fn set_user(&mut self, prefix: &str, uid: Option<&str>) {
        self.keys = uid
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .map(|u| LocalKeys::new(prefix, u));
        self.last_saved_hidden = None;
        self.last_saved_last_read = None;
    }

    pub fn has_user(&self) -> bool {
        self.keys.is_some()
    }

    fn read_trimmed(&self, key: &str) -> Option<String> {
        let raw = self.store.get(key)?;
        let value = raw.trim();
        (!value.is_empty()).then(|| value.to_string())
    }

    pub fn load_active_project_id(&self) -> Option<String> {
        let key = self.keys.as_ref()?.active_project_id();
        self.read_trimmed(&key)
    }

    pub fn save_active_project_id(&mut self, project_id: Option<&str>) {
        let Some(keys) = &self.keys else { return };
        let key = keys.active_project_id();
        match project_id.map(str::trim).filter(|p| !p.is_empty()) {
            Some(pid) => self.store.set(&key, pid),
            None => self.store.remove(&key),
        }
    }

    pub fn load_hidden_blocks(&self, project_id: &str) -> HiddenBlocks {
        let Some(keys) = &self.keys else {
            return HiddenBlocks::new();
        };
        HiddenBlocks::from_json(self.store.get(&keys.hidden_blocks(project_id)).as_deref())
    }

    pub fn load_last_read(&self, project_id: &str) -> Option<CollectionId> {
        let key = self.keys.as_ref()?.last_read_collection_id(project_id);
        CollectionId::new(self.read_trimmed(&key)?)
    }

    /// Write both values unconditionally and remember them as saved
    pub fn save_now(&mut self, project_id: &str, hidden: &HiddenBlocks, last_read: Option<&CollectionId>) {
        let Some(keys) = self.keys.clone() else { return };
        let hidden_json = hidden.to_json();

        self.store.set(&keys.hidden_blocks(project_id), &hidden_json);
        self.store.set(
            &keys.last_read_collection_id(project_id),
            last_read.map(CollectionId::as_str).unwrap_or(""),
        );

        self.last_saved_hidden = Some(hidden_json);
        self.last_saved_last_read = last_read.cloned();
    }

    /// Save only if either value differs from what was last saved
    pub fn save_if_changed(&mut self, project_id: &str, hidden: &HiddenBlocks, last_read: Option<&CollectionId>) -> bool {
        if self.keys.is_none() {
            return false;
        }
        let hidden_changed = self.last_saved_hidden.as_deref() != Some(hidden.to_json().as_str());
        let last_read_changed = self.last_saved_last_read.as_ref() != last_read;
        if !hidden_changed && !last_read_changed {
            return false;
        }
        self.save_now(project_id, hidden, last_read);
        true
    }

    /// Record the loaded values as saved, so an unchanged state writes nothing
    pub fn mark_saved(&mut self, hidden: &HiddenBlocks, last_read: Option<&CollectionId>) {
        self.last_saved_hidden = Some(hidden.to_json());
        self.last_saved_last_read = last_read.cloned();
    }

    /// Forget a project's local state (project deleted)
    pub fn clear_project(&mut self, project_id: &str) {
        let Some(keys) = self.keys.clone() else { return };
        self.store.remove(&keys.hidden_blocks(project_id));
        self.store.remove(&keys.last_read_collection_id(project_id));
        if self.load_active_project_id().as_deref() == Some(project_id) {
            self.store.remove(&keys.active_project_id());
        }
    }
}
