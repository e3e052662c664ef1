//! Reading session controller
//!
//! A `ReaderSession` owns all reader state for one signed-in user: the
//! project's collections, the hidden-block set, both annotation layers, the
//! active tool, the token index of the last render, the sync outbox and the
//! notification queue. The view layer calls into it and repaints from the
//! returned DisplayList; nothing is read back from the DOM.
//!
//! Every operation runs to completion before returning, so a tap is fully
//! applied (state updated, decorations repainted, writes queued) before the
//! next one is handled.

pub mod tools;

pub use tools::ActiveTool;

use crate::annotations::{HighlightLayer, HighlightToggle, MarkerLayer, MarkerTap};
use crate::config::ReaderConfig;
use crate::error::AnnotationError;
use crate::local_state::{KeyValueStore, LocalUiState, MemoryStore};
use crate::models::{
    normalize_markers, Block, Collection, CollectionDirectory, CollectionId, HiddenBlocks, Marker, MarkerId,
    TokenAddress,
};
use crate::notify::{Notification, NotificationQueue};
use crate::render::{marker_cards, marker_preview, DisplayList, MarkerCard, RenderEngine, RenderOutput, TokenIndex};
use crate::sync::{Outbox, PendingWrite};
use crate::utils::{Clock, IdSource, SystemClock, UuidIds};
use serde::Serialize;
use serde_json::Value;

/// Minimum number of rows in the hide-blocks view
pub const MIN_HIDE_VIEW_ROWS: usize = 10;

/// What a tap did
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "tool", rename_all = "camelCase")]
pub enum TapOutcome {
    /// No tool active, or the address was stale
    None,
    Highlight { result: HighlightToggle },
    Marker { result: MarkerTap },
    /// The tap was rejected; a notification explains why
    Rejected { reason: String },
}

/// One row of the hide-blocks view
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HiddenBlockRow {
    pub block_index: usize,
    pub label: String,
    pub hidden: bool,
}

pub struct ReaderSession {
    config: ReaderConfig,
    project_id: Option<String>,
    directory: CollectionDirectory,
    hidden: HiddenBlocks,
    highlights: HighlightLayer,
    markers: MarkerLayer,
    tool: ActiveTool,
    outbox: Outbox,
    notifications: NotificationQueue,
    local: LocalUiState,
    token_index: TokenIndex,
    display: DisplayList,
    editing_note: Option<MarkerId>,
    expanded_note: Option<MarkerId>,
    pending_focus: Option<MarkerId>,
    clock: Box<dyn Clock>,
    ids: Box<dyn IdSource>,
}

impl ReaderSession {
    /// Session with the system clock, random ids and in-memory local state
    pub fn new(config: ReaderConfig) -> Self {
        Self::with_sources(
            config,
            Box::new(SystemClock),
            Box::new(UuidIds),
            Box::new(MemoryStore::new()),
        )
    }

    pub fn with_sources(
        config: ReaderConfig,
        clock: Box<dyn Clock>,
        ids: Box<dyn IdSource>,
        store: Box<dyn KeyValueStore>,
    ) -> Self {
        Self {
            config,
            project_id: None,
            directory: CollectionDirectory::new(),
            hidden: HiddenBlocks::new(),
            highlights: HighlightLayer::new(),
            markers: MarkerLayer::new(),
            tool: ActiveTool::None,
            outbox: Outbox::new(),
            notifications: NotificationQueue::new(),
            local: LocalUiState::new(store),
            token_index: TokenIndex::new(),
            display: DisplayList::default(),
            editing_note: None,
            expanded_note: None,
            pending_focus: None,
            clock,
            ids,
        }
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    // --- Lifecycle ---

    /// Sign a user in (or out with `None`); in-memory state is reset
    pub fn set_user(&mut self, uid: Option<&str>) {
        self.reset();
        self.local.set_user(&self.config.storage_prefix, uid);
    }

    /// Project remembered on this device for the signed-in user
    pub fn stored_active_project_id(&self) -> Option<String> {
        self.local.load_active_project_id()
    }

    /// Install a freshly loaded project
    ///
    /// Restores the device-local hidden blocks and last-read collection,
    /// drops markers whose collection no longer exists, clears highlights
    /// and turns both tools off.
    pub fn load_project(&mut self, project_id: &str, collections: Vec<Collection>, marker_records: &[Value]) -> &DisplayList {
        self.reset();

        let project_id = project_id.trim();
        if project_id.is_empty() {
            log::warn!("load_project called without a project id");
            return self.render();
        }
        self.project_id = Some(project_id.to_string());
        self.local.save_active_project_id(Some(project_id));

        self.directory = CollectionDirectory::from_collections(collections);
        self.hidden = self.local.load_hidden_blocks(project_id);
        if let Some(last_read) = self.local.load_last_read(project_id) {
            self.directory.select_by_id(&last_read);
        }
        self.directory.clamp_index();
        self.local
            .mark_saved(&self.hidden, self.directory.current_collection_id());

        let now = self.clock.now_millis();
        self.markers = MarkerLayer::from_markers(normalize_markers(marker_records, now));
        let directory = &self.directory;
        let orphans = self.markers.retain_collections(|id| directory.contains(id));
        if orphans > 0 {
            log::info!("dropped {} orphaned markers", orphans);
        }

        log::info!(
            "project {} loaded: {} collections, {} markers, {} hidden blocks",
            project_id,
            self.directory.len(),
            self.markers.len(),
            self.hidden.len()
        );
        self.render()
    }

    /// Clear all in-memory state (logout, project switch)
    pub fn reset(&mut self) {
        self.project_id = None;
        self.directory = CollectionDirectory::new();
        self.hidden = HiddenBlocks::new();
        self.highlights.clear();
        self.markers.clear();
        self.tool = ActiveTool::None;
        self.outbox.clear();
        self.token_index.clear();
        self.display = DisplayList::default();
        self.editing_note = None;
        self.expanded_note = None;
        self.pending_focus = None;
    }

    pub fn project_id(&self) -> Option<&str> {
        self.project_id.as_deref()
    }

    // --- Collections ---

    pub fn directory(&self) -> &CollectionDirectory {
        &self.directory
    }

    pub fn current_collection_id(&self) -> Option<&CollectionId> {
        self.directory.current_collection_id()
    }

    pub fn collection_index_of(&self, id: &CollectionId) -> Option<usize> {
        self.directory.index_of(id)
    }

    pub fn goto_next(&mut self) -> &DisplayList {
        if self.directory.goto_next() {
            self.after_navigation();
        }
        self.render()
    }

    pub fn goto_prev(&mut self) -> &DisplayList {
        if self.directory.goto_prev() {
            self.after_navigation();
        }
        self.render()
    }

    pub fn goto_index(&mut self, index: usize) -> &DisplayList {
        self.directory.select_index(index);
        self.after_navigation();
        self.render()
    }

    pub fn select_collection(&mut self, id: &CollectionId) -> Result<&DisplayList, AnnotationError> {
        if !self.directory.select_by_id(id) {
            return Err(self.fail(AnnotationError::CollectionNotFound(id.clone())));
        }
        self.after_navigation();
        Ok(self.render())
    }

    /// Add collections at the end; returns their new ids
    pub fn append_collections(&mut self, collections: Vec<Vec<Block>>) -> Vec<CollectionId> {
        let collections = collections
            .into_iter()
            .map(|blocks| blocks.iter().map(Block::normalized).collect())
            .collect();
        let ids = self.directory.append(collections, self.ids.as_mut());
        self.render();
        ids
    }

    /// Delete collections by position, cascading to their markers by id
    ///
    /// Returns the deleted collection ids. Remote deletion of the collections
    /// and their markers belongs to the store collaborator.
    pub fn delete_collections_by_indices(&mut self, indices: &[usize]) -> Vec<CollectionId> {
        let removed = self.directory.remove_by_indices(indices);
        if removed.is_empty() {
            return removed;
        }

        let removed_markers = self.markers.remove_for_collections(&removed);
        if self
            .editing_note
            .as_ref()
            .is_some_and(|id| removed_markers.contains(id))
        {
            self.editing_note = None;
        }
        if self
            .expanded_note
            .as_ref()
            .is_some_and(|id| removed_markers.contains(id))
        {
            self.expanded_note = None;
        }

        log::info!(
            "deleted {} collections and {} markers",
            removed.len(),
            removed_markers.len()
        );
        self.after_navigation();
        self.render();
        removed
    }

    fn after_navigation(&mut self) {
        self.directory.clamp_index();
        self.markers.clear_pending();
        self.save_local_state();
    }

    // --- Hidden blocks ---

    pub fn hidden_blocks(&self) -> &HiddenBlocks {
        &self.hidden
    }

    pub fn set_hidden_blocks(&mut self, hidden: HiddenBlocks) -> &DisplayList {
        self.hidden = hidden;
        self.save_local_state();
        self.render()
    }

    pub fn set_block_hidden(&mut self, block_index: usize, hidden: bool) -> &DisplayList {
        self.hidden.set_hidden(block_index, hidden);
        self.save_local_state();
        self.render()
    }

    /// Rows for the hide-blocks view (at least `MIN_HIDE_VIEW_ROWS`)
    pub fn hidden_block_rows(&self) -> Vec<HiddenBlockRow> {
        let rows = self.directory.max_block_count().max(MIN_HIDE_VIEW_ROWS);
        (0..rows)
            .map(|block_index| HiddenBlockRow {
                block_index,
                label: self
                    .config
                    .block_label(self.directory.sample_title(block_index).unwrap_or(""), block_index),
                hidden: self.hidden.contains(block_index),
            })
            .collect()
    }

    fn save_local_state(&mut self) {
        if let Some(pid) = &self.project_id {
            self.local
                .save_if_changed(pid, &self.hidden, self.directory.current_collection_id());
        }
    }

    // --- Rendering ---

    /// Full re-render of the displayed collection
    ///
    /// Rebuilds the token index, then paints highlights and (with the marker
    /// tool active) marker decorations. A pending marker focus is handed to
    /// this render and consumed.
    pub fn render(&mut self) -> &DisplayList {
        let RenderOutput { list, index } = RenderEngine::new(&self.config).render(&self.directory, &self.hidden);
        self.display = list;
        self.token_index = index;
        self.repaint();
        self.display.focus_marker_id = self.pending_focus.take();
        &self.display
    }

    /// Last rendered display list
    pub fn display_list(&self) -> &DisplayList {
        &self.display
    }

    pub fn token_index(&self) -> &TokenIndex {
        &self.token_index
    }

    pub fn apply_all_highlights(&mut self) -> &DisplayList {
        self.highlights.apply_all(&mut self.display);
        &self.display
    }

    pub fn apply_all_markers(&mut self) -> &DisplayList {
        let collection_id = self.display.collection_id.clone();
        self.markers
            .apply_all(&mut self.display, collection_id.as_ref(), self.tool.marker_enabled());
        &self.display
    }

    fn repaint(&mut self) {
        self.apply_all_highlights();
        self.apply_all_markers();
        self.display.active_tool = self.tool;
    }

    // --- Tools ---

    pub fn active_tool(&self) -> ActiveTool {
        self.tool
    }

    /// Switch tools; leaving the marker tool drops any pending range start
    pub fn set_tool(&mut self, tool: ActiveTool) -> &DisplayList {
        if tool != self.tool {
            log::debug!("tool {:?} -> {:?}", self.tool, tool);
        }
        self.tool = tool;
        if !tool.marker_enabled() {
            self.markers.clear_pending();
        }
        self.repaint();
        &self.display
    }

    pub fn toggle_highlight_tool(&mut self) -> &DisplayList {
        self.set_tool(self.tool.toggled(ActiveTool::Highlight))
    }

    pub fn toggle_marker_tool(&mut self) -> &DisplayList {
        self.set_tool(self.tool.toggled(ActiveTool::Marker))
    }

    // --- Highlights ---

    pub fn highlights(&self) -> &HighlightLayer {
        &self.highlights
    }

    pub fn clear_highlights(&mut self) -> &DisplayList {
        self.highlights.clear();
        self.apply_all_highlights()
    }

    // --- Taps ---

    /// Dispatch a tap on a rendered token to the active tool
    pub fn tap(&mut self, address: TokenAddress) -> TapOutcome {
        match self.tool {
            ActiveTool::None => TapOutcome::None,
            ActiveTool::Highlight => self.tap_highlight(address),
            ActiveTool::Marker => self.tap_marker(address),
        }
    }

    fn tap_highlight(&mut self, address: TokenAddress) -> TapOutcome {
        let Some(record) = self.token_index.get(address) else {
            return TapOutcome::None;
        };
        let Some(result) = self.highlights.toggle(&record.word) else {
            return TapOutcome::None;
        };
        self.apply_all_highlights();
        TapOutcome::Highlight { result }
    }

    fn tap_marker(&mut self, address: TokenAddress) -> TapOutcome {
        let Some(collection_id) = self.directory.current_collection_id().cloned() else {
            return self.reject(AnnotationError::NoActiveCollection);
        };

        let now = self.clock.now_millis();
        let result = self
            .markers
            .tap(&collection_id, address, &self.token_index, now, self.ids.as_mut());

        let outcome = match result {
            Ok(tap) => {
                match &tap {
                    MarkerTap::Created { marker_id } => {
                        self.persist_upsert(marker_id);
                        self.editing_note = Some(marker_id.clone());
                    }
                    MarkerTap::OpenNote { marker_id } => {
                        self.editing_note = Some(marker_id.clone());
                    }
                    _ => {}
                }
                TapOutcome::Marker { result: tap }
            }
            Err(err) => self.reject(err),
        };
        self.apply_all_markers();
        outcome
    }

    // --- Markers and notes ---

    /// Markers of the project, newest first
    pub fn markers(&self) -> &[Marker] {
        self.markers.markers()
    }

    pub fn marker(&self, id: &MarkerId) -> Option<&Marker> {
        self.markers.get(id)
    }

    pub fn pending_start(&self) -> Option<TokenAddress> {
        self.markers.pending_start()
    }

    /// Open a marker's note for editing (from the reader or the notes view)
    pub fn open_note_editor(&mut self, id: &MarkerId) -> Result<&Marker, AnnotationError> {
        if self.markers.get(id).is_none() {
            return Err(self.fail(AnnotationError::MarkerNotFound(id.clone())));
        }
        self.editing_note = Some(id.clone());
        self.markers
            .get(id)
            .ok_or_else(|| AnnotationError::MarkerNotFound(id.clone()))
    }

    /// Marker whose note editor is open
    pub fn note_editor(&self) -> Option<&Marker> {
        self.editing_note.as_ref().and_then(|id| self.markers.get(id))
    }

    pub fn close_note_editor(&mut self) {
        self.editing_note = None;
    }

    /// Save the note of the marker in the editor and close the editor
    pub fn save_note(&mut self, note: &str) -> Result<(), AnnotationError> {
        let Some(id) = self.editing_note.clone() else {
            return Err(self.fail(AnnotationError::Validation("no note editor is open".to_string())));
        };
        self.update_note(&id, note)?;
        self.editing_note = None;
        Ok(())
    }

    /// Replace a marker's note; only `note` and `updated_at` change
    pub fn update_note(&mut self, id: &MarkerId, note: &str) -> Result<(), AnnotationError> {
        let now = self.clock.now_millis();
        if let Err(err) = self.markers.update_note(id, note, now) {
            return Err(self.fail(err));
        }
        self.persist_upsert(id);
        Ok(())
    }

    /// Delete a marker locally and queue the remote delete
    pub fn delete_marker(&mut self, id: &MarkerId) -> Result<Marker, AnnotationError> {
        let Some(marker) = self.markers.remove(id) else {
            return Err(self.fail(AnnotationError::MarkerNotFound(id.clone())));
        };
        if let Some(pid) = &self.project_id {
            self.outbox.enqueue_delete(pid, id);
        }
        if self.editing_note.as_ref() == Some(id) {
            self.editing_note = None;
        }
        if self.expanded_note.as_ref() == Some(id) {
            self.expanded_note = None;
        }
        log::info!("marker {} deleted", id);
        self.apply_all_markers();
        Ok(marker)
    }

    /// Cards for the notes view
    pub fn marker_cards(&self) -> Vec<MarkerCard> {
        marker_cards(
            self.markers.markers(),
            &self.directory,
            &self.config,
            self.expanded_note.as_ref(),
        )
    }

    /// Expand or collapse a card's preview; returns whether it is now expanded
    pub fn toggle_note_expanded(&mut self, id: &MarkerId) -> bool {
        if self.expanded_note.as_ref() == Some(id) {
            self.expanded_note = None;
            false
        } else {
            self.expanded_note = Some(id.clone());
            true
        }
    }

    pub fn marker_preview(&mut self, id: &MarkerId) -> Result<DisplayList, AnnotationError> {
        let Some(marker) = self.markers.get(id) else {
            return Err(self.fail(AnnotationError::MarkerNotFound(id.clone())));
        };
        match marker_preview(marker, &self.directory, &self.config) {
            Ok(list) => Ok(list),
            Err(err) => Err(self.fail(err)),
        }
    }

    /// Open the reader at a marker's collection with the marker tool on
    ///
    /// The next render carries the marker id as its focus target.
    pub fn navigate_to_marker(&mut self, id: &MarkerId) -> Result<&DisplayList, AnnotationError> {
        let Some(collection_id) = self.markers.get(id).map(|m| m.collection_id.clone()) else {
            return Err(self.fail(AnnotationError::MarkerNotFound(id.clone())));
        };
        if !self.directory.select_by_id(&collection_id) {
            return Err(self.fail(AnnotationError::CollectionNotFound(collection_id)));
        }

        self.after_navigation();
        self.tool = ActiveTool::Marker;
        self.pending_focus = Some(id.clone());
        Ok(self.render())
    }

    // --- Sync ---

    fn persist_upsert(&mut self, id: &MarkerId) {
        let Some(pid) = self.project_id.as_deref() else {
            return;
        };
        let Some(marker) = self.markers.get(id) else {
            return;
        };
        let now = self.clock.now_millis();
        if let Err(err) = self.outbox.enqueue_upsert(pid, marker, now) {
            log::warn!("marker {} not queued: {}", id, err);
            self.notifications
                .push(Notification::from_error(&err, &self.config.messages));
        }
    }

    /// Writes for the store collaborator to perform
    pub fn take_pending_writes(&mut self) -> Vec<PendingWrite> {
        self.outbox.take_pending()
    }

    pub fn acknowledge_write(&mut self, op_id: u64) -> bool {
        self.outbox.acknowledge(op_id)
    }

    /// Surface a failed write; the local state is left as it is
    pub fn report_sync_failure(&mut self, op_id: u64, reason: &str) {
        let Some(op) = self.outbox.report_failure(op_id, reason) else {
            log::debug!("failure report for unknown op #{}", op_id);
            return;
        };
        let err = AnnotationError::Persistence {
            marker_id: op.marker_id().clone(),
            deleted: op.is_delete(),
            reason: reason.to_string(),
        };
        self.notifications
            .push(Notification::from_error(&err, &self.config.messages));
    }

    // --- Notifications ---

    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        self.notifications.drain()
    }

    fn fail(&mut self, err: AnnotationError) -> AnnotationError {
        self.notifications
            .push(Notification::from_error(&err, &self.config.messages));
        err
    }

    fn reject(&mut self, err: AnnotationError) -> TapOutcome {
        let err = self.fail(err);
        TapOutcome::Rejected {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::color_for;
    use crate::utils::{FixedClock, SequentialIds};
    use serde_json::json;
    use std::rc::Rc;

    fn session_with_clock() -> (ReaderSession, Rc<FixedClock>) {
        let clock = Rc::new(FixedClock::new(1_000));
        let mut session = ReaderSession::with_sources(
            ReaderConfig::default(),
            Box::new(clock.clone()),
            Box::new(SequentialIds::new()),
            Box::new(MemoryStore::new()),
        );
        session.set_user(Some("u1"));
        (session, clock)
    }

    fn collection(id: &str, blocks: &[&str]) -> Collection {
        Collection::new(
            CollectionId::new(id).unwrap(),
            blocks.iter().map(|c| Block::new("", *c)).collect(),
        )
    }

    fn loaded() -> (ReaderSession, Rc<FixedClock>) {
        let (mut session, clock) = session_with_clock();
        session.load_project(
            "p1",
            vec![
                collection("c_a", &["The **quick** brown fox", "jumps over the lazy dog"]),
                collection("c_b", &["alpha beta gamma"]),
            ],
            &[
                json!({"id": "m_old", "collectionId": "c_b", "blockIndex": 0, "start": 0, "end": 0, "updatedAt": 5}),
                json!({"id": "m_orphan", "collectionId": "c_gone", "blockIndex": 0, "start": 0, "end": 0}),
            ],
        );
        (session, clock)
    }

    #[test]
    fn test_load_filters_orphans_and_turns_tools_off() {
        let (session, _) = loaded();

        assert_eq!(session.markers().len(), 1);
        assert_eq!(session.active_tool(), ActiveTool::None);
        assert_eq!(session.display_list().blocks.len(), 2);
        assert_eq!(session.current_collection_id().unwrap().as_str(), "c_a");
    }

    #[test]
    fn test_tap_without_tool_does_nothing() {
        let (mut session, _) = loaded();
        assert_eq!(session.tap(TokenAddress::new(0, 1)), TapOutcome::None);
        assert!(session.highlights().is_empty());
    }

    #[test]
    fn test_marker_created_opens_editor_and_queues_upsert() {
        let (mut session, clock) = loaded();
        session.toggle_marker_tool();

        session.tap(TokenAddress::new(0, 1));
        assert!(session.display_list().token(TokenAddress::new(0, 1)).unwrap().pending);

        clock.set(2_000);
        let outcome = session.tap(TokenAddress::new(0, 2));
        assert!(matches!(outcome, TapOutcome::Marker { result: MarkerTap::Created { .. } }));

        let editor = session.note_editor().unwrap().clone();
        assert_eq!(editor.text, "quick brown");
        assert_eq!(editor.created_at, 2_000);

        let writes = session.take_pending_writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].project_id, "p1");

        let token = session.display_list().token(TokenAddress::new(0, 2)).unwrap();
        assert_eq!(token.marker_id.as_ref(), Some(&editor.id));
    }

    #[test]
    fn test_pending_range_into_marker_is_rejected() {
        let (mut session, _) = loaded();
        session.toggle_marker_tool();
        session.tap(TokenAddress::new(0, 0));
        session.tap(TokenAddress::new(0, 2));
        session.close_note_editor();
        session.take_pending_writes();

        session.tap(TokenAddress::new(0, 3));
        let outcome = session.tap(TokenAddress::new(1, 0));
        assert!(matches!(outcome, TapOutcome::Marker { result: MarkerTap::PendingRestarted { .. } }));

        session.toggle_marker_tool();
        session.toggle_marker_tool();
        assert_eq!(session.pending_start(), None);

        // closing 3..=2 touches the existing 0..=2 range
        session.tap(TokenAddress::new(0, 3));
        let outcome = session.tap(TokenAddress::new(0, 2));

        assert!(matches!(outcome, TapOutcome::Rejected { .. }));
        assert_eq!(session.pending_start(), None);
        assert_eq!(session.markers().len(), 2);
        assert!(session.take_pending_writes().is_empty());

        let notes = session.drain_notifications();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].message, session.config().messages.overlap_conflict);
    }

    #[test]
    fn test_idle_tap_on_marker_opens_note() {
        let (mut session, _) = loaded();
        session.goto_next();
        session.toggle_marker_tool();

        let outcome = session.tap(TokenAddress::new(0, 0));

        let id = MarkerId::new("m_old").unwrap();
        assert_eq!(outcome, TapOutcome::Marker { result: MarkerTap::OpenNote { marker_id: id.clone() } });
        assert_eq!(session.note_editor().unwrap().id, id);
        assert_eq!(session.pending_start(), None);

        session.save_note("edited").unwrap();
        assert!(session.note_editor().is_none());
        assert_eq!(session.marker(&id).unwrap().note, "edited");
        assert_eq!(session.marker(&id).unwrap().updated_at, 1_000);
    }

    fn highlight_at(session: &ReaderSession, block: usize, token: usize) -> Option<String> {
        session
            .display_list()
            .token(TokenAddress::new(block, token))
            .and_then(|t| t.highlight.clone())
    }

    #[test]
    fn test_highlight_tap_paints_word_across_blocks() {
        let (mut session, _) = loaded();
        session.toggle_highlight_tool();

        // "The" in block 0 and "the" in block 1 share a key
        let outcome = session.tap(TokenAddress::new(0, 0));
        let color = color_for(0).to_css();
        assert_eq!(
            outcome,
            TapOutcome::Highlight {
                result: HighlightToggle::Added {
                    word: "the".to_string(),
                    color: color.clone(),
                }
            }
        );
        assert_eq!(highlight_at(&session, 0, 0), Some(color.clone()));
        assert_eq!(highlight_at(&session, 1, 2), Some(color));
        assert_eq!(highlight_at(&session, 0, 1), None);

        session.tap(TokenAddress::new(1, 2));
        assert_eq!(highlight_at(&session, 0, 0), None);
        assert_eq!(highlight_at(&session, 1, 2), None);
        assert!(session.highlights().is_empty());
    }

    #[test]
    fn test_highlights_repainted_after_collection_switch() {
        let (mut session, _) = loaded();
        session.toggle_highlight_tool();
        session.tap(TokenAddress::new(0, 0));

        session.goto_next();
        assert_eq!(highlight_at(&session, 0, 0), None);
        session.tap(TokenAddress::new(0, 1));
        assert_eq!(highlight_at(&session, 0, 1), Some(color_for(1).to_css()));

        session.goto_prev();
        assert_eq!(highlight_at(&session, 0, 0), Some(color_for(0).to_css()));
        assert_eq!(highlight_at(&session, 1, 2), Some(color_for(0).to_css()));
    }

    #[test]
    fn test_tool_toggle_keeps_highlights() {
        let (mut session, _) = loaded();
        session.toggle_highlight_tool();
        session.tap(TokenAddress::new(0, 1));

        session.toggle_highlight_tool();
        assert_eq!(session.active_tool(), ActiveTool::None);
        assert_eq!(highlight_at(&session, 0, 1), Some(color_for(0).to_css()));

        session.toggle_marker_tool();
        assert_eq!(highlight_at(&session, 0, 1), Some(color_for(0).to_css()));

        // taps go to the marker tool now
        session.tap(TokenAddress::new(0, 3));
        assert!(session.highlights().is_selected("quick"));
        assert!(!session.highlights().is_selected("fox"));
    }

    #[test]
    fn test_clear_highlights_removes_decorations() {
        let (mut session, _) = loaded();
        session.toggle_highlight_tool();
        session.tap(TokenAddress::new(0, 0));
        session.tap(TokenAddress::new(0, 3));

        session.clear_highlights();

        assert!(session.highlights().is_empty());
        let painted = session
            .display_list()
            .blocks
            .iter()
            .flat_map(|b| b.tokens())
            .filter(|t| t.highlight.is_some())
            .count();
        assert_eq!(painted, 0);

        // color assignment restarts
        session.tap(TokenAddress::new(0, 2));
        assert_eq!(highlight_at(&session, 0, 2), Some(color_for(0).to_css()));
    }

    #[test]
    fn test_tool_off_strips_marker_decorations() {
        let (mut session, _) = loaded();
        session.goto_next();
        session.toggle_marker_tool();
        assert!(session.display_list().token(TokenAddress::new(0, 0)).unwrap().marker_id.is_some());

        session.toggle_highlight_tool();
        assert!(session.active_tool().highlight_enabled());
        assert!(session.display_list().token(TokenAddress::new(0, 0)).unwrap().marker_id.is_none());
        assert_eq!(session.markers().len(), 1);
    }

    #[test]
    fn test_sync_failure_keeps_local_marker() {
        let (mut session, _) = loaded();
        session.toggle_marker_tool();
        session.tap(TokenAddress::new(1, 0));
        session.tap(TokenAddress::new(1, 1));
        let op_id = session.take_pending_writes()[0].op_id;
        session.drain_notifications();

        session.report_sync_failure(op_id, "offline");

        let notes = session.drain_notifications();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].message, session.config().messages.marker_save_failed);
        assert_eq!(session.markers().len(), 2);
    }

    #[test]
    fn test_delete_collection_cascades_by_id() {
        let (mut session, _) = loaded();
        let removed = session.delete_collections_by_indices(&[1, 0]);

        assert_eq!(removed.len(), 2);
        assert!(session.markers().is_empty());
        assert!(session.directory().is_empty());
    }

    #[test]
    fn test_navigate_to_marker_enables_tool_and_focuses() {
        let (mut session, _) = loaded();
        let id = MarkerId::new("m_old").unwrap();

        let list = session.navigate_to_marker(&id).unwrap();
        assert_eq!(list.focus_marker_id.as_ref(), Some(&id));
        assert_eq!(list.collection_id.as_ref().unwrap().as_str(), "c_b");
        assert_eq!(session.active_tool(), ActiveTool::Marker);

        // focus is consumed by the render that carried it
        assert_eq!(session.render().focus_marker_id, None);
    }

    #[test]
    fn test_last_read_and_hidden_restored_on_reload() {
        let (mut session, _) = loaded();
        session.goto_next();
        session.set_block_hidden(1, true);

        let collections = vec![
            collection("c_a", &["a", "b"]),
            collection("c_b", &["c", "d"]),
        ];
        session.load_project("p1", collections, &[]);

        assert_eq!(session.current_collection_id().unwrap().as_str(), "c_b");
        assert!(session.hidden_blocks().contains(1));
        assert_eq!(session.display_list().blocks.len(), 1);
    }

    #[test]
    fn test_hidden_rows_at_least_ten() {
        let (session, _) = loaded();
        let rows = session.hidden_block_rows();
        assert_eq!(rows.len(), MIN_HIDE_VIEW_ROWS);
        assert_eq!(rows[0].label, "Block 1");
    }
}
