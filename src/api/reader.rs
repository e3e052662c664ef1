//! JavaScript-facing reader
//!
//! `LoopReader` wraps one `ReaderSession`. JavaScript creates it once per
//! page, forwards user input to it, and repaints from the returned
//! `ReaderUpdate` (display list, block HTML, notifications).

use super::helpers::*;
use super::types::{ProjectPayload, ReaderUpdate};
use crate::annotations::color_for;
use crate::config::ReaderConfig;
use crate::local_state::BrowserStorage;
use crate::models::serde_helpers::index_from_f64;
use crate::models::{Block, CollectionId, HiddenBlocks, TokenAddress};
use crate::render::html::TOKEN_CLASS;
use crate::session::{ActiveTool, ReaderSession};
use crate::text::{normalize_word, tokenize_content};
use crate::utils::{SystemClock, UuidIds};
use crate::{wasm_info, wasm_log, wasm_warn};
use serde_json::Value;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

#[wasm_bindgen]
pub struct LoopReader {
    session: ReaderSession,
}

impl LoopReader {
    /// Serialize the current view together with any queued notifications
    fn update(&mut self) -> Result<JsValue, JsValue> {
        let notifications = self.session.drain_notifications();
        serialize(
            &ReaderUpdate::new(self.session.display_list(), notifications),
            "Failed to serialize reader update",
        )
    }

    fn tap(&mut self, address: TokenAddress) -> Result<JsValue, JsValue> {
        let outcome = self.session.tap(address);
        wasm_log!("tap {} -> {:?}", address, outcome);
        let notifications = self.session.drain_notifications();
        serialize(
            &ReaderUpdate::new(self.session.display_list(), notifications).with_tap(outcome),
            "Failed to serialize tap result",
        )
    }
}

#[wasm_bindgen]
impl LoopReader {
    /// Create a reader; `config` may be `undefined` for defaults
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<LoopReader, JsValue> {
        let config: ReaderConfig = deserialize_or_default(config, "Invalid reader config")?;
        wasm_info!("LoopReader created (storage prefix {})", config.storage_prefix);
        let session = ReaderSession::with_sources(
            config,
            Box::new(SystemClock),
            Box::new(UuidIds),
            Box::new(BrowserStorage::new()),
        );
        Ok(LoopReader { session })
    }

    // --- Lifecycle ---

    #[wasm_bindgen(js_name = setUser)]
    pub fn set_user(&mut self, uid: Option<String>) {
        self.session.set_user(uid.as_deref());
    }

    #[wasm_bindgen(js_name = storedActiveProjectId)]
    pub fn stored_active_project_id(&self) -> Option<String> {
        self.session.stored_active_project_id()
    }

    /// Install a project: `{ projectId, collections: [{id, blocks}], markers: [...] }`
    #[wasm_bindgen(js_name = loadProject)]
    pub fn load_project(&mut self, payload: JsValue) -> Result<JsValue, JsValue> {
        let payload: ProjectPayload = deserialize(payload, "Invalid project payload")?;
        wasm_info!(
            "loadProject {}: {} collections, {} marker records",
            payload.project_id,
            payload.collections.len(),
            payload.markers.len()
        );
        let collections = payload.collections();
        self.session
            .load_project(&payload.project_id, collections, &payload.markers);
        self.update()
    }

    pub fn reset(&mut self) -> Result<JsValue, JsValue> {
        self.session.reset();
        self.session.render();
        self.update()
    }

    // --- Rendering ---

    pub fn render(&mut self) -> Result<JsValue, JsValue> {
        self.session.render();
        self.update()
    }

    #[wasm_bindgen(js_name = displayList)]
    pub fn display_list(&self) -> Result<JsValue, JsValue> {
        serialize(self.session.display_list(), "Failed to serialize display list")
    }

    #[wasm_bindgen(js_name = applyAllHighlights)]
    pub fn apply_all_highlights(&mut self) -> Result<JsValue, JsValue> {
        self.session.apply_all_highlights();
        self.update()
    }

    #[wasm_bindgen(js_name = applyAllMarkers)]
    pub fn apply_all_markers(&mut self) -> Result<JsValue, JsValue> {
        self.session.apply_all_markers();
        self.update()
    }

    // --- Navigation ---

    #[wasm_bindgen(js_name = gotoNext)]
    pub fn goto_next(&mut self) -> Result<JsValue, JsValue> {
        self.session.goto_next();
        self.update()
    }

    #[wasm_bindgen(js_name = gotoPrev)]
    pub fn goto_prev(&mut self) -> Result<JsValue, JsValue> {
        self.session.goto_prev();
        self.update()
    }

    #[wasm_bindgen(js_name = gotoIndex)]
    pub fn goto_index(&mut self, index: f64) -> Result<JsValue, JsValue> {
        let index = validate_index(index, "collection")?;
        self.session.goto_index(index);
        self.update()
    }

    #[wasm_bindgen(js_name = selectCollection)]
    pub fn select_collection(&mut self, id: &str) -> Result<JsValue, JsValue> {
        let id = parse_collection_id(id)?;
        self.session.select_collection(&id).map_err(annotation_error)?;
        self.update()
    }

    #[wasm_bindgen(js_name = getCurrentCollectionId)]
    pub fn current_collection_id(&self) -> Option<String> {
        self.session.current_collection_id().map(|id| id.to_string())
    }

    #[wasm_bindgen(js_name = getCollectionIndexById)]
    pub fn collection_index_by_id(&self, id: &str) -> Option<u32> {
        let id = CollectionId::new(id)?;
        self.session.collection_index_of(&id).map(|i| i as u32)
    }

    /// Append collections (`[[{title, content}, ...], ...]`); returns new ids
    #[wasm_bindgen(js_name = appendCollections)]
    pub fn append_collections(&mut self, collections: JsValue) -> Result<JsValue, JsValue> {
        let collections: Vec<Vec<Block>> = deserialize(collections, "Invalid collections")?;
        let ids = self.session.append_collections(collections);
        serialize(&ids, "Failed to serialize collection ids")
    }

    /// Delete collections by position; returns the deleted ids
    #[wasm_bindgen(js_name = deleteCollectionsByIndices)]
    pub fn delete_collections_by_indices(&mut self, indices: js_sys::Array) -> Result<JsValue, JsValue> {
        let indices: Vec<usize> = indices
            .iter()
            .filter_map(|v| v.as_f64())
            .filter_map(index_from_f64)
            .collect();
        let removed = self.session.delete_collections_by_indices(&indices);
        serialize(&removed, "Failed to serialize collection ids")
    }

    /// Collections of the current project as `{id, blocks}` objects
    pub fn collections(&self) -> Result<JsValue, JsValue> {
        serialize(self.session.directory().collections(), "Failed to serialize collections")
    }

    // --- Hidden blocks ---

    #[wasm_bindgen(js_name = setHiddenBlocks)]
    pub fn set_hidden_blocks(&mut self, list: JsValue) -> Result<JsValue, JsValue> {
        let raw: Vec<Value> = deserialize_or_default(list, "Invalid hidden block list")?;
        self.session.set_hidden_blocks(HiddenBlocks::normalize(&raw));
        self.update()
    }

    #[wasm_bindgen(js_name = setBlockHidden)]
    pub fn set_block_hidden(&mut self, block_index: f64, hidden: bool) -> Result<JsValue, JsValue> {
        let block_index = validate_index(block_index, "block")?;
        self.session.set_block_hidden(block_index, hidden);
        self.update()
    }

    #[wasm_bindgen(js_name = hiddenBlockRows)]
    pub fn hidden_block_rows(&self) -> Result<JsValue, JsValue> {
        serialize(&self.session.hidden_block_rows(), "Failed to serialize hidden block rows")
    }

    // --- Tools ---

    #[wasm_bindgen(js_name = toggleHighlightTool)]
    pub fn toggle_highlight_tool(&mut self) -> Result<JsValue, JsValue> {
        self.session.toggle_highlight_tool();
        self.update()
    }

    #[wasm_bindgen(js_name = toggleMarkerTool)]
    pub fn toggle_marker_tool(&mut self) -> Result<JsValue, JsValue> {
        self.session.toggle_marker_tool();
        self.update()
    }

    /// 0 = none, 1 = highlight, 2 = marker
    #[wasm_bindgen(js_name = activeTool)]
    pub fn active_tool(&self) -> u8 {
        self.session.active_tool() as u8
    }

    #[wasm_bindgen(js_name = setActiveTool)]
    pub fn set_active_tool(&mut self, tool: u8) -> Result<JsValue, JsValue> {
        let tool = ActiveTool::from_u8(tool)
            .ok_or_else(|| validation_error(format!("Invalid tool value: {} (must be 0-2)", tool)))?;
        self.session.set_tool(tool);
        self.update()
    }

    #[wasm_bindgen(js_name = clearHighlights)]
    pub fn clear_highlights(&mut self) -> Result<JsValue, JsValue> {
        self.session.clear_highlights();
        self.update()
    }

    // --- Taps ---

    /// Resolve a click inside the blocks container and dispatch it
    ///
    /// Clicks outside a word token resolve to `null`.
    #[wasm_bindgen(js_name = handleTokenClick)]
    pub fn handle_token_click(&mut self, event: web_sys::Event) -> Result<JsValue, JsValue> {
        let Some(target) = event.target() else {
            return Ok(JsValue::NULL);
        };
        let element = match target.dyn_into::<web_sys::Element>() {
            Ok(element) => Some(element),
            Err(target) => target
                .dyn_into::<web_sys::Node>()
                .ok()
                .and_then(|node| node.parent_element()),
        };
        let Some(token) = element.and_then(|e| e.closest(&format!(".{}", TOKEN_CLASS)).ok().flatten()) else {
            return Ok(JsValue::NULL);
        };

        let index_attr = |name: &str| {
            token
                .get_attribute(name)
                .and_then(|v| v.trim().parse::<usize>().ok())
        };
        let (Some(block_index), Some(token_index)) = (index_attr("data-block-index"), index_attr("data-token-index")) else {
            wasm_warn!("word token without a usable address");
            return Ok(JsValue::NULL);
        };

        self.tap(TokenAddress::new(block_index, token_index))
    }

    /// Dispatch a tap by address
    #[wasm_bindgen(js_name = tapToken)]
    pub fn tap_token(&mut self, block_index: f64, token_index: f64) -> Result<JsValue, JsValue> {
        let address = TokenAddress::new(validate_index(block_index, "block")?, validate_index(token_index, "token")?);
        self.tap(address)
    }

    // --- Markers and notes ---

    pub fn markers(&self) -> Result<JsValue, JsValue> {
        serialize(self.session.markers(), "Failed to serialize markers")
    }

    #[wasm_bindgen(js_name = markerCards)]
    pub fn marker_cards(&self) -> Result<JsValue, JsValue> {
        serialize(&self.session.marker_cards(), "Failed to serialize marker cards")
    }

    #[wasm_bindgen(js_name = toggleNoteExpanded)]
    pub fn toggle_note_expanded(&mut self, id: &str) -> Result<bool, JsValue> {
        let id = parse_marker_id(id)?;
        Ok(self.session.toggle_note_expanded(&id))
    }

    /// Read-only display list of the marker's collection; `html` per block
    #[wasm_bindgen(js_name = markerPreview)]
    pub fn marker_preview(&mut self, id: &str) -> Result<JsValue, JsValue> {
        let id = parse_marker_id(id)?;
        let list = self.session.marker_preview(&id).map_err(annotation_error)?;
        serialize(&ReaderUpdate::new(&list, Vec::new()), "Failed to serialize marker preview")
    }

    #[wasm_bindgen(js_name = openNoteEditor)]
    pub fn open_note_editor(&mut self, id: &str) -> Result<JsValue, JsValue> {
        let id = parse_marker_id(id)?;
        let marker = self.session.open_note_editor(&id).map_err(annotation_error)?;
        serialize(marker, "Failed to serialize marker")
    }

    /// Marker whose note editor is open, or `null`
    #[wasm_bindgen(js_name = noteEditor)]
    pub fn note_editor(&self) -> Result<JsValue, JsValue> {
        match self.session.note_editor() {
            Some(marker) => serialize(marker, "Failed to serialize marker"),
            None => Ok(JsValue::NULL),
        }
    }

    #[wasm_bindgen(js_name = saveNote)]
    pub fn save_note(&mut self, note: &str) -> Result<JsValue, JsValue> {
        self.session.save_note(note).map_err(annotation_error)?;
        self.update()
    }

    #[wasm_bindgen(js_name = updateNote)]
    pub fn update_note(&mut self, id: &str, note: &str) -> Result<JsValue, JsValue> {
        let id = parse_marker_id(id)?;
        self.session.update_note(&id, note).map_err(annotation_error)?;
        self.update()
    }

    #[wasm_bindgen(js_name = closeNoteEditor)]
    pub fn close_note_editor(&mut self) {
        self.session.close_note_editor();
    }

    #[wasm_bindgen(js_name = deleteMarker)]
    pub fn delete_marker(&mut self, id: &str) -> Result<JsValue, JsValue> {
        let id = parse_marker_id(id)?;
        self.session.delete_marker(&id).map_err(annotation_error)?;
        self.update()
    }

    #[wasm_bindgen(js_name = navigateToMarker)]
    pub fn navigate_to_marker(&mut self, id: &str) -> Result<JsValue, JsValue> {
        let id = parse_marker_id(id)?;
        self.session.navigate_to_marker(&id).map_err(annotation_error)?;
        self.update()
    }

    // --- Sync ---

    /// Queued store writes: `[{opId, projectId, kind: "upsert"|"delete", ...}]`
    #[wasm_bindgen(js_name = takePendingWrites)]
    pub fn take_pending_writes(&mut self) -> Result<JsValue, JsValue> {
        let writes = self.session.take_pending_writes();
        if !writes.is_empty() {
            wasm_log!("handing {} writes to the store", writes.len());
        }
        serialize(&writes, "Failed to serialize pending writes")
    }

    #[wasm_bindgen(js_name = acknowledgeWrite)]
    pub fn acknowledge_write(&mut self, op_id: f64) -> bool {
        self.session.acknowledge_write(op_id as u64)
    }

    /// Report a failed write; returns the notifications to show
    #[wasm_bindgen(js_name = reportSyncFailure)]
    pub fn report_sync_failure(&mut self, op_id: f64, reason: &str) -> Result<JsValue, JsValue> {
        wasm_warn!("store write #{} failed: {}", op_id, reason);
        self.session.report_sync_failure(op_id as u64, reason);
        serialize(&self.session.drain_notifications(), "Failed to serialize notifications")
    }

    #[wasm_bindgen(js_name = drainNotifications)]
    pub fn drain_notifications(&mut self) -> Result<JsValue, JsValue> {
        serialize(&self.session.drain_notifications(), "Failed to serialize notifications")
    }
}

/// CSS color for the n-th highlight selection
#[wasm_bindgen(js_name = colorFor)]
pub fn color_for_index(sequence_index: u32) -> String {
    color_for(sequence_index).to_css()
}

/// Highlight key of a word
#[wasm_bindgen(js_name = normalizeWord)]
pub fn normalize_word_js(raw: &str) -> String {
    normalize_word(raw)
}

/// Tokenize block content into text and word pieces
#[wasm_bindgen(js_name = tokenizeContent)]
pub fn tokenize_content_js(content: &str) -> Result<JsValue, JsValue> {
    serialize(&tokenize_content(content), "Failed to serialize tokens")
}
