//! WebAssembly bindings for studio-core.
//!
//! Everything crosses the boundary as JSON so the view layer only needs
//! the serde shapes of [`Page`], [`InputEvent`] and [`Tool`].

use wasm_bindgen::prelude::*;

use crate::{Editor, EditorConfig, InputEvent, Page, Tool};

/// Initialize the studio WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Editor instance for WASM.
#[wasm_bindgen]
pub struct WasmEditor {
    editor: Editor,
}

#[wasm_bindgen]
impl WasmEditor {
    /// Create an editor over an empty page of the given size.
    #[wasm_bindgen(constructor)]
    #[must_use]
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            editor: Editor::new(Page::new(width, height)),
        }
    }

    /// Create an editor from a page and an optional config, both JSON.
    ///
    /// # Errors
    ///
    /// Returns an error string if either document fails to parse or the page
    /// is invalid under the config.
    #[wasm_bindgen(js_name = fromJson)]
    pub fn from_json(page_json: &str, config_json: Option<String>) -> Result<WasmEditor, String> {
        let config = match config_json {
            Some(json) => EditorConfig::from_json(&json).map_err(|e| e.to_string())?,
            None => EditorConfig::default(),
        };
        let page = Page::from_json(page_json).map_err(|e| e.to_string())?;
        page.validate(config.min_layer_size)
            .map_err(|e| e.to_string())?;
        Ok(Self {
            editor: Editor::with_config(page, config),
        })
    }

    /// The committed page as JSON.
    #[wasm_bindgen(js_name = getPageJson)]
    #[must_use]
    pub fn get_page_json(&self) -> String {
        self.editor.page().to_json().unwrap_or_default()
    }

    /// The page with the in-flight gesture applied, as JSON.
    #[wasm_bindgen(js_name = getPreviewJson)]
    #[must_use]
    pub fn get_preview_json(&self) -> String {
        self.editor.preview().to_json().unwrap_or_default()
    }

    /// Selected layer ids as a JSON array.
    #[wasm_bindgen(js_name = getSelectionJson)]
    #[must_use]
    pub fn get_selection_json(&self) -> String {
        serde_json::to_string(self.editor.selection().ids()).unwrap_or_default()
    }

    /// Current gesture kind, e.g. `"moving"`.
    #[wasm_bindgen(js_name = getInteractionKind)]
    #[must_use]
    pub fn get_interaction_kind(&self) -> String {
        serde_json::to_value(self.editor.interaction().kind())
            .ok()
            .and_then(|v| v.as_str().map(str::to_owned))
            .unwrap_or_default()
    }

    /// Feed one input event as JSON. Returns whether anything changed.
    ///
    /// # Errors
    ///
    /// Returns an error string if the event fails to parse.
    #[wasm_bindgen(js_name = handleEventJson)]
    pub fn handle_event_json(&mut self, json: &str) -> Result<bool, String> {
        let event: InputEvent = serde_json::from_str(json).map_err(|e| e.to_string())?;
        Ok(self.editor.handle_event(&event))
    }

    /// Switch tools from JSON such as `{"tool":"text"}`.
    ///
    /// # Errors
    ///
    /// Returns an error string if the tool fails to parse.
    #[wasm_bindgen(js_name = setToolJson)]
    pub fn set_tool_json(&mut self, json: &str) -> Result<(), String> {
        let tool: Tool = serde_json::from_str(json).map_err(|e| e.to_string())?;
        self.editor.set_tool(tool);
        Ok(())
    }

    /// Overwrite the page as one undoable edit.
    ///
    /// # Errors
    ///
    /// Returns an error string if the page fails to parse.
    #[wasm_bindgen(js_name = replacePageJson)]
    pub fn replace_page_json(&mut self, json: &str) -> Result<bool, String> {
        let page = Page::from_json(json).map_err(|e| e.to_string())?;
        Ok(self.editor.replace_page(page))
    }

    /// Undo the last change.
    pub fn undo(&mut self) -> bool {
        self.editor.undo()
    }

    /// Redo the last undone change.
    pub fn redo(&mut self) -> bool {
        self.editor.redo()
    }

    /// Whether undo is available.
    #[wasm_bindgen(js_name = canUndo)]
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.editor.can_undo()
    }

    /// Whether redo is available.
    #[wasm_bindgen(js_name = canRedo)]
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.editor.can_redo()
    }
}

impl Default for WasmEditor {
    fn default() -> Self {
        Self::new(crate::page::DEFAULT_PAGE_WIDTH, crate::page::DEFAULT_PAGE_HEIGHT)
    }
}
