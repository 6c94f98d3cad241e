use std::time::Duration;

use wasm_bindgen::prelude::*;

use pagecraft_document::InMemoryStore;
use pagecraft_editor::{
    AutoSaveOutcome, EditingSession, FocusScope, KeyChord, MirrorSynchronizer, Overlay,
    PersistenceError, Platform, PlatformContent, RemoteSaveOutcome, SaveRequest, SessionConfig,
    SessionError, ShortcutOutcome,
};

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

fn js_error(context: &str, e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&format!("{}: {}", context, e))
}

/// Editing session handle owned by the browser host
#[wasm_bindgen]
pub struct WasmEditor {
    session: EditingSession<InMemoryStore, MirrorSynchronizer>,
}

impl WasmEditor {
    fn mount(
        config_json: &str,
        desktop: Option<String>,
        mobile: Option<String>,
    ) -> Result<Self, SessionError> {
        let config = if config_json.trim().is_empty() {
            SessionConfig::default()
        } else {
            SessionConfig::from_json(config_json)?
        };
        let store = config.in_memory_store();

        let session = EditingSession::mount(
            store,
            MirrorSynchronizer::new(),
            config,
            PlatformContent::new(desktop, mobile),
            Platform::Desktop,
        )?;
        Ok(Self { session })
    }

    fn shortcut(&mut self, chord_json: &str, focus: &str) -> Result<ShortcutOutcome, String> {
        let chord: KeyChord =
            serde_json::from_str(chord_json).map_err(|e| format!("Invalid key chord: {}", e))?;
        let focus: FocusScope = serde_json::from_value(serde_json::Value::from(focus))
            .map_err(|e| format!("Invalid focus scope: {}", e))?;

        self.session
            .handle_key(&chord, focus)
            .map_err(|e| e.to_string())
    }

    fn finish_save(
        &mut self,
        request_json: &str,
        error: Option<String>,
    ) -> Result<RemoteSaveOutcome, String> {
        let request: SaveRequest =
            serde_json::from_str(request_json).map_err(|e| format!("Invalid save request: {}", e))?;
        let result = match error {
            Some(message) => Err(PersistenceError::Network(message)),
            None => Ok(()),
        };

        self.session
            .finish_remote_save(request, result)
            .map_err(|e| e.to_string())
    }
}

#[wasm_bindgen]
impl WasmEditor {
    /// Mount a session on the desktop page. Missing pages get a default
    /// one-section document.
    #[wasm_bindgen(constructor)]
    pub fn new(
        config_json: &str,
        desktop: Option<String>,
        mobile: Option<String>,
    ) -> Result<WasmEditor, JsValue> {
        Self::mount(config_json, desktop, mobile).map_err(|e| js_error("Mount error", e))
    }

    #[wasm_bindgen(js_name = currentPlatform)]
    pub fn current_platform(&self) -> String {
        self.session.current_platform().to_string()
    }

    #[wasm_bindgen(js_name = switchPlatform)]
    pub fn switch_platform(&mut self, platform: &str) -> Result<(), JsValue> {
        let platform: Platform = platform.parse().map_err(|e| js_error("Platform error", e))?;
        self.session
            .switch_platform(platform)
            .map_err(|e| js_error("Switch error", e))
    }

    /// Regenerate the mobile page from the desktop page
    #[wasm_bindgen(js_name = convertDesktopToMobile)]
    pub fn convert_desktop_to_mobile(&mut self) -> Result<(), JsValue> {
        self.session
            .convert_desktop_to_mobile()
            .into_result()
            .map(|_| ())
            .map_err(|e| js_error("Sync error", e))
    }

    pub fn serialize(&self) -> Result<String, JsValue> {
        self.session
            .serialize()
            .map_err(|e| js_error("Serialization error", e))
    }

    #[wasm_bindgen(js_name = selectNode)]
    pub fn select_node(&mut self, id: Option<String>) {
        self.session.select_node(id.map(Into::into));
    }

    #[wasm_bindgen(js_name = openPopup)]
    pub fn open_popup(&mut self, id: String) {
        self.session.open_overlay(Overlay::Popup(id.into()));
    }

    #[wasm_bindgen(js_name = closeAllOverlays)]
    pub fn close_all_overlays(&mut self) {
        self.session.close_all_overlays();
    }

    /// Dispatch a key press; returns the outcome as JSON
    #[wasm_bindgen(js_name = handleKey)]
    pub fn handle_key(&mut self, chord_json: &str, focus: &str) -> Result<String, JsValue> {
        let outcome = self
            .shortcut(chord_json, focus)
            .map_err(|e| js_error("Shortcut error", e))?;
        serde_json::to_string(&outcome).map_err(|e| js_error("Serialization error", e))
    }

    /// Advance the session clock by `ms` milliseconds
    pub fn advance(&mut self, ms: u32) {
        self.session.advance(Duration::from_millis(u64::from(ms)));
    }

    /// Returns true when a changed snapshot was stored
    #[wasm_bindgen(js_name = autoSaveLocal)]
    pub fn auto_save_local(&mut self) -> Result<bool, JsValue> {
        let outcome = self
            .session
            .auto_save_local()
            .map_err(|e| js_error("Auto-save error", e))?;
        Ok(outcome == AutoSaveOutcome::Saved)
    }

    /// Returns the save request as JSON, or nothing when there is nothing to save
    #[wasm_bindgen(js_name = beginRemoteSave)]
    pub fn begin_remote_save(&mut self) -> Result<Option<String>, JsValue> {
        let request = self
            .session
            .begin_remote_save()
            .map_err(|e| js_error("Auto-save error", e))?;

        request
            .map(|r| serde_json::to_string(&r))
            .transpose()
            .map_err(|e| js_error("Serialization error", e))
    }

    /// Complete a save started with `beginRemoteSave`. Pass the failure
    /// message when the host's request failed.
    #[wasm_bindgen(js_name = finishRemoteSave)]
    pub fn finish_remote_save(
        &mut self,
        request_json: &str,
        error: Option<String>,
    ) -> Result<bool, JsValue> {
        let outcome = self
            .finish_save(request_json, error)
            .map_err(|e| js_error("Auto-save error", e))?;
        Ok(outcome == RemoteSaveOutcome::Saved)
    }

    #[wasm_bindgen(js_name = drainNotifications)]
    pub fn drain_notifications(&mut self) -> Result<String, JsValue> {
        let notifications = self.session.drain_notifications();
        tracing::debug!(count = notifications.len(), "notifications drained");
        serde_json::to_string(&notifications).map_err(|e| js_error("Serialization error", e))
    }

    #[wasm_bindgen(js_name = isAtInitialState)]
    pub fn is_at_initial_state(&self) -> bool {
        self.session.is_at_initial_state()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn editor() -> WasmEditor {
        WasmEditor::mount("{}", None, None).unwrap()
    }

    #[test]
    fn test_mount_with_defaults() {
        let editor = editor();
        assert_eq!(editor.current_platform(), "desktop");
        assert!(editor.serialize().unwrap().contains("default-section"));
        assert!(editor.is_at_initial_state());
    }

    #[test]
    fn test_mount_rejects_bad_config() {
        assert!(matches!(
            WasmEditor::mount(r#"{"pasteOffset": "far"}"#, None, None),
            Err(SessionError::Config(_))
        ));
    }

    #[test]
    fn test_convert_then_switch_to_mobile() {
        let mut editor = editor();
        editor.convert_desktop_to_mobile().unwrap();
        editor.switch_platform("mobile").unwrap();
        assert!(editor.serialize().unwrap().contains("default-section"));
    }

    #[test]
    fn test_shortcut_round_trip() {
        let mut editor = editor();
        editor.select_node(Some("default-section".to_string()));

        let outcome = editor.shortcut(r#"{"key":"c","ctrl":true}"#, "canvas").unwrap();
        assert_eq!(outcome, ShortcutOutcome::Copied);

        let json = editor.handle_key(r#"{"key":"c","ctrl":true}"#, "sidebar").unwrap();
        assert_eq!(json, r#"{"kind":"ignored"}"#);
        assert!(editor.shortcut("{}", "window").is_err());
    }

    #[test]
    fn test_remote_save_through_json() {
        let mut editor = editor();
        editor.switch_platform("mobile").unwrap();
        editor.switch_platform("desktop").unwrap();

        // Synthesized pages were never stored remotely
        let request = editor.begin_remote_save().unwrap().unwrap();
        assert!(editor.finish_remote_save(&request, None).unwrap());

        editor.advance(500);
        assert_eq!(editor.begin_remote_save().unwrap(), None);
        assert_eq!(editor.drain_notifications().unwrap(), "[]");
    }
}
