/// Event names as constants, shared with the frontend listeners.
pub mod event_names {
    pub const DATA_LOADED: &str = "dashboard:data-loaded";
    pub const LAYERS_UPDATED: &str = "dashboard:layers-updated";
    pub const INDICATORS_UPDATED: &str = "dashboard:indicators-updated";
    pub const HISTORY_UPDATED: &str = "dashboard:history-updated";
}

#[cfg(feature = "desktop")]
pub fn emit_event<R: tauri::Runtime, T: serde::Serialize + Clone>(
    app: &tauri::AppHandle<R>,
    event: &str,
    payload: T,
) -> Result<(), String> {
    use tauri::Emitter;
    app.emit(event, payload).map_err(|e| e.to_string())
}
