use std::time::Duration;

use crate::api::ApiClient;
use crate::commands::config::load_config;
use crate::commands::credentials::token_get_any;
use crate::db::DbPool;
use crate::error::{DashboardError, Result};
use crate::types::config::DashboardConfig;

/// Builds an API client from the current configuration and stored token.
pub fn client_from_store(pool: &DbPool) -> Result<(ApiClient, DashboardConfig)> {
    let config = load_config(pool)?;
    let token = token_get_any(pool).map_err(DashboardError::Storage)?;
    let client = ApiClient::new(
        &config.api_url,
        Duration::from_secs(config.request_timeout_secs),
        token,
    )?;
    Ok((client, config))
}

#[cfg(feature = "desktop")]
fn emit_refresh<R: tauri::Runtime>(app: &tauri::AppHandle<R>, refresh: &crate::types::view::DateRefresh) {
    use crate::events::{emit_event, event_names};

    if refresh.superseded {
        return;
    }
    let emits = [
        refresh
            .view
            .as_ref()
            .map(|v| emit_event(app, event_names::DATA_LOADED, v.clone())),
        refresh
            .indicators
            .as_ref()
            .map(|i| emit_event(app, event_names::INDICATORS_UPDATED, i.clone())),
        refresh
            .history
            .as_ref()
            .map(|h| emit_event(app, event_names::HISTORY_UPDATED, h.clone())),
    ];
    for e in emits.into_iter().flatten() {
        if let Err(e) = e {
            tracing::warn!(error = %e, "Failed to emit dashboard event");
        }
    }
}

/// Date-change handler shared by the command and the startup load.
#[cfg(feature = "desktop")]
pub async fn refresh_and_emit<R: tauri::Runtime>(
    app: &tauri::AppHandle<R>,
    pool: &DbPool,
    state: &crate::state::DashboardState,
    date: crate::types::api::DateCode,
) -> std::result::Result<crate::types::view::DateRefresh, String> {
    let (client, config) = client_from_store(pool).map_err(|e| e.to_string())?;
    let settings = crate::state::ViewSettings::from(&config);
    let refresh = crate::dashboard::refresh_date(&client, state, date, settings).await;
    emit_refresh(app, &refresh);
    Ok(refresh)
}

// --- Tauri command wrappers ---

#[cfg(feature = "desktop")]
#[tauri::command]
pub async fn dashboard_load_date(
    app: tauri::AppHandle,
    pool: tauri::State<'_, DbPool>,
    state: tauri::State<'_, crate::state::DashboardState>,
    date: String,
) -> std::result::Result<crate::types::view::DateRefresh, String> {
    let date = crate::types::api::DateCode::parse(&date).map_err(|e| e.to_string())?;
    refresh_and_emit(&app, &pool, &state, date).await
}

#[cfg(feature = "desktop")]
#[tauri::command]
pub fn dashboard_set_hour(
    app: tauri::AppHandle,
    pool: tauri::State<'_, DbPool>,
    state: tauri::State<'_, crate::state::DashboardState>,
    hour: u32,
) -> std::result::Result<crate::types::layer::LayerUpdate, String> {
    use crate::events::{emit_event, event_names};

    let config = load_config(&pool).map_err(|e| e.to_string())?;
    let settings = crate::state::ViewSettings::from(&config);
    let update =
        crate::dashboard::change_hour(&state, hour, settings).map_err(|e| e.to_string())?;
    emit_event(&app, event_names::LAYERS_UPDATED, update.clone())?;
    Ok(update)
}

#[cfg(feature = "desktop")]
#[tauri::command]
pub fn dashboard_view(
    state: tauri::State<'_, crate::state::DashboardState>,
) -> crate::types::view::DashboardView {
    state.view()
}
