use crate::db::DbPool;
use crate::error::DashboardError;
use crate::types::config::DashboardConfig;

pub const API_URL_ENV: &str = "TAXIWATCH_API_URL";

/// Direct DB access for testing (no Tauri State)
pub fn config_get_db(pool: &DbPool) -> Result<String, String> {
    let conn = pool.get().map_err(|e| e.to_string())?;
    let result: Option<String> = conn
        .query_row(
            "SELECT value FROM config WHERE key = 'main'",
            [],
            |row| row.get(0),
        )
        .ok();
    Ok(result.unwrap_or_else(|| "{}".to_string()))
}

pub fn config_set_db(pool: &DbPool, json: &str) -> Result<(), String> {
    let conn = pool.get().map_err(|e| e.to_string())?;
    conn.execute(
        "INSERT INTO config (key, value) VALUES ('main', ?1)
         ON CONFLICT(key) DO UPDATE SET value = ?1, updated_at = datetime('now')",
        [json],
    )
    .map_err(|e| e.to_string())?;
    Ok(())
}

/// Deep-merges `patch_json` into the stored overrides. The merged result must
/// still form a valid configuration or nothing is written.
pub fn config_update_db(pool: &DbPool, patch_json: &str) -> Result<String, String> {
    let current = config_get_db(pool)?;
    let mut current_val: serde_json::Value =
        serde_json::from_str(&current).map_err(|e| e.to_string())?;
    let patch_val: serde_json::Value =
        serde_json::from_str(patch_json).map_err(|e| e.to_string())?;

    merge_json(&mut current_val, &patch_val);
    resolve_config(&current_val, None).map_err(|e| e.to_string())?;

    let merged = serde_json::to_string(&current_val).map_err(|e| e.to_string())?;
    config_set_db(pool, &merged)?;
    Ok(merged)
}

fn merge_json(base: &mut serde_json::Value, patch: &serde_json::Value) {
    if let (serde_json::Value::Object(base_map), serde_json::Value::Object(patch_map)) =
        (base, patch)
    {
        for (key, value) in patch_map {
            if value.is_object() && base_map.get(key).is_some_and(|v| v.is_object()) {
                if let Some(existing) = base_map.get_mut(key) {
                    merge_json(existing, value);
                }
            } else {
                base_map.insert(key.clone(), value.clone());
            }
        }
    }
}

/// Defaults, overlaid with stored overrides, overlaid with the API URL from
/// the environment.
pub fn resolve_config(
    stored: &serde_json::Value,
    env_api_url: Option<String>,
) -> Result<DashboardConfig, DashboardError> {
    let mut merged = serde_json::to_value(DashboardConfig::default()).map_err(|e| {
        DashboardError::Decode {
            what: "default config",
            source: e,
        }
    })?;
    merge_json(&mut merged, stored);

    let mut config: DashboardConfig =
        serde_json::from_value(merged).map_err(|e| DashboardError::Config(e.to_string()))?;
    if let Some(url) = env_api_url.filter(|u| !u.trim().is_empty()) {
        config.api_url = url;
    }
    config.validate()?;
    Ok(config)
}

pub fn load_config(pool: &DbPool) -> Result<DashboardConfig, DashboardError> {
    let stored = config_get_db(pool).map_err(DashboardError::Storage)?;
    let stored: serde_json::Value =
        serde_json::from_str(&stored).map_err(|e| DashboardError::Decode {
            what: "stored config",
            source: e,
        })?;
    resolve_config(&stored, std::env::var(API_URL_ENV).ok())
}

// --- Tauri command wrappers ---
#[cfg(feature = "desktop")]
#[tauri::command]
pub fn config_get(pool: tauri::State<'_, DbPool>) -> Result<DashboardConfig, String> {
    load_config(&pool).map_err(|e| e.to_string())
}

#[cfg(feature = "desktop")]
#[tauri::command]
pub fn config_update(pool: tauri::State<'_, DbPool>, patch: String) -> Result<DashboardConfig, String> {
    config_update_db(&pool, &patch)?;
    load_config(&pool).map_err(|e| e.to_string())
}
