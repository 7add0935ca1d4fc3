use crate::db::DbPool;

const TOKEN_KEY: &str = "api_token";

/// Store the API token in the config table (keychain fallback).
pub fn token_set_db(pool: &DbPool, token: &str) -> Result<(), String> {
    let conn = pool.get().map_err(|e| e.to_string())?;
    conn.execute(
        "INSERT INTO config (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
        [TOKEN_KEY, token],
    )
    .map_err(|e| e.to_string())?;
    Ok(())
}

pub fn token_get_db(pool: &DbPool) -> Result<Option<String>, String> {
    let conn = pool.get().map_err(|e| e.to_string())?;
    match conn.query_row(
        "SELECT value FROM config WHERE key = ?1",
        [TOKEN_KEY],
        |row| row.get(0),
    ) {
        Ok(token) => Ok(Some(token)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.to_string()),
    }
}

pub fn token_delete_db(pool: &DbPool) -> Result<(), String> {
    let conn = pool.get().map_err(|e| e.to_string())?;
    conn.execute("DELETE FROM config WHERE key = ?1", [TOKEN_KEY])
        .map_err(|e| e.to_string())?;
    Ok(())
}

/// Get the token, trying keychain first, then falling back to DB.
pub fn token_get_any(pool: &DbPool) -> Result<Option<String>, String> {
    match crate::keychain::keychain_get_token() {
        Ok(Some(token)) => return Ok(Some(token)),
        Ok(None) => {}
        Err(e) => {
            tracing::warn!(error = %e, "Keychain read failed, falling back to DB");
        }
    }
    token_get_db(pool)
}

pub fn token_set_any(pool: &DbPool, token: &str) -> Result<(), String> {
    if token.trim().is_empty() {
        return Err("API token must not be empty".to_string());
    }
    match crate::keychain::keychain_set_token(token) {
        Ok(()) => Ok(()),
        Err(e) => {
            tracing::warn!(error = %e, "Keychain write failed, falling back to DB");
            token_set_db(pool, token)
        }
    }
}

pub fn token_clear_any(pool: &DbPool) -> Result<(), String> {
    if let Err(e) = crate::keychain::keychain_delete_token() {
        tracing::warn!(error = %e, "Keychain delete failed");
    }
    token_delete_db(pool)
}

// --- Tauri command wrappers ---

#[cfg(feature = "desktop")]
#[tauri::command]
pub fn credentials_set_token(pool: tauri::State<'_, DbPool>, token: String) -> Result<(), String> {
    token_set_any(&pool, &token)
}

#[cfg(feature = "desktop")]
#[tauri::command]
pub fn credentials_token_exists(pool: tauri::State<'_, DbPool>) -> Result<bool, String> {
    Ok(token_get_any(&pool)?.is_some())
}

#[cfg(feature = "desktop")]
#[tauri::command]
pub fn credentials_clear_token(pool: tauri::State<'_, DbPool>) -> Result<(), String> {
    token_clear_any(&pool)
}
