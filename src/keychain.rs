use tracing::debug;

const SERVICE: &str = "dev.taxiwatch";
const TOKEN_ENTRY: &str = "api_token";

fn entry() -> Result<keyring::Entry, String> {
    keyring::Entry::new(SERVICE, TOKEN_ENTRY)
        .map_err(|e| format!("Failed to create keychain entry: {}", e))
}

/// Store the backend bearer token in the OS keychain.
pub fn keychain_set_token(token: &str) -> Result<(), String> {
    if token.trim().is_empty() {
        return Err("API token must not be empty".to_string());
    }
    entry()?
        .set_password(token)
        .map_err(|e| format!("Failed to store in keychain: {}", e))?;
    debug!("API token stored in keychain");
    Ok(())
}

/// Returns None if no token is stored.
pub fn keychain_get_token() -> Result<Option<String>, String> {
    match entry()?.get_password() {
        Ok(token) => Ok(Some(token)),
        Err(keyring::Error::NoEntry) => Ok(None),
        Err(e) => Err(format!("Failed to read from keychain: {}", e)),
    }
}

pub fn keychain_delete_token() -> Result<(), String> {
    match entry()?.delete_credential() {
        Ok(()) => {
            debug!("API token deleted from keychain");
            Ok(())
        }
        Err(keyring::Error::NoEntry) => Ok(()), // Already gone
        Err(e) => Err(format!("Failed to delete from keychain: {}", e)),
    }
}
