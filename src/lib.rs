pub mod api;
pub mod commands;
pub mod dashboard;
pub mod db;
pub mod error;
pub mod events;
pub mod format;
pub mod keychain;
pub mod panels;
pub mod pipeline;
pub mod state;
pub mod types;

use tracing_subscriber::EnvFilter;

/// Initialize structured logging with tracing.
/// Respects RUST_LOG env var; defaults to `info` level for the taxiwatch crate.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("taxiwatch=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}

#[cfg(feature = "desktop")]
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    use tauri::Manager;

    init_tracing();

    let env_path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
    if dotenvy::from_path(&env_path).is_err() {
        dotenvy::dotenv().ok();
    }

    let data_dir = db::taxiwatch_data_dir();
    let db_path = data_dir.join("state").join("taxiwatch.sqlite");
    let pool = db::create_pool(&db_path).expect("Failed to create database pool");
    db::init_db(&pool).expect("Failed to initialize database");

    let config = commands::config::load_config(&pool).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Stored config is invalid, using defaults");
        types::config::DashboardConfig::default()
    });
    let dashboard = state::DashboardState::new(config.default_hour)
        .expect("Default hour already validated");
    let initial_date = types::api::DateCode::parse(&config.default_date)
        .expect("Default date already validated");

    tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .manage(pool)
        .manage(dashboard)
        .setup(move |app| {
            let handle = app.handle().clone();
            tauri::async_runtime::spawn(async move {
                let pool = handle.state::<db::DbPool>();
                let dashboard = handle.state::<state::DashboardState>();
                if let Err(e) =
                    commands::dashboard::refresh_and_emit(&handle, &pool, &dashboard, initial_date)
                        .await
                {
                    tracing::error!(error = %e, date = %initial_date, "Initial dashboard load failed");
                }
            });
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            commands::config::config_get,
            commands::config::config_update,
            commands::credentials::credentials_set_token,
            commands::credentials::credentials_token_exists,
            commands::credentials::credentials_clear_token,
            commands::dashboard::dashboard_load_date,
            commands::dashboard::dashboard_set_hour,
            commands::dashboard::dashboard_view,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
