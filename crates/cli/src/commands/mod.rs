pub mod chat;
pub mod classify;
pub mod context;
pub mod onboard;
pub mod providers;
pub mod status;

use parley_config::AppConfig;

pub(crate) fn load_config() -> Result<AppConfig, Box<dyn std::error::Error>> {
    Ok(AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?)
}
