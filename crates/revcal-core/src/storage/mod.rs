mod config;

pub use config::{ActivityConfig, BlockedConfig, Config, DisplacementConfig, ScheduleConfig};

use std::path::PathBuf;

/// Returns `~/.config/revcal[-dev]/` based on REVCAL_ENV.
///
/// Set REVCAL_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("REVCAL_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("revcal-dev")
    } else {
        base_dir.join("revcal")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
