//! Application directory paths.
//!
//! Single source of truth for where the database and configuration live,
//! resolved through the [`dirs`] crate for platform-appropriate locations.
//!
//! Both paths can be overridden for testing or custom deployments:
//! - `LADDER_DATA_DIR` — overrides [`data_dir`]
//! - `LADDER_CONFIG_DIR` — overrides [`config_dir`]

use std::path::PathBuf;

/// Application data root directory, holding the record database.
///
/// Resolves to `dirs::data_dir()/ladder/` by default; override with the
/// `LADDER_DATA_DIR` environment variable.
#[must_use]
pub fn data_dir() -> PathBuf {
    if let Some(override_dir) = std::env::var_os("LADDER_DATA_DIR") {
        return PathBuf::from(override_dir);
    }
    dirs::data_dir()
        .map(|d| d.join("ladder"))
        .unwrap_or_else(|| PathBuf::from("/tmp/ladder-data"))
}

/// Application config directory, holding `config.toml`.
///
/// Resolves to `dirs::config_dir()/ladder/` by default; override with the
/// `LADDER_CONFIG_DIR` environment variable.
#[must_use]
pub fn config_dir() -> PathBuf {
    if let Some(override_dir) = std::env::var_os("LADDER_CONFIG_DIR") {
        return PathBuf::from(override_dir);
    }
    dirs::config_dir()
        .map(|d| d.join("ladder"))
        .unwrap_or_else(|| PathBuf::from("/tmp/ladder-config"))
}
