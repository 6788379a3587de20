// ABOUTME: Platform-specific locations for smsgate's config and data
// ABOUTME: Resolved through the `directories` crate; None when no home directory exists

use std::path::PathBuf;

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("", "", "smsgate")
}

/// Per-user config file (e.g. ~/.config/smsgate/config.toml)
pub fn config_file() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Default log directory when file logging is enabled without a path
pub fn log_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.data_local_dir().join("logs"))
}
