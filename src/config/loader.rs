// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::model::{Job, RawJobFile};
use crate::config::validate::resolve_job;
use crate::errors::Result;

/// Load a job file from a given path and return the raw `RawJobFile`.
///
/// This only performs TOML deserialization; it does **not** read node files
/// or validate anything. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawJobFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let raw: RawJobFile = toml::from_str(&contents)?;

    Ok(raw)
}

/// Load a job file from path and resolve it into a validated [`Job`].
///
/// - Reads TOML.
/// - Reads `[nodes].file` relative to the config file's directory.
/// - Applies defaults and checks the result with
///   [`crate::config::validate_job`].
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<Job> {
    let path = path.as_ref();
    let raw = load_from_path(path)?;
    resolve_job(raw, &config_root_dir(path))
}

/// Default job file looked up in the current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Gcmd.toml")
}

/// Directory that relative paths inside a config file are resolved against.
///
/// - "configs/Gcmd.toml" -> "configs"
/// - a bare "Gcmd.toml" (parent = "") -> the current working directory
pub fn config_root_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}
