// src/config/mod.rs

//! Job configuration for gcmd.
//!
//! Responsibilities:
//! - Define the TOML-backed data model and the validated [`Job`] (`model.rs`).
//! - Load a job file from disk (`loader.rs`).
//! - Resolve and validate a job before it runs (`validate.rs`).
//! - Parse `"30s"`-style durations (`duration.rs`).

pub mod duration;
pub mod loader;
pub mod model;
pub mod validate;

pub use duration::parse_duration;
pub use loader::{config_root_dir, default_config_path, load_and_validate, load_from_path};
pub use model::{
    DEFAULT_DRAIN_GRACE, DEFAULT_MAXFLIGHT, Job, JobSection, NodesSection, RawJobFile,
};
pub use validate::{resolve_job, validate_job};
