// src/config/duration.rs

use std::time::Duration;

use crate::errors::{GcmdError, Result};

/// Parse a simple duration string like `"3s"`, `"250ms"`, `"1m"`, `"2h"`.
///
/// Used for `timeout` and `drain_grace`, both in the TOML file and on the
/// command line.
pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim();
    if s.is_empty() {
        return Err(GcmdError::ConfigError("empty duration string".to_string()));
    }

    // Find the boundary between digits and suffix.
    let idx = s.chars().position(|c| !c.is_ascii_digit()).ok_or_else(|| {
        GcmdError::ConfigError(format!("duration '{}' is missing a unit suffix", s))
    })?;

    let (num_part, unit_part) = s.split_at(idx);
    let value: u64 = num_part.parse().map_err(|e| {
        GcmdError::ConfigError(format!("invalid duration number '{}': {}", num_part, e))
    })?;
    let unit = unit_part.trim().to_lowercase();

    let secs_per_unit = match unit.as_str() {
        "ms" => return Ok(Duration::from_millis(value)),
        "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        _ => {
            return Err(GcmdError::ConfigError(format!(
                "unsupported duration unit '{}'; expected ms, s, m, or h",
                unit
            )));
        }
    };

    let secs = value.checked_mul(secs_per_unit).ok_or_else(|| {
        GcmdError::ConfigError(format!("duration '{}' is too large", s))
    })?;
    Ok(Duration::from_secs(secs))
}
