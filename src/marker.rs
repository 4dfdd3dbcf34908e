// src/marker.rs

//! Placeholder substitution for argument templates.

/// Placeholder replaced by the node name when no other token is configured.
pub const DEFAULT_MARKER: &str = "__NODE__";

/// Resolve an argument template for one node.
///
/// Every occurrence of `marker` in every argument is replaced by `node`
/// (literal, case-sensitive, no escaping). Arguments without the marker are
/// copied as-is. If `node` itself contains `marker` the result is whatever a
/// single left-to-right replacement pass produces.
pub fn replace_marker(template: &[String], marker: &str, node: &str) -> Vec<String> {
    if marker.is_empty() {
        return template.to_vec();
    }

    template
        .iter()
        .map(|arg| arg.replace(marker, node))
        .collect()
}

/// Whether any argument in the template references the marker.
pub fn template_uses_marker(template: &[String], marker: &str) -> bool {
    !marker.is_empty() && template.iter().any(|arg| arg.contains(marker))
}
