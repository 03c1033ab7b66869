//! File-name and path helpers for the metadata layer.
//!
//! Names stored in metadata records must be portable across host
//! filesystems; these helpers strip the characters that are invalid
//! somewhere, flag the names Windows reserves outright, and cover the
//! extension and normalization queries the layer above needs when mapping
//! host paths onto metadata entries.

use std::path::Path;

/// Characters rejected in entry names on at least one supported platform.
const INVALID_CHARS: &[char] = &['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

/// Base names Windows reserves regardless of extension.
const RESERVED_WINDOWS_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Replaces invalid and control characters with `_` and trims surrounding
/// spaces. Returns an empty string if nothing survives.
#[must_use]
pub fn sanitize_file_name(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| {
            if INVALID_CHARS.contains(&c) || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();
    sanitized.trim_matches(' ').to_string()
}

/// Whether `name` survives sanitisation as a non-empty string.
#[must_use]
pub fn is_valid_file_name(name: &str) -> bool {
    !sanitize_file_name(name).is_empty()
}

/// Splits a path on both `/` and `\`, dropping empty components.
#[must_use]
pub fn split_path(path: &str) -> Vec<String> {
    path.split(['/', '\\'])
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

/// Joins components with the platform separator.
#[must_use]
pub fn join_path(parts: &[String]) -> String {
    let separator = std::path::MAIN_SEPARATOR.to_string();
    parts.join(separator.as_str())
}

/// Whether the base name (extension stripped) is a Windows reserved device
/// name.
#[must_use]
pub fn is_reserved_windows_name(name: &str) -> bool {
    let base = name.split('.').next().unwrap_or(name);
    let upper = base.to_ascii_uppercase();
    RESERVED_WINDOWS_NAMES.contains(&upper.as_str())
}

/// The extension of `filename`, dot included (`".pdf"`); empty when there
/// is none. A leading dot alone (`".gitignore"`) is not an extension.
#[must_use]
pub fn file_extension(filename: &str) -> String {
    Path::new(filename)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}

/// `path` with its last extension removed; other components untouched.
#[must_use]
pub fn remove_file_extension(path: &str) -> String {
    Path::new(path).with_extension("").to_string_lossy().into_owned()
}

/// Resolves `path` against the filesystem (symlinks, `.` and `..`
/// components). A path that cannot be resolved comes back unchanged.
#[must_use]
pub fn normalize_path(path: &str) -> String {
    match std::fs::canonicalize(path) {
        Ok(resolved) => resolved.to_string_lossy().into_owned(),
        Err(_) => path.to_string(),
    }
}

/// Joins `relative` onto `base`. An absolute `relative` replaces the base.
#[must_use]
pub fn make_absolute_path(base: &str, relative: &str) -> String {
    Path::new(base).join(relative).to_string_lossy().into_owned()
}

/// The parent of `path`; empty for a bare name or a root.
#[must_use]
pub fn parent_path(path: &str) -> String {
    Path::new(path)
        .parent()
        .map(|parent| parent.to_string_lossy().into_owned())
        .unwrap_or_default()
}
