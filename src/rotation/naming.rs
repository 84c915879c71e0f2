use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// `<original-path>.<suffix>`
#[must_use]
pub fn rotated_path(original: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(original.as_os_str());
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}

/// `<original-path>.<suffix><compressed-suffix>`
#[must_use]
pub fn compressed_path(original: &Path, suffix: &str, compressed_suffix: &str) -> PathBuf {
    let mut name = rotated_path(original, suffix).into_os_string();
    name.push(compressed_suffix);
    PathBuf::from(name)
}
