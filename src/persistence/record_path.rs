//! Mapping from opaque session keys to record file names.
//!
//! Session keys come straight from the tool caller, so they are never used
//! as path components unless they are plainly safe. Anything else is hashed.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

/// File name used for the record of `key`.
///
/// Keys made only of ASCII alphanumerics, `_`, `-` and `.` (and not starting
/// with `.`) map to `<key>.json`. All other keys map to
/// `sha256-<hex digest>.json`, which cannot contain separators or `..`.
#[must_use]
pub fn record_file_name(key: &str) -> String {
    if is_plain_key(key) {
        format!("{key}.json")
    } else {
        let digest = Sha256::digest(key.as_bytes());
        format!("sha256-{digest:x}.json")
    }
}

/// Full path of the record for `key` inside `dir`.
#[must_use]
pub fn record_path(dir: &Path, key: &str) -> PathBuf {
    dir.join(record_file_name(key))
}

fn is_plain_key(key: &str) -> bool {
    !key.is_empty()
        && key.len() <= 128
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}
