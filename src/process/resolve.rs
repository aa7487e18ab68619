//! Executable resolution.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Extensions tried, in order, when resolving a bare command on Windows.
pub const SHIM_EXTENSIONS: &[&str] = &["cmd", "bat", "exe"];

/// Resolve the program to launch for `command`.
///
/// On Windows with `prefer_shims` set, a bare command name is looked up on
/// `PATH` and the first `.cmd`/`.bat`/`.exe` match wins, so npm-installed
/// CLIs resolve to their shim. Everywhere else the command is used as given
/// and the OS performs the usual `PATH` search.
#[must_use]
pub fn resolve_program(command: &str, prefer_shims: bool) -> PathBuf {
    if cfg!(windows) && prefer_shims {
        let path_var = std::env::var_os("PATH");
        if let Some(found) = search_path(command, path_var.as_deref(), SHIM_EXTENSIONS) {
            return found;
        }
    }
    PathBuf::from(command)
}

/// Search each directory of `path_var` for `command.<ext>`.
///
/// Directories are visited in `PATH` order; within a directory the
/// extensions are tried in the order given. Commands that already carry a
/// directory component or an extension are not searched.
#[must_use]
pub fn search_path(command: &str, path_var: Option<&OsStr>, extensions: &[&str]) -> Option<PathBuf> {
    let as_path = Path::new(command);
    if command.is_empty()
        || as_path.extension().is_some()
        || as_path.components().count() != 1
    {
        return None;
    }

    let path_var = path_var?;
    std::env::split_paths(path_var).find_map(|dir| {
        extensions
            .iter()
            .map(|ext| dir.join(format!("{command}.{ext}")))
            .find(|candidate| candidate.is_file())
    })
}
