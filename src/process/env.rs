//! Child-process environment construction.
//!
//! The child inherits the parent's full environment. On top of it the
//! following overrides are applied, later entries winning:
//!
//! 1. `HOME = USERPROFILE` on Windows when configured.
//! 2. Mode-specific fixed entries (for example `GEMINI_IDE_INTEGRATION`).
//! 3. `HTTPS_PROXY` / `HTTP_PROXY` when the proxy is enabled, keeping any
//!    value the parent already had over the configured endpoint.

use std::collections::HashMap;

use crate::config::GlobalConfig;

/// Compute the ordered environment overrides for a child process.
///
/// `inherited` looks up a variable in the parent environment; `windows` is
/// the host platform flag. The returned pairs are applied in order on top
/// of the inherited environment.
pub fn child_env_overrides<F>(
    inherited: F,
    config: &GlobalConfig,
    fixed: &HashMap<String, String>,
    windows: bool,
) -> Vec<(String, String)>
where
    F: Fn(&str) -> Option<String>,
{
    let present = |key: &str| inherited(key).filter(|value| !value.is_empty());
    let mut overrides = Vec::new();

    if windows && config.windows.force_userprofile_as_home {
        if let Some(profile) = present("USERPROFILE") {
            overrides.push(("HOME".to_owned(), profile));
        }
    }

    let mut fixed_entries: Vec<_> = fixed.iter().collect();
    fixed_entries.sort();
    for (key, value) in fixed_entries {
        overrides.push((key.clone(), value.clone()));
    }

    if config.proxy.enabled {
        let https = present("HTTPS_PROXY").unwrap_or_else(|| config.proxy.https.clone());
        let http = present("HTTP_PROXY").unwrap_or_else(|| config.proxy.http.clone());
        overrides.push(("HTTPS_PROXY".to_owned(), https));
        overrides.push(("HTTP_PROXY".to_owned(), http));
    }

    overrides
}

/// [`child_env_overrides`] against the live process environment.
#[must_use]
pub fn current_env_overrides(
    config: &GlobalConfig,
    fixed: &HashMap<String, String>,
) -> Vec<(String, String)> {
    child_env_overrides(
        |key| std::env::var(key).ok(),
        config,
        fixed,
        cfg!(windows),
    )
}
