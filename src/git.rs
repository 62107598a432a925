//! Thin helpers around the `git` CLI.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Result;

use crate::exec::Executor;

/// Whether `dir` is the top of a git working tree.
#[must_use]
pub fn is_repository(dir: &Path) -> bool {
    dir.join(".git").exists()
}

/// Configured remotes as a name → fetch-URL map, parsed from `git remote -v`.
///
/// # Errors
///
/// Returns an error if git cannot be executed.
pub fn remotes(executor: &dyn Executor, dir: &Path) -> Result<BTreeMap<String, String>> {
    let result = executor.run_in(dir, "git", &["remote", "-v"])?;
    Ok(parse_remotes(&result.stdout))
}

/// Parse `git remote -v` output, keeping only the `(fetch)` lines.
#[must_use]
pub fn parse_remotes(output: &str) -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();
    for line in output.lines() {
        if !line.contains("(fetch)") {
            continue;
        }
        let mut parts = line.split_whitespace();
        if let (Some(name), Some(url)) = (parts.next(), parts.next()) {
            map.insert(name.to_string(), url.to_string());
        }
    }
    map
}

/// Read a git config value; `None` when the key is unset.
///
/// # Errors
///
/// Returns an error if git cannot be executed.
pub fn config_get(executor: &dyn Executor, dir: &Path, key: &str) -> Result<Option<String>> {
    let result = executor.run_unchecked("git", &["-C", &dir.display().to_string(), "config", "--get", key])?;
    if result.success {
        let value = result.stdout.trim().to_string();
        Ok((!value.is_empty()).then_some(value))
    } else {
        Ok(None)
    }
}

/// Set a git config value in the repository at `dir`.
///
/// # Errors
///
/// Returns an error if git fails.
pub fn config_set(executor: &dyn Executor, dir: &Path, key: &str, value: &str) -> Result<()> {
    executor.run_in(dir, "git", &["config", key, value])?;
    Ok(())
}
