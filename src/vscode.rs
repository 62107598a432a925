//! VS Code extension management through the `code` CLI.

use std::collections::HashSet;

use anyhow::Result;

use crate::exec::{ExecResult, Executor};
use crate::platform::Platform;

/// Extensions every student workspace needs.
pub const REQUIRED_EXTENSIONS: &[&str] = &[
    // Python
    "ms-python.python",
    // PDF handouts
    "tomoki1207.pdf",
    // Utilities
    "aaron-bond.better-comments",
    "fill-labs.dependi",
    "sanaajani.taskrunnercode",
    "tamasfe.even-better-toml",
];

/// The VS Code CLI entry point for this platform.
#[must_use]
pub fn code_command(platform: &Platform) -> &'static str {
    if platform.is_windows() {
        "code.cmd"
    } else {
        "code"
    }
}

/// Query the installed extension IDs in a single command.
///
/// Returns a set of lower-cased IDs; an empty set when the command fails
/// (VS Code absent counts as "nothing installed").
///
/// # Errors
///
/// Returns an error only if the command cannot be spawned at all.
pub fn installed_extensions(
    executor: &dyn Executor,
    platform: &Platform,
) -> Result<HashSet<String>> {
    let result = run_code(executor, platform, &["--list-extensions"])?;
    let mut set = HashSet::new();
    if result.success {
        for line in result.stdout.lines() {
            let id = line.trim().to_lowercase();
            if !id.is_empty() {
                set.insert(id);
            }
        }
    }
    Ok(set)
}

/// Extensions from `required` that are missing from `installed`.
///
/// `installed` holds lower-cased IDs, as produced by
/// [`installed_extensions`].
#[must_use]
pub fn missing_extensions<'a>(
    required: &'a [&'a str],
    installed: &HashSet<String>,
) -> Vec<&'a str> {
    required
        .iter()
        .filter(|id| !installed.contains(&id.to_lowercase()))
        .copied()
        .collect()
}

/// Install one extension. Returns `false` when the installer reported
/// failure.
///
/// # Errors
///
/// Returns an error only if the command cannot be spawned at all.
pub fn install_extension(executor: &dyn Executor, platform: &Platform, id: &str) -> Result<bool> {
    let result = run_code(executor, platform, &["--install-extension", id, "--force"])?;
    Ok(result.success)
}

/// Run the VS Code CLI. On Windows the `.cmd` wrapper needs `cmd.exe /C`.
fn run_code(executor: &dyn Executor, platform: &Platform, args: &[&str]) -> Result<ExecResult> {
    let cmd = code_command(platform);
    if platform.is_windows() {
        let mut full_args = vec!["/C", cmd];
        full_args.extend(args);
        executor.run_unchecked("cmd", &full_args)
    } else {
        executor.run_unchecked(cmd, args)
    }
}
