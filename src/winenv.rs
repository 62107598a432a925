//! Persistent per-user environment variables on Windows.
//!
//! Values are read and written through PowerShell's
//! `[Environment]::GetEnvironmentVariable` / `SetEnvironmentVariable` with
//! the `User` scope, which persists to the user registry hive and
//! broadcasts the settings change so new terminals pick it up.

use anyhow::Result;

use crate::exec::Executor;

const NOT_FOUND_SENTINEL: &str = "::NOT_FOUND::";

/// Escape a string for single-quoted PowerShell literals.
fn ps_quote(s: &str) -> String {
    s.replace('\'', "''")
}

/// Read a persistent user environment variable. `None` when unset.
///
/// # Errors
///
/// Returns an error if PowerShell cannot be executed.
pub fn get_user_env(executor: &dyn Executor, name: &str) -> Result<Option<String>> {
    let script = format!(
        "$v = [Environment]::GetEnvironmentVariable('{}', 'User')\n\
         if ([string]::IsNullOrEmpty($v)) {{ Write-Output '{NOT_FOUND_SENTINEL}' }} else {{ Write-Output $v }}",
        ps_quote(name)
    );
    let result = executor.run_unchecked("powershell", &["-NoProfile", "-Command", &script])?;

    if !result.success {
        return Ok(None);
    }
    let output = result.stdout.trim();
    if output == NOT_FOUND_SENTINEL {
        Ok(None)
    } else {
        Ok(Some(output.to_string()))
    }
}

/// Write a persistent user environment variable.
///
/// # Errors
///
/// Returns an error if PowerShell fails.
pub fn set_user_env(executor: &dyn Executor, name: &str, value: &str) -> Result<()> {
    let script = format!(
        "[Environment]::SetEnvironmentVariable('{}', '{}', 'User')",
        ps_quote(name),
        ps_quote(value)
    );
    executor.run("powershell", &["-NoProfile", "-Command", &script])?;
    Ok(())
}

/// Prepend `entry` to the persistent user `Path` unless it is already
/// present (case-insensitive). Returns `true` when the Path was updated.
///
/// # Errors
///
/// Returns an error if PowerShell fails.
pub fn prepend_to_user_path(executor: &dyn Executor, entry: &str) -> Result<bool> {
    let current = get_user_env(executor, "Path")?.unwrap_or_default();

    if path_contains(&current, entry) {
        return Ok(false);
    }

    let updated = if current.is_empty() {
        entry.to_string()
    } else {
        format!("{entry};{current}")
    };
    set_user_env(executor, "Path", &updated)?;
    Ok(true)
}

/// Case-insensitive containment check over `;`-separated Path entries.
fn path_contains(path: &str, entry: &str) -> bool {
    let needle = entry.to_lowercase();
    path.split(';').any(|p| p.trim().to_lowercase() == needle)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::exec::test_helpers::{MockExecutor, RecordingExecutor};

    #[test]
    fn quote_doubles_single_quotes() {
        assert_eq!(ps_quote("it's"), "it''s");
        assert_eq!(ps_quote("plain"), "plain");
    }

    #[test]
    fn path_contains_is_case_insensitive() {
        let path = r"C:\msys64\ucrt64\bin;C:\Windows\System32";
        assert!(path_contains(path, r"c:\MSYS64\ucrt64\BIN"));
        assert!(!path_contains(path, r"C:\other"));
    }

    #[test]
    fn path_contains_rejects_prefix_matches() {
        let path = r"C:\msys64\ucrt64\bin-extra";
        assert!(!path_contains(path, r"C:\msys64\ucrt64\bin"));
    }

    #[test]
    fn get_user_env_returns_none_for_sentinel() {
        let executor = MockExecutor::ok("::NOT_FOUND::\n");
        let value = get_user_env(&executor, "Path").unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn get_user_env_returns_value() {
        let executor = MockExecutor::ok("C:\\tools\n");
        let value = get_user_env(&executor, "Path").unwrap();
        assert_eq!(value.as_deref(), Some("C:\\tools"));
    }

    #[test]
    fn prepend_skips_when_already_present() {
        let executor = MockExecutor::ok("C:\\msys64\\ucrt64\\bin;C:\\Windows\n");
        let updated = prepend_to_user_path(&executor, r"C:\msys64\ucrt64\bin").unwrap();
        assert!(!updated, "no rewrite when the entry is already on Path");
    }

    #[test]
    fn prepend_puts_entry_first() {
        let executor = RecordingExecutor::new();
        // RecordingExecutor returns empty stdout, so the current Path reads
        // as unset and the entry becomes the whole value.
        let updated = prepend_to_user_path(&executor, r"C:\msys64\ucrt64\bin").unwrap();
        assert!(updated);

        let calls = executor.recorded_calls();
        assert_eq!(calls.len(), 2, "one read and one write");
        let set_script = &calls[1].1[2];
        assert!(set_script.contains("SetEnvironmentVariable"));
        assert!(set_script.contains(r"C:\msys64\ucrt64\bin"));
        assert!(set_script.contains("'User'"));
    }
}
