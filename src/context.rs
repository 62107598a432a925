use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;

use crate::cli::GlobalOpts;
use crate::exec::Executor;
use crate::logging::Logger;
use crate::platform::Platform;

/// Shared state for command execution.
pub struct Context {
    /// Detected platform information.
    pub platform: Platform,
    /// Logger for terminal output and the persistent log file.
    pub log: Logger,
    /// Command executor (real system calls, or a mock in tests).
    pub executor: Arc<dyn Executor>,
    /// The student workspace directory.
    pub workspace: PathBuf,
    /// User's home directory.
    pub home: PathBuf,
    /// Preview commands without executing them.
    pub dry_run: bool,
    /// Answer yes to every confirmation prompt.
    pub assume_yes: bool,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("platform", &self.platform)
            .field("workspace", &self.workspace)
            .field("home", &self.home)
            .field("dry_run", &self.dry_run)
            .field("assume_yes", &self.assume_yes)
            .finish_non_exhaustive()
    }
}

impl Context {
    /// Build the context from global CLI options.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory or workspace cannot be resolved.
    pub fn from_opts(global: &GlobalOpts, log: Logger, executor: Arc<dyn Executor>) -> Result<Self> {
        let home =
            dirs::home_dir().ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
        let workspace = resolve_workspace(global)?;

        Ok(Self {
            platform: Platform::detect(),
            log,
            executor,
            workspace,
            home,
            dry_run: global.dry_run,
            assume_yes: global.yes,
        })
    }

    /// Ask a yes/no question, honoring `--yes` and dry-run mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be read.
    pub fn confirm(&self, prompt: &str) -> Result<bool> {
        if self.assume_yes || self.dry_run {
            self.log.debug(&format!("{prompt} -> assumed yes"));
            return Ok(true);
        }
        Ok(self.log.confirm(prompt)?)
    }
}

/// Resolve the student workspace directory: `--workspace` flag, then the
/// `CLASSKIT_WORKSPACE` environment variable, then the current directory.
fn resolve_workspace(global: &GlobalOpts) -> Result<PathBuf> {
    if let Some(ref dir) = global.workspace {
        return Ok(dir.clone());
    }
    if let Ok(dir) = std::env::var("CLASSKIT_WORKSPACE") {
        return Ok(PathBuf::from(dir));
    }
    Ok(std::env::current_dir()?)
}


#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::exec::test_helpers::RecordingExecutor;
    use crate::platform::Os;

    #[test]
    fn explicit_workspace_wins() {
        let global = GlobalOpts {
            workspace: Some(PathBuf::from("/tmp/classwork")),
            dry_run: false,
            yes: false,
        };
        assert_eq!(
            resolve_workspace(&global).unwrap(),
            PathBuf::from("/tmp/classwork")
        );
    }

    #[test]
    fn confirm_is_automatic_with_assume_yes() {
        let ctx = test_helpers::make_context(
            Os::Linux,
            Arc::new(RecordingExecutor::new()),
            PathBuf::from("/tmp"),
        );
        assert!(ctx.confirm("continue?").unwrap());
    }

    #[test]
    fn debug_format_includes_key_fields() {
        let ctx = test_helpers::make_context(
            Os::Linux,
            Arc::new(RecordingExecutor::new()),
            PathBuf::from("/tmp"),
        );
        let debug = format!("{ctx:?}");
        assert!(debug.contains("Context"));
        assert!(debug.contains("dry_run"));
        assert!(debug.contains("workspace"));
    }
}
