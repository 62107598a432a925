//! MSYS2 environment management for Windows.
//!
//! All Windows component installations run inside the MSYS2 UCRT64
//! environment. Shared lab machines carry a portable MSYS2 tree under
//! `C:\Programmes_Portables`; personal machines use the standard winget
//! installation in `C:\msys64`.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::error::PlatformError;
use crate::exec::{ExecResult, Executor};
use crate::logging::Logger;
use crate::platform::Platform;
use crate::winenv;

/// Marker directory identifying a shared lab machine.
pub const LAB_ROOT: &str = r"C:\Programmes_Portables";
/// Portable MSYS2 tree on lab machines.
pub const LAB_INSTALL_DIR: &str = r"C:\Programmes_Portables\MSYS2_FR_1500";
/// Default MSYS2 location on personal machines.
pub const DEFAULT_INSTALL_DIR: &str = r"C:\msys64";

/// MSYS2 installation root for the given platform.
#[must_use]
pub fn install_dir(platform: &Platform) -> PathBuf {
    if platform.lab_machine {
        PathBuf::from(LAB_INSTALL_DIR)
    } else {
        PathBuf::from(DEFAULT_INSTALL_DIR)
    }
}

/// Whether MSYS2 is present on this machine.
#[must_use]
pub fn is_installed(platform: &Platform) -> bool {
    install_dir(platform).exists()
}

/// The `ucrt64\bin` directory that must be on the user PATH.
#[must_use]
pub fn ucrt64_bin(install: &Path) -> PathBuf {
    install.join("ucrt64").join("bin")
}

/// Fail with guidance when MSYS2 is missing.
///
/// # Errors
///
/// Returns [`PlatformError::MissingTool`] when the installation root does
/// not exist.
pub fn ensure_installed(platform: &Platform) -> Result<(), PlatformError> {
    if is_installed(platform) {
        return Ok(());
    }
    Err(PlatformError::MissingTool {
        tool: "MSYS2".to_string(),
        hint: "run 'classkit install msys2' first".to_string(),
    })
}

/// Run a command inside the MSYS2 UCRT64 environment, streaming its output.
/// Fails on a non-zero exit.
///
/// # Errors
///
/// Returns an error if bash cannot be spawned or the command exits non-zero.
pub fn run(executor: &dyn Executor, install: &Path, cmd: &str) -> Result<ExecResult> {
    let bash = bash_path(install);
    executor.run_streaming_checked(
        &bash.to_string_lossy(),
        &["-lc", cmd],
        &[("MSYSTEM", "UCRT64")],
    )
}

/// Like [`run`], but a non-zero exit is reported via the result instead of
/// an error (for status probes such as `pg_ctl status`).
///
/// # Errors
///
/// Returns an error only if bash cannot be spawned.
pub fn run_unchecked(executor: &dyn Executor, install: &Path, cmd: &str) -> Result<ExecResult> {
    let bash = bash_path(install);
    executor.run_streaming(
        &bash.to_string_lossy(),
        &["-lc", cmd],
        &[("MSYSTEM", "UCRT64")],
    )
}

fn bash_path(install: &Path) -> PathBuf {
    install.join("usr").join("bin").join("bash.exe")
}

/// Bring the package database and every installed package up to date.
///
/// `pacman -Syu` is deliberately run twice: the first pass may only upgrade
/// the core runtime and ask for a restart, the second completes the full
/// upgrade. This is MSYS2's documented two-phase update protocol.
///
/// # Errors
///
/// Returns an error if either pacman pass fails.
pub fn update(executor: &dyn Executor, log: &Logger, install: &Path) -> Result<()> {
    log.info("updating MSYS2...");
    run(executor, install, "pacman -Syu --noconfirm")?;
    run(executor, install, "pacman -Syu --noconfirm")?;
    log.info("MSYS2 update finished");
    Ok(())
}

/// Install MSYS2 with winget when missing and possible, then configure it.
///
/// Lab machines never install: their portable tree is provisioned by the
/// teacher. On personal machines the winget installation failure is
/// reported but not fatal, so an already-extracted tree still gets
/// configured and updated.
///
/// # Errors
///
/// Returns an error if the post-install configuration or update fails.
pub fn bootstrap(executor: &dyn Executor, log: &Logger, platform: &Platform) -> Result<()> {
    let install = install_dir(platform);

    if !platform.lab_machine && !install.exists() {
        log.info("installing MSYS2 with winget...");
        let result = executor.run_streaming(
            "winget",
            &["install", "--source", "winget", "MSYS2.MSYS2"],
            &[],
        )?;
        if !result.success {
            log.error(&format!(
                "winget install failed (exit {})",
                result.code.unwrap_or(-1)
            ));
        }
    }

    // Open the UCRT64 shell once so it writes its initial configuration
    init_shell(executor, log, &install);

    if install.exists() {
        let bin = ucrt64_bin(&install);
        if winenv::prepend_to_user_path(executor, &bin.to_string_lossy())? {
            log.success(&format!("added {} to the user PATH", bin.display()));
        } else {
            log.success(&format!("{} is already on the user PATH", bin.display()));
        }
        update(executor, log, &install)?;
    } else {
        anyhow::bail!("MSYS2 was not installed on this machine");
    }

    Ok(())
}

/// Launch the UCRT64 shell with a trivial command so MSYS2 initialises its
/// per-user configuration. Best effort.
fn init_shell(executor: &dyn Executor, log: &Logger, install: &Path) {
    let shell_cmd = install.join("msys2_shell.cmd");
    if !shell_cmd.exists() {
        if install.exists() {
            log.error("msys2_shell.cmd not found");
        }
        return;
    }

    log.info("initialising the UCRT64 terminal...");
    let result = executor.run_streaming(
        &shell_cmd.to_string_lossy(),
        &[
            "-ucrt64",
            "-defterm",
            "-here",
            "-c",
            "echo 'MSYS2 UCRT64 ready' && sleep 1",
        ],
        &[],
    );
    match result {
        Ok(r) if r.success => log.success("UCRT64 terminal initialised"),
        Ok(r) => log.error(&format!(
            "terminal initialisation failed (exit {})",
            r.code.unwrap_or(-1)
        )),
        Err(e) => log.error(&format!("terminal initialisation failed: {e:#}")),
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::exec::test_helpers::RecordingExecutor;
    use crate::platform::Os;

    #[test]
    fn lab_machines_use_portable_tree() {
        let p = Platform::new(Os::Windows, true);
        assert_eq!(install_dir(&p), PathBuf::from(LAB_INSTALL_DIR));
    }

    #[test]
    fn personal_machines_use_default_tree() {
        let p = Platform::new(Os::Windows, false);
        assert_eq!(install_dir(&p), PathBuf::from(DEFAULT_INSTALL_DIR));
    }

    #[test]
    fn ucrt64_bin_under_install_root() {
        let bin = ucrt64_bin(Path::new(r"C:\msys64"));
        assert!(bin.ends_with(Path::new("ucrt64").join("bin")));
    }

    #[test]
    fn ensure_installed_errors_when_missing() {
        // Neither MSYS2 tree exists on the test machine
        let p = Platform::new(Os::Windows, false);
        if !is_installed(&p) {
            let err = ensure_installed(&p).unwrap_err();
            assert!(err.to_string().contains("MSYS2 is not installed"));
        }
    }

    #[test]
    fn run_wraps_command_in_login_bash() {
        let executor = RecordingExecutor::new();
        run(&executor, Path::new(r"C:\msys64"), "pacman -Q").unwrap();

        let calls = executor.recorded_calls();
        assert_eq!(calls.len(), 1);
        let (program, args) = &calls[0];
        assert!(program.contains("bash.exe"));
        assert_eq!(args[0], "-lc");
        assert_eq!(args[1], "pacman -Q");
    }

    #[test]
    fn update_syncs_twice() {
        let executor = RecordingExecutor::new();
        let log = Logger::for_tests();
        update(&executor, &log, Path::new(r"C:\msys64")).unwrap();

        let calls = executor.recorded_calls();
        assert_eq!(calls.len(), 2, "two-phase upgrade needs two pacman passes");
        for (_, args) in &calls {
            assert_eq!(args[1], "pacman -Syu --noconfirm");
        }
    }
}
