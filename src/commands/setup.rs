use anyhow::Result;

use crate::context::Context;
use crate::manifest;
use crate::msys2;
use crate::vscode;
use crate::winenv;

/// Run the `setup` subcommand: verify and repair the workspace environment.
///
/// Three linear checks, none of which aborts the sequence: the workspace
/// manifest, the required VS Code extensions, and (on Windows) the MSYS2
/// entry on the persistent user PATH.
///
/// # Errors
///
/// Returns an error when at least one check ended in a warning, so the
/// process exits non-zero.
pub fn run(ctx: &Context) -> Result<()> {
    ctx.log.stage("Checking the workspace environment");
    let mut all_ok = true;

    ctx.log.info("1/3 workspace manifest...");
    if !check_manifest(ctx) {
        all_ok = false;
    }

    ctx.log.info("2/3 VS Code extensions...");
    if !check_extensions(ctx) {
        all_ok = false;
    }

    ctx.log.info("3/3 environment variables...");
    if !check_user_path(ctx) {
        all_ok = false;
    }

    if all_ok {
        ctx.log.success("environment ready");
        Ok(())
    } else {
        anyhow::bail!("environment configured with warnings; check the messages above")
    }
}

/// The manifest must exist; download the reference one when it does not.
fn check_manifest(ctx: &Context) -> bool {
    let path = ctx.workspace.join(manifest::MANIFEST_FILE);
    if path.exists() {
        ctx.log.success(&format!("{} present", manifest::MANIFEST_FILE));
        return true;
    }

    ctx.log.warn(&format!("{} missing", manifest::MANIFEST_FILE));
    let url = manifest::reference_url();
    if ctx.dry_run {
        ctx.log.dry_run(&format!("download {url}"));
        return true;
    }

    ctx.log.info(&format!("downloading the reference manifest from {url}..."));
    match manifest::download(&url, &path) {
        Ok(()) => {
            ctx.log.success(&format!("{} downloaded", manifest::MANIFEST_FILE));
            true
        }
        Err(e) => {
            ctx.log.error(&format!("download failed: {e:#}"));
            false
        }
    }
}

/// Install every required VS Code extension that is missing.
fn check_extensions(ctx: &Context) -> bool {
    let installed = match vscode::installed_extensions(&*ctx.executor, &ctx.platform) {
        Ok(installed) => installed,
        Err(e) => {
            ctx.log.warn(&format!("VS Code CLI not usable: {e:#}"));
            return false;
        }
    };

    let missing = vscode::missing_extensions(vscode::REQUIRED_EXTENSIONS, &installed);
    if missing.is_empty() {
        ctx.log.success(&format!(
            "VS Code extensions ({} installed)",
            vscode::REQUIRED_EXTENSIONS.len()
        ));
        return true;
    }

    ctx.log
        .warn(&format!("{} extension(s) missing", missing.len()));

    let mut ok = true;
    for id in missing {
        if ctx.dry_run {
            ctx.log.dry_run(&format!("install extension {id}"));
            continue;
        }
        ctx.log.info(&format!("installing {id}..."));
        match vscode::install_extension(&*ctx.executor, &ctx.platform, id) {
            Ok(true) => ctx.log.success(&format!("{id} installed")),
            Ok(false) => {
                ctx.log.error(&format!("failed to install {id}"));
                ok = false;
            }
            Err(e) => {
                ctx.log.error(&format!("failed to install {id}: {e:#}"));
                ok = false;
            }
        }
    }
    ok
}

/// Windows only: `<msys2>\ucrt64\bin` must be on the persistent user PATH.
fn check_user_path(ctx: &Context) -> bool {
    if !ctx.platform.is_windows() {
        ctx.log.success("nothing to check on this platform");
        return true;
    }
    if !msys2::is_installed(&ctx.platform) {
        ctx.log.success("MSYS2 absent, no PATH entry needed");
        return true;
    }

    let bin = msys2::ucrt64_bin(&msys2::install_dir(&ctx.platform));
    if ctx.dry_run {
        ctx.log
            .dry_run(&format!("ensure {} is on the user PATH", bin.display()));
        return true;
    }

    match winenv::prepend_to_user_path(&*ctx.executor, &bin.to_string_lossy()) {
        Ok(true) => {
            ctx.log.success(&format!(
                "added {} to the user PATH (restart VS Code)",
                bin.display()
            ));
            true
        }
        Ok(false) => {
            ctx.log
                .success(&format!("{} is already on the user PATH", bin.display()));
            true
        }
        Err(e) => {
            ctx.log.error(&format!("PATH update failed: {e:#}"));
            false
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::context::test_helpers::make_context;
    use crate::exec::test_helpers::MockExecutor;
    use crate::platform::Os;
    use std::sync::Arc;

    #[test]
    fn setup_passes_with_manifest_and_extensions() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(manifest::MANIFEST_FILE),
            "[project]\nname = \"work\"\n",
        )
        .unwrap();

        let extensions = vscode::REQUIRED_EXTENSIONS.join("\n");
        let executor = MockExecutor::ok(&extensions);
        let ctx = make_context(Os::Linux, Arc::new(executor), dir.path().to_path_buf());

        run(&ctx).unwrap();
    }

    #[test]
    fn setup_fails_when_extensions_cannot_install() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(manifest::MANIFEST_FILE),
            "[project]\nname = \"work\"\n",
        )
        .unwrap();

        // Listing succeeds but reports nothing; every install then fails
        // because the response queue is exhausted.
        let executor = MockExecutor::ok("");
        let ctx = make_context(Os::Linux, Arc::new(executor), dir.path().to_path_buf());

        let err = run(&ctx).unwrap_err();
        assert!(err.to_string().contains("warnings"));
    }

    #[test]
    fn setup_dry_run_reports_without_installing() {
        let dir = tempfile::tempdir().unwrap();
        // No manifest on disk; dry run only announces the download
        let executor = MockExecutor::ok("");
        let mut ctx = make_context(Os::Linux, Arc::new(executor), dir.path().to_path_buf());
        ctx.dry_run = true;

        run(&ctx).unwrap();
        assert!(
            !dir.path().join(manifest::MANIFEST_FILE).exists(),
            "dry run must not download the manifest"
        );
    }
}
