use anyhow::Result;

use crate::context::Context;
use crate::usb;

/// Run the `backup` subcommand: workspace → USB key.
///
/// # Errors
///
/// Returns an error when drive selection refuses or the copy fails.
pub fn run_backup(ctx: &Context) -> Result<()> {
    ctx.log.stage("Backing up to the USB key");
    ctx.log
        .warn("the data on your USB key will be overwritten");
    ctx.log.warn(&format!(
        "every folder in {}/ will be replaced",
        usb::BACKUP_DIR_NAME
    ));
    if !ctx.confirm("Are you sure you want to continue?")? {
        ctx.log.info("backup cancelled");
        return Ok(());
    }

    let drives = usb::detect_drives(&ctx.platform, &*ctx.executor)?;
    let target = usb::backup_target(&drives)?;

    if ctx.dry_run {
        ctx.log.dry_run(&format!(
            "copy the workspace to {}",
            target.display()
        ));
        return Ok(());
    }

    if !target.exists() {
        std::fs::create_dir_all(&target)?;
        ctx.log
            .info(&format!("created {}", target.display()));
    }

    usb::copy_contents(&ctx.workspace, &target, usb::EXCLUDED_DIRS, &ctx.log)?;
    ctx.log
        .success(&format!("backup finished in {}", target.display()));
    Ok(())
}

/// Run the `restore` subcommand: USB key → workspace.
///
/// # Errors
///
/// Returns an error when drive selection refuses or the copy fails.
pub fn run_restore(ctx: &Context) -> Result<()> {
    ctx.log.stage("Restoring from the USB key");
    ctx.log
        .warn("the data in your workspace will be overwritten");
    ctx.log
        .warn("every existing folder will be replaced by the key's version");
    if !ctx.confirm("Are you sure you want to continue?")? {
        ctx.log.info("restore cancelled");
        return Ok(());
    }

    let drives = usb::detect_drives(&ctx.platform, &*ctx.executor)?;
    let source = usb::restore_source(&drives)?;

    if ctx.dry_run {
        ctx.log.dry_run(&format!(
            "copy {} into the workspace",
            source.display()
        ));
        return Ok(());
    }

    usb::copy_contents(&source, &ctx.workspace, &[], &ctx.log)?;
    ctx.log
        .success(&format!("restore finished from {}", source.display()));
    Ok(())
}
