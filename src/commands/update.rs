use anyhow::Result;

use crate::context::Context;
use crate::template;

/// Run the `update` subcommand: overwrite local files with the template's
/// versions, keeping locally added manifest dependencies.
///
/// # Errors
///
/// Returns an error when the workspace or remote is missing, or git fails.
pub fn run(ctx: &Context) -> Result<()> {
    ctx.log.stage("Synchronizing with the class template");

    if ctx.dry_run {
        ctx.log.dry_run(&format!(
            "fetch {} and overwrite local files from {}/{}",
            template::TEMPLATE_REMOTE,
            template::TEMPLATE_REMOTE,
            template::TEMPLATE_BRANCH
        ));
        return Ok(());
    }

    ctx.log
        .warn("your local versions of the template files will be overwritten");
    if !ctx.confirm("Continue?")? {
        ctx.log.info("update cancelled");
        return Ok(());
    }

    let report = template::sync(ctx)?;
    ctx.log
        .success(&format!("{} files synchronized", report.files.len()));

    if !report.kept_dependencies.is_empty() {
        ctx.log.info("kept your locally added dependencies:");
        for dep in &report.kept_dependencies {
            ctx.log.info(&format!("  • {dep}"));
        }
        ctx.log
            .info("reinstall your project dependencies to make sure they are present");
    }
    Ok(())
}
