use anyhow::Result;

use crate::cli::InstallOpts;
use crate::components::{self, Component};
use crate::context::Context;
use crate::error::ComponentError;
use crate::install;

/// Run the `install` subcommand.
///
/// # Errors
///
/// Returns an error for unknown or unavailable components, and when any
/// install step fails.
pub fn run(ctx: &Context, opts: &InstallOpts) -> Result<()> {
    let name = opts.component.to_lowercase();
    let available = components::available_on(&ctx.platform);

    let Some(component) = components::find(&name) else {
        return Err(ComponentError::Unknown { name, available }.into());
    };
    if !components::is_available(&name, ctx.platform.os) {
        return Err(ComponentError::NotAvailable {
            name,
            platform: ctx.platform.os.to_string(),
            available,
        }
        .into());
    }

    show_descriptor(ctx, component);
    if !ctx.confirm("Continue with the installation?")? {
        ctx.log.info("installation cancelled");
        return Ok(());
    }

    if ctx.dry_run {
        ctx.log
            .dry_run(&format!("install component '{}'", component.name));
        return Ok(());
    }

    ctx.log.stage(&format!("Installing {}", component.name));
    install::dispatch(ctx, &name)
}

/// Show what an installation brings before asking for confirmation.
fn show_descriptor(ctx: &Context, component: &Component) {
    ctx.log.stage(component.summary);
    ctx.log.info("this will install:");
    for detail in component.details {
        ctx.log.info(&format!("  • {detail}"));
    }
    ctx.log
        .info(&format!("estimated disk space: {}", component.size));
}
