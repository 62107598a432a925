use anyhow::Result;

use crate::components;
use crate::context::Context;

/// Run the `list` subcommand: the components installable on this platform,
/// plus the named operations.
///
/// # Errors
///
/// Infallible in practice; kept fallible for signature uniformity.
pub fn run(ctx: &Context) -> Result<()> {
    ctx.log.stage(&format!(
        "Components available on {}",
        ctx.platform.os
    ));
    for name in components::available_on(&ctx.platform) {
        if let Some(component) = components::find(name) {
            ctx.log.info(&format!(
                "{name:<12} {} ({})",
                component.summary, component.size
            ));
        }
    }

    ctx.log.stage("Operations");
    ctx.log.info("postgres start|stop       manage the database server");
    ctx.log.info("postgres create <name>    create a UTF-8 database");
    ctx.log.info("postgres init             (re)initialise the cluster");
    ctx.log.info("backup / restore          copy the workspace to/from the USB key");
    ctx.log.info("update                    synchronize with the class template");
    ctx.log.info("init-repo                 point the workspace at your repository");
    ctx.log.info("setup                     check and repair the environment");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::context::test_helpers::make_context;
    use crate::exec::test_helpers::RecordingExecutor;
    use crate::platform::Os;
    use std::path::PathBuf;
    use std::sync::Arc;

    #[test]
    fn list_runs_without_touching_the_system() {
        let executor = Arc::new(RecordingExecutor::new());
        let ctx = make_context(
            Os::Linux,
            Arc::clone(&executor) as Arc<dyn crate::exec::Executor>,
            PathBuf::from("/tmp"),
        );

        run(&ctx).unwrap();
        assert!(executor.recorded_calls().is_empty());
    }
}
