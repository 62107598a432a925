use anyhow::Result;

use crate::cli::InitRepoOpts;
use crate::context::Context;
use crate::repo;

/// Run the `init-repo` subcommand.
///
/// # Errors
///
/// Returns an error when the setup fails or is cancelled.
pub fn run(ctx: &Context, opts: &InitRepoOpts) -> Result<()> {
    if ctx.dry_run {
        ctx.log
            .dry_run("configure the personal 'origin' remote");
        return Ok(());
    }

    let repo_opts = repo::InitRepoOpts {
        url: opts.url.clone(),
        push: opts.push,
    };
    if !repo::init_personal_repo(ctx, &repo_opts)? {
        anyhow::bail!("personal repository setup was not completed");
    }
    Ok(())
}
