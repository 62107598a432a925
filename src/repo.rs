//! Personal repository setup.
//!
//! After cloning the class template, each student points their workspace at
//! their own empty GitHub repository: configure a git identity, replace any
//! existing `origin` remote (with confirmation), add the personal URL as
//! `origin`, and optionally push.

use anyhow::{Result, bail};

use crate::context::Context;
use crate::git;
use crate::template::TEMPLATE_REMOTE;

/// Options for [`init_personal_repo`].
#[derive(Debug, Clone, Default)]
pub struct InitRepoOpts {
    /// Personal repository URL; prompted for when absent.
    pub url: Option<String>,
    /// Push to the new `origin` without asking.
    pub push: bool,
}

/// Configure the student's personal remote. Returns `false` when the
/// student cancelled at one of the confirmation steps.
///
/// # Errors
///
/// Returns an error if git fails or required input is missing.
pub fn init_personal_repo(ctx: &Context, opts: &InitRepoOpts) -> Result<bool> {
    let workspace = &ctx.workspace;
    if !git::is_repository(workspace) {
        bail!("{} is not a git repository", workspace.display());
    }

    show_prerequisites(ctx);
    if !ctx.confirm("Do you have these prerequisites?")? {
        ctx.log.info("setup cancelled");
        ctx.log
            .info("create your repository on GitHub first, then run this again");
        return Ok(false);
    }

    if !configure_identity(ctx)? {
        return Ok(false);
    }

    let executor = &*ctx.executor;
    let remotes = git::remotes(executor, workspace)?;
    if remotes.is_empty() {
        ctx.log.info("current remotes: none");
    } else {
        for (name, url) in &remotes {
            ctx.log.info(&format!("current remote: {name} -> {url}"));
        }
    }

    if remotes.contains_key(TEMPLATE_REMOTE) {
        ctx.log.success("remote 'template' is configured");
    } else {
        ctx.log
            .warn("remote 'template' not found (was the workspace cloned correctly?)");
    }

    // At most one remote named origin at a time; replacement needs consent
    if let Some(existing) = remotes.get("origin") {
        ctx.log
            .warn(&format!("an 'origin' remote already exists: {existing}"));
        if !ctx.confirm("Replace it?")? {
            ctx.log.info("setup cancelled");
            return Ok(false);
        }
        executor.run_in(workspace, "git", &["remote", "remove", "origin"])?;
        ctx.log.info("previous 'origin' remote removed");
    }

    let url = match &opts.url {
        Some(url) => url.clone(),
        None => ctx.log.prompt_line(
            "URL of your personal repository (https://github.com/you/project.git)",
            None,
        )?,
    };
    if url.is_empty() {
        bail!("empty URL, setup cancelled");
    }

    ctx.log.info(&format!("adding remote 'origin': {url}"));
    executor.run_in(workspace, "git", &["remote", "add", "origin", &url])?;
    ctx.log.success("remote 'origin' added");

    let push = opts.push || ctx.confirm("Push your work to the new repository now?")?;
    if push {
        ctx.log.info("pushing to origin/main...");
        match executor.run_in(workspace, "git", &["push", "-u", "origin", "main"]) {
            Ok(_) => ctx.log.success("work pushed to your repository"),
            Err(e) => {
                ctx.log.error(&format!("push failed: {e:#}"));
                ctx.log
                    .info("you can retry by hand with: git push -u origin main");
                return Err(e);
            }
        }
    }

    ctx.log.stage("Setup finished");
    for (name, url) in git::remotes(executor, workspace)? {
        ctx.log.info(&format!("{name}: {url}"));
    }
    Ok(true)
}

fn show_prerequisites(ctx: &Context) {
    ctx.log.stage("Personal repository setup");
    ctx.log.info("Before continuing, make sure you have:");
    ctx.log.info("  1. a GitHub account (https://github.com)");
    ctx.log
        .info("  2. an EMPTY repository created there (no README, no .gitignore)");
    ctx.log
        .info("  3. its URL, e.g. https://github.com/you/project.git");
}

/// Configure `user.name` / `user.email`, defaulting to the current values.
/// Returns `false` when a required value stayed empty.
fn configure_identity(ctx: &Context) -> Result<bool> {
    let executor = &*ctx.executor;
    let workspace = &ctx.workspace;

    let current_name = git::config_get(executor, workspace, "user.name")?;
    let current_email = git::config_get(executor, workspace, "user.email")?;

    // Non-interactive runs keep whatever identity is already configured
    if ctx.assume_yes || ctx.dry_run {
        if current_name.is_none() || current_email.is_none() {
            ctx.log
                .warn("git identity not fully configured (user.name / user.email)");
        }
        return Ok(true);
    }

    ctx.log.info("configuring your git identity (used to sign commits)");

    let name = ctx
        .log
        .prompt_line("Your GitHub user name", current_name.as_deref())?;
    if name.is_empty() {
        ctx.log.error("a user name is required");
        return Ok(false);
    }

    let email = ctx
        .log
        .prompt_line("Your GitHub email", current_email.as_deref())?;
    if email.is_empty() {
        ctx.log.error("an email is required");
        return Ok(false);
    }

    git::config_set(executor, workspace, "user.name", &name)?;
    git::config_set(executor, workspace, "user.email", &email)?;
    ctx.log.success(&format!("identity set: {name} <{email}>"));
    Ok(true)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::context::test_helpers::make_context;
    use crate::exec::test_helpers::RecordingExecutor;
    use crate::platform::Os;
    use std::sync::Arc;

    #[test]
    fn refuses_outside_a_repository() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = make_context(
            Os::Linux,
            Arc::new(RecordingExecutor::new()),
            dir.path().to_path_buf(),
        );

        let opts = InitRepoOpts {
            url: Some("https://example.com/me.git".to_string()),
            push: false,
        };
        assert!(init_personal_repo(&ctx, &opts).is_err());
    }

    #[test]
    fn adds_origin_with_provided_url() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join(".git")).unwrap();

        let executor = Arc::new(RecordingExecutor::new());
        // assume_yes: prerequisites auto-confirmed, identity kept as-is
        let ctx = make_context(
            Os::Linux,
            Arc::clone(&executor) as Arc<dyn crate::exec::Executor>,
            dir.path().to_path_buf(),
        );

        let opts = InitRepoOpts {
            url: Some("https://example.com/me.git".to_string()),
            push: false,
        };
        // confirm("push now?") resolves to yes under assume_yes, so the
        // push command is issued as well
        assert!(init_personal_repo(&ctx, &opts).unwrap());

        let calls = executor.recorded_calls();
        let add = calls
            .iter()
            .find(|(_, args)| args.first().map(String::as_str) == Some("remote") && args.get(1).map(String::as_str) == Some("add"))
            .expect("remote add must be issued");
        assert_eq!(add.1, vec!["remote", "add", "origin", "https://example.com/me.git"]);

        assert!(
            calls
                .iter()
                .any(|(_, args)| args.first().map(String::as_str) == Some("push")),
            "push should run when confirmed"
        );
    }

    #[test]
    fn empty_url_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join(".git")).unwrap();

        let ctx = make_context(
            Os::Linux,
            Arc::new(RecordingExecutor::new()),
            dir.path().to_path_buf(),
        );

        let opts = InitRepoOpts {
            url: Some(String::new()),
            push: false,
        };
        let err = init_personal_repo(&ctx, &opts).unwrap_err();
        assert!(err.to_string().contains("empty URL"));
    }
}
