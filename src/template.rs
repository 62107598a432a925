//! Synchronize the student workspace with the class template repository.
//!
//! Students clone the teacher's template and keep it as the `template`
//! remote. A sync overwrites local files with the template's current
//! versions, file by file, then reconciles the workspace manifest so that
//! dependencies the student added on their own survive the overwrite.

use anyhow::Result;

use crate::context::Context;
use crate::error::SyncError;
use crate::git;
use crate::manifest;

/// Remote created when the workspace was cloned from the template.
pub const TEMPLATE_REMOTE: &str = "template";
/// Branch the teacher publishes on.
pub const TEMPLATE_BRANCH: &str = "main";

/// What a sync did.
#[derive(Debug)]
pub struct SyncReport {
    /// Files overwritten from the template.
    pub files: Vec<String>,
    /// Locally added dependencies that were kept through the manifest
    /// overwrite.
    pub kept_dependencies: Vec<String>,
}

/// Fetch the template and overwrite local files with its versions.
///
/// # Errors
///
/// Returns [`SyncError`] when the workspace is not a repository or the
/// template remote is missing, and any git failure otherwise.
pub fn sync(ctx: &Context) -> Result<SyncReport> {
    let workspace = &ctx.workspace;
    if !git::is_repository(workspace) {
        return Err(SyncError::NotARepository(workspace.clone()).into());
    }

    let remotes = git::remotes(&*ctx.executor, workspace)?;
    if !remotes.contains_key(TEMPLATE_REMOTE) {
        return Err(SyncError::MissingTemplateRemote(TEMPLATE_REMOTE.to_string()).into());
    }

    ctx.log.info("fetching the template...");
    ctx.executor
        .run_in(workspace, "git", &["fetch", TEMPLATE_REMOTE])?;

    // Capture the dependency list before files get overwritten
    let manifest_path = workspace.join(manifest::MANIFEST_FILE);
    let previous = manifest::read_dependencies(&manifest_path)?;

    let spec = format!("{TEMPLATE_REMOTE}/{TEMPLATE_BRANCH}");
    let listing = ctx
        .executor
        .run_in(workspace, "git", &["ls-tree", "-r", "--name-only", &spec])?;
    let files = parse_file_list(&listing.stdout);

    for file in &files {
        ctx.executor
            .run_in(workspace, "git", &["checkout", &spec, "--", file])?;
        ctx.log.debug(&format!("overwrote {file}"));
    }

    let kept = manifest::reconcile(&manifest_path, &previous)?;

    Ok(SyncReport {
        files,
        kept_dependencies: kept,
    })
}

/// Non-empty paths from `git ls-tree -r --name-only` output.
fn parse_file_list(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}
