//! PostgreSQL installation follow-up and day-to-day operations.
//!
//! The classroom convention: a database cluster owned by the `padawan`
//! superuser (password `padawan`), with per-user data under `~/DATABASE`
//! on platforms where the cluster is user-local (Windows MSYS2, and the
//! initdb marker directory on Linux). macOS clusters are managed by
//! Homebrew services instead.

use std::path::{Path, PathBuf};

use anyhow::{Result, bail};

use crate::context::Context;
use crate::msys2;
use crate::platform::{LinuxPackageManager, Os};

/// Database superuser created at initialisation (password is identical).
pub const SUPERUSER: &str = "padawan";

/// Homebrew formula and service name on macOS.
const BREW_SERVICE: &str = "postgresql@16";

/// The per-user database directory.
#[must_use]
pub fn database_dir(home: &Path) -> PathBuf {
    home.join("DATABASE")
}

/// The database directory as an MSYS2 path expression.
///
/// The Windows home path is converted at run time by `cygpath` inside the
/// UCRT64 shell, so the expression stays valid whatever the drive letter.
#[must_use]
pub fn msys2_database_dir(home: &Path) -> String {
    format!("$(cygpath -u '{}')/DATABASE", home.display())
}

/// Database names are plain identifiers; anything else would need quoting
/// games in the SQL below.
#[must_use]
pub fn is_valid_db_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !name.starts_with(|c: char| c.is_ascii_digit())
}

/// Initialise the cluster for the current platform.
///
/// An existing `~/DATABASE` directory is destroyed and recreated, but only
/// after explicit confirmation.
///
/// # Errors
///
/// Returns an error if a required tool is missing or an external command
/// fails.
pub fn init(ctx: &Context) -> Result<()> {
    match ctx.platform.os {
        Os::Windows => init_windows(ctx),
        Os::Linux => init_linux(ctx),
        Os::MacOs => init_macos(ctx),
    }
}

/// Confirm-and-delete an existing database directory. Returns `false` when
/// the user declined and initialisation should stop.
fn reset_database_dir(ctx: &Context) -> Result<bool> {
    let dir = database_dir(&ctx.home);
    if !dir.exists() {
        return Ok(true);
    }

    ctx.log
        .warn(&format!("the directory {} already exists", dir.display()));
    if !ctx.confirm("Delete it and reinitialise PostgreSQL?")? {
        ctx.log.info("initialisation cancelled");
        return Ok(false);
    }
    std::fs::remove_dir_all(&dir)?;
    ctx.log.info("previous database directory removed");
    Ok(true)
}

fn init_windows(ctx: &Context) -> Result<()> {
    if !reset_database_dir(ctx)? {
        return Ok(());
    }

    let install = msys2::install_dir(&ctx.platform);
    let dir = msys2_database_dir(&ctx.home);
    let executor = &*ctx.executor;

    msys2::run(executor, &install, &format!("mkdir -p {dir}"))?;

    // The password never appears on a command line: initdb reads it from a
    // throwaway file removed right after.
    msys2::run(executor, &install, &format!("echo '{SUPERUSER}' > /tmp/pwfile"))?;
    msys2::run(
        executor,
        &install,
        &format!(
            "initdb -D {dir} -U {SUPERUSER} --locale=fr_FR.UTF-8 --encoding=UTF8 --pwfile=/tmp/pwfile"
        ),
    )?;
    msys2::run(executor, &install, "rm /tmp/pwfile")?;

    ctx.log.success("PostgreSQL initialised");
    announce_credentials(ctx);
    Ok(())
}

fn init_linux(ctx: &Context) -> Result<()> {
    let pm = LinuxPackageManager::detect()?;

    if !reset_database_dir(ctx)? {
        return Ok(());
    }
    std::fs::create_dir_all(database_dir(&ctx.home))?;

    let executor = &*ctx.executor;

    match pm {
        LinuxPackageManager::Apt => {
            // Debian installs arrive initialised; just make sure the service runs
        }
        LinuxPackageManager::Yum => {
            ctx.log.info("initialising the cluster...");
            executor.run_streaming_checked("sudo", &["postgresql-setup", "--initdb"], &[])?;
        }
        LinuxPackageManager::Dnf => {
            ctx.log.info("initialising the cluster...");
            executor.run_streaming_checked(
                "sudo",
                &["postgresql-setup", "--initdb", "--unit", "postgresql"],
                &[],
            )?;
        }
    }

    ctx.log.info("starting the PostgreSQL service...");
    executor.run_streaming_checked("sudo", &["systemctl", "start", "postgresql"], &[])?;
    executor.run_streaming_checked("sudo", &["systemctl", "enable", "postgresql"], &[])?;

    ctx.log.info(&format!("creating the {SUPERUSER} user..."));
    // Already-exists failures are fine on a reinitialisation
    let _ = executor.run_streaming(
        "sudo",
        &[
            "-u",
            "postgres",
            "psql",
            "-c",
            &format!("CREATE USER {SUPERUSER} WITH SUPERUSER PASSWORD '{SUPERUSER}';"),
        ],
        &[],
    )?;
    let _ = executor.run_streaming(
        "sudo",
        &[
            "-u",
            "postgres",
            "psql",
            "-c",
            &format!("CREATE DATABASE {SUPERUSER} OWNER {SUPERUSER};"),
        ],
        &[],
    )?;

    ctx.log.success("PostgreSQL initialised");
    announce_credentials(ctx);
    Ok(())
}

fn init_macos(ctx: &Context) -> Result<()> {
    let executor = &*ctx.executor;

    ctx.log.info("starting the PostgreSQL service...");
    executor.run_streaming_checked("brew", &["services", "start", BREW_SERVICE], &[])?;

    // Give the freshly started server a moment to accept connections
    std::thread::sleep(std::time::Duration::from_secs(3));

    ctx.log.info(&format!("creating the {SUPERUSER} user..."));
    let _ = executor.run_streaming(
        "psql",
        &[
            "postgres",
            "-c",
            &format!("CREATE USER {SUPERUSER} WITH SUPERUSER PASSWORD '{SUPERUSER}';"),
        ],
        &[],
    )?;
    let _ = executor.run_streaming(
        "psql",
        &[
            "postgres",
            "-c",
            &format!("CREATE DATABASE {SUPERUSER} OWNER {SUPERUSER};"),
        ],
        &[],
    )?;

    ctx.log.success("PostgreSQL initialised");
    announce_credentials(ctx);
    Ok(())
}

fn announce_credentials(ctx: &Context) {
    ctx.log.info(&format!("user: {SUPERUSER}"));
    ctx.log.info(&format!("password: {SUPERUSER}"));
    ctx.log.info(&format!("database: {SUPERUSER}"));
}

/// Start the server, reporting success when it is already running.
///
/// # Errors
///
/// Returns an error if a required tool is missing or the server fails to
/// start.
pub fn start(ctx: &Context) -> Result<()> {
    let executor = &*ctx.executor;
    match ctx.platform.os {
        Os::Windows => {
            msys2::ensure_installed(&ctx.platform)?;
            let install = msys2::install_dir(&ctx.platform);
            let dir = msys2_database_dir(&ctx.home);

            let status = msys2::run_unchecked(executor, &install, &format!("pg_ctl -D {dir} status"))?;
            if status.success {
                ctx.log.info("the PostgreSQL server is already running");
                return Ok(());
            }

            msys2::run(
                executor,
                &install,
                &format!("pg_ctl -D {dir} -l {dir}/logfile start"),
            )?;
        }
        Os::Linux => {
            let status = executor.run_unchecked("systemctl", &["is-active", "postgresql"])?;
            if status.stdout.trim() == "active" {
                ctx.log.info("the PostgreSQL server is already running");
                return Ok(());
            }
            executor.run_streaming_checked("sudo", &["systemctl", "start", "postgresql"], &[])?;
        }
        Os::MacOs => {
            executor.run_streaming_checked("brew", &["services", "start", BREW_SERVICE], &[])?;
        }
    }
    ctx.log.success("PostgreSQL server started");
    Ok(())
}

/// Stop the server.
///
/// # Errors
///
/// Returns an error if a required tool is missing or the server fails to
/// stop.
pub fn stop(ctx: &Context) -> Result<()> {
    let executor = &*ctx.executor;
    match ctx.platform.os {
        Os::Windows => {
            msys2::ensure_installed(&ctx.platform)?;
            let install = msys2::install_dir(&ctx.platform);
            let dir = msys2_database_dir(&ctx.home);
            msys2::run(
                executor,
                &install,
                &format!("pg_ctl -D {dir} -l {dir}/logfile stop"),
            )?;
        }
        Os::Linux => {
            executor.run_streaming_checked("sudo", &["systemctl", "stop", "postgresql"], &[])?;
        }
        Os::MacOs => {
            executor.run_streaming_checked("brew", &["services", "stop", BREW_SERVICE], &[])?;
        }
    }
    ctx.log.success("PostgreSQL server stopped");
    Ok(())
}

/// Create a UTF-8 database owned by the classroom superuser.
///
/// # Errors
///
/// Returns an error for an invalid name or when the underlying command
/// fails.
pub fn create(ctx: &Context, name: &str) -> Result<()> {
    if !is_valid_db_name(name) {
        bail!("invalid database name '{name}' (letters, digits and _ only)");
    }

    let executor = &*ctx.executor;
    match ctx.platform.os {
        Os::Windows => {
            msys2::ensure_installed(&ctx.platform)?;
            let install = msys2::install_dir(&ctx.platform);
            msys2::run(
                executor,
                &install,
                &format!("createdb -U {SUPERUSER} -E UTF8 {name}"),
            )?;
        }
        Os::Linux => {
            executor.run_streaming_checked(
                "sudo",
                &[
                    "-u",
                    "postgres",
                    "psql",
                    "-c",
                    &format!("CREATE DATABASE {name} OWNER {SUPERUSER} ENCODING 'UTF8';"),
                ],
                &[],
            )?;
        }
        Os::MacOs => {
            executor.run_streaming_checked(
                "psql",
                &[
                    "postgres",
                    "-c",
                    &format!("CREATE DATABASE {name} OWNER {SUPERUSER} ENCODING 'UTF8';"),
                ],
                &[],
            )?;
        }
    }
    ctx.log.success(&format!("database '{name}' created"));
    Ok(())
}
