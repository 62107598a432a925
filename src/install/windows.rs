//! Component installation on Windows, through the MSYS2 UCRT64 environment.

use anyhow::{Result, bail};

use crate::context::Context;
use crate::msys2;
use crate::postgres;

/// MSYS2 package names for one component (UCRT64 repository).
fn msys2_packages(component: &str) -> Option<&'static [&'static str]> {
    match component {
        "elm" => Some(&["mingw-w64-ucrt-x86_64-nodejs"]),
        "rust" => Some(&["mingw-w64-ucrt-x86_64-rust"]),
        "nasm" => Some(&[
            "mingw-w64-ucrt-x86_64-nasm",
            "mingw-w64-ucrt-x86_64-gdb",
        ]),
        "qemu" => Some(&["mingw-w64-ucrt-x86_64-qemu"]),
        "postgresql" => Some(&["mingw-w64-ucrt-x86_64-postgresql"]),
        _ => None,
    }
}

/// Build the single pacman invocation for a package list.
fn pacman_command(packages: &[&str]) -> String {
    format!("pacman -S --noconfirm {}", packages.join(" "))
}

/// Install a component inside MSYS2.
///
/// Every installation first checks MSYS2 is present and brings it up to
/// date (the two-pass sync); the `msys2` component itself runs the
/// bootstrap instead.
///
/// # Errors
///
/// Returns an error when MSYS2 is missing or a step fails.
pub fn install(ctx: &Context, component: &str) -> Result<()> {
    let executor = &*ctx.executor;

    if component == "msys2" {
        return msys2::bootstrap(executor, &ctx.log, &ctx.platform);
    }

    msys2::ensure_installed(&ctx.platform)?;
    let install_dir = msys2::install_dir(&ctx.platform);
    msys2::update(executor, &ctx.log, &install_dir)?;

    let Some(packages) = msys2_packages(component) else {
        bail!("no MSYS2 package defined for '{component}'");
    };
    msys2::run(executor, &install_dir, &pacman_command(packages))?;

    match component {
        "elm" => {
            ctx.log.info("installing Elm with npm...");
            msys2::run(executor, &install_dir, "npm install -g elm")?;
        }
        "postgresql" => postgres::init(ctx)?,
        _ => {}
    }

    ctx.log.success(&format!("{component} installed"));
    Ok(())
}
