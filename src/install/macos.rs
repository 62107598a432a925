//! Component installation on macOS, through Homebrew.

use anyhow::{Result, bail};

use crate::context::Context;
use crate::postgres;

/// Homebrew formulas for one component.
fn brew_formulas(component: &str) -> Option<&'static [&'static str]> {
    match component {
        "nodejs" => Some(&["node"]),
        "elm" => Some(&["node"]),
        "nasm" => Some(&["nasm", "gdb"]),
        "qemu" => Some(&["qemu"]),
        "postgresql" => Some(&["postgresql@16"]),
        _ => None,
    }
}

/// Install a component with Homebrew.
///
/// Homebrew itself is bootstrapped first when missing (after
/// confirmation), matching the behaviour students expect from the lab
/// machines.
///
/// # Errors
///
/// Returns an error when a step fails or the bootstrap is declined.
pub fn install(ctx: &Context, component: &str) -> Result<()> {
    if component == "homebrew" {
        return bootstrap_homebrew(ctx);
    }

    if !ctx.executor.which("brew") {
        ctx.log.warn("Homebrew is not installed");
        if !ctx.confirm("Install Homebrew now?")? {
            bail!("Homebrew is required to install components on macOS");
        }
        bootstrap_homebrew(ctx)?;
    }

    match component {
        "rust" => install_rust(ctx),
        "elm" => {
            brew_install(ctx, &["node"])?;
            ctx.log.info("installing Elm with npm...");
            ctx.executor
                .run_streaming_checked("npm", &["install", "-g", "elm"], &[])?;
            ctx.log.success("Elm installed");
            Ok(())
        }
        "postgresql" => {
            brew_install(ctx, &["postgresql@16"])?;
            postgres::init(ctx)
        }
        other => {
            let Some(formulas) = brew_formulas(other) else {
                bail!("no Homebrew formula defined for '{other}'");
            };
            brew_install(ctx, formulas)?;
            ctx.log.success(&format!("{other} installed"));
            Ok(())
        }
    }
}

/// `brew update` followed by one `brew install` per formula.
fn brew_install(ctx: &Context, formulas: &[&str]) -> Result<()> {
    let executor = &*ctx.executor;
    executor.run_streaming_checked("brew", &["update"], &[])?;
    for formula in formulas {
        executor.run_streaming_checked("brew", &["install", formula], &[])?;
    }
    Ok(())
}

/// Install Homebrew with its official bootstrap script.
fn bootstrap_homebrew(ctx: &Context) -> Result<()> {
    let executor = &*ctx.executor;

    if executor.which("brew") {
        ctx.log.success("Homebrew is already installed");
        return Ok(());
    }

    ctx.log.info("installing Homebrew (your password may be requested)...");
    executor.run_streaming_checked(
        "/bin/bash",
        &[
            "-c",
            "$(curl -fsSL https://raw.githubusercontent.com/Homebrew/install/HEAD/install.sh)",
        ],
        &[],
    )?;
    ctx.log.success("Homebrew installed");

    // Apple Silicon and Intel put brew in different prefixes
    let arch = executor.run_unchecked("uname", &["-m"])?;
    let brew_path = if arch.stdout.trim() == "arm64" {
        "/opt/homebrew/bin/brew"
    } else {
        "/usr/local/bin/brew"
    };
    ctx.log.info(&format!(
        "to use Homebrew now, run: eval \"$({brew_path} shellenv)\""
    ));
    Ok(())
}

/// Install Rust through rustup, same as on Linux.
fn install_rust(ctx: &Context) -> Result<()> {
    let executor = &*ctx.executor;

    if executor.which("rustup") {
        ctx.log.info("rustup already present, updating...");
        executor.run_streaming_checked("rustup", &["update"], &[])?;
    } else {
        ctx.log.info("downloading and installing rustup...");
        executor.run_streaming_checked(
            "sh",
            &[
                "-c",
                "curl --proto '=https' --tlsv1.2 -sSf https://sh.rustup.rs | sh -s -- -y",
            ],
            &[],
        )?;

        let cargo_env = ctx.home.join(".cargo").join("env");
        if cargo_env.exists() {
            ctx.log
                .info(&format!("to use Rust now, run: source {}", cargo_env.display()));
        }
    }

    ctx.log.success("Rust installed");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::context::test_helpers::make_context;
    use crate::exec::test_helpers::RecordingExecutor;
    use crate::platform::Os;
    use std::path::PathBuf;
    use std::sync::Arc;

    #[test]
    fn table_maps_nodejs_to_node() {
        assert_eq!(brew_formulas("nodejs").unwrap(), &["node"]);
    }

    #[test]
    fn postgresql_pins_major_version() {
        assert_eq!(brew_formulas("postgresql").unwrap(), &["postgresql@16"]);
    }

    #[test]
    fn qemu_updates_brew_before_installing() {
        let executor = Arc::new(RecordingExecutor::new().with_which(true));
        let ctx = make_context(
            Os::MacOs,
            Arc::clone(&executor) as Arc<dyn crate::exec::Executor>,
            PathBuf::from("/tmp"),
        );

        install(&ctx, "qemu").unwrap();

        let calls = executor.recorded_calls();
        assert_eq!(calls[0].0, "brew");
        assert_eq!(calls[0].1, vec!["update"]);
        assert_eq!(calls[1].1, vec!["install", "qemu"]);
    }

    #[test]
    fn unknown_component_is_an_error() {
        let executor = Arc::new(RecordingExecutor::new().with_which(true));
        let ctx = make_context(
            Os::MacOs,
            Arc::clone(&executor) as Arc<dyn crate::exec::Executor>,
            PathBuf::from("/tmp"),
        );

        assert!(install(&ctx, "graphviz").is_err());
    }
}
