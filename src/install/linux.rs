//! Component installation on Linux (apt, dnf and yum families).

use anyhow::{Result, bail};

use crate::context::Context;
use crate::platform::LinuxPackageManager;
use crate::postgres;

/// Native package names for one component, per package-manager family.
/// `dnf` falls back to the yum name when it has no entry of its own.
#[derive(Debug, Clone, Copy)]
struct PackageSpec {
    apt: &'static str,
    yum: &'static str,
    dnf: Option<&'static str>,
}

impl PackageSpec {
    const fn names_for(&self, pm: LinuxPackageManager) -> &'static str {
        match pm {
            LinuxPackageManager::Apt => self.apt,
            LinuxPackageManager::Yum => self.yum,
            LinuxPackageManager::Dnf => match self.dnf {
                Some(names) => names,
                None => self.yum,
            },
        }
    }
}

/// The per-distribution package table.
fn spec_for(component: &str) -> Option<PackageSpec> {
    match component {
        "elm" => Some(PackageSpec {
            apt: "nodejs npm",
            yum: "nodejs npm",
            dnf: None,
        }),
        "nasm" => Some(PackageSpec {
            apt: "nasm gdb",
            yum: "nasm gdb",
            dnf: None,
        }),
        "qemu" => Some(PackageSpec {
            apt: "qemu-system",
            yum: "qemu",
            dnf: None,
        }),
        "graphviz" => Some(PackageSpec {
            apt: "graphviz",
            yum: "graphviz",
            dnf: None,
        }),
        "postgresql" => Some(PackageSpec {
            apt: "postgresql postgresql-contrib",
            yum: "postgresql-server postgresql-contrib",
            dnf: None,
        }),
        _ => None,
    }
}

/// Install a component with the detected package manager.
///
/// # Errors
///
/// Returns an error when no package manager is found or a step fails.
pub fn install(ctx: &Context, component: &str) -> Result<()> {
    let pm = LinuxPackageManager::detect()?;
    ctx.log.info(&format!("detected package manager: {pm}"));

    match component {
        "rust" => install_rust(ctx),
        "elm" => {
            install_packages(ctx, pm, "elm")?;
            ctx.log.info("installing Elm with npm...");
            ctx.executor
                .run_streaming_checked("sudo", &["npm", "install", "-g", "elm"], &[])?;
            ctx.log.success("Elm installed");
            Ok(())
        }
        "postgresql" => {
            install_packages(ctx, pm, "postgresql")?;
            postgres::init(ctx)
        }
        other => install_packages(ctx, pm, other),
    }
}

/// Run the package-manager install for a table entry.
fn install_packages(ctx: &Context, pm: LinuxPackageManager, component: &str) -> Result<()> {
    let Some(spec) = spec_for(component) else {
        bail!("no {pm} package defined for '{component}'");
    };
    let names: Vec<&str> = spec.names_for(pm).split_whitespace().collect();
    let executor = &*ctx.executor;

    match pm {
        LinuxPackageManager::Apt => {
            executor.run_streaming_checked("sudo", &["apt", "update"], &[])?;
            let mut args = vec!["apt", "install", "-y"];
            args.extend(&names);
            executor.run_streaming_checked("sudo", &args, &[])?;
        }
        LinuxPackageManager::Dnf => {
            let mut args = vec!["dnf", "install", "-y"];
            args.extend(&names);
            executor.run_streaming_checked("sudo", &args, &[])?;
        }
        LinuxPackageManager::Yum => {
            let mut args = vec!["yum", "install", "-y"];
            args.extend(&names);
            executor.run_streaming_checked("sudo", &args, &[])?;
        }
    }

    ctx.log.success(&format!("{component} installed"));
    Ok(())
}

/// Install Rust through rustup: the distribution packages lag too far
/// behind for classroom use.
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

    #[test]
    fn table_covers_plain_components() {
        for name in ["elm", "nasm", "qemu", "graphviz", "postgresql"] {
            assert!(spec_for(name).is_some(), "{name} missing from table");
        }
    }

    #[test]
    fn rust_is_not_a_table_entry() {
        // rustup handles it, not the distribution
        assert!(spec_for("rust").is_none());
    }

    #[test]
    fn qemu_package_differs_per_family() {
        let spec = spec_for("qemu").unwrap();
        assert_eq!(spec.names_for(LinuxPackageManager::Apt), "qemu-system");
        assert_eq!(spec.names_for(LinuxPackageManager::Yum), "qemu");
    }

    #[test]
    fn dnf_falls_back_to_yum_names() {
        let spec = spec_for("postgresql").unwrap();
        assert_eq!(
            spec.names_for(LinuxPackageManager::Dnf),
            spec.names_for(LinuxPackageManager::Yum)
        );
    }

    #[test]
    fn apt_postgresql_includes_contrib() {
        let spec = spec_for("postgresql").unwrap();
        assert_eq!(
            spec.names_for(LinuxPackageManager::Apt),
            "postgresql postgresql-contrib"
        );
    }
}
