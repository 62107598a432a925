//! Per-platform installation procedures.
//!
//! Each platform module owns a component → package-name table and the
//! handful of special cases (rustup, npm, database initialisation) that a
//! plain package install cannot cover. [`dispatch`] routes a component to
//! the module matching the detected platform.

pub mod linux;
pub mod macos;
pub mod windows;

use anyhow::Result;

use crate::context::Context;
use crate::platform::Os;

/// Install `component` using the procedure for the detected platform.
///
/// # Errors
///
/// Returns an error when any install step fails; partially completed steps
/// are not rolled back.
pub fn dispatch(ctx: &Context, component: &str) -> Result<()> {
    match ctx.platform.os {
        Os::Windows => windows::install(ctx, component),
        Os::Linux => linux::install(ctx, component),
        Os::MacOs => macos::install(ctx, component),
    }
}
