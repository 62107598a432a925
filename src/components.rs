//! The static component registry.
//!
//! A component is a named installable development tool. Descriptors are
//! immutable and defined here; the per-platform install procedures live in
//! [`crate::install`]. Descriptions and size estimates are shown to the
//! student before an installation is confirmed.

use crate::platform::{Os, Platform};

/// An installable component descriptor.
#[derive(Debug, Clone, Copy)]
pub struct Component {
    /// Registry key, as typed on the command line.
    pub name: &'static str,
    /// One-line human description.
    pub summary: &'static str,
    /// What the installation brings, one line per entry.
    pub details: &'static [&'static str],
    /// Estimated disk usage, human readable.
    pub size: &'static str,
}

/// All known components, across every platform.
pub const COMPONENTS: &[Component] = &[
    Component {
        name: "msys2",
        summary: "MSYS2 - UNIX development environment for Windows",
        details: &[
            "bash shell and GNU tools",
            "pacman package manager",
            "base for installing the other components",
        ],
        size: "~500 MB",
    },
    Component {
        name: "homebrew",
        summary: "Homebrew - package manager for macOS",
        details: &["brew command", "base for installing the other components"],
        size: "~50 MB",
    },
    Component {
        name: "nodejs",
        summary: "Node.js - JavaScript runtime",
        details: &["node runtime", "npm package manager"],
        size: "~100 MB",
    },
    Component {
        name: "elm",
        summary: "Elm - functional language for web development",
        details: &[
            "Node.js (JavaScript runtime)",
            "Elm compiler",
            "Elm REPL and development tools",
        ],
        size: "~300 MB",
    },
    Component {
        name: "rust",
        summary: "Rust - fast and safe systems language",
        details: &[
            "rustc compiler",
            "Cargo package manager",
            "documentation and tools",
        ],
        size: "~800 MB",
    },
    Component {
        name: "nasm",
        summary: "NASM + GDB - assembly programming tools",
        details: &["NASM (Netwide Assembler)", "GDB (GNU Debugger)"],
        size: "~100 MB",
    },
    Component {
        name: "qemu",
        summary: "QEMU - machine emulator",
        details: &[
            "CPU emulation (x86, ARM, ...)",
            "hardware virtualisation",
            "support for many guest operating systems",
        ],
        size: "~400 MB",
    },
    Component {
        name: "postgresql",
        summary: "PostgreSQL - relational database server",
        details: &[
            "PostgreSQL server",
            "client tools (psql, pg_dump, ...)",
            "automatic setup with the 'padawan' superuser",
        ],
        size: "~200 MB",
    },
    Component {
        name: "graphviz",
        summary: "Graphviz - graph visualisation toolkit",
        details: &[
            "dot, neato, fdp, circo rendering engines",
            "image generation (PNG, SVG, PDF)",
            "DOT language for describing graphs",
        ],
        size: "~50 MB",
    },
];

/// Component names installable on the given platform, in registry order.
#[must_use]
pub fn available_on(platform: &Platform) -> Vec<&'static str> {
    COMPONENTS
        .iter()
        .map(|c| c.name)
        .filter(|name| is_available(name, platform.os))
        .collect()
}

/// Whether a component can be installed on the given OS.
#[must_use]
pub fn is_available(name: &str, os: Os) -> bool {
    match name {
        "msys2" => os == Os::Windows,
        "homebrew" | "nodejs" => os == Os::MacOs,
        // No Windows/macOS install path exists for graphviz in the classroom
        "graphviz" => os == Os::Linux,
        _ => true,
    }
}

/// Look up a component descriptor by name.
#[must_use]
pub fn find(name: &str) -> Option<&'static Component> {
    COMPONENTS.iter().find(|c| c.name == name)
}
