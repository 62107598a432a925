use std::fmt;
use std::path::Path;

use crate::error::PlatformError;

/// Detected operating system platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Os {
    Windows,
    Linux,
    MacOs,
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Windows => write!(f, "windows"),
            Self::Linux => write!(f, "linux"),
            Self::MacOs => write!(f, "macos"),
        }
    }
}

/// Platform information for the current system.
#[derive(Debug, Clone)]
pub struct Platform {
    pub os: Os,
    /// Shared lab machines carry a portable tool tree under
    /// `C:\Programmes_Portables` instead of per-user installations.
    pub lab_machine: bool,
}

impl Platform {
    /// Detect the current platform.
    #[must_use]
    pub fn detect() -> Self {
        let os = detect_os();
        Self {
            os,
            lab_machine: os == Os::Windows && Path::new(crate::msys2::LAB_ROOT).exists(),
        }
    }

    /// Create a platform with explicit values (for testing).
    #[cfg(test)]
    #[must_use]
    pub const fn new(os: Os, lab_machine: bool) -> Self {
        Self { os, lab_machine }
    }

    #[must_use]
    pub fn is_windows(&self) -> bool {
        self.os == Os::Windows
    }

    #[must_use]
    pub fn is_linux(&self) -> bool {
        self.os == Os::Linux
    }

    #[must_use]
    pub fn is_macos(&self) -> bool {
        self.os == Os::MacOs
    }
}

fn detect_os() -> Os {
    if cfg!(target_os = "windows") {
        Os::Windows
    } else if cfg!(target_os = "macos") {
        Os::MacOs
    } else {
        // Default to Linux for other Unix-like systems
        Os::Linux
    }
}

/// Native Linux package manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinuxPackageManager {
    Apt,
    Dnf,
    Yum,
}

impl fmt::Display for LinuxPackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Apt => write!(f, "apt"),
            Self::Dnf => write!(f, "dnf"),
            Self::Yum => write!(f, "yum"),
        }
    }
}

impl LinuxPackageManager {
    /// Detect the package manager available on this system.
    ///
    /// apt wins over dnf, dnf over yum, mirroring the distribution families
    /// the classroom actually uses (Debian/Ubuntu, then Fedora, then RHEL).
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::NoPackageManager`] if none is found.
    pub fn detect() -> Result<Self, PlatformError> {
        Self::from_probe(
            Path::new("/usr/bin/apt").exists() || Path::new("/usr/bin/apt-get").exists(),
            Path::new("/usr/bin/dnf").exists(),
            Path::new("/usr/bin/yum").exists(),
        )
    }

    /// Select a package manager from presence flags.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::NoPackageManager`] if every flag is false.
    pub const fn from_probe(apt: bool, dnf: bool, yum: bool) -> Result<Self, PlatformError> {
        if apt {
            Ok(Self::Apt)
        } else if dnf {
            Ok(Self::Dnf)
        } else if yum {
            Ok(Self::Yum)
        } else {
            Err(PlatformError::NoPackageManager)
        }
    }
}
