//! Domain-specific error types for the bootstrap toolkit.
//!
//! Internal modules return typed errors while command handlers at the CLI
//! boundary convert them to [`anyhow::Error`] via the standard `?` operator.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that arise from component lookup and dispatch.
#[derive(Error, Debug)]
pub enum ComponentError {
    /// The requested component name is not in the registry.
    #[error("unknown component '{name}'. Available components: {}", available.join(", "))]
    Unknown {
        /// Name as the user typed it.
        name: String,
        /// Valid component names on the current platform.
        available: Vec<&'static str>,
    },

    /// The component exists but cannot be installed on this platform.
    #[error(
        "component '{name}' is not available on {platform}. Available components: {}",
        available.join(", ")
    )]
    NotAvailable {
        name: String,
        platform: String,
        available: Vec<&'static str>,
    },
}

/// Errors that arise from platform detection.
#[derive(Error, Debug)]
pub enum PlatformError {
    /// No supported Linux package manager was found.
    #[error("no supported package manager detected (apt, dnf, yum)")]
    NoPackageManager,

    /// A required tool is not installed.
    #[error("{tool} is not installed. {hint}")]
    MissingTool { tool: String, hint: String },
}

/// Errors that arise from removable-drive detection and selection.
#[derive(Error, Debug)]
pub enum UsbError {
    /// No removable drive is connected.
    #[error("no removable drive detected")]
    NoDriveDetected,

    /// More than one drive is connected and at least one carries a backup folder.
    #[error("multiple removable drives carry a backup folder: {}", format_paths(.0))]
    MultipleBackupFolders(Vec<PathBuf>),

    /// More than one drive is connected and none carries a backup folder.
    #[error("{0} removable drives connected but none carries a backup folder")]
    MultipleDrivesNoBackup(usize),

    /// No drive carries a backup folder to restore from.
    #[error("no backup folder found on any removable drive")]
    NoBackupFolder,
}

/// Errors that arise from template synchronization and remote setup.
#[derive(Error, Debug)]
pub enum SyncError {
    /// The workspace is not a git repository.
    #[error("{0} is not a git repository")]
    NotARepository(PathBuf),

    /// The template remote is not configured.
    #[error("remote '{0}' not found (was the workspace cloned from the class template?)")]
    MissingTemplateRemote(String),
}

fn format_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn unknown_component_lists_available_names() {
        let e = ComponentError::Unknown {
            name: "emacs".to_string(),
            available: vec!["rust", "postgresql"],
        };
        let msg = e.to_string();
        assert!(msg.contains("unknown component 'emacs'"));
        assert!(msg.contains("rust, postgresql"));
    }

    #[test]
    fn not_available_names_platform() {
        let e = ComponentError::NotAvailable {
            name: "msys2".to_string(),
            platform: "linux".to_string(),
            available: vec!["rust"],
        };
        let msg = e.to_string();
        assert!(msg.contains("not available on linux"));
        assert!(msg.contains("rust"));
    }

    #[test]
    fn no_package_manager_display() {
        let e = PlatformError::NoPackageManager;
        assert_eq!(
            e.to_string(),
            "no supported package manager detected (apt, dnf, yum)"
        );
    }

    #[test]
    fn missing_tool_display() {
        let e = PlatformError::MissingTool {
            tool: "MSYS2".to_string(),
            hint: "install the 'msys2' component first".to_string(),
        };
        assert!(e.to_string().contains("MSYS2 is not installed"));
        assert!(e.to_string().contains("msys2"));
    }

    #[test]
    fn usb_multiple_backup_folders_lists_paths() {
        let e = UsbError::MultipleBackupFolders(vec![
            PathBuf::from("/media/a/PROG_NSI"),
            PathBuf::from("/media/b/PROG_NSI"),
        ]);
        let msg = e.to_string();
        assert!(msg.contains("/media/a/PROG_NSI"));
        assert!(msg.contains("/media/b/PROG_NSI"));
    }

    #[test]
    fn usb_no_drive_display() {
        assert_eq!(
            UsbError::NoDriveDetected.to_string(),
            "no removable drive detected"
        );
    }

    #[test]
    fn sync_missing_remote_display() {
        let e = SyncError::MissingTemplateRemote("template".to_string());
        assert!(e.to_string().contains("remote 'template' not found"));
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn all_error_types_are_send_sync() {
        assert_send_sync::<ComponentError>();
        assert_send_sync::<PlatformError>();
        assert_send_sync::<UsbError>();
        assert_send_sync::<SyncError>();
    }

    #[test]
    fn errors_convert_to_anyhow() {
        let _e: anyhow::Error = PlatformError::NoPackageManager.into();
        let _e: anyhow::Error = UsbError::NoDriveDetected.into();
    }
}
