//! Removable-drive detection and workspace backup/restore.
//!
//! Students carry their work between home and the lab on a USB key. The
//! backup lives in a single `PROG_NSI/` folder at the drive root; the copy
//! is a plain overwrite in both directions, never a merge.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use walkdir::WalkDir;

use crate::error::UsbError;
use crate::exec::Executor;
use crate::logging::Logger;
use crate::platform::{Os, Platform};

/// Backup folder at the root of the USB key.
pub const BACKUP_DIR_NAME: &str = "PROG_NSI";

/// Workspace directories never copied to the key.
pub const EXCLUDED_DIRS: &[&str] = &[".venv", ".git", ".pytest_cache"];

/// A detected removable drive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovableDrive {
    pub mountpoint: PathBuf,
}

/// Detect the removable drives currently connected.
///
/// # Errors
///
/// Returns an error if the platform query fails.
pub fn detect_drives(platform: &Platform, executor: &dyn Executor) -> Result<Vec<RemovableDrive>> {
    match platform.os {
        Os::Windows => detect_windows(executor),
        Os::Linux => Ok(detect_linux()),
        Os::MacOs => Ok(detect_macos()),
    }
}

/// Windows: removable logical disks (DriveType=2) via PowerShell/CIM.
fn detect_windows(executor: &dyn Executor) -> Result<Vec<RemovableDrive>> {
    let script = "Get-CimInstance -ClassName Win32_LogicalDisk -Filter 'DriveType=2' | \
                  Select-Object -ExpandProperty DeviceID";
    let result = executor
        .run_unchecked("powershell", &["-NoProfile", "-Command", script])
        .context("querying removable drives")?;

    if !result.success {
        return Ok(Vec::new());
    }
    Ok(parse_device_ids(&result.stdout))
}

/// Parse `DeviceID` lines (`E:`) into mountpoints (`E:\`).
fn parse_device_ids(output: &str) -> Vec<RemovableDrive> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| line.len() == 2 && line.ends_with(':'))
        .map(|line| RemovableDrive {
            mountpoint: PathBuf::from(format!("{line}\\")),
        })
        .collect()
}

/// Linux: user mountpoints under /run/media and /media.
fn detect_linux() -> Vec<RemovableDrive> {
    let user = std::env::var("USER").unwrap_or_default();
    if user.is_empty() {
        return Vec::new();
    }
    let bases = [
        PathBuf::from("/run/media").join(&user),
        PathBuf::from("/media").join(&user),
    ];
    let mut drives = Vec::new();
    for base in bases {
        let Ok(entries) = std::fs::read_dir(&base) else {
            continue;
        };
        for entry in entries.flatten() {
            if entry.path().is_dir() {
                drives.push(RemovableDrive {
                    mountpoint: entry.path(),
                });
            }
        }
    }
    drives
}

/// macOS: /Volumes entries, minus the boot volume (which firmlinks to /).
fn detect_macos() -> Vec<RemovableDrive> {
    let Ok(entries) = std::fs::read_dir("/Volumes") else {
        return Vec::new();
    };
    entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.is_dir())
        .filter(|p| {
            std::fs::canonicalize(p).map_or(true, |real| real != Path::new("/"))
        })
        .map(|mountpoint| RemovableDrive { mountpoint })
        .collect()
}

/// Select the backup destination folder.
///
/// Exactly one connected drive is required; with several drives connected
/// the situation is ambiguous and the operation refuses, whether or not
/// any of them already carries a backup folder.
///
/// # Errors
///
/// See [`UsbError`] for the refusal cases.
pub fn backup_target(drives: &[RemovableDrive]) -> Result<PathBuf, UsbError> {
    match drives {
        [] => Err(UsbError::NoDriveDetected),
        [only] => Ok(only.mountpoint.join(BACKUP_DIR_NAME)),
        many => {
            let existing = folders_on(many);
            if existing.is_empty() {
                Err(UsbError::MultipleDrivesNoBackup(many.len()))
            } else {
                Err(UsbError::MultipleBackupFolders(existing))
            }
        }
    }
}

/// Select the folder to restore from: exactly one connected drive must
/// carry a backup folder.
///
/// # Errors
///
/// See [`UsbError`] for the refusal cases.
pub fn restore_source(drives: &[RemovableDrive]) -> Result<PathBuf, UsbError> {
    if drives.is_empty() {
        return Err(UsbError::NoDriveDetected);
    }
    let mut existing = folders_on(drives);
    match existing.len() {
        0 => Err(UsbError::NoBackupFolder),
        1 => Ok(existing.remove(0)),
        _ => Err(UsbError::MultipleBackupFolders(existing)),
    }
}

/// Backup folders present at the root of the given drives.
fn folders_on(drives: &[RemovableDrive]) -> Vec<PathBuf> {
    drives
        .iter()
        .map(|d| d.mountpoint.join(BACKUP_DIR_NAME))
        .filter(|p| p.is_dir())
        .collect()
}

/// Copy the contents of `source` into `dest`: every immediate
/// subdirectory not named in `excluded` (existing destination directories
/// are replaced), and every file at the root. Symbolic links are skipped;
/// FAT-formatted keys cannot hold them anyway.
///
/// # Errors
///
/// Returns an error on any filesystem failure.
pub fn copy_contents(
    source: &Path,
    dest: &Path,
    excluded: &[&str],
    log: &Logger,
) -> Result<()> {
    let excluded: HashSet<&str> = excluded.iter().copied().collect();
    std::fs::create_dir_all(dest)
        .with_context(|| format!("creating {}", dest.display()))?;

    for entry in std::fs::read_dir(source)
        .with_context(|| format!("reading {}", source.display()))?
    {
        let entry = entry?;
        let path = entry.path();
        let name = entry.file_name();
        let target = dest.join(&name);

        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            if excluded.contains(name.to_string_lossy().as_ref()) {
                continue;
            }
            if target.exists() {
                std::fs::remove_dir_all(&target)
                    .with_context(|| format!("replacing {}", target.display()))?;
            }
            copy_dir(&path, &target)?;
            log.info(&format!(
                "copied {} -> {}",
                name.to_string_lossy(),
                target.display()
            ));
        } else if file_type.is_file() {
            std::fs::copy(&path, &target)
                .with_context(|| format!("copying {}", path.display()))?;
            log.info(&format!(
                "copied {} -> {}",
                name.to_string_lossy(),
                target.display()
            ));
        }
    }
    Ok(())
}

/// Recursive directory copy. Symlinks are skipped.
fn copy_dir(source: &Path, dest: &Path) -> Result<()> {
    for entry in WalkDir::new(source) {
        let entry = entry.with_context(|| format!("walking {}", source.display()))?;
        let rel = entry
            .path()
            .strip_prefix(source)
            .with_context(|| format!("walking {}", source.display()))?;
        let target = dest.join(rel);

        if entry.path_is_symlink() {
            continue;
        }
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target)
                .with_context(|| format!("creating {}", target.display()))?;
        } else {
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
            std::fs::copy(entry.path(), &target)
                .with_context(|| format!("copying {}", entry.path().display()))?;
        }
    }
    Ok(())
}
