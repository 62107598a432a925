//! The student workspace manifest (`pyproject.toml`).
//!
//! The classroom standardises on a `pyproject.toml` at the workspace root
//! whose `[project].dependencies` array lists the packages a student's
//! programs need. The file is read and re-written wholesale, never merged
//! incrementally.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use toml::{Table, Value};

/// Manifest file name at the workspace root.
pub const MANIFEST_FILE: &str = "pyproject.toml";

/// Reference manifest used when a workspace is missing one.
const DEFAULT_REFERENCE_URL: &str =
    "https://raw.githubusercontent.com/classkit/template/main/pyproject.toml";

/// Download timeout for the reference manifest.
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(10);

/// URL the reference manifest is downloaded from.
///
/// Teachers point students at their own template with the
/// `CLASSKIT_MANIFEST_URL` environment variable.
#[must_use]
pub fn reference_url() -> String {
    std::env::var("CLASSKIT_MANIFEST_URL").unwrap_or_else(|_| DEFAULT_REFERENCE_URL.to_string())
}

/// Extract the distribution name from a PEP 508 requirement string.
///
/// Names are normalised: lower-cased with `_` mapped to `-`, so
/// `Flask_SQLAlchemy>=3` and `flask-sqlalchemy` compare equal.
#[must_use]
pub fn dependency_name(requirement: &str) -> String {
    requirement
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .map(|c| match c.to_ascii_lowercase() {
            '_' => '-',
            other => other,
        })
        .collect()
}

/// Read the `[project].dependencies` list from a manifest file.
///
/// A missing file reads as an empty list.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn read_dependencies(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let table: Table = content
        .parse()
        .with_context(|| format!("parsing {}", path.display()))?;

    let deps = table
        .get("project")
        .and_then(Value::as_table)
        .and_then(|p| p.get("dependencies"))
        .and_then(Value::as_array)
        .map(|a| {
            a.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();
    Ok(deps)
}

/// Reconcile the manifest after a template sync.
///
/// `previous` is the dependency list captured before the sync overwrote the
/// manifest. Entries whose distribution name is absent from the freshly
/// synced list are appended back and the file is re-written wholesale.
/// Returns the requirements that were kept.
///
/// # Errors
///
/// Returns an error if the manifest cannot be read, parsed, or re-written.
pub fn reconcile(path: &Path, previous: &[String]) -> Result<Vec<String>> {
    if previous.is_empty() || !path.exists() {
        return Ok(Vec::new());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let mut table: Table = content
        .parse()
        .with_context(|| format!("parsing {}", path.display()))?;

    if !table.contains_key("project") {
        table.insert("project".to_string(), Value::Table(Table::new()));
    }
    let project = table
        .get_mut("project")
        .and_then(Value::as_table_mut)
        .ok_or_else(|| anyhow::anyhow!("[project] is not a table in {}", path.display()))?;

    if !project.contains_key("dependencies") {
        project.insert("dependencies".to_string(), Value::Array(Vec::new()));
    }
    let deps = project
        .get_mut("dependencies")
        .and_then(Value::as_array_mut)
        .ok_or_else(|| {
            anyhow::anyhow!("project.dependencies is not an array in {}", path.display())
        })?;

    let current_names: Vec<String> = deps
        .iter()
        .filter_map(Value::as_str)
        .map(dependency_name)
        .collect();

    let kept: Vec<String> = previous
        .iter()
        .filter(|req| !current_names.contains(&dependency_name(req)))
        .cloned()
        .collect();

    if kept.is_empty() {
        return Ok(Vec::new());
    }

    for req in &kept {
        deps.push(Value::String(req.clone()));
    }

    let rendered = toml::to_string_pretty(&table).context("serialising manifest")?;
    std::fs::write(path, rendered).with_context(|| format!("writing {}", path.display()))?;

    Ok(kept)
}

/// Download the reference manifest to `dest` with a fixed network timeout.
///
/// # Errors
///
/// Returns an error if the request fails, times out, or the file cannot be
/// written.
pub fn download(url: &str, dest: &Path) -> Result<()> {
    let agent: ureq::Agent = ureq::Agent::config_builder()
        .timeout_global(Some(DOWNLOAD_TIMEOUT))
        .build()
        .into();

    let mut response = agent
        .get(url)
        .call()
        .with_context(|| format!("downloading {url}"))?;
    let body = response
        .body_mut()
        .read_to_string()
        .with_context(|| format!("reading response from {url}"))?;

    std::fs::write(dest, body).with_context(|| format!("writing {}", dest.display()))?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn write_manifest(content: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(MANIFEST_FILE);
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn dependency_name_strips_version_specifier() {
        assert_eq!(dependency_name("requests>=2.31"), "requests");
        assert_eq!(dependency_name("numpy==1.26.0"), "numpy");
        assert_eq!(dependency_name("rich"), "rich");
    }

    #[test]
    fn dependency_name_normalises_case_and_underscores() {
        assert_eq!(dependency_name("Flask_SQLAlchemy>=3"), "flask-sqlalchemy");
        assert_eq!(dependency_name("PyYAML"), "pyyaml");
    }

    #[test]
    fn dependency_name_stops_at_extras_marker() {
        assert_eq!(dependency_name("uvicorn[standard]>=0.23"), "uvicorn");
        assert_eq!(dependency_name("pytest ; python_version > '3.8'"), "pytest");
    }

    #[test]
    fn read_dependencies_from_manifest() {
        let (_dir, path) = write_manifest(
            "[project]\nname = \"work\"\ndependencies = [\"requests>=2.0\", \"rich\"]\n",
        );
        let deps = read_dependencies(&path).unwrap();
        assert_eq!(deps, vec!["requests>=2.0", "rich"]);
    }

    #[test]
    fn read_dependencies_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let deps = read_dependencies(&dir.path().join("nope.toml")).unwrap();
        assert!(deps.is_empty());
    }

    #[test]
    fn read_dependencies_without_project_table() {
        let (_dir, path) = write_manifest("[tool.other]\nx = 1\n");
        let deps = read_dependencies(&path).unwrap();
        assert!(deps.is_empty());
    }

    #[test]
    fn reconcile_keeps_locally_added_dependency() {
        // Template dropped "matplotlib"; the student added it locally
        let (_dir, path) = write_manifest(
            "[project]\nname = \"work\"\ndependencies = [\"requests>=2.0\"]\n",
        );
        let previous = vec!["requests>=2.0".to_string(), "matplotlib".to_string()];

        let kept = reconcile(&path, &previous).unwrap();
        assert_eq!(kept, vec!["matplotlib"]);

        let after = read_dependencies(&path).unwrap();
        assert!(after.contains(&"matplotlib".to_string()));
        assert!(after.contains(&"requests>=2.0".to_string()));
    }

    #[test]
    fn reconcile_is_noop_when_template_covers_everything() {
        let (_dir, path) = write_manifest(
            "[project]\nname = \"work\"\ndependencies = [\"requests>=2.0\", \"rich\"]\n",
        );
        let before = std::fs::read_to_string(&path).unwrap();
        let previous = vec!["requests>=2.0".to_string(), "rich".to_string()];

        let kept = reconcile(&path, &previous).unwrap();
        assert!(kept.is_empty());
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            before,
            "no rewrite when nothing was kept"
        );
    }

    #[test]
    fn reconcile_matches_names_not_versions() {
        // The template pins a newer version; the local pin must not duplicate it
        let (_dir, path) = write_manifest(
            "[project]\nname = \"work\"\ndependencies = [\"requests>=2.31\"]\n",
        );
        let previous = vec!["requests>=2.0".to_string()];

        let kept = reconcile(&path, &previous).unwrap();
        assert!(kept.is_empty());
        let after = read_dependencies(&path).unwrap();
        assert_eq!(after.len(), 1);
    }

    #[test]
    fn reconcile_creates_dependency_array_when_missing() {
        let (_dir, path) = write_manifest("[project]\nname = \"work\"\n");
        let previous = vec!["matplotlib".to_string()];

        let kept = reconcile(&path, &previous).unwrap();
        assert_eq!(kept, vec!["matplotlib"]);
        assert_eq!(read_dependencies(&path).unwrap(), vec!["matplotlib"]);
    }

    #[test]
    fn reconcile_with_no_previous_deps_is_noop() {
        let (_dir, path) = write_manifest("[project]\ndependencies = [\"rich\"]\n");
        let kept = reconcile(&path, &[]).unwrap();
        assert!(kept.is_empty());
    }

    #[test]
    fn reference_url_has_default() {
        assert!(reference_url().starts_with("https://"));
    }
}
