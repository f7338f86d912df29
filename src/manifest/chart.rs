//! Chart manifest (Helm Chart.yaml) read/write.
//!
//! The chart carries its own `version` plus an optional `appVersion` mirror
//! of the application's version. Same lifecycle as the application
//! manifest: read fresh, mutate, write the whole document atomically.

use std::path::Path;

use semver::Version;

use crate::error::ManifestError;
use crate::manifest::package::write_atomic;
use crate::manifest::version::parse_strict;

/// Read the chart's own version.
pub fn read_version(path: &Path) -> Result<Version, ManifestError> {
    let doc = read_document(path)?;
    let raw = doc
        .get("version")
        .and_then(|v| yaml_as_string(v))
        .ok_or_else(|| ManifestError::MissingVersionField {
            path: path.to_path_buf(),
        })?;
    parse_strict(&raw)
}

/// Read the chart's `appVersion` mirror, if present and well-formed.
pub fn read_app_version(path: &Path) -> Result<Option<Version>, ManifestError> {
    let doc = read_document(path)?;
    match doc.get("appVersion").and_then(|v| yaml_as_string(v)) {
        Some(raw) => Ok(Some(parse_strict(&raw)?)),
        None => Ok(None),
    }
}

/// Rewrite the chart's version fields.
///
/// `version` replaces the chart's own version when given; `app_version`
/// replaces (or inserts) the `appVersion` mirror. Everything else in the
/// document is preserved. One atomic whole-document write.
pub fn write_versions(
    path: &Path,
    version: Option<&Version>,
    app_version: Option<&Version>,
) -> Result<(), ManifestError> {
    let mut doc = read_document(path)?;
    let map = doc
        .as_mapping_mut()
        .ok_or_else(|| ManifestError::ParseFailed {
            path: path.to_path_buf(),
            reason: "Chart manifest is not a YAML mapping".to_string(),
        })?;

    if let Some(v) = version {
        map.insert(
            serde_yaml::Value::String("version".to_string()),
            serde_yaml::Value::String(v.to_string()),
        );
    }
    if let Some(v) = app_version {
        map.insert(
            serde_yaml::Value::String("appVersion".to_string()),
            serde_yaml::Value::String(v.to_string()),
        );
    }

    let output = serde_yaml::to_string(&doc).map_err(|e| ManifestError::ParseFailed {
        path: path.to_path_buf(),
        reason: format!("Failed to serialize YAML: {e}"),
    })?;
    write_atomic(path, &output)
}

fn read_document(path: &Path) -> Result<serde_yaml::Value, ManifestError> {
    let content = std::fs::read_to_string(path).map_err(|e| ManifestError::ReadFailed {
        path: path.to_path_buf(),
        source: e,
    })?;
    serde_yaml::from_str(&content).map_err(|e| ManifestError::ParseFailed {
        path: path.to_path_buf(),
        reason: format!("Invalid YAML: {e}"),
    })
}

/// Chart versions may be written quoted (string) or bare (YAML number for
/// odd versions like `1.0`); normalize to a string before strict parsing.
fn yaml_as_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const CHART: &str = "\
apiVersion: v2
name: my-app
description: A Helm chart
version: 1.0.0
appVersion: \"2.3.1\"
";

    fn write_chart(dir: &Path) -> std::path::PathBuf {
        let path = dir.join("Chart.yaml");
        fs::write(&path, CHART).unwrap();
        path
    }

    #[test]
    fn test_read_version() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_chart(dir.path());
        assert_eq!(read_version(&path).unwrap(), Version::new(1, 0, 0));
    }

    #[test]
    fn test_read_app_version_quoted() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_chart(dir.path());
        assert_eq!(
            read_app_version(&path).unwrap(),
            Some(Version::new(2, 3, 1))
        );
    }

    #[test]
    fn test_read_app_version_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Chart.yaml");
        fs::write(&path, "apiVersion: v2\nname: x\nversion: 0.1.0\n").unwrap();
        assert_eq!(read_app_version(&path).unwrap(), None);
    }

    #[test]
    fn test_write_chart_version_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_chart(dir.path());

        write_versions(&path, Some(&Version::new(1, 1, 0)), None).unwrap();

        assert_eq!(read_version(&path).unwrap(), Version::new(1, 1, 0));
        // appVersion and the rest of the document survive.
        assert_eq!(
            read_app_version(&path).unwrap(),
            Some(Version::new(2, 3, 1))
        );
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("name: my-app"));
        assert!(content.contains("A Helm chart"));
    }

    #[test]
    fn test_write_app_version_mirror_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_chart(dir.path());

        write_versions(&path, None, Some(&Version::new(2, 3, 2))).unwrap();

        assert_eq!(read_version(&path).unwrap(), Version::new(1, 0, 0));
        assert_eq!(
            read_app_version(&path).unwrap(),
            Some(Version::new(2, 3, 2))
        );
    }

    #[test]
    fn test_write_inserts_missing_app_version() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Chart.yaml");
        fs::write(&path, "apiVersion: v2\nname: x\nversion: 0.1.0\n").unwrap();

        write_versions(&path, None, Some(&Version::new(3, 0, 0))).unwrap();
        assert_eq!(
            read_app_version(&path).unwrap(),
            Some(Version::new(3, 0, 0))
        );
    }

    #[test]
    fn test_read_missing_version_field() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Chart.yaml");
        fs::write(&path, "apiVersion: v2\nname: x\n").unwrap();
        assert!(matches!(
            read_version(&path),
            Err(ManifestError::MissingVersionField { .. })
        ));
    }

    #[test]
    fn test_read_malformed_version_value() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Chart.yaml");
        fs::write(&path, "version: not-a-version\n").unwrap();
        assert!(matches!(
            read_version(&path),
            Err(ManifestError::InvalidVersion { .. })
        ));
    }
}
