//! Report writing shared by the analyzers.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};

/// Current UTC time as an RFC 3339 string, used for report timestamps.
#[must_use]
pub fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Tally items by a string key.
pub fn count_by<'a, T, F>(
    items: impl IntoIterator<Item = &'a T>,
    key: F,
) -> BTreeMap<String, usize>
where
    T: 'a,
    F: Fn(&T) -> String,
{
    let mut counts = BTreeMap::new();
    for item in items {
        *counts.entry(key(item)).or_insert(0) += 1;
    }
    counts
}

/// Serialize `value` as pretty JSON and write it to `path`.
///
/// Parent directories are created as needed. Returns the written path.
///
/// # Errors
///
/// Returns an error if serialization fails or the file cannot be written.
pub fn write_json<T: Serialize>(path: impl AsRef<Path>, value: &T) -> Result<PathBuf> {
    let json = serde_json::to_string_pretty(value)?;
    write_text(path, &json)
}

/// Write text to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns an error if the directory or file cannot be written.
pub fn write_text(path: impl AsRef<Path>, contents: &str) -> Result<PathBuf> {
    let path = path.as_ref().to_path_buf();

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    std::fs::write(&path, contents)?;
    debug!("Wrote {} bytes to {}", contents.len(), path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_is_rfc3339() {
        let ts = timestamp();
        assert!(chrono::DateTime::parse_from_rfc3339(&ts).is_ok());
        assert!(ts.ends_with('Z'));
    }

    #[test]
    fn test_count_by() {
        let items = vec!["High", "Medium", "High"];
        let counts = count_by(&items, |s| (*s).to_string());
        assert_eq!(counts.get("High"), Some(&2));
        assert_eq!(counts.get("Medium"), Some(&1));
        assert_eq!(counts.len(), 2);
    }

    #[test]
    fn test_write_json_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out/report.json");

        let written = write_json(&path, &serde_json::json!({"ok": true})).unwrap();
        assert_eq!(written, path);

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("\"ok\": true"));
    }

    #[test]
    fn test_write_text_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.md");

        write_text(&path, "first").unwrap();
        write_text(&path, "second").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
    }
}
