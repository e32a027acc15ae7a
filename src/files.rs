//! File helpers shared by the loaders and the command handlers.
//!
//! Reading goes through [`read_yaml_file`] so an empty or comment-only file is a
//! `Null` document rather than a parse error. Writing goes through
//! [`write_together`] so a command never leaves half of its outputs on disk.

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer};
use serde_yaml::Value;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// File extensions treated as YAML training data.
const YAML_EXTENSIONS: &[&str] = &["yml", "yaml"];

/// Parse a YAML document, treating a document without content as `Null`.
pub fn parse_yaml_document(content: &str) -> Result<Value> {
    let has_content = content
        .lines()
        .map(str::trim)
        .any(|line| !line.is_empty() && !line.starts_with('#') && line != "---");
    if !has_content {
        return Ok(Value::Null);
    }
    serde_yaml::from_str(content).context("Failed to parse YAML")
}

/// Read and parse a YAML file.
pub fn read_yaml_file(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_yaml_document(&content).with_context(|| format!("Invalid YAML in {}", path.display()))
}

pub fn is_yaml_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| YAML_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

pub fn is_json_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

/// Expand a file or directory into the training data files below it.
///
/// Directories are searched recursively for YAML and JSON files. The result is
/// sorted so load order does not depend on the filesystem.
pub fn training_files(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    if !path.is_dir() {
        anyhow::bail!("Training data path '{}' does not exist", path.display());
    }

    let mut files = Vec::new();
    for extension in YAML_EXTENSIONS.iter().chain(["json"].iter()) {
        let pattern = format!("{}/**/*.{}", path.display(), extension);
        for entry in glob::glob(&pattern)
            .with_context(|| format!("Invalid search pattern {}", pattern))?
        {
            let file = entry.with_context(|| format!("Failed to list {}", path.display()))?;
            if file.is_file() {
                files.push(file);
            }
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}

/// Render a scalar YAML value as plain text (`3.1` and `"3.1"` both become `3.1`).
pub fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

/// Serde helper: accept any scalar for an optional string field.
///
/// `version: 3.1` parses as a float, and `assistant_id: 20240101` as an integer;
/// both are meant as strings.
pub fn optional_scalar<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(v) => Some(scalar_text(&v)),
    })
}

/// Write several files so that either all of them appear or none do.
///
/// Every file is first written to a temporary file next to its destination;
/// only when all writes succeeded are they moved into place.
pub fn write_together(outputs: &[(PathBuf, String)]) -> Result<()> {
    let mut staged = Vec::with_capacity(outputs.len());

    for (path, content) in outputs {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;

        let mut temp = tempfile::NamedTempFile::new_in(&dir)
            .with_context(|| format!("Failed to stage {}", path.display()))?;
        temp.write_all(content.as_bytes())
            .with_context(|| format!("Failed to write {}", path.display()))?;
        staged.push((temp, path));
    }

    for (temp, path) in staged {
        temp.persist(path)
            .with_context(|| format!("Failed to move output into {}", path.display()))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_comment_only_document_is_null() {
        let value = parse_yaml_document("# nothing here\n\n---\n").unwrap();
        assert!(value.is_null());
    }

    #[test]
    fn test_scalar_text_normalizes_numbers() {
        let value: Value = serde_yaml::from_str("3.1").unwrap();
        assert_eq!(scalar_text(&value), "3.1");
        let value: Value = serde_yaml::from_str("\"3.1\"").unwrap();
        assert_eq!(scalar_text(&value), "3.1");
    }

    #[test]
    fn test_training_files_sorted_and_filtered() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("b.yml"), "nlu: []").unwrap();
        fs::write(dir.path().join("nested/a.yaml"), "nlu: []").unwrap();
        fs::write(dir.path().join("notes.md"), "# notes").unwrap();

        let files = training_files(dir.path()).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|f| is_yaml_file(f)));
        let mut sorted = files.clone();
        sorted.sort();
        assert_eq!(files, sorted);
    }

    #[test]
    fn test_training_files_missing_path() {
        let dir = TempDir::new().unwrap();
        assert!(training_files(&dir.path().join("missing")).is_err());
    }

    #[test]
    fn test_write_together_writes_every_file() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out");
        let outputs = vec![
            (out.join("train.yml"), "a: 1\n".to_string()),
            (out.join("test.yml"), "b: 2\n".to_string()),
        ];

        write_together(&outputs).unwrap();

        assert_eq!(fs::read_to_string(out.join("train.yml")).unwrap(), "a: 1\n");
        assert_eq!(fs::read_to_string(out.join("test.yml")).unwrap(), "b: 2\n");
        // no staging files left behind
        assert_eq!(fs::read_dir(&out).unwrap().count(), 2);
    }
}
