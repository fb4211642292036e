use crate::types::field::FieldPath;
use crate::utils::comments::strip_comments;
use crate::utils::error::{BumpError, Result};
use crate::utils::locate::find_string_value;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// A manifest as read from disk.
///
/// `original` is what gets written back; `parsed` is only used to find the
/// version and is never serialized.
#[derive(Debug, Clone)]
pub struct ManifestDocument {
    pub path: PathBuf,
    pub original: String,
    pub parsed: Value,
}

impl ManifestDocument {
    /// Reads `path`, strips its `//` comments and parses the result.
    pub fn load(path: &Path) -> Result<Self> {
        let original = fs::read_to_string(path).map_err(|source| BumpError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_text(path, original)
    }

    pub fn from_text(path: &Path, original: String) -> Result<Self> {
        let cleaned = strip_comments(&original);
        let parsed = serde_json::from_str(&cleaned).map_err(|source| BumpError::JsonParse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(ManifestDocument {
            path: path.to_path_buf(),
            original,
            parsed,
        })
    }

    /// Returns the raw string stored at `field`, unvalidated.
    pub fn extract_version(&self, field: &FieldPath) -> Result<&str> {
        field
            .lookup_str(&self.parsed)
            .ok_or_else(|| self.field_not_found(field))
    }

    /// Returns the original text with the value at `field` changed from
    /// `old` to `new`. Every byte outside the value stays as it was.
    pub fn rewrite_version(&self, field: &FieldPath, old: &str, new: &str) -> Result<String> {
        rewrite_version(&self.original, field, old, new).ok_or_else(|| self.field_not_found(field))
    }

    fn field_not_found(&self, field: &FieldPath) -> BumpError {
        BumpError::FieldNotFound {
            path: self.path.clone(),
            field: field.to_string(),
        }
    }
}

/// Replaces the string value at `field` in `original`, provided it currently
/// reads `old`. The value is located structurally, so an identical
/// `"version": "<old>"` elsewhere in the text is left alone.
pub fn rewrite_version(original: &str, field: &FieldPath, old: &str, new: &str) -> Option<String> {
    let span = find_string_value(original, field.keys())?;
    if &original[span.clone()] != old {
        return None;
    }
    let mut out = String::with_capacity(original.len() + new.len());
    out.push_str(&original[..span.start]);
    out.push_str(new);
    out.push_str(&original[span.end..]);
    Some(out)
}
