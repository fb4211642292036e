use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BumpError {
    #[error("Failed to read {}", path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {}", path.display())]
    JsonParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Field '{field}' not found in {}", path.display())]
    FieldNotFound { path: PathBuf, field: String },

    #[error("Invalid version format: '{0}' (expected <major>.<minor>.<patch>)")]
    InvalidVersionFormat(String),

    #[error("Failed to write {}", path.display())]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration in {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    #[error("Unknown bump type: {0} (expected: major|minor|patch)")]
    UnknownBumpKind(String),

    #[error("No manifest found (looked for {0})")]
    NoManifest(String),
}

pub type Result<T> = std::result::Result<T, BumpError>;
