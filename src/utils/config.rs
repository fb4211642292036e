use crate::bump::constant::DEFAULT_CONSTANT_NAME;
use crate::types::field::FieldPath;
use crate::utils::error::{BumpError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "versionbump.toml";
pub const APP_JSON: &str = "app.json";
pub const PACKAGE_JSON: &str = "package.json";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ManifestEntry {
    pub path: PathBuf,
    pub field: FieldPath,
    #[serde(default)]
    pub optional: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConstantEntry {
    pub path: PathBuf,
    #[serde(default = "default_constant_name")]
    pub name: String,
}

fn default_constant_name() -> String {
    DEFAULT_CONSTANT_NAME.to_string()
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    #[serde(rename = "manifest", default = "default_manifests")]
    pub manifests: Vec<ManifestEntry>,
    #[serde(default)]
    pub constant: Option<ConstantEntry>,
}

fn default_manifests() -> Vec<ManifestEntry> {
    vec![
        ManifestEntry {
            path: PathBuf::from(APP_JSON),
            field: FieldPath::from_keys(["expo", "version"]),
            optional: false,
        },
        ManifestEntry {
            path: PathBuf::from(PACKAGE_JSON),
            field: FieldPath::from_keys(["version"]),
            optional: true,
        },
    ]
}

impl Default for Config {
    fn default() -> Self {
        Config {
            manifests: default_manifests(),
            constant: None,
        }
    }
}

impl Config {
    /// Loads the configuration for `root`.
    ///
    /// An explicit `config_path` must exist. Otherwise `<root>/versionbump.toml`
    /// is used when present, and the built-in defaults when it is not. Relative
    /// paths in the result are resolved against `root`.
    pub fn load(root: &Path, config_path: Option<&Path>) -> Result<Self> {
        let path = match config_path {
            Some(p) => Some(p.to_path_buf()),
            None => {
                let candidate = root.join(CONFIG_FILE);
                candidate.is_file().then_some(candidate)
            }
        };

        let config = match path {
            Some(path) => {
                let text = fs::read_to_string(&path).map_err(|source| BumpError::FileRead {
                    path: path.clone(),
                    source,
                })?;
                Self::parse(&text, &path)?
            }
            None => Config::default(),
        };

        Ok(config.resolved(root))
    }

    pub fn parse(text: &str, path: &Path) -> Result<Self> {
        let config: Config = toml::from_str(text).map_err(|e| BumpError::Config {
            path: path.to_path_buf(),
            message: e.message().to_string(),
        })?;
        if config.manifests.is_empty() {
            return Err(BumpError::Config {
                path: path.to_path_buf(),
                message: "at least one [[manifest]] entry is required".into(),
            });
        }
        Ok(config)
    }

    fn resolved(mut self, root: &Path) -> Self {
        for m in &mut self.manifests {
            m.path = root.join(&m.path);
        }
        if let Some(c) = &mut self.constant {
            c.path = root.join(&c.path);
        }
        self
    }
}
