use crate::utils::config::{APP_JSON, CONFIG_FILE};
use std::{
    env,
    path::{Path, PathBuf},
};

/// Returns the current working directory.
pub fn get_cwd() -> PathBuf {
    env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

/// Returns true if the given directory looks like a project root.
/// A `versionbump.toml` wins, but an `app.json` is enough.
pub fn is_project_root(dir: &Path) -> bool {
    dir.join(CONFIG_FILE).is_file() || dir.join(APP_JSON).is_file()
}

/// Walks upward from `start` to locate the first directory considered a project root.
pub fn find_project_root_from(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| is_project_root(dir))
        .map(Path::to_path_buf)
}

/// Resolves the directory manifests are relative to: the explicit `--root`,
/// else the nearest project root above the cwd, else the cwd itself.
pub fn resolve_root(explicit: Option<&Path>) -> PathBuf {
    if let Some(root) = explicit {
        return root.to_path_buf();
    }
    let cwd = get_cwd();
    find_project_root_from(&cwd).unwrap_or(cwd)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn finds_nearest_root_upwards() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("app.json"), "{}").unwrap();
        let nested = dir.path().join("scripts").join("version");
        fs::create_dir_all(&nested).unwrap();
        assert_eq!(find_project_root_from(&nested), Some(dir.path().to_path_buf()));
    }

    #[test]
    fn explicit_root_wins() {
        let root = resolve_root(Some(Path::new("/some/where")));
        assert_eq!(root, PathBuf::from("/some/where"));
    }
}
