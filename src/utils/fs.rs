use crate::utils::error::{BumpError, Result};
use crate::utils::logger::{LogLevel, Logger};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// A file the current run wants to (over)write, held in memory until commit.
#[derive(Debug, Clone, PartialEq)]
pub struct StagedWrite {
    pub path: PathBuf,
    pub contents: String,
}

impl StagedWrite {
    pub fn new(path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        StagedWrite {
            path: path.into(),
            contents: contents.into(),
        }
    }
}

fn write_error(path: &Path) -> impl FnOnce(std::io::Error) -> BumpError + '_ {
    move |source| BumpError::FileWrite {
        path: path.to_path_buf(),
        source,
    }
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}

/// Directories `write_atomic(path, ..)` would have to create, deepest first.
fn missing_dirs(path: &Path) -> Vec<PathBuf> {
    parent_dir(path)
        .ancestors()
        .take_while(|dir| !dir.as_os_str().is_empty() && !dir.exists())
        .map(Path::to_path_buf)
        .collect()
}

/// Writes `contents` to a temporary file next to `path`, syncs it, then
/// renames it over `path`. The target is either fully replaced or untouched.
///
/// A symlinked target is resolved first, so the link is kept and the file it
/// points to is replaced.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let target = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    let dir = parent_dir(&target);
    fs::create_dir_all(dir).map_err(write_error(path))?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(write_error(path))?;
    tmp.write_all(contents).map_err(write_error(path))?;
    tmp.as_file().sync_all().map_err(write_error(path))?;

    // NamedTempFile is created 0600; keep the target's mode instead.
    match fs::metadata(&target) {
        Ok(meta) => fs::set_permissions(tmp.path(), meta.permissions()).map_err(write_error(path))?,
        Err(_) => set_default_permissions(tmp.path()).map_err(write_error(path))?,
    }

    tmp.persist(&target).map_err(|e| write_error(path)(e.error))?;
    Ok(())
}

#[cfg(unix)]
fn set_default_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn set_default_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

/// Commits every staged write or none of them.
///
/// Current contents of each target are captured first. If a write fails,
/// targets already replaced in this call are restored (or removed when they
/// did not exist), and directories created along the way are removed again,
/// before the error is returned.
pub fn commit(writes: &[StagedWrite]) -> Result<()> {
    let mut backups: Vec<Option<Vec<u8>>> = Vec::with_capacity(writes.len());
    let mut created_dirs: Vec<PathBuf> = Vec::new();
    for w in writes {
        for dir in missing_dirs(&w.path) {
            if !created_dirs.contains(&dir) {
                created_dirs.push(dir);
            }
        }
        let backup = if w.path.is_file() {
            Some(fs::read(&w.path).map_err(|source| BumpError::FileRead {
                path: w.path.clone(),
                source,
            })?)
        } else {
            None
        };
        backups.push(backup);
    }

    for (i, w) in writes.iter().enumerate() {
        if let Err(e) = write_atomic(&w.path, w.contents.as_bytes()) {
            rollback(&writes[..i], &backups[..i]);
            remove_created_dirs(&created_dirs);
            return Err(e);
        }
    }
    Ok(())
}

fn rollback(written: &[StagedWrite], backups: &[Option<Vec<u8>>]) {
    let logger = Logger::new();
    for (w, backup) in written.iter().zip(backups).rev() {
        let restored = match backup {
            Some(bytes) => write_atomic(&w.path, bytes),
            None => fs::remove_file(&w.path).map_err(write_error(&w.path)),
        };
        match restored {
            Ok(()) => logger.log_message(
                LogLevel::Warning,
                &format!("Rolled back {}", w.path.display()),
            ),
            Err(e) => logger.log_message(
                LogLevel::Error,
                &format!("Could not roll back {}: {}", w.path.display(), e),
            ),
        }
    }
}

/// Removes directories this commit created, deepest first. Only empty ones go;
/// anything still holding files is left in place.
fn remove_created_dirs(dirs: &[PathBuf]) {
    let mut dirs = dirs.to_vec();
    dirs.sort_by_key(|d| std::cmp::Reverse(d.components().count()));
    for dir in dirs {
        let _ = fs::remove_dir(&dir);
    }
}

/// Shortens `path` for display when it lives under `base`.
pub fn display_relative(path: &Path, base: &Path) -> String {
    path.strip_prefix(base)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn write_atomic_replaces_contents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.json");
        fs::write(&path, "old").unwrap();
        write_atomic(&path, b"new").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn write_atomic_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("constants").join("version.ts");
        write_atomic(&path, b"x").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "x");
    }

    #[cfg(unix)]
    #[test]
    fn write_atomic_keeps_existing_mode() {
        use std::os::unix::fs::PermissionsExt;
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("package.json");
        fs::write(&path, "{}").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o640)).unwrap();
        write_atomic(&path, b"{ }").unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o640);
    }

    #[test]
    fn commit_writes_everything() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.json");
        let b = dir.path().join("b.json");
        fs::write(&a, "a0").unwrap();
        commit(&[StagedWrite::new(&a, "a1"), StagedWrite::new(&b, "b1")]).unwrap();
        assert_eq!(fs::read_to_string(&a).unwrap(), "a1");
        assert_eq!(fs::read_to_string(&b).unwrap(), "b1");
    }

    #[test]
    fn commit_rolls_back_on_failure() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.json");
        let created = dir.path().join("created.json");
        let blocker = dir.path().join("blocker");
        fs::write(&a, "original").unwrap();
        fs::write(&blocker, "not a directory").unwrap();

        let err = commit(&[
            StagedWrite::new(&a, "changed"),
            StagedWrite::new(&created, "new"),
            StagedWrite::new(blocker.join("version.ts"), "x"),
        ])
        .unwrap_err();

        assert!(matches!(err, BumpError::FileWrite { .. }));
        assert_eq!(fs::read_to_string(&a).unwrap(), "original");
        assert!(!created.exists());
        assert_eq!(fs::read_to_string(&blocker).unwrap(), "not a directory");
    }

    #[test]
    fn commit_rollback_removes_created_directories() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("app.json");
        let generated = dir.path().join("src").join("constants").join("version.ts");
        let blocker = dir.path().join("blocker");
        fs::write(&a, "original").unwrap();
        fs::write(&blocker, "not a directory").unwrap();

        commit(&[
            StagedWrite::new(&a, "changed"),
            StagedWrite::new(&generated, "export const APP_VERSION = \"1.0.1\";\n"),
            StagedWrite::new(blocker.join("x.json"), "{}"),
        ])
        .unwrap_err();

        assert_eq!(fs::read_to_string(&a).unwrap(), "original");
        assert!(!dir.path().join("src").exists());
    }

    #[cfg(unix)]
    #[test]
    fn write_atomic_follows_symlinks() {
        let dir = TempDir::new().unwrap();
        let real = dir.path().join("shared").join("app.json");
        fs::create_dir_all(real.parent().unwrap()).unwrap();
        fs::write(&real, "old").unwrap();
        let link = dir.path().join("app.json");
        std::os::unix::fs::symlink(&real, &link).unwrap();

        commit(&[StagedWrite::new(&link, "new")]).unwrap();

        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(fs::read_to_string(&real).unwrap(), "new");
    }

    #[test]
    fn display_relative_strips_base() {
        let base = Path::new("/work/app");
        assert_eq!(display_relative(&base.join("app.json"), base), "app.json");
        assert_eq!(display_relative(Path::new("/other/x.json"), base), "/other/x.json");
    }
}
