use crate::bump::constant::render_constant_file;
use crate::bump::manifest::ManifestDocument;
use crate::utils::config::{Config, ManifestEntry};
use crate::utils::error::{BumpError, Result};
use crate::utils::fs::{StagedWrite, commit, display_relative};
use crate::utils::logger::{LogLevel, Logger};
use crate::utils::semver::{BumpKind, Version};
use crate::utils::spinner::run_step;
use std::path::Path;

/// A manifest whose version field has been found and validated.
#[derive(Debug, Clone)]
pub struct LoadedManifest {
    pub entry: ManifestEntry,
    pub document: ManifestDocument,
    pub raw_version: String,
    pub version: Version,
}

#[derive(Debug, Clone)]
pub struct BumpPlan {
    pub previous: Version,
    pub next: Version,
    pub writes: Vec<StagedWrite>,
}

/// Reads, cleans, parses and extracts the version of every configured
/// manifest, in order. Optional manifests that do not exist are skipped.
pub fn load_manifests(config: &Config, root: &Path) -> Result<Vec<LoadedManifest>> {
    let logger = Logger::new();
    let mut loaded = Vec::with_capacity(config.manifests.len());

    for entry in &config.manifests {
        let name = display_relative(&entry.path, root);
        if entry.optional && !entry.path.exists() {
            logger.log_message(LogLevel::Info, &format!("Skipping {} (not found)", name));
            continue;
        }

        let document = run_step(
            &format!("Reading {}", name),
            |_| format!("{} opened successfully", name),
            || ManifestDocument::load(&entry.path),
        )?;

        let raw_version = document.extract_version(&entry.field)?.to_string();
        let version: Version = raw_version.parse()?;

        loaded.push(LoadedManifest {
            entry: entry.clone(),
            document,
            raw_version,
            version,
        });
    }

    Ok(loaded)
}

fn no_manifest(config: &Config, root: &Path) -> BumpError {
    let names: Vec<String> = config
        .manifests
        .iter()
        .map(|m| display_relative(&m.path, root))
        .collect();
    BumpError::NoManifest(names.join(", "))
}

/// Computes every write a bump needs without touching the disk.
///
/// The first loaded manifest drives the new version; the others are aligned
/// to it.
pub fn plan_bump(config: &Config, root: &Path, kind: BumpKind) -> Result<BumpPlan> {
    let logger = Logger::new();
    let manifests = load_manifests(config, root)?;
    let primary = manifests
        .first()
        .ok_or_else(|| no_manifest(config, root))?;

    let previous = primary.version;
    let next = previous.bump(kind);
    let next_str = next.to_string();

    let mut writes = Vec::with_capacity(manifests.len() + 1);
    for m in &manifests {
        if m.version != previous {
            logger.log_message(
                LogLevel::Warning,
                &format!(
                    "{} is at {} while {} is at {}; aligning to {}",
                    display_relative(&m.entry.path, root),
                    m.raw_version,
                    display_relative(&primary.entry.path, root),
                    primary.raw_version,
                    next_str
                ),
            );
        }
        let updated = m
            .document
            .rewrite_version(&m.entry.field, &m.raw_version, &next_str)?;
        writes.push(StagedWrite::new(&m.entry.path, updated));
    }

    if let Some(constant) = &config.constant {
        writes.push(StagedWrite::new(
            &constant.path,
            render_constant_file(&constant.name, &next),
        ));
    }

    Ok(BumpPlan {
        previous,
        next,
        writes,
    })
}

/// Bumps every configured manifest and commits all writes together.
pub fn bump(config: &Config, root: &Path, kind: BumpKind, dry_run: bool) -> Result<BumpPlan> {
    let logger = Logger::new();
    let plan = plan_bump(config, root, kind)?;

    logger.log_message(
        LogLevel::Info,
        &format!("Current Version: {}", plan.previous),
    );
    logger.log_message(LogLevel::Info, &format!("New Version: {}", plan.next));

    let targets: Vec<String> = plan
        .writes
        .iter()
        .map(|w| display_relative(&w.path, root))
        .collect();

    if dry_run {
        logger.log_message_with_trace(
            LogLevel::Info,
            &format!("Dry run ({} bump), would update:", kind),
            targets.iter().map(String::as_str).collect(),
        );
        return Ok(plan);
    }

    run_step(
        &format!("Writing {} file(s)", plan.writes.len()),
        |_| format!("Updated {}", targets.join(", ")),
        || commit(&plan.writes),
    )?;

    logger.log_message(
        LogLevel::Success,
        &format!("{} -> {}", plan.previous, plan.next),
    );
    Ok(plan)
}

/// Logs the current version of every configured manifest.
pub fn show(config: &Config, root: &Path) -> Result<Vec<LoadedManifest>> {
    let manifests = load_manifests(config, root)?;
    if manifests.is_empty() {
        return Err(no_manifest(config, root));
    }

    let lines: Vec<String> = manifests
        .iter()
        .map(|m| {
            format!(
                "{} ({}): {}",
                display_relative(&m.entry.path, root),
                m.entry.field,
                m.version
            )
        })
        .collect();
    Logger::new().log_message_with_trace(
        LogLevel::Info,
        "Current versions",
        lines.iter().map(String::as_str).collect(),
    );
    Ok(manifests)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::config::ConstantEntry;
    use std::fs;
    use tempfile::TempDir;

    const APP_JSON: &str = "{\n  // app\n  \"expo\": {\n    \"name\": \"songbook\",\n    \"version\": \"2.0.5\"\n  }\n}\n";

    fn project(files: &[(&str, &str)]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for (name, contents) in files {
            fs::write(dir.path().join(name), contents).unwrap();
        }
        dir
    }

    fn config_for(dir: &TempDir) -> Config {
        Config::load(dir.path(), None).unwrap()
    }

    #[test]
    fn bumps_app_json_only_when_package_json_missing() {
        let dir = project(&[("app.json", APP_JSON)]);
        let plan = bump(&config_for(&dir), dir.path(), BumpKind::Patch, false).unwrap();
        assert_eq!(plan.next, Version::new(2, 0, 6));
        assert_eq!(
            fs::read_to_string(dir.path().join("app.json")).unwrap(),
            APP_JSON.replace("2.0.5", "2.0.6")
        );
        assert!(!dir.path().join("package.json").exists());
    }

    #[test]
    fn aligns_package_json_to_primary() {
        let dir = project(&[
            ("app.json", APP_JSON),
            ("package.json", "{\n  \"name\": \"songbook\",\n  \"version\": \"2.0.4\"\n}\n"),
        ]);
        bump(&config_for(&dir), dir.path(), BumpKind::Minor, false).unwrap();
        let pkg = fs::read_to_string(dir.path().join("package.json")).unwrap();
        assert_eq!(pkg, "{\n  \"name\": \"songbook\",\n  \"version\": \"2.1.0\"\n}\n");
    }

    #[test]
    fn malformed_secondary_version_leaves_everything_untouched() {
        let dir = project(&[
            ("app.json", APP_JSON),
            ("package.json", "{\"version\": \"1.2\"}"),
        ]);
        let err = bump(&config_for(&dir), dir.path(), BumpKind::Patch, false).unwrap_err();
        assert!(matches!(err, BumpError::InvalidVersionFormat(ref v) if v == "1.2"));
        assert_eq!(fs::read_to_string(dir.path().join("app.json")).unwrap(), APP_JSON);
    }

    #[test]
    fn dry_run_writes_nothing() {
        let dir = project(&[("app.json", APP_JSON)]);
        let plan = bump(&config_for(&dir), dir.path(), BumpKind::Major, true).unwrap();
        assert_eq!(plan.next, Version::new(3, 0, 0));
        assert_eq!(plan.writes.len(), 1);
        assert_eq!(fs::read_to_string(dir.path().join("app.json")).unwrap(), APP_JSON);
    }

    #[test]
    fn writes_constant_file() {
        let dir = project(&[("app.json", APP_JSON)]);
        let mut config = config_for(&dir);
        config.constant = Some(ConstantEntry {
            path: dir.path().join("constants").join("version.ts"),
            name: "APP_VERSION".into(),
        });
        bump(&config, dir.path(), BumpKind::Patch, false).unwrap();
        let generated =
            fs::read_to_string(dir.path().join("constants").join("version.ts")).unwrap();
        assert!(generated.ends_with("export const APP_VERSION = \"2.0.6\";\n"));
    }

    #[test]
    fn missing_required_manifest_is_read_error() {
        let dir = project(&[("package.json", "{\"version\": \"1.0.0\"}")]);
        let err = bump(&config_for(&dir), dir.path(), BumpKind::Patch, false).unwrap_err();
        assert!(matches!(err, BumpError::FileRead { .. }));
    }

    #[test]
    fn all_optional_and_missing_is_no_manifest() {
        let dir = project(&[]);
        let mut config = config_for(&dir);
        for m in &mut config.manifests {
            m.optional = true;
        }
        assert!(matches!(
            plan_bump(&config, dir.path(), BumpKind::Patch),
            Err(BumpError::NoManifest(_))
        ));
        assert!(matches!(show(&config, dir.path()), Err(BumpError::NoManifest(_))));
    }

    #[test]
    fn show_reports_every_manifest() {
        let dir = project(&[
            ("app.json", APP_JSON),
            ("package.json", "{\"version\": \"2.0.5\"}"),
        ]);
        let manifests = show(&config_for(&dir), dir.path()).unwrap();
        assert_eq!(manifests.len(), 2);
        assert!(manifests.iter().all(|m| m.version == Version::new(2, 0, 5)));
    }
}
