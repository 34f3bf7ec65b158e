//! Merge accepted translations into locale files on disk.
//!
//! Existing non-empty values are never overwritten. Each file is backed up at
//! most once per run, before its first modification, and new contents are
//! written to a temporary file in the same directory and renamed into place.

use crate::reference::{read_locale_file, LocaleEntries};
use anyhow::{Context, Result};
use chrono::Local;
use indexmap::IndexMap;
use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

/// What happened to one locale file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateReport {
    pub path: PathBuf,
    /// Keys that were absent or empty and received a translation
    pub updated: usize,
    pub backup: Option<PathBuf>,
    /// False for dry runs and for merges that changed nothing
    pub written: bool,
}

pub struct FileUpdater {
    locales_dir: PathBuf,
    backup_dir: PathBuf,
    dry_run: bool,
    backed_up: HashSet<PathBuf>,
}

impl FileUpdater {
    /// Backups go to a timestamped directory under `backup_root`.
    pub fn new(
        locales_dir: impl Into<PathBuf>,
        backup_root: impl AsRef<Path>,
        dry_run: bool,
    ) -> Self {
        let stamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
        Self::with_backup_dir(locales_dir, backup_root.as_ref().join(stamp), dry_run)
    }

    /// Backups go to exactly `backup_dir`.
    pub fn with_backup_dir(
        locales_dir: impl Into<PathBuf>,
        backup_dir: impl Into<PathBuf>,
        dry_run: bool,
    ) -> Self {
        Self {
            locales_dir: locales_dir.into(),
            backup_dir: backup_dir.into(),
            dry_run,
            backed_up: HashSet::new(),
        }
    }

    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    /// Merge `translations` into `<locales_dir>/<language>/<file_name>`.
    pub fn update_locale_file(
        &mut self,
        language: &str,
        file_name: &str,
        translations: &IndexMap<String, String>,
    ) -> Result<UpdateReport> {
        let path = self.locales_dir.join(language).join(file_name);
        let exists = path.is_file();

        let mut entries = if exists {
            read_locale_file(&path)?
        } else {
            LocaleEntries::new()
        };

        let updated = merge_translations(&mut entries, translations);
        let mut report = UpdateReport {
            path: path.clone(),
            updated,
            backup: None,
            written: false,
        };

        if updated == 0 {
            debug!("No changes needed for {}", path.display());
            return Ok(report);
        }

        if self.dry_run {
            info!(
                "[DRY RUN] Would update {} with {} translations",
                path.display(),
                updated
            );
            return Ok(report);
        }

        if exists {
            report.backup = self.backup_file(&path, language, file_name)?;
        } else if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        write_atomically(&path, &entries)?;
        report.written = true;
        info!("Updated {} with {} translations", path.display(), updated);

        Ok(report)
    }

    /// Copy the file into the backup directory unless it was already backed up this run.
    fn backup_file(&mut self, path: &Path, language: &str, file_name: &str) -> Result<Option<PathBuf>> {
        if self.backed_up.contains(path) {
            return Ok(None);
        }

        let backup_path = self.backup_dir.join(language).join(file_name);
        if let Some(parent) = backup_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create backup directory {}", parent.display()))?;
        }
        fs::copy(path, &backup_path).with_context(|| {
            format!(
                "Failed to back up {} to {}",
                path.display(),
                backup_path.display()
            )
        })?;

        debug!("Backed up {} to {}", path.display(), backup_path.display());
        self.backed_up.insert(path.to_path_buf());
        Ok(Some(backup_path))
    }
}

/// Insert translations for keys that are absent or empty; returns how many were written.
///
/// Empty translations are skipped so the key stays pending for the next run.
pub fn merge_translations(
    existing: &mut LocaleEntries,
    translations: &IndexMap<String, String>,
) -> usize {
    let mut updated = 0;
    for (key, value) in translations {
        if value.trim().is_empty() {
            warn!("  Skipping empty translation for {}", key);
            continue;
        }
        match existing.get_mut(key) {
            Some(current) if current.is_empty() => *current = value.clone(),
            Some(_) => continue,
            None => {
                existing.insert(key.clone(), value.clone());
            }
        }
        debug!("  Updated {}: {}", key, value.chars().take(50).collect::<String>());
        updated += 1;
    }
    updated
}

fn write_atomically(path: &Path, entries: &LocaleEntries) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut content = serde_json::to_string_pretty(entries)?;
    content.push('\n');

    let mut temp = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;
    temp.write_all(content.as_bytes())?;
    temp.as_file().sync_all()?;

    // NamedTempFile is created owner-only; keep the usual file mode
    let permissions = match fs::metadata(path) {
        Ok(meta) => Some(meta.permissions()),
        Err(_) => default_permissions(),
    };
    if let Some(permissions) = permissions {
        temp.as_file().set_permissions(permissions)?;
    }

    temp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("Failed to replace {}", path.display()))?;
    Ok(())
}

#[cfg(unix)]
fn default_permissions() -> Option<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn default_permissions() -> Option<fs::Permissions> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn translations(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn setup() -> (TempDir, FileUpdater) {
        let temp = TempDir::new().unwrap();
        let updater = FileUpdater::with_backup_dir(
            temp.path().join("locales"),
            temp.path().join("backups/run"),
            false,
        );
        (temp, updater)
    }

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    // ==================== merge_translations Tests ====================

    #[test]
    fn test_merge_never_overwrites_non_empty_values() {
        let mut existing = translations(&[("greeting", "Bonjour")]);
        let updated = merge_translations(
            &mut existing,
            &translations(&[("greeting", "Salut"), ("farewell", "Au revoir")]),
        );

        assert_eq!(updated, 1);
        assert_eq!(
            existing,
            translations(&[("greeting", "Bonjour"), ("farewell", "Au revoir")])
        );
    }

    #[test]
    fn test_merge_fills_empty_values_in_place() {
        let mut existing = translations(&[("a", "A"), ("b", ""), ("c", "C")]);
        let updated = merge_translations(&mut existing, &translations(&[("b", "B")]));

        assert_eq!(updated, 1);
        let keys: Vec<_> = existing.keys().cloned().collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
        assert_eq!(existing["b"], "B");
    }

    #[test]
    fn test_merge_skips_empty_translations() {
        let mut existing = translations(&[("save", "")]);
        let updated = merge_translations(
            &mut existing,
            &translations(&[("save", ""), ("cancel", "  "), ("close", "Cerrar")]),
        );

        assert_eq!(updated, 1);
        assert_eq!(existing, translations(&[("save", ""), ("close", "Cerrar")]));
    }

    // ==================== update_locale_file Tests ====================

    #[test]
    fn test_update_existing_file_backs_up_and_writes() {
        let (temp, mut updater) = setup();
        let path = temp.path().join("locales/fr/common.json");
        write(&path, r#"{"greeting": "Bonjour", "empty": ""}"#);

        let report = updater
            .update_locale_file(
                "fr",
                "common.json",
                &translations(&[("greeting", "Salut"), ("empty", "Vide"), ("farewell", "Au revoir")]),
            )
            .unwrap();

        assert_eq!(report.updated, 2);
        assert!(report.written);
        let backup = report.backup.unwrap();
        assert_eq!(backup, temp.path().join("backups/run/fr/common.json"));
        assert_eq!(
            fs::read_to_string(&backup).unwrap(),
            r#"{"greeting": "Bonjour", "empty": ""}"#
        );

        let written = read_locale_file(&path).unwrap();
        assert_eq!(
            written,
            translations(&[("greeting", "Bonjour"), ("empty", "Vide"), ("farewell", "Au revoir")])
        );
    }

    #[test]
    fn test_update_creates_missing_file_and_directory() {
        let (temp, mut updater) = setup();

        let report = updater
            .update_locale_file("ja", "chat.json", &translations(&[("send", "送信")]))
            .unwrap();

        assert!(report.written);
        assert!(report.backup.is_none());
        let path = temp.path().join("locales/ja/chat.json");
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("送信"), "non-ASCII text should not be escaped");
        assert!(content.ends_with("}\n"));
    }

    #[test]
    fn test_update_without_changes_does_not_write_or_back_up() {
        let (temp, mut updater) = setup();
        let path = temp.path().join("locales/fr/common.json");
        write(&path, r#"{"greeting": "Bonjour"}"#);

        let report = updater
            .update_locale_file("fr", "common.json", &translations(&[("greeting", "Salut")]))
            .unwrap();

        assert_eq!(report.updated, 0);
        assert!(!report.written);
        assert!(!temp.path().join("backups").exists());
        assert_eq!(fs::read_to_string(&path).unwrap(), r#"{"greeting": "Bonjour"}"#);
    }

    #[test]
    fn test_dry_run_reports_without_touching_disk() {
        let temp = TempDir::new().unwrap();
        let mut updater = FileUpdater::with_backup_dir(
            temp.path().join("locales"),
            temp.path().join("backups/run"),
            true,
        );
        let path = temp.path().join("locales/fr/common.json");
        write(&path, r#"{"greeting": ""}"#);

        let report = updater
            .update_locale_file("fr", "common.json", &translations(&[("greeting", "Bonjour")]))
            .unwrap();
        assert_eq!(report.updated, 1);
        assert!(!report.written);

        let report = updater
            .update_locale_file("de", "common.json", &translations(&[("greeting", "Hallo")]))
            .unwrap();
        assert_eq!(report.updated, 1);

        assert_eq!(fs::read_to_string(&path).unwrap(), r#"{"greeting": ""}"#);
        assert!(!temp.path().join("locales/de").exists());
        assert!(!temp.path().join("backups").exists());
    }

    #[test]
    fn test_file_backed_up_only_once_per_run() {
        let (temp, mut updater) = setup();
        let path = temp.path().join("locales/fr/common.json");
        write(&path, r#"{"a": "", "b": ""}"#);

        let first = updater
            .update_locale_file("fr", "common.json", &translations(&[("a", "A")]))
            .unwrap();
        let second = updater
            .update_locale_file("fr", "common.json", &translations(&[("b", "B")]))
            .unwrap();

        assert!(first.backup.is_some());
        assert!(second.backup.is_none());
        // The backup still holds the pre-run contents
        let backup = fs::read_to_string(first.backup.unwrap()).unwrap();
        assert_eq!(backup, r#"{"a": "", "b": ""}"#);
    }

    #[test]
    fn test_no_temporary_files_left_behind() {
        let (temp, mut updater) = setup();
        updater
            .update_locale_file("es", "common.json", &translations(&[("save", "Guardar")]))
            .unwrap();

        let names: Vec<_> = fs::read_dir(temp.path().join("locales/es"))
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["common.json"]);
    }

    #[test]
    fn test_timestamped_backup_dir() {
        let updater = FileUpdater::new("locales", "backups", false);
        let stamp = updater
            .backup_dir()
            .file_name()
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert_eq!(stamp.len(), "20260101_120000".len());
        assert!(updater.backup_dir().starts_with("backups"));
    }
}
