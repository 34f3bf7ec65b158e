//! Reference locale loading and locale file I/O helpers.

use crate::error::ReferenceMissing;
use anyhow::{Context, Result};
use indexmap::IndexMap;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Flat key → text mapping of one locale file, in file order.
pub type LocaleEntries = IndexMap<String, String>;

/// Read and parse a flat JSON locale file.
pub fn read_locale_file(path: &Path) -> Result<LocaleEntries> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read locale file {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse locale file {}", path.display()))
}

/// The reference language's file set: file name → entries.
///
/// Files are kept sorted by name so every run enumerates them in the same order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceSet {
    files: BTreeMap<String, LocaleEntries>,
}

impl ReferenceSet {
    /// Load every `*.json` file in `<locales_dir>/<reference_language>`,
    /// skipping any file named in `excluded`.
    ///
    /// Fails with [`ReferenceMissing`] when the reference directory does not exist.
    pub fn load(locales_dir: &Path, reference_language: &str, excluded: &[String]) -> Result<Self> {
        let reference_dir = locales_dir.join(reference_language);
        if !reference_dir.is_dir() {
            return Err(ReferenceMissing {
                path: reference_dir,
            }
            .into());
        }

        let mut files = BTreeMap::new();
        for path in json_files(&reference_dir)? {
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if excluded.iter().any(|name| name == file_name) {
                debug!("Skipping excluded reference file {}", file_name);
                continue;
            }
            files.insert(file_name.to_string(), read_locale_file(&path)?);
        }

        info!("Loaded {} {} reference files", files.len(), reference_language);
        Ok(Self { files })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &LocaleEntries)> {
        self.files.iter()
    }

    pub fn get(&self, file_name: &str) -> Option<&LocaleEntries> {
        self.files.get(file_name)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// List target languages: every subdirectory of `locales_dir` except the
/// reference language, sorted by code.
pub fn discover_languages(locales_dir: &Path, reference_language: &str) -> Result<Vec<String>> {
    let entries = fs::read_dir(locales_dir)
        .with_context(|| format!("Failed to list locales directory {}", locales_dir.display()))?;

    let mut languages = Vec::new();
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            if name != reference_language {
                languages.push(name.to_string());
            }
        }
    }
    languages.sort();
    Ok(languages)
}

fn json_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("Failed to list {}", dir.display()))? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            paths.push(path);
        }
    }
    Ok(paths)
}
