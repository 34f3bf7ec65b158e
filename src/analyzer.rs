//! Diff analysis: find reference keys that a target language lacks or leaves empty.

use crate::reference::{discover_languages, read_locale_file, ReferenceSet};
use anyhow::Result;
use indexmap::IndexMap;
use std::path::PathBuf;
use tracing::{info, warn};

/// One unit of translation work, identified by (language, file, key).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationTask {
    pub language: String,
    pub file_name: String,
    pub key: String,
    pub source_text: String,
    /// True when the key is absent; false when present with an empty value
    pub missing: bool,
}

/// Compares target languages against a loaded [`ReferenceSet`].
pub struct LocaleAnalyzer<'a> {
    locales_dir: PathBuf,
    reference_language: String,
    reference: &'a ReferenceSet,
}

impl<'a> LocaleAnalyzer<'a> {
    pub fn new(
        locales_dir: impl Into<PathBuf>,
        reference_language: impl Into<String>,
        reference: &'a ReferenceSet,
    ) -> Self {
        Self {
            locales_dir: locales_dir.into(),
            reference_language: reference_language.into(),
            reference,
        }
    }

    /// Tasks for every missing or empty key of one language.
    ///
    /// A language without a directory yields no tasks. A missing file marks all
    /// of its reference keys as missing. Keys that only exist in the target
    /// are ignored.
    pub fn analyze(&self, language: &str) -> Result<Vec<TranslationTask>> {
        let mut tasks = Vec::new();
        let language_dir = self.locales_dir.join(language);

        if !language_dir.is_dir() {
            warn!("Locale directory not found: {}", language_dir.display());
            return Ok(tasks);
        }

        for (file_name, reference_entries) in self.reference.iter() {
            let target_path = language_dir.join(file_name);
            let target = if target_path.is_file() {
                Some(read_locale_file(&target_path)?)
            } else {
                None
            };

            for (key, source_text) in reference_entries {
                let missing = match target.as_ref().map(|entries| entries.get(key)) {
                    None | Some(None) => true,
                    Some(Some(value)) if value.is_empty() => false,
                    Some(Some(_)) => continue,
                };
                tasks.push(TranslationTask {
                    language: language.to_string(),
                    file_name: file_name.clone(),
                    key: key.clone(),
                    source_text: source_text.clone(),
                    missing,
                });
            }
        }

        Ok(tasks)
    }

    /// Analyze the given languages (or every discovered one when `None`),
    /// dropping languages that need no work.
    pub fn generate_translation_tasks(
        &self,
        languages: Option<&[String]>,
    ) -> Result<IndexMap<String, Vec<TranslationTask>>> {
        let languages = match languages {
            Some(list) => list.to_vec(),
            None => discover_languages(&self.locales_dir, &self.reference_language)?,
        };

        let mut all_tasks = IndexMap::new();
        for language in languages {
            if language == self.reference_language {
                continue;
            }
            let tasks = self.analyze(&language)?;
            if !tasks.is_empty() {
                info!("Found {} translation tasks for {}", tasks.len(), language);
                all_tasks.insert(language, tasks);
            }
        }

        Ok(all_tasks)
    }
}
