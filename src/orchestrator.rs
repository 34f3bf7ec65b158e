//! Drive a full translation run: analyze, batch, translate, validate, merge.

use crate::analyzer::{LocaleAnalyzer, TranslationTask};
use crate::batcher::group_into_batches;
use crate::config::{Config, LanguageSelection};
use crate::i18n::LanguageRegistry;
use crate::provider::TranslationProvider;
use crate::reference::ReferenceSet;
use crate::retry::RetryPolicy;
use crate::stats::RunStatistics;
use crate::translation::{TaskResult, TranslationCache, TranslationClient};
use crate::updater::FileUpdater;
use anyhow::Result;
use indexmap::IndexMap;
use std::path::Path;
use tokio::time::sleep;
use tracing::{error, info, warn};

/// Accepted translations of one language, grouped by file
type FileTranslations = IndexMap<String, IndexMap<String, String>>;

pub struct LocaleTranslator<P> {
    config: Config,
    reference: ReferenceSet,
    client: TranslationClient<P>,
    updater: FileUpdater,
    cache: TranslationCache,
    stats: RunStatistics,
}

impl<P: TranslationProvider> LocaleTranslator<P> {
    /// Load the reference set and prepare collaborators.
    ///
    /// Fails with [`crate::error::ReferenceMissing`] when the reference
    /// directory does not exist.
    pub fn new(config: Config, provider: P) -> Result<Self> {
        let reference = ReferenceSet::load(
            &config.locales_dir,
            &config.reference_language,
            &config.excluded_files,
        )?;
        let client = TranslationClient::new(provider, RetryPolicy::translation(config.max_retries));
        let updater = FileUpdater::new(&config.locales_dir, &config.backup_dir, config.dry_run);

        Ok(Self::from_parts(config, reference, client, updater))
    }

    pub fn from_parts(
        config: Config,
        reference: ReferenceSet,
        client: TranslationClient<P>,
        updater: FileUpdater,
    ) -> Self {
        Self {
            config,
            reference,
            client,
            updater,
            cache: TranslationCache::new(),
            stats: RunStatistics::new(),
        }
    }

    pub fn stats(&self) -> &RunStatistics {
        &self.stats
    }

    pub fn backup_dir(&self) -> &Path {
        self.updater.backup_dir()
    }

    /// Run the pipeline over the selected languages and return the statistics.
    ///
    /// Failed batches are counted and skipped; only I/O failures while
    /// reading or writing locale files abort the run.
    pub async fn run(&mut self, selection: &LanguageSelection) -> Result<RunStatistics> {
        self.stats = RunStatistics::new();

        info!("Analyzing locales for missing/empty translations...");
        let all_tasks = {
            let analyzer = LocaleAnalyzer::new(
                &self.config.locales_dir,
                self.config.reference_language.as_str(),
                &self.reference,
            );
            let languages = match selection {
                LanguageSelection::All => None,
                LanguageSelection::List(codes) => Some(codes.as_slice()),
            };
            analyzer.generate_translation_tasks(languages)?
        };

        if all_tasks.is_empty() {
            info!("No translation tasks found!");
            return Ok(self.stats.clone());
        }

        let total_tasks: usize = all_tasks.values().map(Vec::len).sum();
        self.stats.total_tasks = total_tasks;
        self.stats.estimated_cost = RunStatistics::estimate_cost(total_tasks, self.config.batch_size);
        info!(
            "Found {} total translation tasks across {} locales",
            total_tasks,
            all_tasks.len()
        );
        info!(
            "Estimated cost: ${:.2} (using {})",
            self.stats.estimated_cost, self.config.openai_model
        );

        if self.config.dry_run {
            info!("DRY RUN MODE - No files will be modified");
        }

        for (language, tasks) in &all_tasks {
            info!(
                "Processing {} ({})...",
                language,
                LanguageRegistry::get().display_name(language)
            );

            let file_translations = self.translate_language(tasks).await;

            for (file_name, translations) in &file_translations {
                if !translations.is_empty() {
                    self.updater
                        .update_locale_file(language, file_name, translations)?;
                }
            }
        }

        self.stats.log_summary(self.updater.backup_dir(), self.config.dry_run);
        Ok(self.stats.clone())
    }

    async fn translate_language(&mut self, tasks: &[TranslationTask]) -> FileTranslations {
        let batches = group_into_batches(tasks, self.config.batch_size);
        let mut file_translations = FileTranslations::new();

        for (i, batch) in batches.iter().enumerate() {
            info!(
                "  Batch {}/{}: {} items from {}",
                i + 1,
                batches.len(),
                batch.len(),
                batch[0].file_name
            );

            let requests_before = self.client.requests_sent();
            match self.client.translate_batch(batch, &mut self.cache).await {
                Ok(outcome) => {
                    self.stats.cache_hits += outcome.cache_hits;
                    for result in outcome.results {
                        self.record(result, &mut file_translations);
                    }
                }
                Err(e) => {
                    error!("  Batch failed: {}", e);
                    self.stats.failed += batch.len();
                }
            }
            self.stats.api_calls += self.client.requests_sent() - requests_before;

            // Brief delay between batches
            if i + 1 < batches.len() && !self.config.batch_delay.is_zero() {
                sleep(self.config.batch_delay).await;
            }
        }

        file_translations
    }

    fn record(&mut self, result: TaskResult, file_translations: &mut FileTranslations) {
        let TaskResult {
            task,
            translation,
            validation,
            ..
        } = result;

        if !validation.is_acceptable(self.config.accept_warnings) {
            self.stats.failed += 1;
            if validation.has_errors() {
                error!("    Failed: {}: {}", task.key, validation.errors.join(", "));
            } else {
                error!(
                    "    Rejected: {}: {}",
                    task.key,
                    validation.warnings.join(", ")
                );
            }
            return;
        }

        if translation.trim().is_empty() {
            self.stats.failed += 1;
            error!("    Failed: {}: empty translation", task.key);
            return;
        }

        self.stats.translated += 1;
        if validation.has_warnings() {
            self.stats.warnings += validation.warnings.len();
            if self.config.verbose {
                for warning in &validation.warnings {
                    warn!("    {}: {}", task.key, warning);
                }
            }
        }

        file_translations
            .entry(task.file_name)
            .or_default()
            .insert(task.key, translation);
    }
}
