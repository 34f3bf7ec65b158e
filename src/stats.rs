//! Run statistics.
//!
//! One [`RunStatistics`] value is owned by the orchestrator for the duration of
//! a run. Nothing here is persisted.

use std::path::Path;
use tracing::info;

/// Assumed tokens per translated string for the cost estimate
const TOKENS_PER_TRANSLATION: f64 = 50.0;

/// Assumed USD per 1000 tokens for the cost estimate
const PRICE_PER_1K_TOKENS: f64 = 0.001;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunStatistics {
    pub total_tasks: usize,
    pub translated: usize,
    pub failed: usize,
    /// Number of warning messages across all accepted translations
    pub warnings: usize,
    /// Provider requests actually sent, retries included
    pub api_calls: usize,
    pub cache_hits: usize,
    /// Advisory USD estimate computed before the run starts
    pub estimated_cost: f64,
}

impl RunStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rough cost of translating `total_tasks` in batches of `batch_size`.
    pub fn estimate_cost(total_tasks: usize, batch_size: usize) -> f64 {
        let batch_size = batch_size.max(1);
        let estimated_calls = total_tasks.div_ceil(batch_size);
        estimated_calls as f64 * PRICE_PER_1K_TOKENS * batch_size as f64 * TOKENS_PER_TRANSLATION
            / 1000.0
    }

    /// Log the end-of-run summary.
    pub fn log_summary(&self, backup_dir: &Path, dry_run: bool) {
        info!("{}", "=".repeat(60));
        info!("TRANSLATION COMPLETE{}", if dry_run { " (DRY RUN)" } else { "" });
        info!("{}", "=".repeat(60));
        info!("Total tasks: {}", self.total_tasks);
        info!("Successfully translated: {}", self.translated);
        info!("Failed: {}", self.failed);
        info!("Warnings: {}", self.warnings);
        info!("API calls made: {}", self.api_calls);
        info!("Cache hits: {}", self.cache_hits);
        info!("Estimated cost: ${:.4}", self.estimated_cost);
        if !dry_run {
            info!("Backups saved to: {}", backup_dir.display());
        }
    }
}
