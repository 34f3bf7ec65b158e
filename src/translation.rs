use crate::analyzer::TranslationTask;
use crate::error::ProviderError;
use crate::i18n::{LanguageRegistry, TranslationValidator, ValidationResult};
use crate::provider::{BatchRequest, SourceItem, TranslatedItem, TranslationProvider};
use crate::retry::{with_retry, RetryAction, RetryPolicy};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, warn};

/// Translations produced during this run, keyed by (language, key, source text).
///
/// Entries are never invalidated; a changed source text simply misses.
#[derive(Debug, Default)]
pub struct TranslationCache {
    entries: HashMap<(String, String, String), String>,
}

impl TranslationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, task: &TranslationTask) -> Option<&String> {
        self.entries.get(&Self::cache_key(task))
    }

    pub fn insert(&mut self, task: &TranslationTask, translation: String) {
        self.entries.insert(Self::cache_key(task), translation);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn cache_key(task: &TranslationTask) -> (String, String, String) {
        (
            task.language.clone(),
            task.key.clone(),
            task.source_text.clone(),
        )
    }
}

/// A translated task together with its validation verdict.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskResult {
    pub task: TranslationTask,
    pub translation: String,
    pub validation: ValidationResult,
    /// Served from the cache rather than a fresh provider call
    pub cached: bool,
}

/// Result of translating one batch.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub results: Vec<TaskResult>,
    pub cache_hits: usize,
}

/// Why a single provider attempt did not produce an acceptable batch
enum AttemptError {
    Provider(ProviderError),
    /// The provider answered but at least one translation failed validation
    Rejected(Vec<TaskResult>),
}

impl fmt::Display for AttemptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptError::Provider(e) => write!(f, "{}", e),
            AttemptError::Rejected(results) => {
                let failed = results.iter().filter(|r| !r.validation.valid).count();
                write!(f, "{} translations failed validation", failed)
            }
        }
    }
}

/// Sends batches to a [`TranslationProvider`], validating and caching the results.
pub struct TranslationClient<P> {
    provider: P,
    policy: RetryPolicy,
    requests_sent: AtomicUsize,
}

impl<P: TranslationProvider> TranslationClient<P> {
    pub fn new(provider: P, policy: RetryPolicy) -> Self {
        Self {
            provider,
            policy,
            requests_sent: AtomicUsize::new(0),
        }
    }

    /// Total provider requests issued so far, retries included.
    pub fn requests_sent(&self) -> usize {
        self.requests_sent.load(Ordering::Relaxed)
    }

    /// Translate one batch of tasks sharing a (language, file).
    ///
    /// Cache hits are resolved without a request but still re-validated.
    /// Misses go to the provider in one request; if any returned translation
    /// fails validation the whole batch is re-sent while attempts remain, and
    /// after the last attempt the failing results are returned as-is for the
    /// caller to reject. Provider failures back off exponentially and are
    /// returned once attempts are exhausted.
    pub async fn translate_batch(
        &self,
        tasks: &[TranslationTask],
        cache: &mut TranslationCache,
    ) -> Result<BatchOutcome, ProviderError> {
        let mut outcome = BatchOutcome::default();
        let Some(first) = tasks.first() else {
            return Ok(outcome);
        };

        let mut misses = Vec::new();
        for task in tasks {
            match cache.get(task) {
                Some(translation) => {
                    let validation = TranslationValidator::validate(
                        &task.source_text,
                        translation,
                        &task.language,
                    );
                    outcome.results.push(TaskResult {
                        task: task.clone(),
                        translation: translation.clone(),
                        validation,
                        cached: true,
                    });
                    outcome.cache_hits += 1;
                }
                None => misses.push(task.clone()),
            }
        }

        if misses.is_empty() {
            debug!("All {} tasks served from cache", tasks.len());
            return Ok(outcome);
        }

        let request = BatchRequest::new(
            first.language.as_str(),
            LanguageRegistry::get().display_name(&first.language),
            first.file_name.as_str(),
            misses
                .iter()
                .map(|task| SourceItem {
                    key: task.key.clone(),
                    text: task.source_text.clone(),
                })
                .collect(),
        );

        let operation_name = format!("Translate {}/{}", first.language, first.file_name);
        let attempt = with_retry(
            &self.policy,
            &operation_name,
            || self.attempt(&request, &misses),
            |err| match err {
                AttemptError::Provider(e) if e.is_retryable() => RetryAction::Backoff,
                AttemptError::Provider(_) => RetryAction::Stop,
                AttemptError::Rejected(_) => RetryAction::After(self.policy.validation_delay),
            },
        )
        .await;

        let fresh = match attempt {
            Ok(results) => results,
            Err(AttemptError::Rejected(results)) => results,
            Err(AttemptError::Provider(e)) => return Err(e),
        };

        for result in &fresh {
            cache.insert(&result.task, result.translation.clone());
        }
        outcome.results.extend(fresh);

        Ok(outcome)
    }

    async fn attempt(
        &self,
        request: &BatchRequest,
        misses: &[TranslationTask],
    ) -> Result<Vec<TaskResult>, AttemptError> {
        self.requests_sent.fetch_add(1, Ordering::Relaxed);

        let items = self
            .provider
            .translate(request)
            .await
            .map_err(AttemptError::Provider)?;
        let translations = align_translations(misses, items).map_err(AttemptError::Provider)?;

        let results: Vec<TaskResult> = misses
            .iter()
            .zip(translations)
            .map(|(task, translation)| {
                let validation =
                    TranslationValidator::validate(&task.source_text, &translation, &task.language);
                TaskResult {
                    task: task.clone(),
                    translation,
                    validation,
                    cached: false,
                }
            })
            .collect();

        let mut rejected = false;
        for result in results.iter().filter(|r| !r.validation.valid) {
            warn!(
                "Translation validation failed for {}: {:?}",
                result.task.key, result.validation.errors
            );
            rejected = true;
        }

        if rejected {
            Err(AttemptError::Rejected(results))
        } else {
            Ok(results)
        }
    }
}

/// Match provider output to the requested tasks.
///
/// The response must contain exactly the requested keys, each once. Items are
/// matched by key, so a reordered response is still associated correctly.
/// Returns translations in task order.
pub fn align_translations(
    tasks: &[TranslationTask],
    items: Vec<TranslatedItem>,
) -> Result<Vec<String>, ProviderError> {
    let expected = tasks.len();
    let received = items.len();
    let misaligned = |detail: String| ProviderError::Misaligned {
        expected,
        received,
        detail,
    };

    if expected != received {
        return Err(misaligned("item count differs".to_string()));
    }

    let mut by_key: HashMap<String, String> = HashMap::with_capacity(received);
    for item in items {
        if by_key.contains_key(&item.key) {
            return Err(misaligned(format!("duplicate key '{}'", item.key)));
        }
        by_key.insert(item.key, item.translation);
    }

    tasks
        .iter()
        .map(|task| {
            by_key
                .remove(&task.key)
                .ok_or_else(|| misaligned(format!("missing key '{}'", task.key)))
        })
        .collect()
}
