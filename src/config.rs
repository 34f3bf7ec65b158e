use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_LOCALES_DIR: &str = "public/locales";
pub const DEFAULT_REFERENCE_LANGUAGE: &str = "en";
pub const DEFAULT_BATCH_SIZE: usize = 20;

/// Languages processed when the caller names neither a list nor `--all`.
pub const DEFAULT_LANGUAGES: &[&str] = &[
    "es", "fr", "de", "zh", "ru", "pt", "ja", "ar", "hi", "it", "ko", "nl",
];

/// Which target languages a run should cover.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LanguageSelection {
    /// Every subdirectory of the locales directory except the reference language
    All,
    /// An explicit list of language codes
    List(Vec<String>),
}

impl LanguageSelection {
    /// Parse a comma-separated list such as `"es, fr,de"`.
    pub fn from_csv(value: &str) -> Self {
        LanguageSelection::List(
            value
                .split(',')
                .map(str::trim)
                .filter(|code| !code.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn defaults() -> Self {
        LanguageSelection::List(DEFAULT_LANGUAGES.iter().map(|c| c.to_string()).collect())
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    // OpenAI
    pub openai_api_key: String,
    pub openai_model: String,
    pub openai_api_url: String,

    // Locale tree
    pub locales_dir: PathBuf,
    pub reference_language: String,
    pub excluded_files: Vec<String>,
    pub backup_dir: PathBuf,

    // Batching
    pub batch_size: usize,
    pub max_retries: u32,
    pub batch_delay: Duration,

    // Behaviour
    pub dry_run: bool,
    pub verbose: bool,
    pub accept_warnings: bool,
}

impl Config {
    /// Load configuration from the environment.
    ///
    /// `api_key` takes precedence over `OPENAI_API_KEY`; a run without either
    /// is rejected here, before any locale file is read.
    pub fn load(api_key: Option<String>) -> Result<Self> {
        let openai_api_key = api_key
            .filter(|key| !key.trim().is_empty())
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .filter(|key| !key.trim().is_empty())
            .context("OpenAI API key not provided. Set OPENAI_API_KEY or use --api-key")?;

        Ok(Self {
            openai_api_key,
            openai_model: std::env::var("OPENAI_MODEL")
                .unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            openai_api_url: std::env::var("OPENAI_API_URL")
                .unwrap_or_else(|_| DEFAULT_API_URL.to_string()),

            locales_dir: std::env::var("LOCALES_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_LOCALES_DIR)),
            reference_language: std::env::var("REFERENCE_LANGUAGE")
                .unwrap_or_else(|_| DEFAULT_REFERENCE_LANGUAGE.to_string()),
            excluded_files: vec!["terms.json".to_string()],
            backup_dir: std::env::var("BACKUP_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("backups")),

            batch_size: std::env::var("BATCH_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|size| *size > 0)
                .unwrap_or(DEFAULT_BATCH_SIZE),
            max_retries: std::env::var("MAX_RETRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(3),
            batch_delay: Duration::from_millis(
                std::env::var("BATCH_DELAY_MS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(500),
            ),

            dry_run: false,
            verbose: false,
            accept_warnings: true,
        })
    }
}
