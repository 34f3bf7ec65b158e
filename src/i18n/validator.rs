//! Translation quality validation module.
//!
//! Three independent checks run against every candidate translation:
//! placeholder integrity, length plausibility and script appropriateness.
//! Only a lost placeholder invalidates a translation; the other checks produce
//! warnings that are recorded but do not block a merge.

use crate::i18n::{LanguageRegistry, Script};
use regex::Regex;
use std::sync::OnceLock;

/// Verdict for a single translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    /// False when at least one error was recorded
    pub valid: bool,

    /// Problems that invalidate the translation
    pub errors: Vec<String>,

    /// Anomalies worth reviewing that do not invalidate the translation
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn error(&mut self, message: String) {
        self.valid = false;
        self.errors.push(message);
    }

    pub fn warn(&mut self, message: String) {
        self.warnings.push(message);
    }

    /// Combine two results: valid iff both are valid, messages concatenated in order.
    pub fn combine(mut self, other: ValidationResult) -> ValidationResult {
        self.valid = self.valid && other.valid;
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
        self
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Whether this result may be merged into a locale file.
    ///
    /// Clean results always pass. Warning-only results pass when
    /// `accept_warnings` is set.
    pub fn is_acceptable(&self, accept_warnings: bool) -> bool {
        if !self.valid || self.has_errors() {
            return false;
        }
        accept_warnings || !self.has_warnings()
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

/// Technical terms that legitimately stay in Latin script.
const TECHNICAL_TERMS: &[&str] = &[
    "API", "URL", "JSON", "HTML", "HTTP", "HTTPS", "ID", "UI", "OpenAI", "ChatGPT",
];

/// Share of Latin letters above which a non-Latin translation is suspicious.
const LATIN_REMNANT_THRESHOLD: f64 = 0.3;

static PLACEHOLDER_REGEX: OnceLock<Regex> = OnceLock::new();
static TECHNICAL_TERMS_BY_LENGTH: OnceLock<Vec<&'static str>> = OnceLock::new();

/// Validator for translation quality.
pub struct TranslationValidator;

impl TranslationValidator {
    /// Run all checks and combine their results.
    pub fn validate(source: &str, translated: &str, language: &str) -> ValidationResult {
        Self::validate_placeholders(source, translated)
            .combine(Self::validate_length(source, translated))
            .combine(Self::validate_script(translated, language))
    }

    /// Every `{{placeholder}}` in the source must survive verbatim.
    ///
    /// Missing placeholders are errors; placeholders the translation invented
    /// are only warnings.
    pub fn validate_placeholders(source: &str, translated: &str) -> ValidationResult {
        let mut result = ValidationResult::new();

        let source_placeholders = Self::extract_placeholders(source);
        let translated_placeholders = Self::extract_placeholders(translated);

        for placeholder in &source_placeholders {
            if !translated_placeholders.contains(placeholder) {
                result.error(format!("Missing placeholder {} in translation", placeholder));
            }
        }

        for placeholder in &translated_placeholders {
            if !source_placeholders.contains(placeholder) {
                result.warn(format!("Extra placeholder {} in translation", placeholder));
            }
        }

        result
    }

    /// Flag translations whose length is implausible relative to the source.
    pub fn validate_length(source: &str, translated: &str) -> ValidationResult {
        let mut result = ValidationResult::new();

        let source_len = source.chars().count();
        if source_len == 0 {
            return result;
        }
        let translated_len = translated.chars().count();

        // Very short sources are often acronyms or abbreviations
        let tolerance = if source_len <= 5 { 5.0 } else { 3.0 };
        let ratio = translated_len as f64 / source_len as f64;

        if ratio < 1.0 / tolerance || ratio > tolerance {
            result.warn(format!(
                "Translation length ratio {:.2} may be unusual (original: {} chars, translated: {} chars)",
                ratio, source_len, translated_len
            ));
        }

        result
    }

    /// Detect Latin text left behind in a translation to a non-Latin script.
    pub fn validate_script(translated: &str, language: &str) -> ValidationResult {
        let mut result = ValidationResult::new();

        if LanguageRegistry::get().script(language) != Script::NonLatin {
            return result;
        }

        let mut remaining = Self::placeholder_regex()
            .replace_all(translated, "")
            .into_owned();
        for term in Self::technical_terms() {
            remaining = remaining.replace(term, "");
        }

        let latin_chars = remaining.chars().filter(char::is_ascii_alphabetic).count();
        let total_chars = remaining.chars().filter(|c| !c.is_whitespace()).count();

        if total_chars > 0 && latin_chars as f64 / total_chars as f64 > LATIN_REMNANT_THRESHOLD {
            result.warn(format!(
                "Translation may contain untranslated English text ({}/{} Latin characters)",
                latin_chars, total_chars
            ));
        }

        result
    }

    /// Extract all `{{...}}` placeholders in order of appearance
    pub fn extract_placeholders(text: &str) -> Vec<String> {
        Self::placeholder_regex()
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect()
    }

    fn placeholder_regex() -> &'static Regex {
        PLACEHOLDER_REGEX.get_or_init(|| Regex::new(r"\{\{[^}]+\}\}").unwrap())
    }

    // Longest first so "HTTPS" is stripped before "HTTP" can leave an "S" behind
    fn technical_terms() -> &'static [&'static str] {
        TECHNICAL_TERMS_BY_LENGTH.get_or_init(|| {
            let mut terms = TECHNICAL_TERMS.to_vec();
            terms.sort_by_key(|term| std::cmp::Reverse(term.len()));
            terms
        })
    }
}
