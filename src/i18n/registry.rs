//! Language registry: known target languages and their metadata.
//!
//! The registry is an immutable table initialized once with `OnceLock`. Codes
//! missing from the table are still valid translation targets; they simply
//! fall back to the code as display name and are assumed to use Latin script.

use std::sync::OnceLock;

/// Writing system family, used by the script-appropriateness check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Script {
    Latin,
    Cyrillic,
    /// Scripts where leftover Latin letters indicate untranslated text
    NonLatin,
}

/// Metadata for a single language.
#[derive(Debug, Clone)]
pub struct LanguageConfig {
    /// Locale directory name (e.g., "en", "es", "zh")
    pub code: &'static str,

    /// English name used in provider prompts (e.g., "Spanish")
    pub name: &'static str,

    pub script: Script,
}

pub struct LanguageRegistry {
    languages: Vec<LanguageConfig>,
}

static REGISTRY: OnceLock<LanguageRegistry> = OnceLock::new();

impl LanguageRegistry {
    /// Get the global language registry instance.
    pub fn get() -> &'static LanguageRegistry {
        REGISTRY.get_or_init(|| LanguageRegistry {
            languages: default_languages(),
        })
    }

    pub fn get_by_code(&self, code: &str) -> Option<&LanguageConfig> {
        self.languages.iter().find(|lang| lang.code == code)
    }

    /// Human-readable name for prompts; unknown codes are returned unchanged.
    pub fn display_name<'a>(&self, code: &'a str) -> &'a str {
        match self.get_by_code(code) {
            Some(lang) => lang.name,
            None => code,
        }
    }

    /// Script family for a code. Unknown codes are treated as Latin.
    pub fn script(&self, code: &str) -> Script {
        self.get_by_code(code)
            .map(|lang| lang.script)
            .unwrap_or(Script::Latin)
    }

    pub fn len(&self) -> usize {
        self.languages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.languages.is_empty()
    }
}

fn lang(code: &'static str, name: &'static str, script: Script) -> LanguageConfig {
    LanguageConfig { code, name, script }
}

fn default_languages() -> Vec<LanguageConfig> {
    use Script::{Cyrillic, Latin, NonLatin};

    vec![
        lang("en", "English", Latin),
        lang("es", "Spanish", Latin),
        lang("fr", "French", Latin),
        lang("de", "German", Latin),
        lang("zh", "Chinese (Simplified)", NonLatin),
        lang("ru", "Russian", Cyrillic),
        lang("pt", "Portuguese", Latin),
        lang("ja", "Japanese", NonLatin),
        lang("ar", "Arabic", NonLatin),
        lang("hi", "Hindi", NonLatin),
        lang("it", "Italian", Latin),
        lang("ko", "Korean", NonLatin),
        lang("nl", "Dutch", Latin),
        lang("pl", "Polish", Latin),
        lang("tr", "Turkish", Latin),
        lang("vi", "Vietnamese", Latin),
        lang("th", "Thai", NonLatin),
        lang("uk", "Ukrainian", Cyrillic),
        lang("cs", "Czech", Latin),
        lang("sv", "Swedish", Latin),
        lang("ro", "Romanian", Latin),
        lang("he", "Hebrew", NonLatin),
        lang("id", "Indonesian", Latin),
        lang("fa", "Persian/Farsi", NonLatin),
        lang("bn", "Bengali", NonLatin),
        lang("ca", "Catalan", Latin),
        lang("fi", "Finnish", Latin),
        lang("am", "Amharic", NonLatin),
        lang("my", "Burmese", NonLatin),
        lang("si", "Sinhala", NonLatin),
        lang("sw", "Swahili", Latin),
        lang("te", "Telugu", NonLatin),
        lang("ur", "Urdu", NonLatin),
    ]
}
