//! The structured translation port.
//!
//! The pipeline only depends on [`TranslationProvider`]: one request per
//! batch in, one ordered list of `{key, translation}` items out. Prompt text is
//! built here so every provider sends the same instructions.

use crate::error::ProviderError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One source string to translate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceItem {
    pub key: String,
    pub text: String,
}

/// One translated string as returned by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslatedItem {
    pub key: String,
    pub translation: String,
}

/// Schema the provider must answer with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationResponse {
    pub translations: Vec<TranslatedItem>,
}

/// Everything a provider needs to translate one batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRequest {
    pub language: String,
    pub language_name: String,
    pub file_name: String,
    pub context: &'static str,
    pub items: Vec<SourceItem>,
}

impl BatchRequest {
    pub fn new(
        language: impl Into<String>,
        language_name: impl Into<String>,
        file_name: impl Into<String>,
        items: Vec<SourceItem>,
    ) -> Self {
        let file_name = file_name.into();
        Self {
            language: language.into(),
            language_name: language_name.into(),
            context: file_context(&file_name),
            file_name,
            items,
        }
    }

    pub fn system_prompt(&self) -> String {
        build_system_prompt(&self.language_name, self.context)
    }

    pub fn user_prompt(&self) -> String {
        build_user_prompt(&self.language_name, &self.items)
    }
}

#[async_trait]
pub trait TranslationProvider: Send + Sync {
    /// Translate every item of the batch, returning one item per input in the same order.
    async fn translate(&self, request: &BatchRequest) -> Result<Vec<TranslatedItem>, ProviderError>;
}

/// Describe what kind of strings a locale file holds.
pub fn file_context(file_name: &str) -> &'static str {
    match file_name {
        "chat.json" => "Chat interface labels and messages",
        "common.json" => "Common UI elements and general terms",
        "settings.json" => "Settings and configuration interface",
        "sidebar.json" => "Sidebar navigation elements",
        "promptbar.json" => "Prompt bar and search interface",
        "transcribeModal.json" => "Transcription modal dialog",
        "storage.json" => "Storage management interface",
        "terms.json" => "Terms of service and legal text",
        "markdown.json" => "Markdown editor interface",
        "agents.json" => "AI agent configuration interface",
        _ => "User interface elements",
    }
}

fn build_system_prompt(language_name: &str, context: &str) -> String {
    format!(
        r#"You are a professional translator specializing in software localization.
Translate the following English UI texts to {language}.

IMPORTANT RULES:
1. Preserve ALL placeholders exactly as they appear (e.g., {{{{name}}}}, {{{{count}}}})
2. Maintain the tone and style appropriate for a professional application
3. Use natural, idiomatic {language} expressions
4. For technical terms (API, URL, JSON, etc.), keep them as-is if commonly used in {language}
5. Ensure translations are culturally appropriate
6. Context: These are {context} for a chat application

Return one translation per input item, in the same order, with each item's 'key' unchanged."#,
        language = language_name,
        context = context
    )
}

fn build_user_prompt(language_name: &str, items: &[SourceItem]) -> String {
    // Serializing plain strings cannot fail
    let items_json = serde_json::to_string_pretty(items).unwrap_or_default();
    format!(
        "Translate these UI texts to {}:\n{}",
        language_name, items_json
    )
}
