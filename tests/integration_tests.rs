//! Integration tests for the locale translator
//!
//! These tests drive the full pipeline against a temporary locale tree, with
//! the OpenAI chat completions endpoint served by a mock server.

use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;
use wiremock::{
    matchers::{header, method, path},
    Mock, MockServer, Request, Respond, ResponseTemplate,
};

use locale_translator::{
    config::{Config, LanguageSelection},
    error::ReferenceMissing,
    openai::OpenAiProvider,
    orchestrator::LocaleTranslator,
};

// ==================== Test Helpers ====================

/// Answers every chat completion by prefixing each source text with the
/// target language name, keeping keys and placeholders intact.
struct PrefixTranslator;

impl Respond for PrefixTranslator {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: Value = serde_json::from_slice(&request.body).expect("request body is JSON");
        let prompt = body["messages"][1]["content"]
            .as_str()
            .expect("user prompt present");
        let (header_line, items) = prompt.split_once('\n').expect("prompt has items");
        let language = header_line
            .trim_start_matches("Translate these UI texts to ")
            .trim_end_matches(':');
        let items: Vec<Value> = serde_json::from_str(items).expect("items are JSON");

        let translations: Vec<Value> = items
            .iter()
            .map(|item| {
                json!({
                    "key": item["key"],
                    "translation": format!("{} {}", language, item["text"].as_str().unwrap()),
                })
            })
            .collect();

        ResponseTemplate::new(200).set_body_json(json!({
            "id": "chatcmpl-test",
            "object": "chat.completion",
            "choices": [{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": json!({ "translations": translations }).to_string(),
                    "refusal": null
                },
                "finish_reason": "stop"
            }]
        }))
    }
}

fn create_test_config(server: &MockServer, temp_dir: &TempDir) -> Config {
    Config {
        openai_api_key: "test-openai-key".to_string(),
        openai_model: "gpt-4o-mini".to_string(),
        openai_api_url: format!("{}/v1/chat/completions", server.uri()),
        locales_dir: temp_dir.path().join("locales"),
        reference_language: "en".to_string(),
        excluded_files: vec!["terms.json".to_string()],
        backup_dir: temp_dir.path().join("backups"),
        batch_size: 20,
        max_retries: 1,
        batch_delay: Duration::ZERO,
        dry_run: false,
        verbose: false,
        accept_warnings: true,
    }
}

fn create_translator(config: Config) -> LocaleTranslator<OpenAiProvider> {
    let provider = OpenAiProvider::from_config(&config);
    LocaleTranslator::new(config, provider).expect("reference locale should load")
}

async fn mount_translator(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("Authorization", "Bearer test-openai-key"))
        .respond_with(PrefixTranslator)
        .mount(server)
        .await;
}

fn write(locales: &Path, relative: &str, content: &str) {
    let path = locales.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn read_json(path: PathBuf) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

fn languages(codes: &[&str]) -> LanguageSelection {
    LanguageSelection::List(codes.iter().map(|c| c.to_string()).collect())
}

/// Standard tree: two reference files plus an excluded legal file.
fn create_locale_tree(temp_dir: &TempDir) -> PathBuf {
    let locales = temp_dir.path().join("locales");
    write(
        &locales,
        "en/common.json",
        r#"{"save": "Save", "cancel": "Cancel", "greeting": "Hello {{name}}"}"#,
    );
    write(&locales, "en/chat.json", r#"{"send": "Send message"}"#);
    write(&locales, "en/terms.json", r#"{"legal": "Legal text"}"#);
    write(
        &locales,
        "es/common.json",
        r#"{"save": "Guardar", "cancel": ""}"#,
    );
    locales
}

// ==================== Full Pipeline Tests ====================

#[tokio::test]
async fn test_full_run_fills_missing_and_empty_entries() {
    let server = MockServer::start().await;
    mount_translator(&server).await;
    let temp_dir = TempDir::new().unwrap();
    let locales = create_locale_tree(&temp_dir);

    let mut translator = create_translator(create_test_config(&server, &temp_dir));
    let stats = translator.run(&languages(&["es"])).await.unwrap();

    assert_eq!(stats.total_tasks, 3);
    assert_eq!(stats.translated, 3);
    assert_eq!(stats.failed, 0);
    // One request per (language, file)
    assert_eq!(stats.api_calls, 2);

    let common = read_json(locales.join("es/common.json"));
    assert_eq!(common["save"], "Guardar");
    assert_eq!(common["cancel"], "Spanish Cancel");
    assert_eq!(common["greeting"], "Spanish Hello {{name}}");

    let chat = read_json(locales.join("es/chat.json"));
    assert_eq!(chat["send"], "Spanish Send message");

    assert!(!locales.join("es/terms.json").exists());
}

#[tokio::test]
async fn test_existing_file_keeps_key_order_and_gets_backed_up() {
    let server = MockServer::start().await;
    mount_translator(&server).await;
    let temp_dir = TempDir::new().unwrap();
    let locales = create_locale_tree(&temp_dir);

    let mut translator = create_translator(create_test_config(&server, &temp_dir));
    translator.run(&languages(&["es"])).await.unwrap();

    let content = fs::read_to_string(locales.join("es/common.json")).unwrap();
    let save = content.find("\"save\"").unwrap();
    let cancel = content.find("\"cancel\"").unwrap();
    let greeting = content.find("\"greeting\"").unwrap();
    assert!(save < cancel && cancel < greeting);

    let backup = translator.backup_dir().join("es/common.json");
    assert_eq!(
        fs::read_to_string(backup).unwrap(),
        r#"{"save": "Guardar", "cancel": ""}"#
    );
    // Newly created files have nothing to back up
    assert!(!translator.backup_dir().join("es/chat.json").exists());
}

#[tokio::test]
async fn test_second_run_is_a_no_op() {
    let server = MockServer::start().await;
    mount_translator(&server).await;
    let temp_dir = TempDir::new().unwrap();
    let locales = create_locale_tree(&temp_dir);

    let mut first = create_translator(create_test_config(&server, &temp_dir));
    first.run(&languages(&["es"])).await.unwrap();
    let after_first = fs::read_to_string(locales.join("es/common.json")).unwrap();

    let mut second = create_translator(create_test_config(&server, &temp_dir));
    let stats = second.run(&languages(&["es"])).await.unwrap();

    assert_eq!(stats.total_tasks, 0);
    assert_eq!(stats.api_calls, 0);
    assert_eq!(
        fs::read_to_string(locales.join("es/common.json")).unwrap(),
        after_first
    );
}

#[tokio::test]
async fn test_dry_run_leaves_tree_untouched() {
    let server = MockServer::start().await;
    mount_translator(&server).await;
    let temp_dir = TempDir::new().unwrap();
    let locales = create_locale_tree(&temp_dir);

    let mut config = create_test_config(&server, &temp_dir);
    config.dry_run = true;
    let mut translator = create_translator(config);
    let stats = translator.run(&languages(&["es"])).await.unwrap();

    assert_eq!(stats.translated, 3);
    assert_eq!(
        fs::read_to_string(locales.join("es/common.json")).unwrap(),
        r#"{"save": "Guardar", "cancel": ""}"#
    );
    assert!(!locales.join("es/chat.json").exists());
    assert!(!temp_dir.path().join("backups").exists());
}

#[tokio::test]
async fn test_all_languages_discovers_directories() {
    let server = MockServer::start().await;
    mount_translator(&server).await;
    let temp_dir = TempDir::new().unwrap();
    let locales = create_locale_tree(&temp_dir);
    fs::create_dir_all(locales.join("fr")).unwrap();

    let mut translator = create_translator(create_test_config(&server, &temp_dir));
    let stats = translator.run(&LanguageSelection::All).await.unwrap();

    // es: 3 tasks, fr: all 4 reference keys
    assert_eq!(stats.total_tasks, 7);
    assert_eq!(
        read_json(locales.join("fr/common.json"))["save"],
        "French Save"
    );
}

#[tokio::test]
async fn test_missing_language_directory_is_skipped() {
    let server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();
    let locales = create_locale_tree(&temp_dir);

    let mut translator = create_translator(create_test_config(&server, &temp_dir));
    let stats = translator.run(&languages(&["xx"])).await.unwrap();

    assert_eq!(stats.total_tasks, 0);
    assert!(!locales.join("xx").exists());
}

// ==================== Cache Tests ====================

#[tokio::test]
async fn test_identical_strings_translated_once_per_run() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(PrefixTranslator)
        .expect(1)
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let locales = temp_dir.path().join("locales");
    write(&locales, "en/chat.json", r#"{"save": "Save"}"#);
    write(&locales, "en/common.json", r#"{"save": "Save"}"#);
    fs::create_dir_all(locales.join("de")).unwrap();

    let mut translator = create_translator(create_test_config(&server, &temp_dir));
    let stats = translator.run(&languages(&["de"])).await.unwrap();

    assert_eq!(stats.api_calls, 1);
    assert_eq!(stats.cache_hits, 1);
    assert_eq!(stats.translated, 2);
    assert_eq!(read_json(locales.join("de/common.json"))["save"], "German Save");
}

// ==================== Error Handling Tests ====================

#[tokio::test]
async fn test_missing_reference_is_fatal() {
    let server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();
    fs::create_dir_all(temp_dir.path().join("locales/es")).unwrap();

    let config = create_test_config(&server, &temp_dir);
    let provider = OpenAiProvider::from_config(&config);
    let err = LocaleTranslator::new(config, provider).err().unwrap();

    let missing = err.downcast_ref::<ReferenceMissing>().unwrap();
    assert_eq!(missing.path, temp_dir.path().join("locales/en"));
}

#[tokio::test]
async fn test_provider_errors_are_counted_not_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Invalid API key"))
        .expect(2)
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let locales = create_locale_tree(&temp_dir);

    let mut translator = create_translator(create_test_config(&server, &temp_dir));
    let stats = translator.run(&languages(&["es"])).await.unwrap();

    assert_eq!(stats.failed, 3);
    assert_eq!(stats.translated, 0);
    assert_eq!(stats.api_calls, 2);
    assert_eq!(
        fs::read_to_string(locales.join("es/common.json")).unwrap(),
        r#"{"save": "Guardar", "cancel": ""}"#
    );
}

#[tokio::test]
async fn test_malformed_locale_file_aborts_run() {
    let server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();
    let locales = create_locale_tree(&temp_dir);
    write(&locales, "es/chat.json", "{not json");

    let mut translator = create_translator(create_test_config(&server, &temp_dir));
    let err = translator.run(&languages(&["es"])).await.unwrap_err();

    assert!(format!("{:#}", err).contains("chat.json"));
}
