use anyhow::Result;
use clap::Parser;
use locale_translator::config::{Config, LanguageSelection};
use locale_translator::openai::OpenAiProvider;
use locale_translator::orchestrator::LocaleTranslator;
use std::path::PathBuf;
use tracing::{error, info};

/// Translate missing or empty locale entries using OpenAI
#[derive(Parser, Debug)]
#[command(name = "locale-translator", version, about)]
struct Args {
    /// Comma-separated list of languages to process (e.g., "es,fr,de")
    #[arg(long, conflicts_with = "all")]
    languages: Option<String>,

    /// Process every language directory found under the locales directory
    #[arg(long)]
    all: bool,

    /// Number of items per API request
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    batch_size: Option<u32>,

    /// OpenAI model to use
    #[arg(long)]
    model: Option<String>,

    /// Show what would be translated without making changes
    #[arg(long)]
    dry_run: bool,

    /// Show detailed output, including validation warnings
    #[arg(long)]
    verbose: bool,

    /// OpenAI API key
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Locales directory (overrides LOCALES_DIR)
    #[arg(long)]
    locales_dir: Option<PathBuf>,

    /// Treat translations with validation warnings as failures
    #[arg(long)]
    reject_warnings: bool,
}

impl Args {
    fn selection(&self) -> LanguageSelection {
        if self.all {
            LanguageSelection::All
        } else if let Some(languages) = &self.languages {
            LanguageSelection::from_csv(languages)
        } else {
            LanguageSelection::defaults()
        }
    }

    fn apply(&self, config: &mut Config) {
        if let Some(batch_size) = self.batch_size {
            config.batch_size = batch_size as usize;
        }
        if let Some(model) = &self.model {
            config.openai_model = model.clone();
        }
        if let Some(locales_dir) = &self.locales_dir {
            config.locales_dir = locales_dir.clone();
        }
        config.dry_run = self.dry_run;
        config.verbose = self.verbose;
        config.accept_warnings = !self.reject_warnings;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored when the variables come from the environment)
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(format!("locale_translator={}", level).parse()?),
        )
        .init();

    let mut config = match Config::load(args.api_key.clone()) {
        Ok(config) => config,
        Err(e) => {
            error!("{:#}", e);
            std::process::exit(1);
        }
    };
    args.apply(&mut config);

    info!(
        "Translating locales in {} with {}",
        config.locales_dir.display(),
        config.openai_model
    );

    let provider = OpenAiProvider::from_config(&config);
    let mut translator = LocaleTranslator::new(config, provider)?;
    let stats = translator.run(&args.selection()).await?;

    if stats.failed > 0 {
        info!("{} translations failed; re-run to retry them", stats.failed);
    }

    Ok(())
}
