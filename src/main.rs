// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::{Path, PathBuf};

use sitetrans::app_config::{self, Config, TranslationProvider};
use sitetrans::app_controller::Controller;
use sitetrans::file_utils::FileManager;

/// CLI Wrapper for TranslationProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTranslationProvider {
    Google,
    Ollama,
}

impl From<CliTranslationProvider> for TranslationProvider {
    fn from(cli_provider: CliTranslationProvider) -> Self {
        match cli_provider {
            CliTranslationProvider::Google => TranslationProvider::Google,
            CliTranslationProvider::Ollama => TranslationProvider::Ollama,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate HTML documents in place (default command)
    Translate(TranslateArgs),

    /// Generate shell completions for sitetrans
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug, Default)]
struct TranslateArgs {
    /// HTML file or site directory to translate (defaults to batch.root_directory)
    #[arg(value_name = "INPUT_PATH")]
    input_path: Option<PathBuf>,

    /// Translation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Model name to use for translation (Ollama)
    #[arg(short, long)]
    model: Option<String>,

    /// Source language code (e.g., 'en', 'es', 'fr')
    #[arg(short, long)]
    source_language: Option<String>,

    /// Target language code (e.g., 'hi', 'de', 'zh-CN')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Number of documents translated at the same time
    #[arg(short = 'j', long)]
    concurrency: Option<usize>,

    /// Maximum characters sent to the provider in one request
    #[arg(long)]
    max_chunk_size: Option<usize>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// sitetrans - batch translation of static HTML sites
///
/// Walks a directory of HTML documents and translates the human-visible text of
/// each one in place, leaving markup, scripts and styles untouched.
#[derive(Parser, Debug)]
#[command(name = "sitetrans")]
#[command(version)]
#[command(about = "Translate the text of a tree of HTML documents in place")]
#[command(long_about = "sitetrans translates the human-visible text of HTML documents in place, \
several documents at a time, keeping tags, attributes, scripts and styles unchanged.

EXAMPLES:
    sitetrans ./site                           # Translate using default config (en -> hi)
    sitetrans -s en -t de ./site               # Translate from English to German
    sitetrans -j 8 -p ollama -m qwen2.5 ./site # Use a local model, 8 documents at a time
    sitetrans ./site/index.html                # Translate a single document
    sitetrans --log-level debug ./site         # Show per-document details
    sitetrans completions bash > sitetrans.bash

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.

SUPPORTED PROVIDERS:
    google - Google Translate web endpoint (default, 5000 characters per request)
    ollama - Local Ollama server (default: llama3.2:3b)")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    translate: TranslateArgs,
}

// @struct: Custom logger implementation
struct CustomLogger;

impl CustomLogger {
    // @initializes: Global logger; records are filtered by `log::max_level`
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI colour and emoji for a level
    fn decoration(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("\x1B[1;31m", "❌ "),
            Level::Warn => ("\x1B[1;33m", "🚧 "),
            Level::Info => ("\x1B[1;32m", " "),
            Level::Debug => ("\x1B[1;36m", "🔍 "),
            Level::Trace => ("\x1B[1;35m", "📋 "),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (colour, emoji) = Self::decoration(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "{}{} {} {}\x1B[0m", colour, now, emoji, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Info until the configuration says otherwise
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "sitetrans", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Translate(args)) => run_translate(args).await,
        None => run_translate(cli.translate).await,
    }
}

/// Load the configuration file, creating it with defaults when missing
fn load_config(config_path: &str) -> Result<Config> {
    if Path::new(config_path).exists() {
        let content = FileManager::read_to_string(config_path)?;
        serde_json::from_str(&content)
            .context(format!("Failed to parse config file: {}", config_path))
    } else {
        warn!("Config file not found at '{}', creating default config.", config_path);

        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;

        FileManager::write_to_file(config_path, &config_json)
            .context(format!("Failed to write default config to file: {}", config_path))?;

        Ok(config)
    }
}

/// Command-line values win over the config file
fn apply_overrides(config: &mut Config, options: &TranslateArgs) {
    if let Some(provider) = options.provider.clone() {
        config.translation.provider = provider.into();
    }
    if let Some(level) = options.log_level.clone() {
        config.log_level = level.into();
    }

    // Provider entries are edited after the provider switch so they land on the right one
    let active = config.translation.active_provider_config_mut();
    if let Some(model) = &options.model {
        active.model = model.clone();
    }
    if let Some(size) = options.max_chunk_size {
        active.max_chars_per_request = size;
    }

    if let Some(code) = &options.source_language {
        config.source_language.clone_from(code);
    }
    if let Some(code) = &options.target_language {
        config.target_language.clone_from(code);
    }
    if let Some(concurrency) = options.concurrency {
        config.batch.concurrency = concurrency;
    }
}

async fn run_translate(options: TranslateArgs) -> Result<()> {
    // A level given on the command line applies before the config is read
    if let Some(level) = &options.log_level {
        log::set_max_level(app_config::LogLevel::from(level.clone()).as_filter());
    }

    let mut config = load_config(&options.config_path)?;
    apply_overrides(&mut config, &options);

    config.validate()
        .context("Configuration validation failed")?;

    log::set_max_level(config.log_level.as_filter());

    let input_path = options
        .input_path
        .clone()
        .or_else(|| config.batch.root_directory.clone())
        .ok_or_else(|| anyhow!("INPUT_PATH is required when batch.root_directory is not configured"))?;

    let controller = Controller::with_config(config)?;

    if let Err(e) = controller.test_connection().await {
        warn!("{} - documents will keep their original text where translation fails", e);
    }

    let report = controller.run(input_path).await?;

    if report.total() > 0 && report.succeeded() == 0 {
        return Err(anyhow!("No document could be translated"));
    }

    Ok(())
}
