// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, info, warn};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

use xlifftr::app_config::{self, Config, TranslationProvider};
use xlifftr::app_controller::Controller;

/// CLI Wrapper for TranslationProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTranslationProvider {
    Google,
    #[value(name = "deepl")]
    DeepL,
    #[value(name = "libretranslate")]
    LibreTranslate,
    Ollama,
}

impl From<CliTranslationProvider> for TranslationProvider {
    fn from(cli_provider: CliTranslationProvider) -> Self {
        match cli_provider {
            CliTranslationProvider::Google => TranslationProvider::Google,
            CliTranslationProvider::DeepL => TranslationProvider::DeepL,
            CliTranslationProvider::LibreTranslate => TranslationProvider::LibreTranslate,
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

fn level_filter(level: &app_config::LogLevel) -> LevelFilter {
    match level {
        app_config::LogLevel::Error => LevelFilter::Error,
        app_config::LogLevel::Warn => LevelFilter::Warn,
        app_config::LogLevel::Info => LevelFilter::Info,
        app_config::LogLevel::Debug => LevelFilter::Debug,
        app_config::LogLevel::Trace => LevelFilter::Trace,
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate XLIFF documents (default command)
    Translate(TranslateArgs),

    /// Generate shell completions for xlifftr
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct TranslateArgs {
    /// Input XLIFF file or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: PathBuf,

    #[command(flatten)]
    options: TranslateOptions,
}

/// Options shared by the `translate` subcommand and the top-level command
#[derive(Args, Debug, Clone)]
struct TranslateOptions {
    /// Target language code; repeat for several outputs (e.g. -t en -t fr)
    #[arg(short, long = "target-language")]
    target_language: Vec<String>,

    /// Source language code, or 'auto'
    #[arg(short, long)]
    source_language: Option<String>,

    /// Translation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Model name to use for LLM providers
    #[arg(short, long)]
    model: Option<String>,

    /// Glossary CSV file (source,replacement,mode,match)
    #[arg(short, long)]
    glossary: Option<PathBuf>,

    /// Directory for the translated documents (default: next to the input)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Also replace the source text with the translation
    #[arg(long)]
    overwrite_source: bool,

    /// Delay in milliseconds between provider calls
    #[arg(long)]
    throttle_ms: Option<u64>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// xlifftr - XLIFF translator
///
/// Translates XLIFF 1.2 and 2.x documents with machine translation services
/// while keeping inline tags, placeholders and structure intact.
#[derive(Parser, Debug)]
#[command(name = "xlifftr")]
#[command(version)]
#[command(about = "Structure-preserving XLIFF translation tool")]
#[command(args_conflicts_with_subcommands = true)]
#[command(long_about = "xlifftr translates XLIFF 1.2 and 2.x documents with machine translation services.

EXAMPLES:
    xlifftr messages.xlf                         # Translate using default config
    xlifftr -t en -t es messages.xlf             # One output per target language
    xlifftr -f messages.xlf                      # Force overwrite existing files
    xlifftr -p deepl -s pt messages.xlf          # Use DeepL from Portuguese
    xlifftr -g glossary.csv -o out/ locales/     # Whole folder with a glossary
    xlifftr completions bash > xlifftr.bash      # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default
    one will be created automatically.

SUPPORTED PROVIDERS:
    google         - Google web translation endpoint (default, no key)
    deepl          - DeepL API (requires api_key or DEEPL_API_KEY)
    libretranslate - LibreTranslate server (default http://localhost:5000)
    ollama         - Local Ollama server (default http://localhost:11434)")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input XLIFF file or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: Option<PathBuf>,

    #[command(flatten)]
    options: TranslateOptions,
}

// @struct: Custom logger implementation
//
// Filtering follows `log::max_level()`, which is raised or lowered once the
// config has been read.
struct CustomLogger;

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Marker and ANSI color for a level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("✖", "1;31"),
            Level::Warn => ("▲", "1;33"),
            Level::Info => ("", "1;32"),
            Level::Debug => ("·", "1;36"),
            Level::Trace => ("…", "1;35"),
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
            let (marker, color) = Self::style_for_level(record.level());
            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "\x1B[{}m{} {} {}\x1B[0m", color, now, marker, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Info until the config says otherwise
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "xlifftr", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Translate(args)) => run_translate(args.input_path, args.options).await,
        None => {
            // Top-level arguments behave like the translate subcommand
            let input_path = cli
                .input_path
                .ok_or_else(|| anyhow!("INPUT_PATH is required when no subcommand is specified"))?;
            run_translate(input_path, cli.options).await
        }
    }
}

/// Load the config file, or write a default one when it is missing
fn load_or_create_config(config_path: &str) -> Result<Config> {
    if Path::new(config_path).exists() {
        let file = File::open(config_path)
            .with_context(|| format!("Failed to open config file: {}", config_path))?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse config file: {}", config_path))
    } else {
        warn!("Config file not found at '{}', creating default config.", config_path);
        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        std::fs::write(config_path, config_json)
            .with_context(|| format!("Failed to write default config to file: {}", config_path))?;
        Ok(config)
    }
}

/// Apply command line overrides on top of the file config
fn apply_overrides(config: &mut Config, options: &TranslateOptions) {
    if let Some(provider) = &options.provider {
        config.translation.provider = provider.clone().into();
    }

    if let Some(model) = &options.model {
        let provider_str = config.translation.provider.to_lowercase_string();
        match config
            .translation
            .available_providers
            .iter_mut()
            .find(|p| p.provider_type.eq_ignore_ascii_case(&provider_str))
        {
            Some(provider_config) => provider_config.model = model.clone(),
            None => {
                let mut provider_config = app_config::ProviderConfig::new(config.translation.provider);
                provider_config.model = model.clone();
                config.translation.available_providers.push(provider_config);
            }
        }
    }

    if let Some(source_lang) = &options.source_language {
        config.source_language = source_lang.clone();
    }
    if !options.target_language.is_empty() {
        config.target_languages = options.target_language.clone();
    }
    if let Some(glossary) = &options.glossary {
        config.document.glossary_path = Some(glossary.to_string_lossy().to_string());
    }
    if options.overwrite_source {
        config.document.overwrite_source = true;
    }
    if let Some(throttle_ms) = options.throttle_ms {
        config.translation.common.throttle_ms = throttle_ms;
    }
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }
}

async fn run_translate(input_path: PathBuf, options: TranslateOptions) -> Result<()> {
    // A level given on the command line applies before the config is read
    if let Some(cmd_log_level) = &options.log_level {
        log::set_max_level(level_filter(&cmd_log_level.clone().into()));
    }

    let mut config = load_or_create_config(&options.config_path)?;
    apply_overrides(&mut config, &options);

    config.validate().context("Configuration validation failed")?;
    log::set_max_level(level_filter(&config.log_level));

    let controller = Controller::with_config(config)?;

    let summary = if input_path.is_file() {
        controller
            .run(input_path, options.output_dir.clone(), options.force_overwrite)
            .await?
    } else if input_path.is_dir() {
        controller
            .run_folder(input_path, options.output_dir.clone(), options.force_overwrite)
            .await?
    } else {
        return Err(anyhow!("Input path does not exist: {:?}", input_path));
    };

    info!(
        "{} document(s) written, {} skipped, {} failed",
        summary.written.len(),
        summary.skipped,
        summary.failed
    );
    if summary.failed > 0 {
        return Err(anyhow!("{} translation(s) failed", summary.failed));
    }

    Ok(())
}
