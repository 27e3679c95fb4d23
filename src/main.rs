// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, Context};
use log::{info, warn, LevelFilter, Log, Metadata, Record, Level, SetLoggerError};
use std::path::PathBuf;
use std::io::Write;
use clap::{Args, Parser, ValueEnum, CommandFactory, Subcommand};
use clap_complete::{generate, Shell};

use icml_strings::app_config::{self, Config};
use icml_strings::Controller;

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
    /// Extract source strings into `<translations>/<lang>.json` (default command)
    Extract,

    /// Write translated strings back into copies of the source stories
    Reinsert(ReinsertArgs),

    /// Generate shell completions for icml-strings
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug, Clone)]
struct CommonArgs {
    /// Folder holding one sub-folder of ICML files per language
    #[arg(short = 'f', long, env = "ICML_FOLDER_LOCATION", global = true)]
    source_folder: Option<PathBuf>,

    /// Source language code (ISO 639-1, e.g. 'en')
    #[arg(short = 'l', long, env = "SOURCE_LANG", global = true)]
    source_lang: Option<String>,

    /// Folder holding the interchange documents
    #[arg(short = 't', long, env = "TRANSLATIONS_FOLDER", global = true)]
    translations_folder: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Set logging level
    #[arg(long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,
}

#[derive(Args, Debug, Clone)]
struct ReinsertArgs {
    /// Folder receiving `<lang>/<story>.icml` (defaults to the source folder)
    #[arg(short, long, env = "ICML_OUTPUT_FOLDER")]
    output_folder: Option<PathBuf>,

    /// Target language to reinsert; repeat for several (default: every `<lang>.json` found)
    #[arg(long = "target-lang")]
    target_langs: Vec<String>,

    /// Force overwrite of existing output files
    #[arg(long)]
    force_overwrite: bool,
}

/// icml-strings - InCopy story text extraction and reinsertion
///
/// Extracts the translatable text of ICML stories into JSON interchange
/// documents, and writes translated documents back into the stories.
#[derive(Parser, Debug)]
#[command(name = "icml-strings")]
#[command(version)]
#[command(about = "ICML story string extraction and reinsertion")]
#[command(long_about = "icml-strings reads <source-folder>/<source-lang>/*.icml and writes the
translatable text to <translations-folder>/<source-lang>.json. Translated
documents placed next to it can be written back into copies of the stories.

EXAMPLES:
    icml-strings                                   # Extract with defaults (../InCopy, en, ../i18n)
    icml-strings extract -f InCopy -l en -t i18n   # Extract from explicit folders
    icml-strings reinsert --target-lang fr         # Reinsert the French translations
    icml-strings reinsert -o out --force-overwrite # Reinsert every language into ./out
    icml-strings completions bash > icml-strings.bash

ENVIRONMENT:
    ICML_FOLDER_LOCATION, SOURCE_LANG, TRANSLATIONS_FOLDER and ICML_OUTPUT_FOLDER
    are read when the matching flag is not given.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Shared by every subcommand, accepted before or after its name
    #[command(flatten)]
    common: CommonArgs,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color and emoji for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("1;31", "❌ "),
            Level::Warn => ("1;33", "🚧 "),
            Level::Info => ("1;32", " "),
            Level::Debug => ("1;36", "🔍 "),
            Level::Trace => ("1;35", "📋 "),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (color, emoji) = Self::style_for_level(record.level());
            let _ = writeln!(
                std::io::stderr(),
                "\x1B[{}m{} {} {}\x1B[0m",
                color, now, emoji, record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
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

fn main() -> Result<()> {
    // Trace is the ceiling; the effective level is set once config is loaded
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "icml-strings", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Reinsert(args)) => run_reinsert(&cli.common, args),
        Some(Commands::Extract) | None => run_extract(&cli.common),
    }
}

/// Build the configuration from the optional file, then the flags.
fn load_config(args: &CommonArgs) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    if let Some(source_folder) = &args.source_folder {
        config.source_folder = source_folder.clone();
    }
    if let Some(source_lang) = &args.source_lang {
        config.source_language = source_lang.clone();
    }
    if let Some(translations_folder) = &args.translations_folder {
        config.translations_folder = translations_folder.clone();
    }
    if let Some(log_level) = &args.log_level {
        config.log_level = log_level.clone().into();
    }

    log::set_max_level(level_filter(&config.log_level));
    Ok(config)
}

fn run_extract(common: &CommonArgs) -> Result<()> {
    let config = load_config(common)?;
    let controller = Controller::with_config(config)?;
    let summary = controller.run_extract()?;
    if summary.errors > 0 {
        warn!("{} file(s) could not be extracted", summary.errors);
    }
    Ok(())
}

fn run_reinsert(common: &CommonArgs, args: ReinsertArgs) -> Result<()> {
    let mut config = load_config(common)?;
    if args.output_folder.is_some() {
        config.output_folder = args.output_folder;
    }
    if !args.target_langs.is_empty() {
        config.target_languages = args.target_langs;
    }
    config.force_overwrite |= args.force_overwrite;

    let controller = Controller::with_config(config)?;
    let summary = controller
        .run_reinsert()
        .context("Reinsertion failed")?;
    info!(
        "{} file(s) written, {} substitution(s), {} issue(s)",
        summary.processed,
        summary.units,
        summary.issues.len()
    );
    Ok(())
}
