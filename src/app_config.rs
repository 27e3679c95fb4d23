use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::errors::AppError;
use crate::file_utils::FileManager;
use crate::language_utils::{get_language_name, validate_language_code};

/// Application configuration module
///
/// Settings come from an optional JSON file, then command-line flags and
/// their environment fallbacks override them.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Folder holding one sub-folder of ICML files per language
    #[serde(default = "default_source_folder")]
    pub source_folder: PathBuf,

    /// Source language code (ISO 639-1)
    #[serde(default = "default_source_language")]
    pub source_language: String,

    /// Folder holding the `<lang>.json` interchange documents
    #[serde(default = "default_translations_folder")]
    pub translations_folder: PathBuf,

    /// Where reinserted stories go; the source folder when unset
    #[serde(default)]
    pub output_folder: Option<PathBuf>,

    /// Languages to reinsert; discovered from the translations folder when empty
    #[serde(default)]
    pub target_languages: Vec<String>,

    /// Replace existing output files
    #[serde(default)]
    pub force_overwrite: bool,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_source_folder() -> PathBuf {
    PathBuf::from("../InCopy")
}

fn default_source_language() -> String {
    "en".to_string()
}

fn default_translations_folder() -> PathBuf {
    PathBuf::from("../i18n")
}

/// File name of the batch issues log inside the translations folder
pub const ISSUES_LOG_FILE: &str = "icml-strings.issues.log";

impl Config {
    /// Load a configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {:?}", path))?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        validate_language_code(&self.source_language).map_err(|e| {
            AppError::Config(format!("Source language must be a lowercase ISO 639-1 code: {}", e))
        })?;

        for target in &self.target_languages {
            validate_language_code(target).map_err(|e| {
                AppError::Config(format!("Target languages must be lowercase ISO 639-1 codes: {}", e))
            })?;
            if *target == self.source_language {
                return Err(AppError::Config(format!("Target language '{}' is the source language", target)).into());
            }
        }

        Ok(())
    }

    // @returns: English name of the source language
    pub fn source_language_name(&self) -> String {
        get_language_name(&self.source_language).unwrap_or_else(|_| self.source_language.clone())
    }

    // @returns: Folder holding the source language's story files
    pub fn source_language_folder(&self) -> PathBuf {
        self.source_folder.join(&self.source_language)
    }

    // @returns: Interchange document path for a language
    pub fn interchange_path(&self, language: &str) -> PathBuf {
        FileManager::interchange_path(&self.translations_folder, language)
    }

    // @returns: Folder receiving `<lang>/<file>.icml` outputs
    pub fn output_root(&self) -> &Path {
        self.output_folder.as_deref().unwrap_or(&self.source_folder)
    }

    pub fn issues_log_path(&self) -> PathBuf {
        self.translations_folder.join(ISSUES_LOG_FILE)
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            source_folder: default_source_folder(),
            source_language: default_source_language(),
            translations_folder: default_translations_folder(),
            output_folder: None,
            target_languages: Vec::new(),
            force_overwrite: false,
            log_level: LogLevel::default(),
        }
    }
}
