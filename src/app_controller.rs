use anyhow::{Result, Context, anyhow};
use log::{error, warn, info, debug};
use std::path::{Path, PathBuf};
use indicatif::{ProgressBar, ProgressStyle};

use crate::app_config::Config;
use crate::errors::ReinsertError;
use crate::file_utils::FileManager;
use crate::story::{
    InterchangeBuilder, InterchangeDocument, ParagraphUnits, extract_units, reinsert_story, story_id_from_file_name,
};

// @module: Application controller for story extraction and reinsertion

/// Counters and issue lines collected over one batch
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    // @field: Files handled successfully
    pub processed: usize,
    // @field: Files left alone because their output exists
    pub skipped: usize,
    // @field: Files or languages that failed
    pub errors: usize,
    // @field: Translation units written or substitutions made
    pub units: usize,
    // @field: One line per reported problem
    pub issues: Vec<String>,
}

/// Main application controller
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().context("Configuration validation failed")?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn progress_bar(len: usize) -> ProgressBar {
        let progress_bar = ProgressBar::new(len as u64);
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(template_result.progress_chars("█▓▒░"));
        progress_bar
    }

    fn file_name(path: &Path) -> String {
        path.file_name()
            .map(|f| f.to_string_lossy().to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }

    // @method: Source ICML files in name order
    fn source_files(&self) -> Result<Vec<PathBuf>> {
        let folder = self.config.source_language_folder();
        let files = FileManager::find_icml_files(&folder)?;
        debug!("Found {} ICML file(s) in {:?}", files.len(), folder);
        Ok(files)
    }

    /// Extract every story of the source language into `<translations>/<lang>.json`.
    ///
    /// A file that cannot be read or parsed is reported and skipped; the
    /// document is written from the files that succeeded.
    pub fn run_extract(&self) -> Result<BatchSummary> {
        let start_time = std::time::Instant::now();
        info!(
            "Extracting {} ({}) stories from {:?}",
            self.config.source_language_name(),
            self.config.source_language,
            self.config.source_language_folder()
        );

        let files = self.source_files()?;
        let progress_bar = Self::progress_bar(files.len());
        let mut builder = InterchangeBuilder::new();
        let mut summary = BatchSummary::default();

        for path in &files {
            let file_name = Self::file_name(path);
            progress_bar.set_message(format!("Extracting: {}", file_name));
            debug!("Extracting strings from file {}", file_name);

            match self.extract_file(path) {
                Ok(paragraphs) => {
                    summary.units += paragraphs.iter().map(ParagraphUnits::unit_count).sum::<usize>();
                    builder.push_file(&story_id_from_file_name(&file_name), paragraphs);
                    summary.processed += 1;
                }
                Err(e) => {
                    error!("Error processing file {}: {:#}", file_name, e);
                    summary.issues.push(format!("{}: {:#}", file_name, e));
                    summary.errors += 1;
                }
            }
            progress_bar.inc(1);
        }
        progress_bar.finish_with_message("Extraction complete");

        let document = builder.finish();
        let output_path = self.config.interchange_path(&self.config.source_language);
        let json = document.to_json_pretty().context("Failed to serialize interchange document")?;
        FileManager::write_to_file(&output_path, &json)?;
        info!("Success: {}", output_path.display());

        self.record_summary("Extraction", &summary, start_time.elapsed());
        Ok(summary)
    }

    fn extract_file(&self, path: &Path) -> Result<Vec<ParagraphUnits>> {
        let markup = FileManager::read_to_string(path)?;
        extract_units(&markup).with_context(|| format!("Failed to parse story {:?}", path))
    }

    // @returns: Languages to reinsert, explicit or discovered
    pub fn target_languages(&self) -> Result<Vec<String>> {
        if !self.config.target_languages.is_empty() {
            return Ok(self.config.target_languages.clone());
        }
        FileManager::discover_languages(&self.config.translations_folder, &self.config.source_language)
    }

    /// Write every target language's translations back into copies of the
    /// source stories under `<output>/<lang>/`.
    pub fn run_reinsert(&self) -> Result<BatchSummary> {
        let start_time = std::time::Instant::now();
        let languages = self.target_languages()?;
        let mut summary = BatchSummary::default();

        if languages.is_empty() {
            warn!("No target languages found in {:?}", self.config.translations_folder);
            return Ok(summary);
        }

        let files = self.source_files()?;
        for language in &languages {
            info!("Reinserting {} translations", language);
            let translations = match self.load_translations(language) {
                Ok(document) => document,
                Err(e) => {
                    error!("{}", e);
                    summary.issues.push(format!("[{}] {}", language, e));
                    summary.errors += 1;
                    continue;
                }
            };

            let output_dir = self.config.output_root().join(language);
            let progress_bar = Self::progress_bar(files.len());
            for path in &files {
                let file_name = Self::file_name(path);
                progress_bar.set_message(format!("{}: {}", language, file_name));

                let output_path = output_dir.join(&file_name);
                if output_path.exists() && !self.config.force_overwrite {
                    warn!("Skipping {}, output already exists (use --force-overwrite to replace it)", output_path.display());
                    summary.skipped += 1;
                    progress_bar.inc(1);
                    continue;
                }

                match self.reinsert_file(path, &file_name, &translations, &output_path) {
                    Ok((substitutions, issues)) => {
                        summary.units += substitutions;
                        summary.processed += 1;
                        for issue in issues {
                            warn!("{} ({}): {}", file_name, language, issue);
                            summary.issues.push(format!("[{}] {}: {}", language, file_name, issue));
                        }
                    }
                    Err(e) => {
                        error!("Error processing file {}: {:#}", file_name, e);
                        summary.issues.push(format!("[{}] {}: {:#}", language, file_name, e));
                        summary.errors += 1;
                    }
                }
                progress_bar.inc(1);
            }
            progress_bar.finish_with_message(format!("{} complete", language));
        }

        self.record_summary("Reinsertion", &summary, start_time.elapsed());
        Ok(summary)
    }

    fn load_translations(&self, language: &str) -> Result<InterchangeDocument> {
        let path = self.config.interchange_path(language);
        if !FileManager::file_exists(&path) {
            return Err(anyhow!(ReinsertError::MissingTranslation {
                language: language.to_string(),
                path: path.display().to_string(),
            }));
        }
        let json = FileManager::read_to_string(&path)?;
        InterchangeDocument::from_json(&json).with_context(|| format!("Failed to load translations {:?}", path))
    }

    fn reinsert_file(
        &self,
        path: &Path,
        file_name: &str,
        translations: &InterchangeDocument,
        output_path: &Path,
    ) -> Result<(usize, Vec<String>)> {
        let markup = FileManager::read_to_string(path)?;
        let outcome = reinsert_story(&markup, &story_id_from_file_name(file_name), translations)
            .with_context(|| format!("Failed to reinsert into {:?}", path))?;
        FileManager::write_to_file(output_path, &outcome.markup)?;
        debug!("{} substitution(s) written to {}", outcome.substitutions, output_path.display());
        Ok((outcome.substitutions, outcome.issues.iter().map(ToString::to_string).collect()))
    }

    // Format duration in a human-readable format (HH:MM:SS)
    fn format_duration(duration: std::time::Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }

    // @method: Log the batch summary and append it to the issues log
    fn record_summary(&self, operation: &str, summary: &BatchSummary, duration: std::time::Duration) {
        let summary_message = format!(
            "{} completed: {} processed, {} skipped, {} errors, {} units - Duration: {}",
            operation,
            summary.processed,
            summary.skipped,
            summary.errors,
            summary.units,
            Self::format_duration(duration)
        );
        info!("{}", summary_message);

        let log_file_path = self.config.issues_log_path();
        let lines = std::iter::once(summary_message).chain(summary.issues.iter().cloned());
        for line in lines {
            if let Err(e) = FileManager::append_to_log_file(&log_file_path, &line) {
                warn!("Failed to write batch log to file: {}", e);
                return;
            }
        }
    }
}
