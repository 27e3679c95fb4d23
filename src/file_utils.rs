use anyhow::{Result, Context};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use std::fs::OpenOptions;
use std::io::Write;
use chrono::Local;

use crate::errors::AppError;
use crate::language_utils::is_valid_iso;

// @module: File and directory utilities

/// Extension of InCopy story files
pub const ICML_EXTENSION: &str = "icml";

/// Extension of interchange documents
pub const INTERCHANGE_EXTENSION: &str = "json";

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    // @returns: Entries directly inside a folder, sorted by file name
    fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>> {
        let mut entries = Vec::new();
        for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
            let entry = entry.context("Failed to read directory entry")?;
            entries.push(entry.into_path());
        }
        Ok(entries)
    }

    fn has_extension(path: &Path, extension: &str) -> bool {
        path.is_file()
            && path
                .extension()
                .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(extension))
    }

    /// Find the story files of a language folder, sorted by file name.
    ///
    /// An empty folder and a folder without any `.icml` file are reported
    /// as two different errors.
    pub fn find_icml_files<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>, AppError> {
        let dir = dir.as_ref();
        if !Self::dir_exists(dir) {
            return Err(AppError::File(format!("Source folder does not exist: {:?}", dir)));
        }

        let entries = Self::sorted_entries(dir).map_err(|e| AppError::File(e.to_string()))?;
        if entries.is_empty() {
            return Err(AppError::File(format!(
                "There don't seem to be any files at all in folder {:?}, let alone ICML files",
                dir
            )));
        }

        let icml_files: Vec<PathBuf> = entries
            .into_iter()
            .filter(|path| Self::has_extension(path, ICML_EXTENSION))
            .collect();
        if icml_files.is_empty() {
            return Err(AppError::File(format!("Could not find any ICML files in folder {:?}", dir)));
        }

        Ok(icml_files)
    }

    // @returns: Path of the interchange document for a language
    pub fn interchange_path<P: AsRef<Path>>(translations_folder: P, language: &str) -> PathBuf {
        translations_folder
            .as_ref()
            .join(format!("{}.{}", language, INTERCHANGE_EXTENSION))
    }

    /// Languages with an interchange document in the translations folder,
    /// sorted, `exclude` left out. Stems that are not ISO 639-1 codes are
    /// ignored.
    pub fn discover_languages<P: AsRef<Path>>(translations_folder: P, exclude: &str) -> Result<Vec<String>> {
        let languages = Self::sorted_entries(translations_folder.as_ref())?
            .into_iter()
            .filter(|path| Self::has_extension(path, INTERCHANGE_EXTENSION))
            .filter_map(|path| path.file_stem().map(|stem| stem.to_string_lossy().to_string()))
            .filter(|stem| stem != exclude && is_valid_iso(stem))
            .collect();
        Ok(languages)
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        // Ensure the parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Append content to a log file with timestamp
    pub fn append_to_log_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open log file: {:?}", path.as_ref()))?;

        writeln!(file, "[{}] {}", timestamp, content)
            .with_context(|| format!("Failed to write to log file: {:?}", path.as_ref()))?;

        Ok(())
    }
}
