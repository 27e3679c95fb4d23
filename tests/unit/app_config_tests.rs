/*!
 * Tests for application configuration
 */

use std::path::{Path, PathBuf};
use anyhow::Result;
use icml_strings::app_config::{Config, LogLevel, ISSUES_LOG_FILE};
use icml_strings::errors::AppError;
use crate::common;

#[test]
fn test_default_shouldMatchCommandLineDefaults() {
    let config = Config::default();
    assert_eq!(config.source_folder, PathBuf::from("../InCopy"));
    assert_eq!(config.source_language, "en");
    assert_eq!(config.translations_folder, PathBuf::from("../i18n"));
    assert_eq!(config.output_folder, None);
    assert_eq!(config.log_level, LogLevel::Info);
    assert!(config.validate().is_ok());
}

#[test]
fn test_validate_withInvalidSourceLanguage_shouldFail() {
    let config = Config {
        source_language: "english".to_string(),
        ..Config::default()
    };
    let error = config.validate().unwrap_err();
    assert!(matches!(error.downcast_ref::<AppError>(), Some(AppError::Config(_))));
}

#[test]
fn test_validate_withTargetEqualToSource_shouldFail() {
    let config = Config {
        target_languages: vec!["fr".to_string(), "en".to_string()],
        ..Config::default()
    };
    let error = config.validate().unwrap_err();
    assert_eq!(error.to_string(), "Configuration error: Target language 'en' is the source language");
}

#[test]
fn test_paths_shouldDeriveFromFolders() {
    let config = Config {
        source_folder: PathBuf::from("/work/InCopy"),
        translations_folder: PathBuf::from("/work/i18n"),
        ..Config::default()
    };

    assert_eq!(config.source_language_folder(), Path::new("/work/InCopy/en"));
    assert_eq!(config.interchange_path("fr"), Path::new("/work/i18n/fr.json"));
    assert_eq!(config.output_root(), Path::new("/work/InCopy"));
    assert_eq!(config.issues_log_path(), Path::new("/work/i18n").join(ISSUES_LOG_FILE));

    let with_output = Config {
        output_folder: Some(PathBuf::from("/out")),
        ..config
    };
    assert_eq!(with_output.output_root(), Path::new("/out"));
}

#[test]
fn test_fromFile_withPartialJson_shouldFillDefaults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        temp_dir.path(),
        "conf.json",
        r#"{"source_language": "de", "log_level": "debug", "target_languages": ["fr"]}"#,
    )?;

    let config = Config::from_file(&path)?;
    assert_eq!(config.source_language, "de");
    assert_eq!(config.log_level, LogLevel::Debug);
    assert_eq!(config.target_languages, vec!["fr".to_string()]);
    assert_eq!(config.source_folder, PathBuf::from("../InCopy"));
    assert_eq!(config.source_language_name(), "German");

    Ok(())
}

#[test]
fn test_fromFile_withMissingFile_shouldFail() {
    assert!(Config::from_file("./missing_config_12345.json").is_err());
}
