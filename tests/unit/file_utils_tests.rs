/*!
 * Tests for file utility functions
 */

use std::fs;
use anyhow::Result;
use icml_strings::errors::AppError;
use icml_strings::file_utils::FileManager;
use crate::common;

/// Test that file_exists returns true for existing files
#[test]
fn test_file_exists_withExistingFile_shouldReturnTrue() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let test_file = common::create_test_file(temp_dir.path(), "test_file_exists.tmp", "test content")?;

    assert!(FileManager::file_exists(&test_file));
    assert!(!FileManager::dir_exists(&test_file));

    Ok(())
}

#[test]
fn test_findIcmlFiles_withMixedFolder_shouldReturnSortedIcmlFiles() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let folder = temp_dir.path();
    common::create_test_file(folder, "b-s02.icml", "<Document/>")?;
    common::create_test_file(folder, "notes.txt", "ignore me")?;
    common::create_test_file(folder, "a-s01.icml", "<Document/>")?;
    fs::create_dir_all(folder.join("nested"))?;
    common::create_test_file(&folder.join("nested"), "c-s03.icml", "<Document/>")?;

    let files = FileManager::find_icml_files(folder)?;
    let names: Vec<String> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
        .collect();
    assert_eq!(names, vec!["a-s01.icml".to_string(), "b-s02.icml".to_string()]);

    Ok(())
}

#[test]
fn test_findIcmlFiles_withEmptyFolder_shouldReportNoFilesAtAll() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;

    let error = FileManager::find_icml_files(temp_dir.path()).unwrap_err();
    assert!(matches!(error, AppError::File(ref message) if message.contains("any files at all")));

    Ok(())
}

#[test]
fn test_findIcmlFiles_withoutIcmlFiles_shouldReportNoIcmlFiles() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_file(temp_dir.path(), "readme.md", "hi")?;

    let error = FileManager::find_icml_files(temp_dir.path()).unwrap_err();
    assert!(matches!(error, AppError::File(ref message) if message.contains("Could not find any ICML files")));

    Ok(())
}

#[test]
fn test_findIcmlFiles_withMissingFolder_shouldFail() {
    assert!(FileManager::find_icml_files("./non_existent_directory_12345").is_err());
}

#[test]
fn test_discoverLanguages_shouldKeepValidIsoStemsOnly() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    for name in ["en.json", "fr.json", "de.json", "xx.json", "notes.json", "es.txt"] {
        common::create_test_file(temp_dir.path(), name, "{}")?;
    }

    let languages = FileManager::discover_languages(temp_dir.path(), "en")?;
    assert_eq!(languages, vec!["de".to_string(), "fr".to_string()]);

    Ok(())
}

#[test]
fn test_writeToFile_withMissingParent_shouldCreateIt() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("a").join("b").join("out.json");

    FileManager::write_to_file(&path, "{}")?;
    assert_eq!(FileManager::read_to_string(&path)?, "{}");

    Ok(())
}

#[test]
fn test_appendToLogFile_shouldTimestampEachLine() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("issues.log");

    FileManager::append_to_log_file(&path, "first")?;
    FileManager::append_to_log_file(&path, "second")?;

    let content = fs::read_to_string(&path)?;
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with('[') && lines[0].ends_with("] first"));
    assert!(lines[1].ends_with("] second"));

    Ok(())
}
