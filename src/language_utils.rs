//! Language utilities for ISO language code handling
//!
//! Interchange documents are named after ISO 639-1 (2-letter) codes. Three
//! letter codes are accepted where a user types a language, and mapped back
//! to their 2-letter form.

use anyhow::{Result, anyhow};
use isolang::Language;

/// Check whether a code is a valid ISO 639-1 code, case-sensitively.
///
/// Interchange file stems are compared as written, so `EN` is not a valid
/// stem while `en` is.
pub fn is_valid_iso(code: &str) -> bool {
    code.len() == 2 && code.chars().all(|c| c.is_ascii_lowercase()) && Language::from_639_1(code).is_some()
}

/// Normalize a language code to ISO 639-1 (2-letter) format
///
/// Accepts 2-letter codes and ISO 639-3 codes that have a 2-letter
/// equivalent.
pub fn normalize_to_part1(code: &str) -> Result<String> {
    let normalized_code = code.trim().to_lowercase();

    if normalized_code.len() == 2 {
        if Language::from_639_1(&normalized_code).is_some() {
            return Ok(normalized_code);
        }
    } else if normalized_code.len() == 3 {
        if let Some(code_639_1) = Language::from_639_3(&normalized_code).and_then(|lang| lang.to_639_1()) {
            return Ok(code_639_1.to_string());
        }
    }

    Err(anyhow!("Invalid language code: {}", code))
}

/// Validate a code that names an interchange document.
pub fn validate_language_code(code: &str) -> Result<()> {
    if is_valid_iso(code) {
        Ok(())
    } else {
        Err(anyhow!("Invalid ISO 639-1 language code: '{}'", code))
    }
}

/// Get the English language name from a code
pub fn get_language_name(code: &str) -> Result<String> {
    let normalized = normalize_to_part1(code)?;
    let lang = Language::from_639_1(&normalized)
        .ok_or_else(|| anyhow!("Failed to get language from code: {}", normalized))?;

    Ok(lang.to_name().to_string())
}
