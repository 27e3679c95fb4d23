/*!
 * Tests for error types
 */

use icml_strings::errors::{AppError, ExtractionError, ReinsertError};
use icml_strings::story::markup::parse_story;

#[test]
fn test_markupError_shouldConvertIntoAppError() {
    let error = parse_story("<Document>").unwrap_err();
    let app_error: AppError = error.into();
    assert!(matches!(app_error, AppError::Markup(_)));
    assert!(app_error.to_string().starts_with("Markup error: Malformed story markup"));
}

#[test]
fn test_extractionError_shouldNamePosition() {
    let error = ExtractionError::AmbiguousHyperlink { paragraph: 3, run: 1, count: 2 };
    assert_eq!(error.to_string(), "Paragraph 3, run 1: 2 hyperlink destinations in one run");
}

#[test]
fn test_reinsertError_fromJsonError_shouldBeInvalidInterchange() {
    let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let error: ReinsertError = json_error.into();
    assert!(matches!(error, ReinsertError::InvalidInterchange(_)));
}

#[test]
fn test_ioError_shouldConvertIntoFileError() {
    let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
    let app_error: AppError = io_error.into();
    assert_eq!(app_error.to_string(), "File error: gone");
}
