/*!
 * Error types for the icml-strings application.
 *
 * This module contains custom error types for the different stages of the
 * extraction and reinsertion pipeline, using the thiserror crate for
 * ergonomic error definitions.
 */

use thiserror::Error;

/// Errors raised while turning story markup into a tree
#[derive(Error, Debug)]
pub enum MarkupError {
    /// The markup is not well-formed XML
    #[error("Malformed story markup: {0}")]
    Xml(#[from] roxmltree::Error),
}

/// Errors that make a single paragraph impossible to traverse
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// A paragraph range appears inside a character style range
    #[error("Paragraph {paragraph}, run {run}: nested ParagraphStyleRange")]
    NestedParagraph {
        /// Paragraph index within the story
        paragraph: usize,
        /// Run index within the paragraph
        run: usize,
    },

    /// A run declares more than one hyperlink destination
    #[error("Paragraph {paragraph}, run {run}: {count} hyperlink destinations in one run")]
    AmbiguousHyperlink {
        /// Paragraph index within the story
        paragraph: usize,
        /// Run index within the paragraph
        run: usize,
        /// Number of destinations found
        count: usize,
    },
}

/// Errors that can occur while writing translations back into markup
#[derive(Error, Debug)]
pub enum ReinsertError {
    /// The translated interchange document for a language is missing
    #[error("Missing translation file for language '{language}': {path}")]
    MissingTranslation {
        /// Target language code
        language: String,
        /// Expected path of the interchange document
        path: String,
    },

    /// The interchange document does not have the expected shape
    #[error("Invalid interchange document: {0}")]
    InvalidInterchange(String),

    /// The source markup could not be parsed
    #[error("Markup error: {0}")]
    Markup(#[from] MarkupError),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Invalid or incomplete configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from markup parsing
    #[error("Markup error: {0}")]
    Markup(#[from] MarkupError),

    /// Error from reinsertion
    #[error("Reinsertion error: {0}")]
    Reinsert(#[from] ReinsertError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}

impl From<serde_json::Error> for ReinsertError {
    fn from(error: serde_json::Error) -> Self {
        Self::InvalidInterchange(error.to_string())
    }
}
