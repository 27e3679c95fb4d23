/*!
 * # icml-strings - text extraction and reinsertion for InCopy stories
 *
 * A Rust library for moving the translatable text of ICML story files in
 * and out of JSON interchange documents.
 *
 * ## Features
 *
 * - Extract every translatable run of a folder of ICML stories
 * - Merge styled runs into sentence-sized translation units
 * - Hand hyperlink runs to translators as inline anchors
 * - Write one interchange document per language, keyed by story,
 *   paragraph, run and content position
 * - Reinsert translated units into copies of the source stories
 * - ISO 639-1 language code validation
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `story`: ICML processing:
 *   - `story::whitespace`: Whitespace-preserving pre-pass
 *   - `story::markup`: Story tree and sibling adjacency
 *   - `story::special_chars`: Line and paragraph separator transcoding
 *   - `story::extractor`: Run records
 *   - `story::hyperlink`: Anchor fragment codec
 *   - `story::merge`: Translation unit merging
 *   - `story::interchange`: Interchange document model and JSON format
 *   - `story::reinsert`: Writing translations back into markup
 * - `app_config`: Configuration management
 * - `app_controller`: Batch extraction and reinsertion
 * - `file_utils`: File system operations
 * - `language_utils`: ISO language code utilities
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod story;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::{BatchSummary, Controller};
pub use errors::{AppError, ExtractionError, MarkupError, ReinsertError};
pub use language_utils::{get_language_name, is_valid_iso};
pub use story::{InterchangeDocument, extract_units, reinsert_story};
