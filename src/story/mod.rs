/*!
 * ICML story processing.
 *
 * Raw markup goes through the whitespace pre-pass and the parser adapter,
 * then run extraction and merging, and ends up as interchange units.
 */

pub mod extractor;
pub mod hyperlink;
pub mod interchange;
pub mod markup;
pub mod merge;
pub mod reinsert;
pub mod special_chars;
pub mod whitespace;

pub use extractor::{ParagraphRecords, RecordKind, RunRecord, extract};
pub use interchange::{
    InterchangeBuilder, InterchangeDocument, ParagraphUnits, RunKey, Story, TranslationUnit, UnitKey,
    story_id_from_file_name,
};
pub use markup::{StoryTree, parse_story};
pub use merge::{merge_paragraph, merge_story};
pub use reinsert::{ReinsertIssue, ReinsertOutcome, StoryRewriter, reinsert_story};

use crate::errors::MarkupError;

/// Parse, extract and merge one story's markup.
///
/// Paragraphs without any record are left out.
pub fn extract_units(markup: &str) -> Result<Vec<ParagraphUnits>, MarkupError> {
    let tree = parse_story(markup)?;
    Ok(merge_story(extract(&tree)))
}
