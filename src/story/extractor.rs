/*!
 * Run extraction.
 *
 * Walks paragraphs, then character style ranges, then content leaves, in
 * document order and produces one normalized record per leaf.
 */

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::markup::{ContentLeaf, LeafPosition, ParagraphNode, ParagraphSlot, Side, StoryTree};
use super::special_chars::leaf_to_portable;

/// Whether a record came from plain text or a hyperlink destination run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordKind {
    #[serde(rename = "text")]
    Plain,
    #[serde(rename = "hyperlink")]
    Hyperlink,
}

/// One content leaf, normalized.
///
/// Serialized field names are the ones found in existing `src` lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRecord {
    /// Transcoded text
    #[serde(rename = "content")]
    pub text: String,

    #[serde(rename = "type")]
    pub kind: RecordKind,

    /// Destination `Name`, hyperlinks only
    #[serde(rename = "name", default, skip_serializing_if = "Option::is_none")]
    pub anchor_title: Option<String>,

    /// Destination `Self`, hyperlinks only
    #[serde(rename = "self", default, skip_serializing_if = "Option::is_none")]
    pub anchor_id: Option<String>,

    #[serde(rename = "csrIdx")]
    pub run_index: usize,

    #[serde(rename = "contentIdx")]
    pub content_index: usize,

    /// `None` when adjacency was not computed (hyperlink records)
    #[serde(rename = "hasPrevBr", default, skip_serializing_if = "Option::is_none")]
    pub has_prev_break: Option<bool>,

    #[serde(rename = "hasNextBr", default, skip_serializing_if = "Option::is_none")]
    pub has_next_break: Option<bool>,

    #[serde(skip)]
    pub paragraph_index: usize,
}

impl RunRecord {
    /// Plain record without adjacency information
    pub fn plain(text: &str, paragraph_index: usize, run_index: usize, content_index: usize) -> Self {
        RunRecord {
            text: text.to_string(),
            kind: RecordKind::Plain,
            anchor_title: None,
            anchor_id: None,
            run_index,
            content_index,
            has_prev_break: Some(false),
            has_next_break: Some(false),
            paragraph_index,
        }
    }

    /// Set the line-break flags
    pub fn with_breaks(mut self, previous: bool, next: bool) -> Self {
        self.has_prev_break = Some(previous);
        self.has_next_break = Some(next);
        self
    }

    pub fn is_hyperlink(&self) -> bool {
        self.kind == RecordKind::Hyperlink
    }

    /// At least one alphabetic character
    pub fn has_letter(&self) -> bool {
        self.text.chars().any(char::is_alphabetic)
    }

    pub fn starts_with_non_letter(&self) -> bool {
        self.text.chars().next().is_some_and(|c| !c.is_alphabetic())
    }

    pub fn breaks_before(&self) -> bool {
        self.has_prev_break == Some(true)
    }

    pub fn breaks_after(&self) -> bool {
        self.has_next_break == Some(true)
    }

    /// Adjacency flags were computed for this record
    pub fn has_adjacency(&self) -> bool {
        self.has_prev_break.is_some() && self.has_next_break.is_some()
    }
}

/// The records of one paragraph, in document order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParagraphRecords {
    pub index: usize,
    pub records: Vec<RunRecord>,
}

/// Extract every paragraph of a story.
///
/// A story without paragraphs yields nothing. A paragraph that could not be
/// traversed is logged with its raw markup and yields no records; extraction
/// carries on with the next one.
pub fn extract(tree: &StoryTree) -> Vec<ParagraphRecords> {
    if !tree.has_paragraphs() {
        debug!("Story has no paragraphs, nothing to extract");
        return Vec::new();
    }

    tree.paragraphs()
        .iter()
        .map(|slot| match slot {
            ParagraphSlot::Parsed(paragraph) => ParagraphRecords {
                index: paragraph.index,
                records: extract_paragraph(tree, paragraph),
            },
            ParagraphSlot::Malformed(malformed) => {
                warn!("Error parsing story at paragraph style range {}: {}", malformed.index, malformed.error);
                warn!("{}", malformed.raw);
                ParagraphRecords {
                    index: malformed.index,
                    records: Vec::new(),
                }
            }
        })
        .collect()
}

fn extract_paragraph(tree: &StoryTree, paragraph: &ParagraphNode) -> Vec<RunRecord> {
    let mut records = Vec::new();

    for run in &paragraph.runs {
        if let (Some(destination), [leaf @ ContentLeaf::Text(_)]) =
            (&run.hyperlink_destination, run.contents.as_slice())
        {
            if let Some(text) = leaf_to_portable(leaf) {
                records.push(RunRecord {
                    text,
                    kind: RecordKind::Hyperlink,
                    anchor_title: destination.name.clone(),
                    anchor_id: destination.self_id.clone(),
                    run_index: run.index,
                    content_index: 0,
                    has_prev_break: None,
                    has_next_break: None,
                    paragraph_index: paragraph.index,
                });
            }
            continue;
        }

        for (content_index, leaf) in run.contents.iter().enumerate() {
            let Some(text) = leaf_to_portable(leaf) else {
                continue;
            };
            let position = LeafPosition {
                paragraph: paragraph.index,
                run: run.index,
                content: content_index,
            };
            records.push(
                RunRecord::plain(&text, paragraph.index, run.index, content_index).with_breaks(
                    tree.sibling_is_break(position, Side::Previous),
                    tree.sibling_is_break(position, Side::Next),
                ),
            );
        }
    }

    records
}
