/*!
 * Story markup parser adapter.
 *
 * Parses ICML story markup into an owned tree in a single pass. Every level
 * that can repeat in ICML (Document, Story, ParagraphStyleRange,
 * CharacterStyleRange, HyperlinkTextSource) is a `Vec`, even when only one
 * instance is present. The same pass records, for each `<Content>` leaf,
 * which element sits immediately before and after it, so that line-break
 * adjacency can be answered without walking the tree again.
 */

use std::collections::HashSet;

use roxmltree::Node;

use super::special_chars::leaf_to_portable;
use super::whitespace::preserve_whitespace;
use crate::errors::{ExtractionError, MarkupError};

const DOCUMENT: &str = "Document";
const STORY: &str = "Story";
const PARAGRAPH: &str = "ParagraphStyleRange";
const RUN: &str = "CharacterStyleRange";
const CONTENT: &str = "Content";
const BREAK: &str = "Br";
const HYPERLINK_DESTINATION: &str = "HyperlinkTextDestination";
const HYPERLINK_SOURCE: &str = "HyperlinkTextSource";

/// Text payload of a `<Content>` element.
///
/// XML only knows text, but the leaf shape still matters: numeric-looking
/// text is kept verbatim rather than normalized, and a `<Content>` holding
/// anything besides character data (elements, processing instructions such
/// as `<?ACE 18?>`, comments) is passed through with a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentLeaf {
    /// Ordinary character data
    Text(String),
    /// Character data that reads as a number, kept exactly as written
    Numeric(String),
    /// Character data interleaved with child elements
    Nested(String),
    /// No character data at all
    Empty,
}

impl ContentLeaf {
    fn from_node(node: Node) -> Self {
        if node.children().any(|child| !child.is_text()) {
            let text: String = node
                .descendants()
                .filter(|n| n.is_text())
                .filter_map(|n| n.text())
                .collect();
            return ContentLeaf::Nested(text);
        }

        let text: String = node
            .children()
            .filter(|n| n.is_text())
            .filter_map(|n| n.text())
            .collect();

        if text.is_empty() {
            ContentLeaf::Empty
        } else if looks_numeric(&text) {
            ContentLeaf::Numeric(text)
        } else {
            ContentLeaf::Text(text)
        }
    }

    /// Raw text of the leaf, if any
    pub fn raw_text(&self) -> Option<&str> {
        match self {
            ContentLeaf::Text(text) | ContentLeaf::Numeric(text) | ContentLeaf::Nested(text) => {
                Some(text)
            }
            ContentLeaf::Empty => None,
        }
    }
}

fn looks_numeric(text: &str) -> bool {
    text.chars().any(|c| c.is_ascii_digit())
        && text
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-' | '+'))
}

/// Kind of element found next to a content leaf
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SiblingKind {
    /// No element sibling on that side
    Absent,
    /// An explicit `<Br/>`
    Break,
    /// Any other element, by tag name
    Element(String),
}

impl SiblingKind {
    fn of(node: Option<Node>) -> Self {
        match node {
            None => SiblingKind::Absent,
            Some(n) if n.tag_name().name() == BREAK => SiblingKind::Break,
            Some(n) => SiblingKind::Element(n.tag_name().name().to_string()),
        }
    }
}

/// Element siblings on both sides of one content leaf
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafAdjacency {
    pub previous: SiblingKind,
    pub next: SiblingKind,
}

/// Which side of a leaf to look at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Previous,
    Next,
}

/// Position of a content leaf inside a story
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LeafPosition {
    pub paragraph: usize,
    pub run: usize,
    pub content: usize,
}

/// `<HyperlinkTextDestination>` attached to a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HyperlinkDestination {
    /// `Self` attribute
    pub self_id: Option<String>,
    /// `Name` attribute
    pub name: Option<String>,
}

/// `<HyperlinkTextSource>` inside a run, with its own content leaves
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HyperlinkSource {
    pub self_id: Option<String>,
    pub name: Option<String>,
    pub contents: Vec<ContentLeaf>,
}

/// One `<CharacterStyleRange>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunNode {
    /// Position within the paragraph
    pub index: usize,
    /// `AppliedCharacterStyle` attribute
    pub style: Option<String>,
    pub hyperlink_destination: Option<HyperlinkDestination>,
    pub hyperlink_sources: Vec<HyperlinkSource>,
    pub contents: Vec<ContentLeaf>,
    /// One entry per element of `contents`
    pub adjacency: Vec<LeafAdjacency>,
}

impl RunNode {
    fn from_node(node: Node, paragraph: usize, index: usize) -> Result<Self, ExtractionError> {
        let mut destinations = Vec::new();
        let mut hyperlink_sources = Vec::new();
        let mut contents = Vec::new();
        let mut adjacency = Vec::new();

        for child in node.children().filter(|n| n.is_element()) {
            match child.tag_name().name() {
                CONTENT => {
                    contents.push(ContentLeaf::from_node(child));
                    adjacency.push(LeafAdjacency {
                        previous: SiblingKind::of(child.prev_sibling_element()),
                        next: SiblingKind::of(child.next_sibling_element()),
                    });
                }
                HYPERLINK_DESTINATION => destinations.push(HyperlinkDestination {
                    self_id: child.attribute("Self").map(str::to_string),
                    name: child.attribute("Name").map(str::to_string),
                }),
                HYPERLINK_SOURCE => hyperlink_sources.push(HyperlinkSource {
                    self_id: child.attribute("Self").map(str::to_string),
                    name: child.attribute("Name").map(str::to_string),
                    contents: child
                        .children()
                        .filter(|n| n.is_element() && n.tag_name().name() == CONTENT)
                        .map(ContentLeaf::from_node)
                        .collect(),
                }),
                PARAGRAPH => {
                    return Err(ExtractionError::NestedParagraph { paragraph, run: index });
                }
                _ => {}
            }
        }

        if destinations.len() > 1 {
            return Err(ExtractionError::AmbiguousHyperlink {
                paragraph,
                run: index,
                count: destinations.len(),
            });
        }

        Ok(RunNode {
            index,
            style: node.attribute("AppliedCharacterStyle").map(str::to_string),
            hyperlink_destination: destinations.pop(),
            hyperlink_sources,
            contents,
            adjacency,
        })
    }

    /// Whether the element next to content leaf `content` on `side` is a `<Br/>`
    pub fn sibling_is_break(&self, content: usize, side: Side) -> bool {
        self.adjacency.get(content).is_some_and(|adjacent| {
            let kind = match side {
                Side::Previous => &adjacent.previous,
                Side::Next => &adjacent.next,
            };
            *kind == SiblingKind::Break
        })
    }
}

/// One `<ParagraphStyleRange>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParagraphNode {
    /// Position within the story
    pub index: usize,
    /// `AppliedParagraphStyle` attribute
    pub style: Option<String>,
    pub runs: Vec<RunNode>,
}

/// A paragraph that could not be traversed, kept for diagnostics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedParagraph {
    pub index: usize,
    /// The paragraph's markup as found in the (preserved) source
    pub raw: String,
    pub error: ExtractionError,
}

/// Outcome of reading one paragraph
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParagraphSlot {
    Parsed(ParagraphNode),
    Malformed(MalformedParagraph),
}

impl ParagraphSlot {
    fn from_node(node: Node, index: usize, source: &str) -> Self {
        let runs: Result<Vec<RunNode>, ExtractionError> = node
            .children()
            .filter(|n| n.is_element() && n.tag_name().name() == RUN)
            .enumerate()
            .map(|(run_index, run)| RunNode::from_node(run, index, run_index))
            .collect();

        match runs {
            Ok(runs) => ParagraphSlot::Parsed(ParagraphNode {
                index,
                style: node.attribute("AppliedParagraphStyle").map(str::to_string),
                runs,
            }),
            Err(error) => ParagraphSlot::Malformed(MalformedParagraph {
                index,
                raw: source.get(node.range()).unwrap_or_default().to_string(),
                error,
            }),
        }
    }

    pub fn index(&self) -> usize {
        match self {
            ParagraphSlot::Parsed(paragraph) => paragraph.index,
            ParagraphSlot::Malformed(malformed) => malformed.index,
        }
    }

    pub fn as_parsed(&self) -> Option<&ParagraphNode> {
        match self {
            ParagraphSlot::Parsed(paragraph) => Some(paragraph),
            ParagraphSlot::Malformed(_) => None,
        }
    }
}

/// One `<Story>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryNode {
    /// `Self` attribute
    pub self_id: Option<String>,
    pub paragraphs: Vec<ParagraphSlot>,
}

/// The `<Document>` root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentNode {
    pub stories: Vec<StoryNode>,
}

/// Parsed story markup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoryTree {
    pub documents: Vec<DocumentNode>,
}

impl StoryTree {
    /// True when Document → Story → paragraph list exists and is non-empty.
    pub fn has_paragraphs(&self) -> bool {
        !self.paragraphs().is_empty()
    }

    /// Paragraphs of the first story of the first document
    pub fn paragraphs(&self) -> &[ParagraphSlot] {
        self.documents
            .first()
            .and_then(|document| document.stories.first())
            .map(|story| story.paragraphs.as_slice())
            .unwrap_or_default()
    }

    /// Whether the element beside the leaf at `position` is a `<Br/>`.
    pub fn sibling_is_break(&self, position: LeafPosition, side: Side) -> bool {
        self.paragraphs()
            .get(position.paragraph)
            .and_then(ParagraphSlot::as_parsed)
            .and_then(|paragraph| paragraph.runs.get(position.run))
            .is_some_and(|run| run.sibling_is_break(position.content, side))
    }

    /// Every distinct translatable text of the story, in document order.
    ///
    /// Includes hyperlink source contents, which run extraction leaves out.
    pub fn text_inventory(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut inventory = Vec::new();

        let runs = self
            .paragraphs()
            .iter()
            .filter_map(ParagraphSlot::as_parsed)
            .flat_map(|paragraph| paragraph.runs.iter());

        for run in runs {
            let leaves = run
                .hyperlink_sources
                .iter()
                .flat_map(|source| source.contents.iter())
                .chain(run.contents.iter());
            for leaf in leaves {
                if let Some(text) = leaf_to_portable(leaf) {
                    if seen.insert(text.clone()) {
                        inventory.push(text);
                    }
                }
            }
        }

        inventory
    }
}

/// Parse raw story markup.
///
/// The whitespace pre-pass runs first. A root other than `<Document>` gives
/// an empty tree; markup that is not well-formed is an error.
pub fn parse_story(markup: &str) -> Result<StoryTree, MarkupError> {
    let preserved = preserve_whitespace(markup);
    let options = roxmltree::ParsingOptions {
        allow_dtd: true,
        ..roxmltree::ParsingOptions::default()
    };
    let doc = roxmltree::Document::parse_with_options(&preserved, options)?;

    let root = doc.root_element();
    if root.tag_name().name() != DOCUMENT {
        return Ok(StoryTree::default());
    }

    let stories = root
        .children()
        .filter(|n| n.is_element() && n.tag_name().name() == STORY)
        .map(|story| StoryNode {
            self_id: story.attribute("Self").map(str::to_string),
            paragraphs: story
                .children()
                .filter(|n| n.is_element() && n.tag_name().name() == PARAGRAPH)
                .enumerate()
                .map(|(index, paragraph)| ParagraphSlot::from_node(paragraph, index, &preserved))
                .collect(),
        })
        .collect();

    Ok(StoryTree {
        documents: vec![DocumentNode { stories }],
    })
}
