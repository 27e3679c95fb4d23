/*!
 * Interchange document model.
 *
 * Extraction results are held as stories owning paragraphs owning units, and
 * only turned into the nested JSON mapping
 * `Story_<id> → PSR_<n> → CSR_<r> | CSR_html_<r> → Content_<c>` at the file
 * boundary. Every key is a function of story id and paragraph/run/content
 * position, so repeated runs over the same input produce identical files.
 */

use std::fmt;
use std::str::FromStr;

use log::warn;
use serde::ser::{Error as _, SerializeMap};
use serde::{Serialize, Serializer};
use serde_json::Value;

use super::extractor::RunRecord;
use super::hyperlink::{anchor_fragment, is_anchor_fragment, parse_anchor};
use crate::errors::ReinsertError;

/// Reserved paragraph key holding the unmerged record list
pub const SRC_KEY: &str = "src";

const STORY_PREFIX: &str = "Story_";
const PARAGRAPH_PREFIX: &str = "PSR_";
const CONTENT_PREFIX: &str = "Content_";

/// Story id of a source file: the text after the last hyphen, up to the
/// first dot. A name without a hyphen gives its whole stem.
pub fn story_id_from_file_name(file_name: &str) -> String {
    let after_hyphen = match file_name.rfind('-') {
        Some(separator) => &file_name[separator + 1..],
        None => file_name,
    };
    after_hyphen.split('.').next().unwrap_or_default().to_string()
}

/// Run-level key of a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunKey {
    Plain(usize),
    Hyperlink(usize),
}

impl RunKey {
    pub fn run_index(&self) -> usize {
        match self {
            RunKey::Plain(index) | RunKey::Hyperlink(index) => *index,
        }
    }
}

impl fmt::Display for RunKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunKey::Plain(index) => write!(f, "CSR_{}", index),
            RunKey::Hyperlink(index) => write!(f, "CSR_html_{}", index),
        }
    }
}

impl FromStr for RunKey {
    type Err = ReinsertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ReinsertError::InvalidInterchange(format!("Invalid run key: {}", s));
        if let Some(index) = s.strip_prefix("CSR_html_") {
            return index.parse().map(RunKey::Hyperlink).map_err(|_| invalid());
        }
        s.strip_prefix("CSR_")
            .and_then(|index| index.parse().ok())
            .map(RunKey::Plain)
            .ok_or_else(invalid)
    }
}

/// Full key of a unit inside its paragraph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UnitKey {
    pub run: RunKey,
    pub content: usize,
}

impl UnitKey {
    pub fn for_record(record: &RunRecord) -> Self {
        let run = if record.is_hyperlink() {
            RunKey::Hyperlink(record.run_index)
        } else {
            RunKey::Plain(record.run_index)
        };
        UnitKey {
            run,
            content: record.content_index,
        }
    }

    pub fn content_key(&self) -> String {
        format!("{}{}", CONTENT_PREFIX, self.content)
    }

    /// Tag delimiting this unit's text inside a merged unit
    pub fn segment_tag(&self) -> String {
        format!("{}:{}", self.run, self.content_key())
    }

    /// Read a segment tag; a bare run key takes `content` as its content index.
    pub fn from_segment_tag(tag: &str, content: usize) -> Option<Self> {
        match tag.split_once(':') {
            Some((run, content_key)) => Some(UnitKey {
                run: run.parse().ok()?,
                content: content_key.strip_prefix(CONTENT_PREFIX)?.parse().ok()?,
            }),
            None => Some(UnitKey {
                run: tag.parse().ok()?,
                content,
            }),
        }
    }
}

/// One piece of a merged unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeSegment {
    pub key: UnitKey,
    /// Text, or anchor fragment for hyperlink runs
    pub value: String,
}

/// The smallest piece of text a translator edits
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslationUnit {
    Plain {
        text: String,
    },
    Hyperlink {
        anchor_id: Option<String>,
        anchor_title: Option<String>,
        text: String,
    },
    Merged {
        segments: Vec<MergeSegment>,
    },
}

impl TranslationUnit {
    pub fn from_record(record: &RunRecord) -> Self {
        if record.is_hyperlink() {
            TranslationUnit::Hyperlink {
                anchor_id: record.anchor_id.clone(),
                anchor_title: record.anchor_title.clone(),
                text: record.text.clone(),
            }
        } else {
            TranslationUnit::Plain {
                text: record.text.clone(),
            }
        }
    }

    /// Interchange string of the unit
    pub fn render(&self) -> String {
        match self {
            TranslationUnit::Plain { text } => text.clone(),
            TranslationUnit::Hyperlink {
                anchor_id,
                anchor_title,
                text,
            } => anchor_fragment(anchor_id.as_deref(), anchor_title.as_deref(), text),
            TranslationUnit::Merged { segments } => {
                let mut rendered = String::new();
                for (position, segment) in segments.iter().enumerate() {
                    let tag = if position == 0 {
                        segment.key.run.to_string()
                    } else {
                        segment.key.segment_tag()
                    };
                    rendered.push_str(&format!("<{tag}>{}</{tag}>", segment.value));
                }
                rendered
            }
        }
    }

    /// Append a segment, turning this unit into a merged one if needed.
    ///
    /// `own_key` is the key the unit is stored under.
    pub fn absorb(&mut self, own_key: UnitKey, segment: MergeSegment) {
        if let TranslationUnit::Merged { segments } = self {
            segments.push(segment);
            return;
        }
        let first = MergeSegment {
            key: own_key,
            value: self.render(),
        };
        *self = TranslationUnit::Merged {
            segments: vec![first, segment],
        };
    }

    /// Read a stored interchange string back into a unit.
    pub fn parse(key: &UnitKey, raw: &str) -> Self {
        if raw.starts_with("<CSR_") {
            if let Some(segments) = parse_segments(key, raw) {
                return TranslationUnit::Merged { segments };
            }
        }
        if is_anchor_fragment(raw) {
            if let Some(anchor) = parse_anchor(raw) {
                return TranslationUnit::Hyperlink {
                    anchor_id: Some(anchor.id),
                    anchor_title: Some(anchor.title),
                    text: anchor.text,
                };
            }
        }
        TranslationUnit::Plain {
            text: raw.to_string(),
        }
    }
}

/// Split `<CSR_a>..</CSR_a><CSR_b:Content_n>..</CSR_b:Content_n>` into segments.
pub fn parse_segments(key: &UnitKey, raw: &str) -> Option<Vec<MergeSegment>> {
    let mut segments = Vec::new();
    let mut rest = raw;

    while !rest.is_empty() {
        let after_open = rest.strip_prefix('<')?;
        let tag_end = after_open.find('>')?;
        let tag = &after_open[..tag_end];
        let segment_key = UnitKey::from_segment_tag(tag, key.content)?;

        let body = &after_open[tag_end + 1..];
        let closing = format!("</{}>", tag);
        let body_end = body.find(&closing)?;
        segments.push(MergeSegment {
            key: segment_key,
            value: body[..body_end].to_string(),
        });
        rest = &body[body_end + closing.len()..];
    }

    if segments.is_empty() { None } else { Some(segments) }
}

/// Units stored for one run key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunUnits {
    pub key: RunKey,
    /// `(content index, unit)` in insertion order
    pub contents: Vec<(usize, TranslationUnit)>,
}

/// Position of a stored unit inside a paragraph's run list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitCursor {
    run_slot: usize,
    content_slot: usize,
}

/// Translation units of one paragraph plus its unmerged records
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParagraphUnits {
    pub index: usize,
    pub runs: Vec<RunUnits>,
    pub src: Vec<RunRecord>,
}

impl ParagraphUnits {
    pub fn new(index: usize) -> Self {
        ParagraphUnits {
            index,
            runs: Vec::new(),
            src: Vec::new(),
        }
    }

    pub fn key_name(&self) -> String {
        format!("{}{}", PARAGRAPH_PREFIX, self.index)
    }

    /// Store a unit, replacing any unit already under the same key.
    pub fn insert(&mut self, key: UnitKey, unit: TranslationUnit) -> UnitCursor {
        let run_slot = match self.runs.iter().position(|run| run.key == key.run) {
            Some(slot) => slot,
            None => {
                self.runs.push(RunUnits {
                    key: key.run,
                    contents: Vec::new(),
                });
                self.runs.len() - 1
            }
        };

        let contents = &mut self.runs[run_slot].contents;
        let content_slot = match contents.iter().position(|(content, _)| *content == key.content) {
            Some(slot) => {
                contents[slot].1 = unit;
                slot
            }
            None => {
                contents.push((key.content, unit));
                contents.len() - 1
            }
        };

        UnitCursor {
            run_slot,
            content_slot,
        }
    }

    pub fn key_at(&self, cursor: UnitCursor) -> Option<UnitKey> {
        let run = self.runs.get(cursor.run_slot)?;
        let (content, _) = run.contents.get(cursor.content_slot)?;
        Some(UnitKey {
            run: run.key,
            content: *content,
        })
    }

    pub fn unit_mut(&mut self, cursor: UnitCursor) -> Option<&mut TranslationUnit> {
        self.runs
            .get_mut(cursor.run_slot)?
            .contents
            .get_mut(cursor.content_slot)
            .map(|(_, unit)| unit)
    }

    pub fn unit(&self, key: &UnitKey) -> Option<&TranslationUnit> {
        self.runs
            .iter()
            .find(|run| run.key == key.run)?
            .contents
            .iter()
            .find(|(content, _)| *content == key.content)
            .map(|(_, unit)| unit)
    }

    /// All units in storage order
    pub fn units(&self) -> impl Iterator<Item = (UnitKey, &TranslationUnit)> {
        self.runs.iter().flat_map(|run| {
            run.contents.iter().map(move |(content, unit)| {
                (
                    UnitKey {
                        run: run.key,
                        content: *content,
                    },
                    unit,
                )
            })
        })
    }

    pub fn unit_count(&self) -> usize {
        self.runs.iter().map(|run| run.contents.len()).sum()
    }
}

/// All paragraphs extracted for one story id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Story {
    pub id: String,
    pub paragraphs: Vec<ParagraphUnits>,
}

impl Story {
    pub fn new(id: &str) -> Self {
        Story {
            id: id.to_string(),
            paragraphs: Vec::new(),
        }
    }

    pub fn key_name(&self) -> String {
        format!("{}{}", STORY_PREFIX, self.id)
    }

    pub fn paragraph(&self, index: usize) -> Option<&ParagraphUnits> {
        self.paragraphs.iter().find(|paragraph| paragraph.index == index)
    }

    /// Add a paragraph; one with the same index is replaced in place.
    pub fn upsert_paragraph(&mut self, paragraph: ParagraphUnits) {
        match self.paragraphs.iter_mut().find(|existing| existing.index == paragraph.index) {
            Some(existing) => {
                warn!("Story {}: paragraph {} extracted twice, keeping the later one", self.id, paragraph.index);
                *existing = paragraph;
            }
            None => self.paragraphs.push(paragraph),
        }
    }
}

/// The unit mapping of a whole batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterchangeDocument {
    pub stories: Vec<Story>,
}

impl InterchangeDocument {
    pub fn story(&self, id: &str) -> Option<&Story> {
        self.stories.iter().find(|story| story.id == id)
    }

    pub fn unit_count(&self) -> usize {
        self.stories
            .iter()
            .flat_map(|story| story.paragraphs.iter())
            .map(ParagraphUnits::unit_count)
            .sum()
    }

    /// Pretty-printed JSON with tab indentation
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        let mut buffer = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
        self.serialize(&mut serializer)?;
        String::from_utf8(buffer).map_err(serde_json::Error::custom)
    }

    /// Read an interchange document, keeping key order.
    ///
    /// The `src` lists are optional so that documents coming back from
    /// translation tools that drop them still load.
    pub fn from_json(json: &str) -> Result<Self, ReinsertError> {
        let value: Value = serde_json::from_str(json)?;
        let stories = as_object(&value, "document")?;

        let mut document = InterchangeDocument::default();
        for (story_key, story_value) in stories {
            let Some(id) = story_key.strip_prefix(STORY_PREFIX) else {
                warn!("Skipping unexpected top-level key '{}'", story_key);
                continue;
            };
            let mut story = Story::new(id);
            for (paragraph_key, paragraph_value) in as_object(story_value, story_key)? {
                let index = paragraph_key
                    .strip_prefix(PARAGRAPH_PREFIX)
                    .and_then(|index| index.parse().ok())
                    .ok_or_else(|| {
                        ReinsertError::InvalidInterchange(format!("Invalid paragraph key: {}", paragraph_key))
                    })?;
                story.upsert_paragraph(read_paragraph(index, paragraph_value)?);
            }
            document.stories.push(story);
        }

        Ok(document)
    }
}

fn as_object<'a>(value: &'a Value, context: &str) -> Result<&'a serde_json::Map<String, Value>, ReinsertError> {
    value
        .as_object()
        .ok_or_else(|| ReinsertError::InvalidInterchange(format!("Expected an object for {}", context)))
}

fn read_paragraph(index: usize, value: &Value) -> Result<ParagraphUnits, ReinsertError> {
    let mut paragraph = ParagraphUnits::new(index);

    for (run_key, run_value) in as_object(value, &paragraph.key_name())? {
        if run_key == SRC_KEY {
            let mut src: Vec<RunRecord> = serde_json::from_value(run_value.clone())?;
            for record in &mut src {
                record.paragraph_index = index;
            }
            paragraph.src = src;
            continue;
        }

        let run: RunKey = run_key.parse()?;
        for (content_key, content_value) in as_object(run_value, run_key)? {
            let content = content_key
                .strip_prefix(CONTENT_PREFIX)
                .and_then(|content| content.parse().ok())
                .ok_or_else(|| ReinsertError::InvalidInterchange(format!("Invalid content key: {}", content_key)))?;
            let raw = content_value.as_str().ok_or_else(|| {
                ReinsertError::InvalidInterchange(format!("Unit {}/{} is not a string", run_key, content_key))
            })?;
            let key = UnitKey { run, content };
            paragraph.insert(key, TranslationUnit::parse(&key, raw));
        }
    }

    Ok(paragraph)
}

impl Serialize for RunUnits {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.contents.len()))?;
        for (content, unit) in &self.contents {
            map.serialize_entry(&format!("{}{}", CONTENT_PREFIX, content), &unit.render())?;
        }
        map.end()
    }
}

impl Serialize for ParagraphUnits {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.runs.len() + 1))?;
        for run in &self.runs {
            map.serialize_entry(&run.key.to_string(), run)?;
        }
        map.serialize_entry(SRC_KEY, &self.src)?;
        map.end()
    }
}

impl Serialize for Story {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.paragraphs.len()))?;
        for paragraph in &self.paragraphs {
            map.serialize_entry(&paragraph.key_name(), paragraph)?;
        }
        map.end()
    }
}

impl Serialize for InterchangeDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.stories.len()))?;
        for story in &self.stories {
            map.serialize_entry(&story.key_name(), story)?;
        }
        map.end()
    }
}

/// Groups per-file extraction results into stories, in file order.
#[derive(Debug, Default)]
pub struct InterchangeBuilder {
    document: InterchangeDocument,
    current_story: Option<String>,
}

impl InterchangeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the paragraphs extracted from one file.
    ///
    /// Consecutive files with the same story id share a story entry. A
    /// different id starts a fresh entry; if that id was seen before, its
    /// earlier entry is replaced. A file without units still opens its
    /// story, so it breaks a run of files with another id.
    pub fn push_file(&mut self, story_id: &str, paragraphs: Vec<ParagraphUnits>) {
        if self.current_story.as_deref() != Some(story_id) {
            self.current_story = Some(story_id.to_string());
            match self.document.stories.iter_mut().find(|story| story.id == story_id) {
                Some(existing) => {
                    warn!("Story {} reappears after another story, its earlier entry is replaced", story_id);
                    *existing = Story::new(story_id);
                }
                None => self.document.stories.push(Story::new(story_id)),
            }
        }

        if let Some(story) = self.document.stories.iter_mut().find(|story| story.id == story_id) {
            for paragraph in paragraphs {
                story.upsert_paragraph(paragraph);
            }
        }
    }

    pub fn finish(self) -> InterchangeDocument {
        self.document
    }
}
