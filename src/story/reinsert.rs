/*!
 * Reinsertion of translated units into story markup.
 *
 * The source markup is extracted again so every unit is known with its key
 * path. Each source unit is paired with the unit at the same path in the
 * translated interchange document, and the host-encoded source text is then
 * replaced by the host-encoded translation inside the `<Content>` bodies of
 * the original markup. Nothing outside those bodies is touched.
 */

use std::collections::HashSet;
use std::fmt;
use std::ops::Range;

use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;

use super::extract_units;
use super::hyperlink::decode;
use super::interchange::{InterchangeDocument, MergeSegment, ParagraphUnits, RunKey, TranslationUnit, UnitKey};
use super::markup::parse_story;
use super::special_chars::to_host;
use super::whitespace::{escape_text, unescape_references};
use crate::errors::ReinsertError;

// @const: Character data of a Content element
static CONTENT_BODY_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<Content>([^<]*)</Content>").expect("Invalid content body regex")
});

/// Something that kept part of a story from being translated
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReinsertIssue {
    /// The story has no entry in the translated document
    MissingStory { story: String },
    /// A source unit has no translated counterpart
    MissingUnit { paragraph: usize, key: String },
    /// A merged translation lost one of its segments
    MissingSegment { paragraph: usize, tag: String },
    /// The source text was not found in any remaining Content body
    NoMatch { paragraph: usize, text: String },
    /// A translatable leaf that no pair covered
    Untranslated { text: String },
}

impl fmt::Display for ReinsertIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReinsertIssue::MissingStory { story } => write!(f, "Story {} is missing from the translations", story),
            ReinsertIssue::MissingUnit { paragraph, key } => {
                write!(f, "Paragraph {}: no translation for {}", paragraph, key)
            }
            ReinsertIssue::MissingSegment { paragraph, tag } => {
                write!(f, "Paragraph {}: merged translation lacks segment {}", paragraph, tag)
            }
            ReinsertIssue::NoMatch { paragraph, text } => {
                write!(f, "Paragraph {}: source text not found in markup: {:?}", paragraph, text)
            }
            ReinsertIssue::Untranslated { text } => write!(f, "Leaf left untranslated: {:?}", text),
        }
    }
}

/// Source text and its translation, both portable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextPair {
    pub paragraph: usize,
    pub source: String,
    pub translation: String,
}

/// Result of rewriting one story file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReinsertOutcome {
    pub markup: String,
    pub substitutions: usize,
    pub issues: Vec<ReinsertIssue>,
}

#[derive(Debug)]
struct ContentBody {
    range: Range<usize>,
    text: String,
    replaced: bool,
}

/// Cursor-based text substitution over the Content bodies of a story.
pub struct StoryRewriter<'a> {
    markup: &'a str,
    bodies: Vec<ContentBody>,
    cursor: usize,
}

impl<'a> StoryRewriter<'a> {
    pub fn new(markup: &'a str) -> Self {
        let bodies = CONTENT_BODY_REGEX
            .captures_iter(markup)
            .filter_map(|caps| caps.get(1))
            .map(|body| ContentBody {
                range: body.range(),
                text: unescape_references(body.as_str()).into_owned(),
                replaced: false,
            })
            .collect();

        StoryRewriter {
            markup,
            bodies,
            cursor: 0,
        }
    }

    /// Slots to visit: from the cursor to the end, then from the start.
    fn search_order(&self) -> impl Iterator<Item = usize> {
        let len = self.bodies.len();
        let start = self.cursor.min(len);
        (start..len).chain(0..start)
    }

    /// Replace `source` with `translation` in the next body holding it.
    ///
    /// A body whose whole text equals the source is preferred over one that
    /// merely contains it. Each body is rewritten at most once.
    pub fn substitute(&mut self, source: &str, translation: &str) -> bool {
        let source = to_host(source);
        if source.is_empty() {
            return false;
        }

        let found = self
            .search_order()
            .find(|&slot| !self.bodies[slot].replaced && self.bodies[slot].text == source)
            .or_else(|| {
                self.search_order()
                    .find(|&slot| !self.bodies[slot].replaced && self.bodies[slot].text.contains(&source))
            });

        let Some(slot) = found else {
            return false;
        };

        let body = &mut self.bodies[slot];
        body.text = body.text.replacen(&source, &to_host(translation), 1);
        body.replaced = true;
        self.cursor = slot + 1;
        true
    }

    pub fn finish(self) -> String {
        let mut rewritten = String::with_capacity(self.markup.len());
        let mut copied_up_to = 0;
        for body in self.bodies.iter().filter(|body| body.replaced) {
            rewritten.push_str(&self.markup[copied_up_to..body.range.start]);
            rewritten.push_str(&escape_text(&body.text));
            copied_up_to = body.range.end;
        }
        rewritten.push_str(&self.markup[copied_up_to..]);
        rewritten
    }
}

fn plain_pair(paragraph: usize, source: &str, translation: &str) -> TextPair {
    TextPair {
        paragraph,
        source: source.to_string(),
        translation: translation.to_string(),
    }
}

fn hyperlink_pairs(paragraph: usize, source_fragment: &str, translated_fragment: &str, story_id: &str) -> Vec<TextPair> {
    decode(source_fragment, translated_fragment, story_id)
        .into_iter()
        .map(|entry| plain_pair(paragraph, &entry.source_text, &entry.text))
        .collect()
}

fn segment_pairs(
    paragraph: usize,
    source: &[MergeSegment],
    translated: &[MergeSegment],
    story_id: &str,
    issues: &mut Vec<ReinsertIssue>,
) -> Vec<TextPair> {
    let mut pairs = Vec::new();
    for segment in source {
        let Some(counterpart) = translated.iter().find(|candidate| candidate.key == segment.key) else {
            issues.push(ReinsertIssue::MissingSegment {
                paragraph,
                tag: segment.key.segment_tag(),
            });
            continue;
        };
        match segment.key.run {
            RunKey::Hyperlink(_) => {
                pairs.extend(hyperlink_pairs(paragraph, &segment.value, &counterpart.value, story_id))
            }
            RunKey::Plain(_) => pairs.push(plain_pair(paragraph, &segment.value, &counterpart.value)),
        }
    }
    pairs
}

fn unit_pairs(
    paragraph: usize,
    key: &UnitKey,
    source: &TranslationUnit,
    translated: &TranslationUnit,
    story_id: &str,
    issues: &mut Vec<ReinsertIssue>,
) -> Vec<TextPair> {
    match (source, translated) {
        (TranslationUnit::Merged { segments }, TranslationUnit::Merged { segments: translated }) => {
            segment_pairs(paragraph, segments, translated, story_id, issues)
        }
        (TranslationUnit::Merged { .. }, _) => {
            issues.push(ReinsertIssue::MissingSegment {
                paragraph,
                tag: key.segment_tag(),
            });
            Vec::new()
        }
        (TranslationUnit::Hyperlink { .. }, translated) => {
            hyperlink_pairs(paragraph, &source.render(), &translated.render(), story_id)
        }
        (TranslationUnit::Plain { text }, translated) => vec![plain_pair(paragraph, text, &translated.render())],
    }
}

/// Pair every unit of a source paragraph with its translation.
pub fn paragraph_pairs(
    source: &ParagraphUnits,
    translated: Option<&ParagraphUnits>,
    story_id: &str,
    issues: &mut Vec<ReinsertIssue>,
) -> Vec<TextPair> {
    let mut pairs = Vec::new();
    for (key, unit) in source.units() {
        let Some(translated_unit) = translated.and_then(|paragraph| paragraph.unit(&key)) else {
            issues.push(ReinsertIssue::MissingUnit {
                paragraph: source.index,
                key: format!("{}/{}", key.run, key.content_key()),
            });
            continue;
        };
        pairs.extend(unit_pairs(source.index, &key, unit, translated_unit, story_id, issues));
    }
    pairs
}

/// Rewrite one story's markup with the translations found for `story_id`.
pub fn reinsert_story(
    markup: &str,
    story_id: &str,
    translations: &InterchangeDocument,
) -> Result<ReinsertOutcome, ReinsertError> {
    let Some(translated_story) = translations.story(story_id) else {
        warn!("Story {} has no translations, keeping it untranslated", story_id);
        return Ok(ReinsertOutcome {
            markup: markup.to_string(),
            substitutions: 0,
            issues: vec![ReinsertIssue::MissingStory {
                story: story_id.to_string(),
            }],
        });
    };

    let source_paragraphs = extract_units(markup)?;
    let mut issues = Vec::new();
    let pairs: Vec<TextPair> = source_paragraphs
        .iter()
        .flat_map(|paragraph| {
            paragraph_pairs(paragraph, translated_story.paragraph(paragraph.index), story_id, &mut issues)
        })
        .collect();

    let mut rewriter = StoryRewriter::new(markup);
    let mut covered = HashSet::new();
    let mut substitutions = 0;
    for pair in &pairs {
        if rewriter.substitute(&pair.source, &pair.translation) {
            substitutions += 1;
            covered.insert(pair.source.as_str());
        } else {
            debug!("Story {}: no Content body holds {:?}", story_id, pair.source);
            issues.push(ReinsertIssue::NoMatch {
                paragraph: pair.paragraph,
                text: pair.source.clone(),
            });
        }
    }

    let inventory = parse_story(markup)?.text_inventory();
    for text in inventory {
        let translatable = text.chars().any(char::is_alphabetic);
        if translatable && !covered.contains(text.as_str()) {
            issues.push(ReinsertIssue::Untranslated { text });
        }
    }

    Ok(ReinsertOutcome {
        markup: rewriter.finish(),
        substitutions,
        issues,
    })
}
