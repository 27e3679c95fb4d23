/*!
 * Hyperlink codec.
 *
 * A hyperlink run is handed to translators as an inline anchor fragment.
 * The anchor's `id` and `title` are structure, only the anchor text is meant
 * to be translated. Decoding pairs the source and translated fragments up by
 * element id.
 */

use std::borrow::Cow;

use log::warn;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

use super::extractor::RunRecord;
use super::whitespace::escape_text;

/// Anchor id used when a destination declares none
pub const DEFAULT_ANCHOR_ID: &str = "item-0";

static ANCHOR_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a").expect("Invalid anchor selector"));
static ID_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("[id]").expect("Invalid id selector"));
static ANCHOR_WITH_ID_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[id]").expect("Invalid anchor selector"));
static SPAN_WITH_ID_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("span[id]").expect("Invalid span selector"));

/// A source text paired with its translation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationEntry {
    pub source_text: String,
    pub text: String,
    pub story_id: String,
    /// Anchor title, empty for spans and plain units
    pub note: String,
}

/// Anchor attributes and text read back from a fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HyperlinkAnchor {
    pub id: String,
    pub title: String,
    pub text: String,
}

fn escape_attribute(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}

/// Render an anchor fragment from its parts.
pub fn anchor_fragment(id: Option<&str>, title: Option<&str>, text: &str) -> String {
    format!(
        "<a id=\"{}\" title=\"{}\">{}</a>",
        escape_attribute(id.unwrap_or(DEFAULT_ANCHOR_ID)),
        escape_attribute(title.unwrap_or_default()),
        escape_text(text)
    )
}

/// Encode a hyperlink record as the fragment stored for translation.
pub fn encode(record: &RunRecord) -> String {
    anchor_fragment(record.anchor_id.as_deref(), record.anchor_title.as_deref(), &record.text)
}

/// Whether a stored value is an anchor fragment produced by [`encode`].
pub fn is_anchor_fragment(value: &str) -> bool {
    let value = value.trim();
    value.starts_with("<a id=") && value.ends_with("</a>")
}

/// HTML input normalization folds `\r` into `\n`; a character reference
/// keeps the forced line break through parsing.
fn parse_fragment(fragment: &str) -> Html {
    let protected = if fragment.contains('\r') {
        Cow::Owned(fragment.replace('\r', "&#13;"))
    } else {
        Cow::Borrowed(fragment)
    };
    Html::parse_fragment(&protected)
}

/// Read the first anchor of a fragment back into its parts.
pub fn parse_anchor(fragment: &str) -> Option<HyperlinkAnchor> {
    let html = parse_fragment(fragment);
    html.select(&ANCHOR_SELECTOR).next().map(|anchor| HyperlinkAnchor {
        id: anchor.value().attr("id").unwrap_or(DEFAULT_ANCHOR_ID).to_string(),
        title: anchor.value().attr("title").unwrap_or_default().to_string(),
        text: anchor.text().collect(),
    })
}

fn find_by_id<'a>(html: &'a Html, selector: &Selector, id: &str) -> Option<ElementRef<'a>> {
    html.select(selector).find(|element| element.value().id() == Some(id))
}

/// Pair the id-bearing anchors, then spans, of a source fragment with the
/// elements carrying the same id in the translated fragment.
pub fn decode(source_fragment: &str, translated_fragment: &str, story_id: &str) -> Vec<TranslationEntry> {
    let source = parse_fragment(source_fragment);
    let translated = parse_fragment(translated_fragment);

    let mut entries = Vec::new();
    for (selector, keep_title) in [(&*ANCHOR_WITH_ID_SELECTOR, true), (&*SPAN_WITH_ID_SELECTOR, false)] {
        for element in source.select(selector) {
            let Some(id) = element.value().id() else {
                continue;
            };
            let Some(counterpart) = find_by_id(&translated, &ID_SELECTOR, id) else {
                warn!("Story {}: no element with id '{}' in the translated fragment", story_id, id);
                continue;
            };
            let note = if keep_title {
                element.value().attr("title").unwrap_or_default().to_string()
            } else {
                String::new()
            };
            entries.push(TranslationEntry {
                source_text: element.text().collect(),
                text: counterpart.text().collect(),
                story_id: story_id.to_string(),
                note,
            });
        }
    }

    entries
}
