/*!
 * Special-character transcoding between ICML and portable text.
 *
 * InDesign stores forced line breaks as U+2028 and paragraph separators as
 * U+2029 inside `<Content>`. Translators and the interchange format see the
 * standard `\r` and `\n` control characters instead.
 */

use log::warn;

use super::markup::ContentLeaf;

/// Forced line break as serialized by InDesign
pub const HOST_LINE_SEPARATOR: char = '\u{2028}';

/// Paragraph separator as serialized by InDesign
pub const HOST_PARAGRAPH_SEPARATOR: char = '\u{2029}';

/// Tabs are the same code point on both sides
pub const HOST_TAB: char = '\u{0009}';

/// Replace host separators with portable control characters.
pub fn to_portable(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            HOST_LINE_SEPARATOR => '\r',
            HOST_PARAGRAPH_SEPARATOR => '\n',
            HOST_TAB => '\t',
            other => other,
        })
        .collect()
}

/// Exact inverse of [`to_portable`].
pub fn to_host(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\r' => HOST_LINE_SEPARATOR,
            '\n' => HOST_PARAGRAPH_SEPARATOR,
            '\t' => HOST_TAB,
            other => other,
        })
        .collect()
}

/// Transcode a content leaf.
///
/// Text and numeric leaves are transcoded. Any other shape is a contract
/// violation: it is reported and its text is handed back unchanged.
pub fn leaf_to_portable(leaf: &ContentLeaf) -> Option<String> {
    match leaf {
        ContentLeaf::Text(text) | ContentLeaf::Numeric(text) => Some(to_portable(text)),
        ContentLeaf::Nested(text) => {
            warn!("Content leaf has nested markup, passing it through untranscoded: {:?}", text);
            Some(text.clone())
        }
        ContentLeaf::Empty => None,
    }
}
