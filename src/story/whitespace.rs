/*!
 * Whitespace-preserving pre-pass over raw story markup.
 *
 * Generic XML consumers trim leaf text. Wrapping every `<Content>` body that
 * starts or ends with whitespace in a CDATA block keeps that whitespace
 * literal, whatever parser runs next.
 */

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

// @const: A Content element holding character data only
static CONTENT_BODY_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<Content>([^<]*)</Content>").expect("Invalid content body regex")
});

// @const: Entity and character references
static REFERENCE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(#x[0-9A-Fa-f]+|#[0-9]+|amp|lt|gt|quot|apos);").expect("Invalid reference regex")
});

/// Wrap whitespace-bounded `<Content>` bodies in CDATA.
///
/// References are resolved before wrapping since CDATA is taken literally.
/// Bodies that would contain `]]>` once resolved are left as they are.
pub fn preserve_whitespace(markup: &str) -> Cow<'_, str> {
    CONTENT_BODY_REGEX.replace_all(markup, |caps: &Captures| {
        let body = &caps[1];
        let bounded = body.starts_with(char::is_whitespace) || body.ends_with(char::is_whitespace);
        if !bounded {
            return caps[0].to_string();
        }

        let literal = unescape_references(body);
        if literal.contains("]]>") {
            return caps[0].to_string();
        }
        format!("<Content><![CDATA[{}]]></Content>", literal)
    })
}

/// Resolve the predefined XML entities and numeric character references.
pub fn unescape_references(text: &str) -> Cow<'_, str> {
    REFERENCE_REGEX.replace_all(text, |caps: &Captures| {
        let reference = &caps[1];
        let resolved = match reference {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            _ if reference.starts_with("#x") => {
                u32::from_str_radix(&reference[2..], 16).ok().and_then(char::from_u32)
            }
            _ => reference[1..].parse::<u32>().ok().and_then(char::from_u32),
        };
        resolved.map(String::from).unwrap_or_else(|| caps[0].to_string())
    })
}

/// Escape text for use as XML character data, the way InDesign writes it.
pub fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            other => escaped.push(other),
        }
    }
    escaped
}
