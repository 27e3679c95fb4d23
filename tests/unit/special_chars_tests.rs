/*!
 * Tests for special character transcoding
 */

use icml_strings::story::markup::ContentLeaf;
use icml_strings::story::special_chars::{leaf_to_portable, to_host, to_portable};

/// Host text survives a trip through the portable form
#[test]
fn test_toHost_afterToPortable_shouldRestoreHostText() {
    let samples = [
        "",
        "plain text",
        "line\u{2028}break",
        "paragraph\u{2029}",
        "\ttabbed\u{2028}\u{2029}mixed\t",
        "unicode \u{00e9}\u{4e2d}\u{1f600}",
    ];
    for sample in samples {
        assert_eq!(to_host(&to_portable(sample)), sample, "sample {:?}", sample);
    }
}

#[test]
fn test_toPortable_shouldMapSeparatorsToControlCharacters() {
    assert_eq!(to_portable("a\u{2028}b\u{2029}c\td"), "a\rb\nc\td");
}

#[test]
fn test_toHost_shouldMapControlCharactersToSeparators() {
    assert_eq!(to_host("a\rb\nc"), "a\u{2028}b\u{2029}c");
}

#[test]
fn test_leafToPortable_withEveryVariant_shouldFollowFallbackPolicy() {
    assert_eq!(leaf_to_portable(&ContentLeaf::Text("x\u{2028}y".to_string())), Some("x\ry".to_string()));
    assert_eq!(leaf_to_portable(&ContentLeaf::Numeric("3.14".to_string())), Some("3.14".to_string()));
    assert_eq!(
        leaf_to_portable(&ContentLeaf::Nested("a\u{2028}b".to_string())),
        Some("a\u{2028}b".to_string())
    );
    assert_eq!(leaf_to_portable(&ContentLeaf::Empty), None);
}
