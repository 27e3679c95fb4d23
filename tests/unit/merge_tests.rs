/*!
 * Tests for translation unit merging on real markup
 */

use icml_strings::story::interchange::{RunKey, TranslationUnit, UnitKey};
use icml_strings::story::extract_units;
use crate::common::{paragraph, sample_story, story_markup};

fn key(run: RunKey, content: usize) -> UnitKey {
    UnitKey { run, content }
}

/// A paragraph made only of a dash has no unit but keeps its record
#[test]
fn test_extractUnits_withDashOnlyParagraph_shouldKeepRecordInSrcOnly() {
    let markup = story_markup(&paragraph(&["<Content>\u{2014}</Content>"]));
    let paragraphs = extract_units(&markup).unwrap();

    assert_eq!(paragraphs.len(), 1);
    assert_eq!(paragraphs[0].unit_count(), 0);
    assert_eq!(paragraphs[0].src.len(), 1);
    assert_eq!(paragraphs[0].src[0].text, "\u{2014}");
}

#[test]
fn test_extractUnits_withLeadingPunctuation_shouldMergeRuns() {
    let markup = story_markup(&paragraph(&["<Content>Hello</Content>", "<Content>, world</Content>"]));
    let paragraphs = extract_units(&markup).unwrap();

    let unit = paragraphs[0].unit(&key(RunKey::Plain(0), 0)).unwrap();
    assert_eq!(unit.render(), "<CSR_0>Hello</CSR_0><CSR_1:Content_0>, world</CSR_1:Content_0>");
    assert!(paragraphs[0].unit(&key(RunKey::Plain(1), 0)).is_none());
}

#[test]
fn test_extractUnits_withBreakBetweenRuns_shouldKeepTwoUnits() {
    let markup = story_markup(&paragraph(&["<Content>Hello</Content><Br/>", "<Content>world</Content>"]));
    let paragraphs = extract_units(&markup).unwrap();

    assert_eq!(paragraphs[0].unit_count(), 2);
    assert_eq!(
        paragraphs[0].unit(&key(RunKey::Plain(0), 0)),
        Some(&TranslationUnit::Plain { text: "Hello".to_string() })
    );
    assert_eq!(
        paragraphs[0].unit(&key(RunKey::Plain(1), 0)),
        Some(&TranslationUnit::Plain { text: "world".to_string() })
    );
}

#[test]
fn test_extractUnits_withBreakInsideRun_shouldKeepContentIndexes() {
    let markup = story_markup(&paragraph(&["<Content>Line one</Content><Br/><Content>Line two</Content>"]));
    let paragraphs = extract_units(&markup).unwrap();

    assert!(paragraphs[0].unit(&key(RunKey::Plain(0), 0)).is_some());
    assert!(paragraphs[0].unit(&key(RunKey::Plain(0), 1)).is_some());
}

#[test]
fn test_extractUnits_withSampleStory_shouldProduceExpectedUnits() {
    let paragraphs = extract_units(&sample_story()).unwrap();

    assert_eq!(paragraphs.len(), 5);
    let counts: Vec<usize> = paragraphs.iter().map(|p| p.unit_count()).collect();
    assert_eq!(counts, vec![1, 2, 2, 0, 1]);

    let link = paragraphs[2].unit(&key(RunKey::Hyperlink(1), 0)).unwrap();
    assert_eq!(
        link.render(),
        r#"<a id="HyperlinkTextDestination/lnk1" title="Destination A">the guide</a>"#
    );
    assert_eq!(
        paragraphs[4].unit(&key(RunKey::Plain(0), 0)).unwrap().render(),
        "Tom & Jerry\ragain"
    );
}

/// Run order in src and in units is document order
#[test]
fn test_extractUnits_shouldPreserveRunOrder() {
    let markup = story_markup(&paragraph(&[
        "<Content>Alpha</Content><Br/>",
        "<Content>Beta</Content><Br/>",
        "<Content>Gamma</Content>",
    ]));
    let paragraphs = extract_units(&markup).unwrap();

    let src: Vec<usize> = paragraphs[0].src.iter().map(|r| r.run_index).collect();
    assert_eq!(src, vec![0, 1, 2]);
    let units: Vec<usize> = paragraphs[0].units().map(|(k, _)| k.run.run_index()).collect();
    assert_eq!(units, vec![0, 1, 2]);
}
