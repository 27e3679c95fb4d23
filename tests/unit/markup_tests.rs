/*!
 * Tests for story markup parsing and run extraction
 */

use icml_strings::story::extractor::{RecordKind, extract};
use icml_strings::story::markup::{ContentLeaf, LeafPosition, ParagraphSlot, Side, parse_story};
use icml_strings::story::whitespace::preserve_whitespace;
use crate::common::{paragraph, sample_story, story_markup};

/// A single paragraph with a single run still comes back as lists
#[test]
fn test_parseStory_withSingleParagraphAndRun_shouldForceLists() {
    let markup = story_markup(&paragraph(&["<Content>Only run</Content>"]));
    let tree = parse_story(&markup).unwrap();

    assert_eq!(tree.documents.len(), 1);
    assert_eq!(tree.documents[0].stories.len(), 1);
    assert_eq!(tree.paragraphs().len(), 1);
    let paragraph = tree.paragraphs()[0].as_parsed().unwrap();
    assert_eq!(paragraph.runs.len(), 1);
    assert_eq!(paragraph.runs[0].contents, vec![ContentLeaf::Text("Only run".to_string())]);
}

#[test]
fn test_parseStory_withoutStory_shouldHaveNoParagraphs() {
    let tree = parse_story("<Document DOMVersion=\"8.0\"></Document>").unwrap();
    assert!(!tree.has_paragraphs());
    assert!(extract(&tree).is_empty());
}

#[test]
fn test_parseStory_withForeignRoot_shouldYieldEmptyTree() {
    let tree = parse_story("<Snippet><Story/></Snippet>").unwrap();
    assert!(tree.documents.is_empty());
}

#[test]
fn test_parseStory_withBrokenXml_shouldFail() {
    assert!(parse_story("<Document><Story><ParagraphStyleRange></Story></Document>").is_err());
}

/// Whitespace at the edges of a Content element survives parsing
#[test]
fn test_parseStory_withBoundingWhitespace_shouldKeepIt() {
    let markup = story_markup(&paragraph(&["<Content> and more </Content>"]));
    assert!(preserve_whitespace(&markup).contains("<![CDATA[ and more ]]>"));

    let tree = parse_story(&markup).unwrap();
    let records = &extract(&tree)[0].records;
    assert_eq!(records[0].text, " and more ");
}

#[test]
fn test_parseStory_withNumericContent_shouldKeepItVerbatim() {
    let markup = story_markup(&paragraph(&["<Content>1,250.00</Content>"]));
    let tree = parse_story(&markup).unwrap();
    let run = &tree.paragraphs()[0].as_parsed().unwrap().runs[0];

    assert_eq!(run.contents[0], ContentLeaf::Numeric("1,250.00".to_string()));
    assert_eq!(extract(&tree)[0].records[0].text, "1,250.00");
}

#[test]
fn test_parseStory_withNestedContent_shouldPassTextThrough() {
    let markup = story_markup(&paragraph(&["<Content>outer<Properties>inner</Properties></Content>"]));
    let tree = parse_story(&markup).unwrap();
    let run = &tree.paragraphs()[0].as_parsed().unwrap().runs[0];

    assert_eq!(run.contents[0], ContentLeaf::Nested("outerinner".to_string()));
    assert_eq!(extract(&tree)[0].records[0].text, "outerinner");
}

#[test]
fn test_siblingIsBreak_shouldLookAtElementSiblingsOnly() {
    let markup = story_markup(&paragraph(&["<Content>one</Content>\n<Br/>\n<Content>two</Content><Properties/>"]));
    let tree = parse_story(&markup).unwrap();
    let first = LeafPosition { paragraph: 0, run: 0, content: 0 };
    let second = LeafPosition { paragraph: 0, run: 0, content: 1 };

    assert!(!tree.sibling_is_break(first, Side::Previous));
    assert!(tree.sibling_is_break(first, Side::Next));
    assert!(tree.sibling_is_break(second, Side::Previous));
    assert!(!tree.sibling_is_break(second, Side::Next));
    assert!(!tree.sibling_is_break(LeafPosition { paragraph: 5, run: 0, content: 0 }, Side::Next));
}

#[test]
fn test_parseStory_withNestedParagraph_shouldMarkOnlyThatParagraphMalformed() {
    let markup = story_markup(&format!(
        "{}\n{}",
        paragraph(&["<ParagraphStyleRange><Content>inner</Content></ParagraphStyleRange>"]),
        paragraph(&["<Content>fine</Content>"])
    ));
    let tree = parse_story(&markup).unwrap();

    assert!(matches!(tree.paragraphs()[0], ParagraphSlot::Malformed(_)));
    assert_eq!(tree.paragraphs()[1].index(), 1);
    let paragraphs = extract(&tree);
    assert!(paragraphs[0].records.is_empty());
    assert_eq!(paragraphs[1].records[0].text, "fine");
}

#[test]
fn test_extract_withSampleStory_shouldEmitRecordsInDocumentOrder() {
    let tree = parse_story(&sample_story()).unwrap();
    let paragraphs = extract(&tree);

    assert_eq!(paragraphs.len(), 5);
    let texts: Vec<&str> = paragraphs[0].records.iter().map(|r| r.text.as_str()).collect();
    assert_eq!(texts, vec!["Hello", ", world"]);

    let link = &paragraphs[2].records[1];
    assert_eq!(link.kind, RecordKind::Hyperlink);
    assert_eq!(link.run_index, 1);
    assert_eq!(link.anchor_title.as_deref(), Some("Destination A"));

    assert_eq!(paragraphs[4].records[0].text, "Tom & Jerry\ragain");
}

#[test]
fn test_textInventory_shouldIncludeHyperlinkSources() {
    let markup = story_markup(&paragraph(&[
        "<Content>Body</Content>",
        r#"<HyperlinkTextSource Self="src1" Name="Link"><Content>Read more</Content></HyperlinkTextSource>"#,
        "<Content>Body</Content>",
    ]));
    let inventory = parse_story(&markup).unwrap().text_inventory();
    assert_eq!(inventory, vec!["Body".to_string(), "Read more".to_string()]);
}
