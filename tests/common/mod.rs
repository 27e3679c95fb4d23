/*!
 * Common test utilities for the icml-strings test suite
 */

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::fs;
use anyhow::Result;
use tempfile::TempDir;

/// Routes library logs to the test harness, once per process
pub fn init_test_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Wraps paragraph markup in an ICML document with a single story
pub fn story_markup(paragraphs: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<?aid style="50" type="snippet" readerVersion="6.0" featureSet="257" product="8.0(370)" ?>
<Document DOMVersion="8.0" Self="d">
  <Story Self="u1a2" AppliedTOCStyle="n" TrackChanges="false">
{}
  </Story>
</Document>"#,
        paragraphs
    )
}

/// Markup for one paragraph built from character style range bodies
pub fn paragraph(runs: &[&str]) -> String {
    let mut markup = String::from("    <ParagraphStyleRange AppliedParagraphStyle=\"ParagraphStyle/Body\">\n");
    for run in runs {
        markup.push_str("      <CharacterStyleRange AppliedCharacterStyle=\"CharacterStyle/$ID/[No character style]\">");
        markup.push_str(run);
        markup.push_str("</CharacterStyleRange>\n");
    }
    markup.push_str("    </ParagraphStyleRange>");
    markup
}

/// A story exercising merging, breaks, hyperlinks and special characters
pub fn sample_story() -> String {
    let paragraphs = [
        paragraph(&["<Content>Hello</Content>", "<Content>, world</Content>"]),
        paragraph(&["<Content>First line</Content><Br/>", "<Content>Second line</Content>"]),
        paragraph(&[
            "<Content>See </Content>",
            r#"<HyperlinkTextDestination Self="HyperlinkTextDestination/lnk1" Name="Destination A" Hidden="false"/><Content>the guide</Content>"#,
        ]),
        paragraph(&["<Content>\u{2014}</Content>"]),
        paragraph(&["<Content>Tom &amp; Jerry\u{2028}again</Content>"]),
    ];
    story_markup(&paragraphs.join("\n"))
}

/// Creates `<root>/<language>/<file>` for each `(file, markup)` pair
pub fn create_source_tree(root: &Path, language: &str, files: &[(&str, &str)]) -> Result<PathBuf> {
    let folder = root.join(language);
    fs::create_dir_all(&folder)?;
    for (file_name, markup) in files {
        create_test_file(&folder, file_name, markup)?;
    }
    Ok(folder)
}
