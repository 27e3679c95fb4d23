/*!
 * Merge engine.
 *
 * Turns a paragraph's records into translation units. Records without a
 * letter are never units of their own. A record continues the current unit
 * when it starts with a non-letter, or when no line break separates it from
 * the previous lettered record. Everything else starts a new unit.
 */

use log::debug;

use super::extractor::{ParagraphRecords, RunRecord};
use super::interchange::{MergeSegment, ParagraphUnits, TranslationUnit, UnitCursor, UnitKey};

/// Whether `current` continues the unit that `last` belongs to
pub fn continues_unit(last: &RunRecord, current: &RunRecord) -> bool {
    if current.starts_with_non_letter() {
        return true;
    }
    // Hyperlink records carry no break flags
    current.has_adjacency() && last.has_adjacency() && !last.breaks_after() && !current.breaks_before()
}

/// Build the units of one paragraph; `src` keeps every record unmerged.
pub fn merge_paragraph(paragraph: ParagraphRecords) -> ParagraphUnits {
    let ParagraphRecords { index, records } = paragraph;
    let mut units = ParagraphUnits::new(index);

    let mut cursor: Option<UnitCursor> = None;
    let mut last_record: Option<&RunRecord> = None;
    let mut basket = String::new();

    for record in &records {
        if !record.has_letter() {
            continue;
        }

        let key = UnitKey::for_record(record);
        let unit = TranslationUnit::from_record(record);

        let merge_target = match (cursor, last_record) {
            (Some(cursor), Some(last)) if record.run_index > 0 && continues_unit(last, record) => Some(cursor),
            _ => None,
        };

        match merge_target.and_then(|target| units.key_at(target).map(|own_key| (target, own_key))) {
            Some((target, own_key)) => {
                debug!("Merging '{}' into '{}' (paragraph {})", record.text, basket, index);
                let segment = MergeSegment {
                    key,
                    value: unit.render(),
                };
                if let Some(stored) = units.unit_mut(target) {
                    stored.absorb(own_key, segment);
                }
                basket.push_str(&record.text);
            }
            None => {
                cursor = Some(units.insert(key, unit));
                basket = record.text.clone();
            }
        }

        last_record = Some(record);
    }

    units.src = records;
    units
}

/// Merge every paragraph that produced records.
pub fn merge_story(paragraphs: Vec<ParagraphRecords>) -> Vec<ParagraphUnits> {
    paragraphs
        .into_iter()
        .filter(|paragraph| !paragraph.records.is_empty())
        .map(merge_paragraph)
        .collect()
}
