//! Whole-document replacement.
use log::debug;

use crate::common::error::Result;
use crate::ooxml::docx::{BodyItem, Block, Document};
use crate::replace::locator::TextSpanLocator;
use crate::replace::rule::ReplacementRule;
use crate::replace::snapshot::{BlockFormat, Snapshot};
use crate::replace::splicer::FragmentSplicer;
use crate::replace::walker::TableWalker;

/// Replace every occurrence of the locator's needle in `block`, keeping the
/// paragraph layout. Returns the number of occurrences replaced.
pub fn replace_in_block(block: &mut Block, locator: &TextSpanLocator<'_>, replacement: &str) -> usize {
    let matches = locator.locate_in_block(block);
    if matches.is_empty() {
        return 0;
    }
    let layout = BlockFormat::capture(block);
    let count = FragmentSplicer::splice(block, &matches, replacement);
    layout.apply(block);
    count
}

/// Applies replacement rules to a whole document.
///
/// Each rule makes one complete pass over the body (top-level paragraphs and
/// every table, in body order) before the next rule starts. Text produced by
/// one rule is therefore visible to later rules, but never to the rule that
/// produced it.
#[derive(Debug, Clone, Copy, Default)]
pub struct Replacer {
    walker: TableWalker,
}

impl Replacer {
    pub fn new(walker: TableWalker) -> Self {
        Self { walker }
    }

    /// Apply `rules` in order and return the occurrence count of each.
    ///
    /// Every table is depth-checked before the first edit, so a rejected
    /// document is left exactly as it was.
    pub fn replace_in_document(&self, document: &mut Document, rules: &[ReplacementRule]) -> Result<Vec<usize>> {
        for table in document.tables() {
            self.walker.check_depth(table)?;
        }

        let mut counts = Vec::with_capacity(rules.len());
        for rule in rules {
            let locator = TextSpanLocator::new(rule.find());
            let mut count = 0;
            for item in document.content_mut() {
                count += match item {
                    BodyItem::Block(block) => replace_in_block(block, &locator, rule.replace()),
                    BodyItem::Table(table) => TableWalker::visit_mut(table, &mut |block: &mut Block| {
                        replace_in_block(block, &locator, rule.replace())
                    }),
                    BodyItem::Other(_) => 0,
                };
            }
            debug!("{:?} -> {:?}: {} occurrence(s)", rule.find(), rule.replace(), count);
            counts.push(count);
        }
        Ok(counts)
    }
}

/// Apply `rules` to `document` with the default depth limit.
pub fn replace_text(document: &mut Document, rules: &[ReplacementRule]) -> Result<Vec<usize>> {
    Replacer::default().replace_in_document(document, rules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::docx::testing::{document_xml, nested_table_xml, paragraph_xml};

    fn rules(pairs: &[(&str, &str)]) -> Vec<ReplacementRule> {
        pairs.iter().map(|(f, r)| ReplacementRule::new(*f, *r).unwrap()).collect()
    }

    #[test]
    fn test_document_body_order() {
        let body = format!(
            "{}{}{}",
            paragraph_xml(&["Q1 total"]),
            nested_table_xml(2, &paragraph_xml(&["Q", "1 inner"])),
            paragraph_xml(&["end Q1"])
        );
        let mut doc = Document::parse(document_xml(&body).as_bytes()).unwrap();
        let counts = replace_text(&mut doc, &rules(&[("Q1", "Q2")])).unwrap();
        assert_eq!(counts, [3]);
        let texts: Vec<_> = doc.all_blocks().iter().map(|b| b.text()).collect();
        assert_eq!(texts, ["Q2 total", "level 1", "level 2", "Q2 inner", "end Q2"]);
    }

    #[test]
    fn test_rules_run_whole_document_in_order() {
        let body = paragraph_xml(&["cat dog"]);
        let mut doc = Document::parse(document_xml(&body).as_bytes()).unwrap();
        let counts = replace_text(&mut doc, &rules(&[("cat", "dog"), ("dog", "bird")])).unwrap();
        assert_eq!(counts, [1, 2]);
        assert_eq!(doc.text(), "bird bird");
    }

    #[test]
    fn test_paragraph_layout_kept() {
        let body = r#"<w:p><w:pPr><w:jc w:val="right"/><w:ind w:left="360"/></w:pPr><w:r><w:t>old</w:t></w:r></w:p>"#;
        let mut doc = Document::parse(document_xml(body).as_bytes()).unwrap();
        replace_text(&mut doc, &rules(&[("old", "new")])).unwrap();
        let block = doc.blocks().next().unwrap();
        assert_eq!(block.text(), "new");
        let ppr = block.properties().unwrap();
        assert_eq!(ppr.child("jc").unwrap().attr("val").as_deref(), Some("right"));
        assert_eq!(ppr.child("ind").unwrap().attr("left").as_deref(), Some("360"));
    }

    #[test]
    fn test_logical_alignment_untouched() {
        let body = r#"<w:p><w:pPr><w:bidi/><w:jc w:val="start"/></w:pPr><w:r><w:t>old</w:t></w:r></w:p>"#;
        let mut doc = Document::parse(document_xml(body).as_bytes()).unwrap();
        let before = doc.blocks().next().unwrap().properties().unwrap().to_xml();
        replace_text(&mut doc, &rules(&[("old", "new")])).unwrap();
        let block = doc.blocks().next().unwrap();
        assert_eq!(block.text(), "new");
        assert_eq!(block.properties().unwrap().to_xml(), before);
    }

    #[test]
    fn test_too_deep_document_unchanged() {
        let body = format!("{}{}", paragraph_xml(&["x"]), nested_table_xml(101, ""));
        let mut doc = Document::parse(document_xml(&body).as_bytes()).unwrap();
        let before = doc.clone();
        assert!(replace_text(&mut doc, &rules(&[("x", "y")])).is_err());
        assert_eq!(doc, before);
    }
}
