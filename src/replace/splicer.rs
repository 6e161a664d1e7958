//! Rebuilding a block's fragment sequence around located matches.
use crate::ooxml::docx::{Block, Fragment, Inline};
use crate::replace::locator::SpanMatch;

/// Splices replacement text into a block.
///
/// For each match the fragment holding its first character keeps the text
/// before the match, the fragment holding its last character keeps the text
/// after it, and fragments strictly inside are dropped. A single replacement
/// fragment, formatted like the fragment holding the first matched
/// character, goes in between. Opaque inlines that sat inside the matched
/// range follow the replacement fragment in their original order.
pub struct FragmentSplicer;

impl FragmentSplicer {
    /// Apply `matches` (as produced by
    /// [`TextSpanLocator::locate_in_block`](crate::replace::TextSpanLocator::locate_in_block)
    /// on this block) and return how many were replaced.
    ///
    /// The block's inline sequence is rebuilt aside and swapped in once.
    pub fn splice(block: &mut Block, matches: &[SpanMatch], replacement: &str) -> usize {
        if matches.is_empty() {
            return 0;
        }

        let old = block.take_inlines();
        let mut rebuilt = Vec::with_capacity(old.len() + matches.len() * 2);
        let mut next = 0;
        let mut index = 0;

        for inline in old {
            let fragment = match inline {
                Inline::Fragment(f) => f,
                opaque => {
                    rebuilt.push(opaque);
                    continue;
                },
            };
            let idx = index;
            index += 1;

            let mut touched = false;
            let mut consumed = false;
            let mut cursor = 0;
            while let Some(m) = matches.get(next) {
                if m.first().fragment > idx {
                    break;
                }
                touched = true;
                if m.first().fragment == idx {
                    push_piece(&mut rebuilt, &fragment, &fragment.text()[cursor..m.first().start]);
                    if !replacement.is_empty() {
                        rebuilt.push(Inline::Fragment(replacement_fragment(&fragment, replacement)));
                    }
                }
                if m.last().fragment == idx {
                    cursor = m.last().end;
                    next += 1;
                } else {
                    // the match runs on into a later fragment
                    consumed = true;
                    break;
                }
            }

            if !touched {
                rebuilt.push(Inline::Fragment(fragment));
            } else if !consumed {
                push_piece(&mut rebuilt, &fragment, &fragment.text()[cursor..]);
            }
        }

        block.set_inlines(rebuilt);
        next
    }
}

/// Push a leftover piece of `source`, unless it is empty.
fn push_piece(out: &mut Vec<Inline>, source: &Fragment, text: &str) {
    if !text.is_empty() {
        out.push(Inline::Fragment(source.with_text(text)));
    }
}

/// A fragment holding `text` with the character formatting of `source`.
///
/// The whole `w:rPr` is carried over, so properties no snapshot models
/// (theme attributes, unit-bearing sizes, extension elements) survive.
fn replacement_fragment(source: &Fragment, text: &str) -> Fragment {
    source.with_text(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::xml::{XmlDocument, XmlElement, XmlNode};
    use crate::replace::TextSpanLocator;

    fn texts(block: &Block) -> Vec<String> {
        block.fragments().map(|f| f.text().to_string()).collect()
    }

    fn run(block: &mut Block, find: &str, replace: &str) -> usize {
        let locator = TextSpanLocator::new(find);
        let matches = locator.locate_in_block(block);
        FragmentSplicer::splice(block, &matches, replace)
    }

    #[test]
    fn test_cross_fragment_scenario() {
        let mut block = Block::from_texts(&["Report 20", "24 Summary"]);
        assert_eq!(run(&mut block, "2024", "2025"), 1);
        assert_eq!(block.text(), "Report 2025 Summary");
        assert_eq!(texts(&block), ["Report ", "2025", " Summary"]);
    }

    #[test]
    fn test_inner_fragments_dropped() {
        let mut block = Block::from_texts(&["a[", "x", "y", "]b"]);
        assert_eq!(run(&mut block, "[xy]", "-"), 1);
        assert_eq!(texts(&block), ["a", "-", "b"]);
    }

    #[test]
    fn test_several_matches_in_one_fragment() {
        let mut block = Block::from_texts(&["one two one", " one"]);
        assert_eq!(run(&mut block, "one", "1"), 3);
        assert_eq!(block.text(), "1 two 1 1");
        assert!(block.fragments().all(|f| !f.is_empty()));
    }

    #[test]
    fn test_whole_fragment_match_leaves_no_empties() {
        let mut block = Block::from_texts(&["ab", "cd"]);
        assert_eq!(run(&mut block, "abcd", "z"), 1);
        assert_eq!(texts(&block), ["z"]);
    }

    #[test]
    fn test_empty_replacement_deletes() {
        let mut block = Block::from_texts(&["draft ", "report"]);
        assert_eq!(run(&mut block, "draft ", ""), 1);
        assert_eq!(texts(&block), ["report"]);
    }

    #[test]
    fn test_replacement_containing_needle_is_not_rescanned() {
        let mut block = Block::from_texts(&["a", "a"]);
        assert_eq!(run(&mut block, "a", "aa"), 2);
        assert_eq!(block.text(), "aaaa");
    }

    #[test]
    fn test_untouched_fragments_are_moved_through() {
        let mut block = Block::from_texts(&["keep", " x "]);
        run(&mut block, "x", "y");
        let kept = block.fragments().next().unwrap();
        assert_eq!(kept.text(), "keep");
        assert_eq!(kept, &Fragment::new("keep"));
    }

    #[test]
    fn test_opaque_inside_match_follows_replacement() {
        let mut block = Block::new();
        block.push_fragment(Fragment::new("Hel"));
        let mut inlines = block.take_inlines();
        inlines.push(Inline::Opaque(XmlNode::Element(XmlElement::new("w:bookmarkStart"))));
        inlines.push(Inline::Fragment(Fragment::new("lo!")));
        block.set_inlines(inlines);

        assert_eq!(run(&mut block, "Hello", "Bye"), 1);
        assert_eq!(shape(&block), ["Bye", "<opaque>", "!"]);
    }

    fn shape(block: &Block) -> Vec<String> {
        block
            .inlines()
            .iter()
            .map(|i| match i {
                Inline::Fragment(f) => f.text().to_string(),
                Inline::Opaque(_) => "<opaque>".to_string(),
            })
            .collect()
    }

    fn paragraph(xml: &str) -> Block {
        Block::from_element(XmlDocument::parse(xml.as_bytes()).unwrap().root)
    }

    #[test]
    fn test_replacement_keeps_every_run_property() {
        let mut block = paragraph(
            r#"<w:p><w:r><w:rPr><w:sz w:val="14pt"/><w:u w:val="single" w:themeColor="accent2" w:themeShade="80"/></w:rPr><w:t>old text</w:t></w:r></w:p>"#,
        );
        let source_rpr = block.fragments().next().unwrap().properties().unwrap().clone();

        assert_eq!(run(&mut block, "old", "new"), 1);
        assert_eq!(texts(&block), ["new", " text"]);
        for fragment in block.fragments() {
            assert_eq!(fragment.properties(), Some(&source_rpr));
        }

        let mut out = String::new();
        block.write_to(&mut out);
        assert!(out.contains(r#"<w:u w:val="single" w:themeColor="accent2" w:themeShade="80"/>"#));
        assert!(out.contains(r#"<w:sz w:val="14pt"/>"#));
    }

    #[test]
    fn test_no_match_across_hyperlink_text() {
        let xml = r#"<w:p><w:r><w:t xml:space="preserve">Hello </w:t></w:r><w:hyperlink r:id="rId5"><w:r><w:t>link</w:t></w:r></w:hyperlink><w:r><w:t>world</w:t></w:r></w:p>"#;
        let mut block = paragraph(xml);
        let before = block.clone();
        assert_eq!(run(&mut block, "Hello world", "X"), 0);
        assert_eq!(block, before);

        // each side is still searchable on its own
        assert_eq!(run(&mut block, "Hello", "Bye"), 1);
        assert_eq!(run(&mut block, "world", "all"), 1);
        assert_eq!(shape(&block), ["Bye", " ", "<opaque>", "all"]);
    }
}
