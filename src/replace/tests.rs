//! Property tests for locating and splicing across fragment boundaries.
use proptest::prelude::*;

use super::*;
use crate::common::VerticalPosition;
use crate::common::xml::XmlDocument;
use crate::ooxml::docx::testing::paragraph_xml;
use crate::ooxml::docx::{Block, Fragment};

/// A block holding `text` cut at `cuts`; fragment `i` has size `20 + 2 * i`.
fn partitioned(text: &str, cuts: &[usize]) -> Block {
    let mut cuts: Vec<usize> = cuts.iter().map(|c| c % (text.len() + 1)).collect();
    cuts.sort_unstable();
    let mut block = Block::new();
    let mut start = 0;
    for (i, end) in cuts.into_iter().chain([text.len()]).enumerate() {
        let mut fragment = Fragment::new(&text[start..end]);
        FormatSnapshot {
            size: Some((20 + 2 * i).to_string()),
            ..Default::default()
        }
        .apply(&mut fragment);
        block.push_fragment(fragment);
        start = end;
    }
    block
}

fn replace_all(block: &mut Block, find: &str, replacement: &str) -> usize {
    replace_in_block(block, &TextSpanLocator::new(find), replacement)
}

/// Size of every byte of block text, in order.
fn sizes_per_byte(block: &Block) -> Vec<Option<u32>> {
    block
        .fragments()
        .flat_map(|f| std::iter::repeat_n(FormatSnapshot::capture(f).half_points(), f.len()))
        .collect()
}

fn snapshot_strategy() -> impl Strategy<Value = FormatSnapshot> {
    let toggles = (
        proptest::option::of(any::<bool>()),
        proptest::option::of(any::<bool>()),
        proptest::option::of(any::<bool>()),
        proptest::option::of(any::<bool>()),
    );
    let values = (
        proptest::option::of(2u32..400),
        proptest::option::of(2u32..400),
        proptest::option::of(prop_oneof![Just("yellow"), Just("green"), Just("cyan")]),
        proptest::option::of(prop_oneof![
            Just(VerticalPosition::Normal),
            Just(VerticalPosition::Superscript),
            Just(VerticalPosition::Subscript),
        ]),
        proptest::option::of(prop_oneof![Just("single"), Just("double"), Just("wave")]),
    );
    (toggles, values).prop_map(|((b, i, s, ds), (sz, szcs, hl, va, u))| FormatSnapshot {
        size: sz.map(|v| v.to_string()),
        size_complex: szcs.map(|v| v.to_string()),
        bold: b,
        italic: i,
        strike: s,
        double_strike: ds,
        highlight: hl.map(str::to_string),
        vertical_position: va,
        underline: u.map(|style| [("w:val", style)].into_iter().collect()),
        ..Default::default()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn prop_splice_matches_str_replace(
        text in "[ab ]{0,24}",
        cuts in prop::collection::vec(any::<usize>(), 0..6),
        find in "[ab]{1,3}",
        replacement in "[abc]{0,4}",
    ) {
        let mut block = partitioned(&text, &cuts);
        let count = replace_all(&mut block, &find, &replacement);

        let expected = text.replace(&find, &replacement);
        prop_assert_eq!(block.text(), expected.clone());
        prop_assert_eq!(count, text.matches(find.as_str()).count());
        prop_assert_eq!(
            expected.len() as isize,
            text.len() as isize + count as isize * (replacement.len() as isize - find.len() as isize)
        );

        // same outcome as a single-fragment block
        let mut single = Block::from_texts(&[text.as_str()]);
        replace_all(&mut single, &find, &replacement);
        prop_assert_eq!(block.text(), single.text());
    }

    #[test]
    fn prop_no_new_empty_fragments(
        text in "[ab]{0,24}",
        cuts in prop::collection::vec(any::<usize>(), 0..6),
        find in "[ab]{1,3}",
    ) {
        let mut block = partitioned(&text, &cuts);
        let empties_before = block.fragments().filter(|f| f.is_empty()).count();
        replace_all(&mut block, &find, "");
        let empties_after = block.fragments().filter(|f| f.is_empty()).count();
        prop_assert!(empties_after <= empties_before);
    }

    #[test]
    fn prop_replacement_inherits_first_character_format(
        head in "[ab]{0,8}",
        tail in "[ab]{0,8}",
        cuts in prop::collection::vec(any::<usize>(), 0..6),
        replacement in "[Q]{1,3}",
    ) {
        let text = format!("{}XYZ{}", head, tail);
        let mut block = partitioned(&text, &cuts);
        let before = sizes_per_byte(&block);

        prop_assert_eq!(replace_all(&mut block, "XYZ", &replacement), 1);

        let start = head.len();
        let mut expected = before[..start].to_vec();
        expected.extend(std::iter::repeat_n(before[start], replacement.len()));
        expected.extend_from_slice(&before[start + 3..]);
        prop_assert_eq!(sizes_per_byte(&block), expected);
    }

    #[test]
    fn prop_snapshot_round_trip(snapshot in snapshot_strategy()) {
        let mut blank = Fragment::new("x");
        snapshot.apply(&mut blank);
        prop_assert_eq!(FormatSnapshot::capture(&blank), snapshot.clone());

        // and applied back onto its own source
        let mut source = blank.clone();
        let captured = FormatSnapshot::capture(&source);
        captured.apply(&mut source);
        prop_assert_eq!(FormatSnapshot::capture(&source), captured);
    }
}

#[test]
fn test_report_scenario_keeps_first_fragment_format() {
    let p = XmlDocument::parse(paragraph_xml(&["Report 20", "24 Summary"]).as_bytes())
        .unwrap()
        .root;
    let mut block = Block::from_element(p);
    assert_eq!(replace_all(&mut block, "2024", "2025"), 1);
    assert_eq!(block.text(), "Report 2025 Summary");

    let sizes: Vec<_> = block
        .fragments()
        .map(|f| (f.text().to_string(), FormatSnapshot::capture(f).half_points()))
        .collect();
    assert_eq!(
        sizes,
        [
            ("Report ".to_string(), Some(20)),
            ("2025".to_string(), Some(20)),
            (" Summary".to_string(), Some(22)),
        ]
    );

    let mut out = String::new();
    block.write_to(&mut out);
    assert!(out.contains(r#"<w:t xml:space="preserve">Report </w:t>"#));
}

#[test]
fn test_match_at_fragment_boundary_takes_following_format() {
    let mut block = partitioned("ab|cd", &[2]);
    replace_all(&mut block, "|c", "+");
    let sizes: Vec<_> = block
        .fragments()
        .map(|f| (f.text().to_string(), FormatSnapshot::capture(f).half_points()))
        .collect();
    assert_eq!(
        sizes,
        [("ab".to_string(), Some(20)), ("+".to_string(), Some(22)), ("d".to_string(), Some(22))]
    );
}
