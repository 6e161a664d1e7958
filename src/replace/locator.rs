//! Locating literal text across fragment boundaries.
use memchr::memmem;
use smallvec::SmallVec;

use crate::ooxml::docx::{Block, Inline};

/// The part of one fragment covered by a match, in bytes relative to the
/// fragment's own text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FragmentSpan {
    /// Index into the block's fragment sequence
    pub fragment: usize,
    pub start: usize,
    pub end: usize,
}

/// One occurrence of the needle in the concatenated block text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpanMatch {
    /// Absolute byte offsets into the concatenated text
    pub start: usize,
    pub end: usize,
    /// Every fragment the match overlaps, in order
    pub spans: SmallVec<[FragmentSpan; 4]>,
}

impl SpanMatch {
    /// The span holding the match's first character.
    pub fn first(&self) -> &FragmentSpan {
        &self.spans[0]
    }

    /// The span holding the match's last character.
    pub fn last(&self) -> &FragmentSpan {
        &self.spans[self.spans.len() - 1]
    }
}

/// Finds non-overlapping occurrences of a literal needle in a sequence of
/// fragment texts, scanning left to right once.
///
/// After a hit the scan resumes at the end of that hit, so replaced regions
/// are never revisited.
pub struct TextSpanLocator<'n> {
    needle: &'n str,
    finder: memmem::Finder<'n>,
}

impl<'n> TextSpanLocator<'n> {
    pub fn new(needle: &'n str) -> Self {
        Self {
            needle,
            finder: memmem::Finder::new(needle.as_bytes()),
        }
    }

    #[inline]
    pub fn needle(&self) -> &str {
        self.needle
    }

    /// Locate every occurrence in `texts`, taken as consecutive fragments.
    pub fn locate<S: AsRef<str>>(&self, texts: &[S]) -> Vec<SpanMatch> {
        if self.needle.is_empty() {
            return Vec::new();
        }

        let mut bounds = Vec::with_capacity(texts.len());
        let mut haystack = String::new();
        for text in texts {
            let start = haystack.len();
            haystack.push_str(text.as_ref());
            bounds.push(start..haystack.len());
        }
        if self.needle.len() > haystack.len() {
            return Vec::new();
        }

        let mut matches = Vec::new();
        let mut pos = 0;
        let mut first_fragment = 0;
        while let Some(offset) = self.finder.find(&haystack.as_bytes()[pos..]) {
            let start = pos + offset;
            let end = start + self.needle.len();

            // fragments ending at or before the match start hold none of it
            while bounds[first_fragment].end <= start {
                first_fragment += 1;
            }
            let spans = bounds[first_fragment..]
                .iter()
                .enumerate()
                .take_while(|(_, b)| b.start < end)
                .filter(|(_, b)| !b.is_empty())
                .map(|(i, b)| FragmentSpan {
                    fragment: first_fragment + i,
                    start: start.max(b.start) - b.start,
                    end: end.min(b.end) - b.start,
                })
                .collect();

            matches.push(SpanMatch { start, end, spans });
            pos = end;
        }
        matches
    }

    /// Locate every occurrence in the fragments of `block`.
    ///
    /// Inlines that show content of their own ([`Inline::breaks_text`])
    /// split the block into segments, and no match crosses a segment
    /// boundary. Offsets stay relative to [`Block::text`].
    pub fn locate_in_block(&self, block: &Block) -> Vec<SpanMatch> {
        let mut matches = Vec::new();
        let mut segment: SmallVec<[&str; 16]> = SmallVec::new();
        let mut first = 0;
        let mut offset = 0;

        for inline in block.inlines() {
            match inline {
                Inline::Fragment(f) => segment.push(f.text()),
                opaque if opaque.breaks_text() && !segment.is_empty() => {
                    self.locate_segment(&segment, first, offset, &mut matches);
                    first += segment.len();
                    offset += segment.iter().map(|t| t.len()).sum::<usize>();
                    segment.clear();
                },
                _ => {},
            }
        }
        self.locate_segment(&segment, first, offset, &mut matches);
        matches
    }

    /// Locate within one segment whose first fragment is `first` and whose
    /// text starts at `offset`.
    fn locate_segment(&self, texts: &[&str], first: usize, offset: usize, out: &mut Vec<SpanMatch>) {
        out.extend(self.locate(texts).into_iter().map(|mut m| {
            m.start += offset;
            m.end += offset;
            for span in &mut m.spans {
                span.fragment += first;
            }
            m
        }));
    }
}
