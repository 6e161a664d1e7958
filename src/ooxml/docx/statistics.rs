/// Document statistics for DOCX documents.
///
/// # Example
///
/// ```rust,no_run
/// use docsplice::ooxml::docx::Package;
///
/// let pkg = Package::open("document.docx")?;
/// let stats = pkg.document().statistics();
/// println!("Words: {}", stats.word_count());
/// println!("Paragraphs: {}", stats.paragraph_count());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
use serde::Serialize;

/// Counts of paragraphs, tables, cells, words and characters.
///
/// Paragraphs inside table cells (at any nesting depth) are included.
/// Statistics are calculated on demand.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DocumentStatistics {
    word_count: usize,
    character_count: usize,
    character_count_no_spaces: usize,
    paragraph_count: usize,
    table_count: usize,
    cell_count: usize,
    /// Replacements performed on the document in the current session
    replacement_count: usize,
}

impl DocumentStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn word_count(&self) -> usize {
        self.word_count
    }

    /// Character count, including spaces.
    #[inline]
    pub fn character_count(&self) -> usize {
        self.character_count
    }

    #[inline]
    pub fn character_count_no_spaces(&self) -> usize {
        self.character_count_no_spaces
    }

    #[inline]
    pub fn paragraph_count(&self) -> usize {
        self.paragraph_count
    }

    /// Table count, nested tables included.
    #[inline]
    pub fn table_count(&self) -> usize {
        self.table_count
    }

    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cell_count
    }

    #[inline]
    pub fn replacement_count(&self) -> usize {
        self.replacement_count
    }

    /// Account for one paragraph's text.
    pub(crate) fn add_paragraph(&mut self, text: &str) {
        self.paragraph_count += 1;
        self.word_count += count_words(text);
        self.character_count += count_characters(text);
        self.character_count_no_spaces += count_characters_no_spaces(text);
    }

    pub(crate) fn add_table(&mut self) {
        self.table_count += 1;
    }

    pub(crate) fn add_cells(&mut self, count: usize) {
        self.cell_count += count;
    }

    pub(crate) fn set_replacement_count(&mut self, count: usize) {
        self.replacement_count = count;
    }
}

/// Word count: runs of non-whitespace.
#[inline]
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Character count (with spaces).
#[inline]
pub fn count_characters(text: &str) -> usize {
    text.chars().count()
}

/// Character count (without whitespace).
#[inline]
pub fn count_characters_no_spaces(text: &str) -> usize {
    text.chars().filter(|c| !c.is_whitespace()).count()
}
