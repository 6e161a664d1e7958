//! Depth-first traversal of table trees.
use crate::common::error::{Error, Result};
use crate::ooxml::docx::{Block, Table};
use crate::replace::replacer::replace_in_block;
use crate::replace::rule::ReplacementRule;
use crate::replace::snapshot::{CellFormat, Snapshot};
use crate::replace::TextSpanLocator;

/// Deepest table nesting accepted by default.
pub const DEFAULT_MAX_TABLE_DEPTH: usize = 100;

/// Applies block-level work to every paragraph of a table, nested tables
/// included.
///
/// Traversal is pre-order: for each row, for each cell, the cell's own
/// paragraphs are visited first, then each table nested in the cell. A
/// table nested deeper than `max_depth` is rejected before anything is
/// visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableWalker {
    max_depth: usize,
}

impl TableWalker {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    #[inline]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Fail with [`Error::Structural`] if `table` nests too deep.
    pub fn check_depth(&self, table: &Table) -> Result<()> {
        let depth = table.nesting_depth();
        if depth > self.max_depth {
            return Err(Error::Structural(format!(
                "table nesting depth {} exceeds the limit of {}",
                depth, self.max_depth
            )));
        }
        Ok(())
    }

    /// Run `f` on every paragraph in `table`, summing what it returns.
    ///
    /// Cell formatting is captured before a cell is processed and applied
    /// again afterwards.
    pub fn process_with<F>(&self, table: &mut Table, mut f: F) -> Result<usize>
    where
        F: FnMut(&mut Block) -> usize,
    {
        self.check_depth(table)?;
        Ok(Self::visit_mut(table, &mut f))
    }

    /// Apply `rules` in order over the whole table, one full pass per rule.
    /// Returns the occurrence count of each rule.
    pub fn process(&self, table: &mut Table, rules: &[ReplacementRule]) -> Result<Vec<usize>> {
        self.check_depth(table)?;
        Ok(rules
            .iter()
            .map(|rule| {
                let locator = TextSpanLocator::new(rule.find());
                Self::visit_mut(table, &mut |block: &mut Block| {
                    replace_in_block(block, &locator, rule.replace())
                })
            })
            .collect())
    }

    /// Visit every paragraph read-only, with the nesting depth of the table
    /// that holds it (1 for the outermost).
    pub fn walk<F>(&self, table: &Table, mut f: F) -> Result<()>
    where
        F: FnMut(&Block, usize),
    {
        self.check_depth(table)?;
        Self::visit(table, 1, &mut f);
        Ok(())
    }

    /// Traversal without the depth check; callers check first.
    pub(crate) fn visit_mut<F>(table: &mut Table, f: &mut F) -> usize
    where
        F: FnMut(&mut Block) -> usize,
    {
        let mut total = 0;
        for row in table.rows_mut() {
            for cell in row.cells_mut() {
                let format = CellFormat::capture(cell);
                for block in cell.blocks_mut() {
                    total += f(block);
                }
                for nested in cell.tables_mut() {
                    total += Self::visit_mut(nested, f);
                }
                format.apply(cell);
            }
        }
        total
    }

    fn visit<F>(table: &Table, depth: usize, f: &mut F)
    where
        F: FnMut(&Block, usize),
    {
        for cell in table.rows().flat_map(|r| r.cells()) {
            for block in cell.blocks() {
                f(block, depth);
            }
            for nested in cell.tables() {
                Self::visit(nested, depth + 1, f);
            }
        }
    }
}

impl Default for TableWalker {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_TABLE_DEPTH)
    }
}
