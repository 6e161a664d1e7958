/// Table, row, and cell structures for Word documents.
///
/// Tables form a strict tree: a table owns rows, a row owns cells, and a cell
/// owns paragraphs and nested tables. Table-level children the model does not
/// interpret (`w:tblPr`, `w:tblGrid`, `w:trPr`, content controls wrapping
/// rows or cells) are kept in position as opaque nodes.
use crate::common::xml::{XmlAttr, XmlElement, XmlNode};
use crate::ooxml::docx::paragraph::Block;

/// Children of a `w:tbl`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableItem {
    Row(Row),
    Other(XmlNode),
}

/// Children of a `w:tr`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowItem {
    Cell(Cell),
    Other(XmlNode),
}

/// Children of a `w:tc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellItem {
    Block(Block),
    Table(Table),
    Other(XmlNode),
}

/// A table (`w:tbl`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    name: String,
    attrs: Vec<XmlAttr>,
    items: Vec<TableItem>,
}

/// A table row (`w:tr`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    name: String,
    attrs: Vec<XmlAttr>,
    items: Vec<RowItem>,
}

/// A table cell (`w:tc`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    name: String,
    attrs: Vec<XmlAttr>,
    /// `w:tcPr`
    properties: Option<XmlElement>,
    items: Vec<CellItem>,
}

/// Open tag of `name`/`attrs`, then `body`, then the close tag.
fn write_wrapped(name: &str, attrs: &[XmlAttr], empty: bool, out: &mut String, body: impl FnOnce(&mut String)) {
    let shell = XmlElement {
        name: name.to_string(),
        attrs: attrs.to_vec(),
        children: Vec::new(),
    };
    shell.write_open(out, empty);
    if !empty {
        body(out);
        shell.write_close(out);
    }
}

impl Table {
    /// An empty table in the `w` namespace.
    pub fn new() -> Self {
        Self {
            name: "w:tbl".to_string(),
            attrs: Vec::new(),
            items: Vec::new(),
        }
    }

    pub fn from_element(element: XmlElement) -> Self {
        let XmlElement { name, attrs, children } = element;
        let items = children
            .into_iter()
            .map(|child| match child {
                XmlNode::Element(e) if e.local_name() == "tr" => TableItem::Row(Row::from_element(e)),
                other => TableItem::Other(other),
            })
            .collect();
        Self { name, attrs, items }
    }

    pub fn rows(&self) -> impl Iterator<Item = &Row> {
        self.items.iter().filter_map(|i| match i {
            TableItem::Row(r) => Some(r),
            TableItem::Other(_) => None,
        })
    }

    pub fn rows_mut(&mut self) -> impl Iterator<Item = &mut Row> {
        self.items.iter_mut().filter_map(|i| match i {
            TableItem::Row(r) => Some(r),
            TableItem::Other(_) => None,
        })
    }

    pub fn row_count(&self) -> usize {
        self.rows().count()
    }

    pub fn push_row(&mut self, row: Row) {
        self.items.push(TableItem::Row(row));
    }

    /// Nesting depth of this table: 1 when no cell holds a nested table.
    pub fn nesting_depth(&self) -> usize {
        1 + self
            .rows()
            .flat_map(Row::cells)
            .flat_map(Cell::tables)
            .map(Table::nesting_depth)
            .max()
            .unwrap_or(0)
    }

    pub fn write_to(&self, out: &mut String) {
        write_wrapped(&self.name, &self.attrs, self.items.is_empty(), out, |out| {
            for item in &self.items {
                match item {
                    TableItem::Row(r) => r.write_to(out),
                    TableItem::Other(node) => node.write_to(out),
                }
            }
        });
    }
}

impl Default for Table {
    fn default() -> Self {
        Self::new()
    }
}

impl Row {
    pub fn new() -> Self {
        Self {
            name: "w:tr".to_string(),
            attrs: Vec::new(),
            items: Vec::new(),
        }
    }

    pub fn from_element(element: XmlElement) -> Self {
        let XmlElement { name, attrs, children } = element;
        let items = children
            .into_iter()
            .map(|child| match child {
                XmlNode::Element(e) if e.local_name() == "tc" => RowItem::Cell(Cell::from_element(e)),
                other => RowItem::Other(other),
            })
            .collect();
        Self { name, attrs, items }
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.items.iter().filter_map(|i| match i {
            RowItem::Cell(c) => Some(c),
            RowItem::Other(_) => None,
        })
    }

    pub fn cells_mut(&mut self) -> impl Iterator<Item = &mut Cell> {
        self.items.iter_mut().filter_map(|i| match i {
            RowItem::Cell(c) => Some(c),
            RowItem::Other(_) => None,
        })
    }

    pub fn push_cell(&mut self, cell: Cell) {
        self.items.push(RowItem::Cell(cell));
    }

    pub fn write_to(&self, out: &mut String) {
        write_wrapped(&self.name, &self.attrs, self.items.is_empty(), out, |out| {
            for item in &self.items {
                match item {
                    RowItem::Cell(c) => c.write_to(out),
                    RowItem::Other(node) => node.write_to(out),
                }
            }
        });
    }
}

impl Default for Row {
    fn default() -> Self {
        Self::new()
    }
}

impl Cell {
    pub fn new() -> Self {
        Self {
            name: "w:tc".to_string(),
            attrs: Vec::new(),
            properties: None,
            items: Vec::new(),
        }
    }

    pub fn from_element(element: XmlElement) -> Self {
        let XmlElement { name, attrs, children } = element;
        let mut properties = None;
        let mut items = Vec::with_capacity(children.len());

        for child in children {
            match child {
                XmlNode::Element(e) if properties.is_none() && items.is_empty() && e.local_name() == "tcPr" => {
                    properties = Some(e);
                },
                XmlNode::Element(e) if e.local_name() == "p" => items.push(CellItem::Block(Block::from_element(e))),
                XmlNode::Element(e) if e.local_name() == "tbl" => items.push(CellItem::Table(Table::from_element(e))),
                other => items.push(CellItem::Other(other)),
            }
        }

        Self {
            name,
            attrs,
            properties,
            items,
        }
    }

    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.items.iter().filter_map(|i| match i {
            CellItem::Block(b) => Some(b),
            _ => None,
        })
    }

    pub fn blocks_mut(&mut self) -> impl Iterator<Item = &mut Block> {
        self.items.iter_mut().filter_map(|i| match i {
            CellItem::Block(b) => Some(b),
            _ => None,
        })
    }

    /// Tables nested directly in this cell.
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.items.iter().filter_map(|i| match i {
            CellItem::Table(t) => Some(t),
            _ => None,
        })
    }

    pub fn tables_mut(&mut self) -> impl Iterator<Item = &mut Table> {
        self.items.iter_mut().filter_map(|i| match i {
            CellItem::Table(t) => Some(t),
            _ => None,
        })
    }

    pub fn push_block(&mut self, block: Block) {
        self.items.push(CellItem::Block(block));
    }

    pub fn push_table(&mut self, table: Table) {
        self.items.push(CellItem::Table(table));
    }

    /// Text of the cell's own paragraphs, joined by newlines.
    pub fn text(&self) -> String {
        self.blocks().map(|b| b.text()).collect::<Vec<_>>().join("\n")
    }

    /// Cell properties (`w:tcPr`), if present.
    #[inline]
    pub fn properties(&self) -> Option<&XmlElement> {
        self.properties.as_ref()
    }

    /// Cell properties for editing, created empty when absent.
    pub fn properties_mut(&mut self) -> &mut XmlElement {
        let name = match self.name.rfind(':') {
            Some(i) => format!("{}:tcPr", &self.name[..i]),
            None => "tcPr".to_string(),
        };
        self.properties.get_or_insert_with(|| XmlElement::new(name))
    }

    pub fn write_to(&self, out: &mut String) {
        let empty = self.properties.is_none() && self.items.is_empty();
        write_wrapped(&self.name, &self.attrs, empty, out, |out| {
            if let Some(props) = &self.properties {
                props.write_to(out);
            }
            for item in &self.items {
                match item {
                    CellItem::Block(b) => b.write_to(out),
                    CellItem::Table(t) => t.write_to(out),
                    CellItem::Other(node) => node.write_to(out),
                }
            }
        });
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::xml::XmlDocument;

    const NESTED: &str = r#"<w:tbl><w:tblPr><w:tblW w:w="0" w:type="auto"/></w:tblPr><w:tblGrid><w:gridCol w:w="4788"/></w:tblGrid><w:tr><w:tc><w:tcPr><w:shd w:val="clear" w:fill="FFFF00"/></w:tcPr><w:p><w:r><w:t>outer</w:t></w:r></w:p><w:tbl><w:tr><w:tc><w:p><w:r><w:t>inner</w:t></w:r></w:p></w:tc></w:tr></w:tbl><w:p/></w:tc></w:tr></w:tbl>"#;

    fn nested() -> Table {
        Table::from_element(XmlDocument::parse(NESTED.as_bytes()).unwrap().root)
    }

    #[test]
    fn test_cell_structure() {
        let table = nested();
        assert_eq!(table.row_count(), 1);
        let cell = table.rows().next().unwrap().cells().next().unwrap();
        assert_eq!(cell.blocks().count(), 2);
        assert_eq!(cell.tables().count(), 1);
        assert_eq!(cell.text(), "outer\n");
        assert!(cell.properties().unwrap().child("shd").is_some());
    }

    #[test]
    fn test_nesting_depth() {
        assert_eq!(nested().nesting_depth(), 2);
        assert_eq!(Table::new().nesting_depth(), 1);
    }

    #[test]
    fn test_serialization_is_lossless() {
        let mut out = String::new();
        nested().write_to(&mut out);
        assert_eq!(out, NESTED);
    }

    #[test]
    fn test_built_table() {
        let mut cell = Cell::new();
        cell.push_block(Block::from_texts(&["a"]));
        let mut row = Row::new();
        row.push_cell(cell);
        let mut table = Table::new();
        table.push_row(row);
        let mut out = String::new();
        table.write_to(&mut out);
        assert_eq!(out, "<w:tbl><w:tr><w:tc><w:p><w:r><w:t>a</w:t></w:r></w:p></w:tc></w:tr></w:tbl>");
    }
}
