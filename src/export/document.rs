//! Abstract document tree for the Word export template
//!
//! The template's body is modeled as structured nodes (paragraphs,
//! tables, rows, cells, runs) so the exporter can run its two passes
//! separately: global placeholder substitution, then repeating-row
//! expansion. Formatting properties (pPr, rPr, tblPr, ...) are carried
//! as opaque XML subtrees and written back untouched.

use std::collections::BTreeMap;

use regex::Regex;

use crate::export::xml::{XmlElement, XmlError, XmlNode};

/// A top-level body block
#[derive(Debug, Clone)]
pub enum Block {
    Paragraph(Paragraph),
    Table(Table),
    /// Anything else (section properties, bookmarks) passes through
    Other(XmlElement),
}

#[derive(Debug, Clone, Default)]
pub struct Paragraph {
    pub props: Option<XmlElement>,
    pub runs: Vec<Run>,
}

#[derive(Debug, Clone, Default)]
pub struct Run {
    pub props: Option<XmlElement>,
    pub text: String,
}

#[derive(Debug, Clone, Default)]
pub struct Table {
    pub props: Option<XmlElement>,
    pub grid: Option<XmlElement>,
    pub rows: Vec<Row>,
}

#[derive(Debug, Clone, Default)]
pub struct Row {
    pub props: Option<XmlElement>,
    pub cells: Vec<Cell>,
}

#[derive(Debug, Clone, Default)]
pub struct Cell {
    pub props: Option<XmlElement>,
    pub paragraphs: Vec<Paragraph>,
}

/// The parsed document part: `w:document` attributes plus body blocks
#[derive(Debug, Clone)]
pub struct DocumentTree {
    pub doc_attrs: Vec<(String, String)>,
    pub blocks: Vec<Block>,
}

impl Paragraph {
    /// Full paragraph text, concatenated across runs
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    /// Replace the paragraph's text, collapsing it into a single run
    /// that keeps the first run's formatting
    pub fn set_text(&mut self, text: &str) {
        let props = self.runs.first().and_then(|r| r.props.clone());
        self.runs = vec![Run {
            props,
            text: text.to_string(),
        }];
    }

    fn substitute(&mut self, replacements: &BTreeMap<String, String>) {
        let original = self.text();
        let mut updated = original.clone();
        for (token, value) in replacements {
            if updated.contains(token.as_str()) {
                updated = updated.replace(token.as_str(), value);
            }
        }
        if updated != original {
            self.set_text(&updated);
        }
    }
}

impl Cell {
    /// Cell text across its paragraphs
    pub fn text(&self) -> String {
        self.paragraphs
            .iter()
            .map(|p| p.text())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Table {
    /// Whether any cell contains the marker, ignoring quote styling
    pub fn contains_marker(&self, marker: &str) -> bool {
        self.rows.iter().any(|row| {
            row.cells
                .iter()
                .any(|cell| normalize_quotes(&cell.text()).contains(marker))
        })
    }

    /// Index of the first row carrying any of the given markers
    pub fn template_row_index(&self, markers: &[&str]) -> Option<usize> {
        self.rows.iter().position(|row| {
            row.cells.iter().any(|cell| {
                let text = normalize_quotes(&cell.text());
                markers.iter().any(|m| text.contains(m))
            })
        })
    }

    /// Expand the marker-bearing template row: one clone per record, in
    /// record order, inserted where the template row was; the template
    /// row itself is removed. With no records the template row is left
    /// untouched so the document stays reviewable.
    pub fn expand_rows(&mut self, markers: &[&str], records: &[BTreeMap<String, String>]) {
        let Some(index) = self.template_row_index(markers) else {
            return;
        };
        if records.is_empty() {
            return;
        }

        let template = self.rows[index].clone();
        let mut clones = Vec::with_capacity(records.len());
        for record in records {
            let mut row = template.clone();
            for cell in &mut row.cells {
                for paragraph in &mut cell.paragraphs {
                    let original = paragraph.text();
                    let mut updated = original.clone();
                    for (marker, value) in record {
                        if normalize_quotes(&updated).contains(marker.as_str()) {
                            updated = replace_marker(&updated, marker, value);
                        }
                    }
                    if updated != original {
                        paragraph.set_text(&updated);
                    }
                }
            }
            clones.push(row);
        }

        self.rows.splice(index..=index, clones);
    }
}

impl DocumentTree {
    /// Build the tree from a parsed `w:document` element
    pub fn from_xml(root: &XmlElement) -> Result<Self, XmlError> {
        if root.name != "w:document" {
            return Err(XmlError::Structure(format!(
                "expected w:document root, found {}",
                root.name
            )));
        }
        let body = root
            .child("w:body")
            .ok_or_else(|| XmlError::Structure("w:document has no w:body".to_string()))?;

        let mut blocks = Vec::new();
        for node in &body.children {
            let XmlNode::Element(element) = node else {
                continue;
            };
            match element.name.as_str() {
                "w:p" => blocks.push(Block::Paragraph(parse_paragraph(element))),
                "w:tbl" => blocks.push(Block::Table(parse_table(element))),
                _ => blocks.push(Block::Other(element.clone())),
            }
        }

        Ok(Self {
            doc_attrs: root.attrs.clone(),
            blocks,
        })
    }

    /// Serialize back to a `w:document` element
    pub fn to_xml(&self) -> XmlElement {
        let mut body = XmlElement::new("w:body");
        for block in &self.blocks {
            let element = match block {
                Block::Paragraph(p) => paragraph_to_xml(p),
                Block::Table(t) => table_to_xml(t),
                Block::Other(e) => e.clone(),
            };
            body.children.push(XmlNode::Element(element));
        }

        let mut doc = XmlElement::new("w:document");
        doc.attrs = self.doc_attrs.clone();
        doc.children.push(XmlNode::Element(body));
        doc
    }

    /// Pass 1: substitute placeholder tokens in every free-standing
    /// paragraph and every table-cell paragraph
    pub fn substitute(&mut self, replacements: &BTreeMap<String, String>) {
        for block in &mut self.blocks {
            match block {
                Block::Paragraph(p) => p.substitute(replacements),
                Block::Table(t) => {
                    for row in &mut t.rows {
                        for cell in &mut row.cells {
                            for paragraph in &mut cell.paragraphs {
                                paragraph.substitute(replacements);
                            }
                        }
                    }
                }
                Block::Other(_) => {}
            }
        }
    }

    /// Mutable access to the body tables for pass 2
    pub fn tables_mut(&mut self) -> impl Iterator<Item = &mut Table> {
        self.blocks.iter_mut().filter_map(|b| match b {
            Block::Table(t) => Some(t),
            _ => None,
        })
    }
}

/// Normalize word-processor curly quotes to straight quotes
pub fn normalize_quotes(text: &str) -> String {
    text.replace(['\u{201C}', '\u{201D}'], "\"")
}

/// Replace a bracketed marker, swallowing any straight or curly quotes
/// auto-formatting wrapped around it
pub fn replace_marker(text: &str, marker: &str, value: &str) -> String {
    let pattern = format!(
        "[\"\u{201C}\u{201D}]?{}[\"\u{201C}\u{201D}]?",
        regex::escape(marker)
    );
    match Regex::new(&pattern) {
        Ok(re) => re.replace_all(text, regex::NoExpand(value)).into_owned(),
        Err(_) => text.replace(marker, value),
    }
}

fn parse_paragraph(element: &XmlElement) -> Paragraph {
    let mut paragraph = Paragraph {
        props: element.child("w:pPr").cloned(),
        runs: Vec::new(),
    };
    for run in element.children_named("w:r") {
        let text = run
            .children_named("w:t")
            .map(|t| t.text())
            .collect::<String>();
        paragraph.runs.push(Run {
            props: run.child("w:rPr").cloned(),
            text,
        });
    }
    paragraph
}

fn parse_table(element: &XmlElement) -> Table {
    let mut table = Table {
        props: element.child("w:tblPr").cloned(),
        grid: element.child("w:tblGrid").cloned(),
        rows: Vec::new(),
    };
    for row in element.children_named("w:tr") {
        let mut parsed = Row {
            props: row.child("w:trPr").cloned(),
            cells: Vec::new(),
        };
        for cell in row.children_named("w:tc") {
            parsed.cells.push(Cell {
                props: cell.child("w:tcPr").cloned(),
                paragraphs: cell.children_named("w:p").map(parse_paragraph).collect(),
            });
        }
        table.rows.push(parsed);
    }
    table
}

fn paragraph_to_xml(paragraph: &Paragraph) -> XmlElement {
    let mut element = XmlElement::new("w:p");
    if let Some(props) = &paragraph.props {
        element.children.push(XmlNode::Element(props.clone()));
    }
    for run in &paragraph.runs {
        let mut r = XmlElement::new("w:r");
        if let Some(props) = &run.props {
            r.children.push(XmlNode::Element(props.clone()));
        }
        let t = XmlElement::new("w:t")
            .with_attr("xml:space", "preserve")
            .with_text(run.text.clone());
        r.children.push(XmlNode::Element(t));
        element.children.push(XmlNode::Element(r));
    }
    element
}

fn table_to_xml(table: &Table) -> XmlElement {
    let mut element = XmlElement::new("w:tbl");
    if let Some(props) = &table.props {
        element.children.push(XmlNode::Element(props.clone()));
    }
    if let Some(grid) = &table.grid {
        element.children.push(XmlNode::Element(grid.clone()));
    }
    for row in &table.rows {
        let mut tr = XmlElement::new("w:tr");
        if let Some(props) = &row.props {
            tr.children.push(XmlNode::Element(props.clone()));
        }
        for cell in &row.cells {
            let mut tc = XmlElement::new("w:tc");
            if let Some(props) = &cell.props {
                tc.children.push(XmlNode::Element(props.clone()));
            }
            for paragraph in &cell.paragraphs {
                tc.children.push(XmlNode::Element(paragraph_to_xml(paragraph)));
            }
            tr.children.push(XmlNode::Element(tc));
        }
        element.children.push(XmlNode::Element(tr));
    }
    element
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::xml;

    fn doc(body: &str) -> DocumentTree {
        let xml_text = format!(
            r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
            body
        );
        let root = xml::parse(&xml_text).unwrap();
        DocumentTree::from_xml(&root).unwrap()
    }

    fn cell(text: &str) -> String {
        format!("<w:tc><w:p><w:r><w:t>{}</w:t></w:r></w:p></w:tc>", text)
    }

    fn qa_table() -> String {
        format!(
            "<w:tbl><w:tr>{}{}</w:tr><w:tr>{}{}</w:tr></w:tbl>",
            cell("Test"),
            cell("Result"),
            cell("[TEST]"),
            cell("[RESULT]")
        )
    }

    #[test]
    fn test_substitute_covers_paragraphs_and_cells() {
        let mut tree = doc(&format!(
            "<w:p><w:r><w:t>Project: {{{{PROJECT}}}}</w:t></w:r></w:p><w:tbl><w:tr>{}</w:tr></w:tbl>",
            cell("Inspector: {{INSPECTOR}}")
        ));

        let mut replacements = BTreeMap::new();
        replacements.insert("{{PROJECT}}".to_string(), "Runway 9L".to_string());
        replacements.insert("{{INSPECTOR}}".to_string(), "Jane Doe".to_string());
        tree.substitute(&replacements);

        let Block::Paragraph(p) = &tree.blocks[0] else {
            panic!("expected paragraph");
        };
        assert_eq!(p.text(), "Project: Runway 9L");

        let Block::Table(t) = &tree.blocks[1] else {
            panic!("expected table");
        };
        assert_eq!(t.rows[0].cells[0].text(), "Inspector: Jane Doe");
    }

    #[test]
    fn test_substitute_joins_split_runs() {
        let mut tree = doc(
            "<w:p><w:r><w:t>{{PRO</w:t></w:r><w:r><w:t>JECT}}</w:t></w:r></w:p>",
        );
        let mut replacements = BTreeMap::new();
        replacements.insert("{{PROJECT}}".to_string(), "Runway".to_string());
        tree.substitute(&replacements);

        let Block::Paragraph(p) = &tree.blocks[0] else {
            panic!("expected paragraph");
        };
        assert_eq!(p.text(), "Runway");
        assert_eq!(p.runs.len(), 1);
    }

    #[test]
    fn test_expand_rows_clones_per_record_and_removes_template() {
        let mut tree = doc(&qa_table());
        let records: Vec<BTreeMap<String, String>> = ["Compaction", "Proof Roll", "Nuclear Gauge"]
            .iter()
            .map(|name| {
                let mut record = BTreeMap::new();
                record.insert("[TEST]".to_string(), name.to_string());
                record.insert("[RESULT]".to_string(), "Pass".to_string());
                record
            })
            .collect();

        let table = tree.tables_mut().next().unwrap();
        table.expand_rows(&["[TEST]", "[RESULT]"], &records);

        // Header row + exactly 3 data rows, in collection order
        assert_eq!(table.rows.len(), 4);
        assert_eq!(table.rows[1].cells[0].text(), "Compaction");
        assert_eq!(table.rows[2].cells[0].text(), "Proof Roll");
        assert_eq!(table.rows[3].cells[0].text(), "Nuclear Gauge");
        assert!(!table.contains_marker("[TEST]"));
    }

    #[test]
    fn test_expand_rows_empty_collection_keeps_template_row() {
        let mut tree = doc(&qa_table());
        let table = tree.tables_mut().next().unwrap();
        table.expand_rows(&["[TEST]", "[RESULT]"], &[]);

        assert_eq!(table.rows.len(), 2);
        assert!(table.contains_marker("[TEST]"));
    }

    #[test]
    fn test_marker_matching_tolerates_curly_quotes() {
        let mut tree = doc(&format!(
            "<w:tbl><w:tr>{}</w:tr></w:tbl>",
            cell("\u{201C}[TEST]\u{201D}")
        ));
        let table = tree.tables_mut().next().unwrap();
        assert!(table.contains_marker("[TEST]"));

        let mut record = BTreeMap::new();
        record.insert("[TEST]".to_string(), "Compaction".to_string());
        table.expand_rows(&["[TEST]"], &[record]);
        assert_eq!(table.rows[0].cells[0].text(), "Compaction");
    }

    #[test]
    fn test_replace_marker_strips_wrapping_quotes() {
        assert_eq!(replace_marker("\"[QTY]\"", "[QTY]", "12"), "12");
        assert_eq!(
            replace_marker("\u{201C}[QTY]\u{201D} SY", "[QTY]", "12"),
            "12 SY"
        );
        assert_eq!(replace_marker("[QTY]", "[QTY]", "12"), "12");
    }

    #[test]
    fn test_roundtrip_through_xml() {
        let tree = doc(&qa_table());
        let root = tree.to_xml();
        let serialized = xml::serialize(&root).unwrap();
        let reparsed = DocumentTree::from_xml(&xml::parse(&serialized).unwrap()).unwrap();
        assert_eq!(reparsed.blocks.len(), tree.blocks.len());
    }
}
