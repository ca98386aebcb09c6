//! Word document assembly for a finalized report
//!
//! The template is a WordprocessingML main document part, resolved from
//! the workspace's `.dit/templates/` override or the embedded assets.
//! After the two population passes the part is packaged as a minimal
//! OPC (.docx) archive and returned as bytes with a suggested filename.

use std::io::Write;

use rust_embed::Embed;
use thiserror::Error;

use crate::core::store::ReportAggregate;
use crate::core::Workspace;
use crate::entities::report::Report;
use crate::export::document::DocumentTree;
use crate::export::fields::{
    crew_rows, equipment_rows, placeholder_map, qa_rows, quantity_rows, CREW_MARKERS,
    EQUIPMENT_MARKERS, QA_MARKERS, QUANTITY_MARKERS,
};
use crate::export::xml::{self, XmlError};

#[derive(Embed)]
#[folder = "templates/"]
struct EmbeddedTemplates;

/// The template part filename, both embedded and as workspace override
pub const TEMPLATE_NAME: &str = "inspection_report.xml";

/// Errors that can occur while exporting a report document
#[derive(Debug, Error)]
pub enum ExportError {
    #[error(
        "export template not found; place {TEMPLATE_NAME} under .dit/templates/ to provide one"
    )]
    TemplateMissing,

    #[error("template could not be read: {0}")]
    TemplateUnreadable(String),

    #[error("template is not a valid document: {0}")]
    BadTemplate(#[from] XmlError),

    #[error("failed to package document: {0}")]
    Package(String),
}

/// A populated export: the .docx bytes plus a suggested filename
pub struct ExportedReport {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Populate the template from a report aggregate
pub fn export(
    agg: &ReportAggregate,
    ws: Option<&Workspace>,
) -> Result<ExportedReport, ExportError> {
    let template = load_template(ws)?;
    let root = xml::parse(&template)?;
    let mut tree = DocumentTree::from_xml(&root)?;

    // Pass 1: global placeholder substitution
    tree.substitute(&placeholder_map(agg));

    // Pass 2: expand each repeating table found in the template
    for table in tree.tables_mut() {
        if table.contains_marker("[TEST]") {
            table.expand_rows(QA_MARKERS, &qa_rows(agg));
        } else if table.contains_marker("[DESC]") {
            table.expand_rows(QUANTITY_MARKERS, &quantity_rows(agg));
        } else if table.contains_marker("[CONTRACTOR]") {
            table.expand_rows(CREW_MARKERS, &crew_rows(agg));
        } else if table.contains_marker("[EQUIPMENT]") {
            table.expand_rows(EQUIPMENT_MARKERS, &equipment_rows(agg));
        }
    }

    let document_xml = xml::serialize(&tree.to_xml())?;
    let bytes = package_docx(&document_xml)?;

    Ok(ExportedReport {
        filename: suggested_filename(&agg.report),
        bytes,
    })
}

/// Resolve the template part: workspace override first, then embedded
fn load_template(ws: Option<&Workspace>) -> Result<String, ExportError> {
    if let Some(ws) = ws {
        let override_path = ws.dit_dir().join("templates").join(TEMPLATE_NAME);
        if override_path.exists() {
            return std::fs::read_to_string(&override_path)
                .map_err(|e| ExportError::TemplateUnreadable(e.to_string()));
        }
    }

    let embedded = EmbeddedTemplates::get(TEMPLATE_NAME).ok_or(ExportError::TemplateMissing)?;
    String::from_utf8(embedded.data.into_owned())
        .map_err(|e| ExportError::TemplateUnreadable(e.to_string()))
}

/// `DIR_<dir_number>_<date>.docx`, sanitized for the filesystem
pub fn suggested_filename(report: &Report) -> String {
    let dir = report
        .dir_number
        .clone()
        .unwrap_or_else(|| report.id.to_string());
    let date = report
        .start_date
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "undated".to_string());
    let raw = format!("DIR_{}_{}.docx", dir, date);
    raw.chars()
        .map(|c| if c.is_whitespace() || c == '/' { '_' } else { c })
        .collect()
}

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

/// Zip the populated part into a minimal OPC package
fn package_docx(document_xml: &str) -> Result<Vec<u8>, ExportError> {
    let cursor = std::io::Cursor::new(Vec::new());
    let mut archive = zip::ZipWriter::new(cursor);

    let parts: [(&str, &str); 3] = [
        ("[Content_Types].xml", CONTENT_TYPES),
        ("_rels/.rels", ROOT_RELS),
        ("word/document.xml", document_xml),
    ];

    for (name, content) in parts {
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated);
        archive
            .start_file(name, options)
            .map_err(|e| ExportError::Package(e.to_string()))?;
        archive
            .write_all(content.as_bytes())
            .map_err(|e| ExportError::Package(e.to_string()))?;
    }

    let cursor = archive
        .finish()
        .map_err(|e| ExportError::Package(e.to_string()))?;
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::entries::{PlacedQuantity, QaEntry, QaResult, QaType};
    use crate::entities::{BidItem, Project, SpecItem};
    use chrono::NaiveDate;
    use std::collections::BTreeMap;
    use std::io::Read;

    fn aggregate() -> ReportAggregate {
        let project = Project::new(
            "Runway 9L".to_string(),
            "FAA-2026-017".to_string(),
            "jdoe".to_string(),
        );
        let spec = SpecItem::new("P-401".to_string(), "Asphalt".to_string(), "jdoe".to_string());
        let item = BidItem::new(
            project.id.clone(),
            spec.id.clone(),
            "P-401".to_string(),
            "Asphalt Mix Pavement".to_string(),
            "jdoe".to_string(),
        );

        let mut report = Report::new("jdoe".to_string());
        report.dir_number = Some("042".to_string());
        report.project = Some(project.id.clone());
        report.start_date = NaiveDate::from_ymd_opt(2026, 8, 1);
        for _ in 0..3 {
            report
                .placed_quantities
                .push(PlacedQuantity::new(item.id.clone(), 100.0));
        }

        let mut items = BTreeMap::new();
        items.insert(item.id.to_string(), item);

        ReportAggregate {
            report,
            project: Some(project),
            phase: None,
            items,
            specs: BTreeMap::new(),
        }
    }

    fn document_part(bytes: &[u8]) -> String {
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes.to_vec())).unwrap();
        let mut part = archive.by_name("word/document.xml").unwrap();
        let mut content = String::new();
        part.read_to_string(&mut content).unwrap();
        content
    }

    #[test]
    fn test_export_produces_populated_package() {
        let agg = aggregate();
        let exported = export(&agg, None).unwrap();

        assert_eq!(exported.filename, "DIR_042_2026-08-01.docx");
        let document = document_part(&exported.bytes);
        assert!(document.contains("Runway 9L"));
        assert!(document.contains("08/01/2026"));
        assert!(!document.contains("{{PROJECT}}"));
    }

    #[test]
    fn test_export_expands_quantity_rows_and_keeps_empty_qa_template() {
        let agg = aggregate();
        let exported = export(&agg, None).unwrap();
        let document = document_part(&exported.bytes);

        // 3 placed quantities -> the [DESC] marker is gone and the item
        // description appears three times
        assert!(!document.contains("[DESC]"));
        assert_eq!(document.matches("Asphalt Mix Pavement").count(), 3);

        // No QA entries -> the QA template row stays, markers intact
        assert!(document.contains("[TEST]"));
    }

    #[test]
    fn test_export_expands_qa_rows_when_present() {
        let mut agg = aggregate();
        agg.report.qa_entries.push(QaEntry {
            qa_type: QaType::Compaction,
            result: QaResult::Pass,
            location: Some("Sta 2+50".to_string()),
            remarks: None,
        });
        let exported = export(&agg, None).unwrap();
        let document = document_part(&exported.bytes);

        assert!(!document.contains("[TEST]"));
        assert!(document.contains("Compaction"));
        assert!(document.contains("Sta 2+50"));
    }

    #[test]
    fn test_suggested_filename_sanitizes() {
        let mut report = Report::new("jdoe".to_string());
        report.dir_number = Some("42 A/B".to_string());
        assert_eq!(suggested_filename(&report), "DIR_42_A_B_undated.docx");
    }
}
