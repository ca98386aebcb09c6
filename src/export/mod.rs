//! Report export: the CSV master log and the templated Word document

pub mod csv;
pub mod docx;
pub mod document;
pub mod fields;
pub mod xml;

pub use csv::{master_log, CsvError};
pub use docx::{export, suggested_filename, ExportError, ExportedReport};
pub use document::DocumentTree;
