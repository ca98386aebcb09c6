//! Entity type definitions
//!
//! DIT manages the following entity types:
//!
//! **Catalog:**
//! - [`Project`] - A construction contract with its header metadata
//! - [`Phase`] - A named construction phase
//! - [`SpecItem`] - A universal specification code with a default checklist
//! - [`BidItem`] - A project-scoped pay item translating a spec item
//!
//! **Reporting:**
//! - [`Report`] - The daily inspection report aggregate, embedding its
//!   placed quantities, equipment, crew, QA entries, checklists,
//!   attachments, and activity log

pub mod answers;
pub mod bid_item;
pub mod entries;
pub mod phase;
pub mod project;
pub mod report;
pub mod spec_item;

pub use bid_item::BidItem;
pub use entries::{
    ActivityLog, ChecklistEntry, CrewEntry, EquipmentEntry, PlacedQuantity, QaEntry, QaResult,
    QaType, ReportAttachment,
};
pub use phase::Phase;
pub use project::Project;
pub use report::{Compliance, DeficiencyStatus, Report, ReportResult, ReportStatus};
pub use spec_item::SpecItem;

use std::fmt;

/// A single field-level validation failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.message)
    }
}

/// A structured list of field+message validation failures
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub errors: Vec<FieldError>,
}

impl ValidationError {
    pub fn new(errors: Vec<FieldError>) -> Self {
        Self { errors }
    }

    /// Ok when the error list is empty, Err(self) otherwise
    pub fn into_result(self) -> Result<(), ValidationError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.errors.iter().map(|e| e.to_string()).collect();
        write!(f, "{}", messages.join(", "))
    }
}

impl std::error::Error for ValidationError {}
