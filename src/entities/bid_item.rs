//! Bid item entity type (a project-scoped contract pay item)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::identity::{EntityId, EntityPrefix};
use crate::entities::spec_item::SpecItem;
use crate::entities::{FieldError, ValidationError};

/// A bid item translates a universal spec item into a pay item on one
/// specific contract. Its code is unique within its project only, so
/// two projects can both carry a "P-401".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BidItem {
    pub id: EntityId,

    /// Owning project
    pub project: EntityId,

    /// Linked specification item
    pub spec_item: EntityId,

    /// Pay item code, unique within the project
    pub code: String,

    #[serde(default)]
    pub description: String,

    /// Unit of measure (e.g. "SY", "TON")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    /// Project-specific checklist override; when non-empty it wins over
    /// the spec item's default questions
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub checklist_questions: Vec<String>,

    pub created: DateTime<Utc>,

    pub author: String,
}

impl BidItem {
    pub fn new(
        project: EntityId,
        spec_item: EntityId,
        code: String,
        description: String,
        author: String,
    ) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Item),
            project,
            spec_item,
            code,
            description,
            unit: None,
            checklist_questions: Vec::new(),
            created: Utc::now(),
            author,
        }
    }

    /// Resolve which checklist questions apply to this item: the item's
    /// own non-empty override wins; otherwise the spec item's defaults;
    /// otherwise no questions.
    pub fn active_questions<'a>(&'a self, spec: Option<&'a SpecItem>) -> &'a [String] {
        if !self.checklist_questions.is_empty() {
            return &self.checklist_questions;
        }
        if let Some(spec) = spec {
            if !spec.checklist_questions.is_empty() {
                return &spec.checklist_questions;
            }
        }
        &[]
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = Vec::new();
        if self.code.trim().is_empty() {
            errors.push(FieldError::new("code", "is required"));
        }
        ValidationError::new(errors).into_result()
    }
}

/// Join a question list into editable text, one question per line
pub fn questions_to_text(questions: &[String]) -> String {
    questions.join("\n")
}

/// Parse editable text back into a question list: split on newlines,
/// trim, drop blanks
pub fn questions_from_text(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
