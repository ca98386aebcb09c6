//! Spec item entity type (a universal specification code)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::identity::{EntityId, EntityPrefix};
use crate::entities::{FieldError, ValidationError};

/// A universal specification item (e.g. "P-401 Asphalt Mix Pavement")
/// carrying the default checklist questions for bid items that
/// translate it into a contract
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecItem {
    pub id: EntityId,

    /// Specification code, unique across the workspace
    pub code: String,

    pub description: String,

    /// Division or category label (e.g. "Flexible Pavement")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub division: Option<String>,

    /// Default ordered checklist questions
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub checklist_questions: Vec<String>,

    pub created: DateTime<Utc>,

    pub author: String,
}

impl SpecItem {
    pub fn new(code: String, description: String, author: String) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Spec),
            code,
            description,
            division: None,
            checklist_questions: Vec::new(),
            created: Utc::now(),
            author,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = Vec::new();
        if self.code.trim().is_empty() {
            errors.push(FieldError::new("code", "is required"));
        }
        ValidationError::new(errors).into_result()
    }
}
