//! Project entity type (a construction contract)

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::identity::{EntityId, EntityPrefix};
use crate::entities::{FieldError, ValidationError};

/// A construction project: the contract under which bid items are placed
/// and daily inspection reports are filed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    /// Unique identifier
    pub id: EntityId,

    /// Project name
    pub name: String,

    /// Contract number
    pub contract_number: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_manager: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub construction_manager: Option<String>,

    /// Contract duration in days
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_days: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_start_date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prime_contractor: Option<String>,

    /// Creation timestamp
    pub created: DateTime<Utc>,

    /// Author (who created this project)
    pub author: String,
}

impl Project {
    pub fn new(name: String, contract_number: String, author: String) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Prj),
            name,
            contract_number,
            project_manager: None,
            construction_manager: None,
            contract_days: None,
            contract_start_date: None,
            prime_contractor: None,
            created: Utc::now(),
            author,
        }
    }

    /// Required-field validation
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = Vec::new();
        if self.name.trim().is_empty() {
            errors.push(FieldError::new("name", "is required"));
        }
        if self.contract_number.trim().is_empty() {
            errors.push(FieldError::new("contract_number", "is required"));
        }
        ValidationError::new(errors).into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_creation() {
        let project = Project::new(
            "Runway 9L Rehab".to_string(),
            "FAA-2026-017".to_string(),
            "jdoe".to_string(),
        );
        assert!(project.id.to_string().starts_with("PRJ-"));
        assert!(project.validate().is_ok());
    }

    #[test]
    fn test_project_requires_name_and_contract() {
        let project = Project::new(String::new(), String::new(), "jdoe".to_string());
        let err = project.validate().unwrap_err();
        assert_eq!(err.errors.len(), 2);
        assert_eq!(err.errors[0].field, "name");
        assert_eq!(err.errors[1].field, "contract_number");
    }

    #[test]
    fn test_project_roundtrip() {
        let mut project = Project::new(
            "Taxiway B".to_string(),
            "C-1001".to_string(),
            "jdoe".to_string(),
        );
        project.prime_contractor = Some("Acme Paving".to_string());

        let yaml = serde_yml::to_string(&project).unwrap();
        let parsed: Project = serde_yml::from_str(&yaml).unwrap();
        assert_eq!(project.id, parsed.id);
        assert_eq!(parsed.prime_contractor.as_deref(), Some("Acme Paving"));
    }
}
