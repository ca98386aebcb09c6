//! Phase entity type (a named construction phase)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::identity::{EntityId, EntityPrefix};
use crate::entities::{FieldError, ValidationError};

/// A named construction phase referenced by reports
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Phase {
    pub id: EntityId,

    /// Phase name (unique across the workspace)
    pub name: String,

    pub created: DateTime<Utc>,

    pub author: String,
}

impl Phase {
    pub fn new(name: String, author: String) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Phs),
            name,
            created: Utc::now(),
            author,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = Vec::new();
        if self.name.trim().is_empty() {
            errors.push(FieldError::new("name", "is required"));
        }
        ValidationError::new(errors).into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_creation() {
        let phase = Phase::new("Phase 2 - Paving".to_string(), "jdoe".to_string());
        assert!(phase.id.to_string().starts_with("PHS-"));
        assert!(phase.validate().is_ok());
    }

    #[test]
    fn test_phase_requires_name() {
        let phase = Phase::new("  ".to_string(), "jdoe".to_string());
        assert!(phase.validate().is_err());
    }
}
