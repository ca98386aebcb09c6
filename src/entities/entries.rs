//! Child rows embedded in a report: placed quantities, equipment, crew,
//! QA tests, checklists, attachments, and the revision activity log

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::identity::{EntityId, EntityPrefix};
use crate::entities::answers::{parse_answer_map, AnswerMap};

/// One line item of work performed against a bid item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacedQuantity {
    /// The bid item this quantity was placed against
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bid_item: Option<EntityId>,

    #[serde(default)]
    pub quantity: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// Sparse question -> answer blob; read through [`Self::answers`]
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub checklist_answers: serde_json::Value,
}

impl PlacedQuantity {
    pub fn new(bid_item: EntityId, quantity: f64) -> Self {
        Self {
            bid_item: Some(bid_item),
            quantity,
            location: None,
            notes: None,
            checklist_answers: serde_json::Value::Null,
        }
    }

    /// Read-repaired answer map
    pub fn answers(&self) -> AnswerMap {
        parse_answer_map(&self.checklist_answers)
    }

    /// A placed-quantity row is only meaningful with a bid item
    pub fn is_meaningful(&self) -> bool {
        self.bid_item.is_some()
    }
}

impl Default for PlacedQuantity {
    fn default() -> Self {
        Self {
            bid_item: None,
            quantity: 0.0,
            location: None,
            notes: None,
            checklist_answers: serde_json::Value::Null,
        }
    }
}

/// One equipment usage row
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EquipmentEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contractor: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub make_model: Option<String>,

    #[serde(default = "default_equipment_quantity")]
    pub quantity: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours: Option<f64>,
}

fn default_equipment_quantity() -> u32 {
    1
}

impl EquipmentEntry {
    /// An equipment row is only meaningful with a make/model
    pub fn is_meaningful(&self) -> bool {
        self.make_model
            .as_deref()
            .map(|s| !s.trim().is_empty())
            .unwrap_or(false)
    }
}

/// One crew count row
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrewEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contractor: Option<String>,

    #[serde(default)]
    pub foreman_count: u32,

    #[serde(default)]
    pub superintendent_count: u32,

    #[serde(default)]
    pub laborer_count: u32,

    #[serde(default)]
    pub operator_count: u32,

    #[serde(default)]
    pub survey_count: u32,

    #[serde(default)]
    pub electrician_count: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl CrewEntry {
    /// A crew row is only meaningful with a contractor
    pub fn is_meaningful(&self) -> bool {
        self.contractor
            .as_deref()
            .map(|s| !s.trim().is_empty())
            .unwrap_or(false)
    }
}

/// Discrete QA test categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QaType {
    Compaction,
    ConcreteSlump,
    ConcreteCylinder,
    AsphaltTemp,
    NuclearGauge,
    ProofRoll,
}

impl QaType {
    /// Display label for exports
    pub fn label(&self) -> &'static str {
        match self {
            QaType::Compaction => "Compaction",
            QaType::ConcreteSlump => "Concrete Slump",
            QaType::ConcreteCylinder => "Concrete Cylinder",
            QaType::AsphaltTemp => "Asphalt Temp",
            QaType::NuclearGauge => "Nuclear Gauge",
            QaType::ProofRoll => "Proof Roll",
        }
    }
}

impl std::fmt::Display for QaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for QaType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "compaction" => Ok(QaType::Compaction),
            "concrete_slump" => Ok(QaType::ConcreteSlump),
            "concrete_cylinder" => Ok(QaType::ConcreteCylinder),
            "asphalt_temp" => Ok(QaType::AsphaltTemp),
            "nuclear_gauge" => Ok(QaType::NuclearGauge),
            "proof_roll" => Ok(QaType::ProofRoll),
            _ => Err(format!("Unknown QA test type: {}", s)),
        }
    }
}

/// Outcome of a single QA test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QaResult {
    Pass,
    Fail,
    Pending,
    #[serde(rename = "n_a")]
    NotApplicable,
}

impl QaResult {
    pub fn label(&self) -> &'static str {
        match self {
            QaResult::Pass => "Pass",
            QaResult::Fail => "Fail",
            QaResult::Pending => "Pending",
            QaResult::NotApplicable => "N/A",
        }
    }
}

impl std::fmt::Display for QaResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for QaResult {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pass" => Ok(QaResult::Pass),
            "fail" => Ok(QaResult::Fail),
            "pending" => Ok(QaResult::Pending),
            "n_a" | "n/a" | "na" => Ok(QaResult::NotApplicable),
            _ => Err(format!("Unknown QA result: {}", s)),
        }
    }
}

/// One discrete QA test result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QaEntry {
    pub qa_type: QaType,

    pub result: QaResult,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
}

/// A per-report checklist instance for a spec item, independent of any
/// particular placed-quantity line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChecklistEntry {
    pub id: EntityId,

    pub spec_item: EntityId,

    /// Sparse question -> answer blob; read through [`Self::answers`]
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub checklist_answers: serde_json::Value,
}

impl ChecklistEntry {
    pub fn new(spec_item: EntityId) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Chk),
            spec_item,
            checklist_answers: serde_json::Value::Null,
        }
    }

    /// Read-repaired answer map
    pub fn answers(&self) -> AnswerMap {
        parse_answer_map(&self.checklist_answers)
    }
}

/// A file attached to a report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportAttachment {
    pub filename: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

/// Audit-trail row recorded when a revision is requested
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityLog {
    /// Roster username of the reviewer; always an identified user
    pub actor: String,

    pub note: String,

    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_placed_quantity_meaningful_requires_bid_item() {
        let row = PlacedQuantity::default();
        assert!(!row.is_meaningful());

        let row = PlacedQuantity::new(EntityId::new(EntityPrefix::Item), 120.0);
        assert!(row.is_meaningful());
    }

    #[test]
    fn test_equipment_meaningful_requires_make_model() {
        let mut row = EquipmentEntry::default();
        assert!(!row.is_meaningful());
        row.make_model = Some("   ".to_string());
        assert!(!row.is_meaningful());
        row.make_model = Some("CAT 140M".to_string());
        assert!(row.is_meaningful());
    }

    #[test]
    fn test_crew_meaningful_requires_contractor() {
        let mut row = CrewEntry::default();
        assert!(!row.is_meaningful());
        row.contractor = Some("Acme Paving".to_string());
        assert!(row.is_meaningful());
    }

    #[test]
    fn test_qa_enums_serialize_with_stable_tags() {
        let entry = QaEntry {
            qa_type: QaType::NuclearGauge,
            result: QaResult::NotApplicable,
            location: None,
            remarks: None,
        };
        let yaml = serde_yml::to_string(&entry).unwrap();
        assert!(yaml.contains("qa_type: nuclear_gauge"));
        assert!(yaml.contains("result: n_a"));
    }

    #[test]
    fn test_placed_quantity_answers_read_repair() {
        let mut row = PlacedQuantity::new(EntityId::new(EntityPrefix::Item), 1.0);
        row.checklist_answers = json!("{\"Q1\":\"Yes\"}");
        assert_eq!(row.answers().get("Q1").map(String::as_str), Some("Yes"));

        row.checklist_answers = serde_json::Value::Null;
        assert!(row.answers().is_empty());
    }

    #[test]
    fn test_checklist_entry_ids_use_chk_prefix() {
        let entry = ChecklistEntry::new(EntityId::new(EntityPrefix::Spec));
        assert!(entry.id.to_string().starts_with("CHK-"));
    }
}
