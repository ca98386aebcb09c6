//! Report entity type (the daily inspection report aggregate)

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::identity::{EntityId, EntityPrefix};
use crate::entities::answers::validate_answers;
use crate::entities::entries::{
    ActivityLog, ChecklistEntry, CrewEntry, EquipmentEntry, PlacedQuantity, QaEntry, QaResult,
    ReportAttachment,
};
use crate::entities::{FieldError, ValidationError};

/// Workflow stage of a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    #[default]
    Creating,
    QcReview,
    Revise,
    Authorization,
}

impl ReportStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ReportStatus::Creating => "Creating",
            ReportStatus::QcReview => "QC Review",
            ReportStatus::Revise => "Revise",
            ReportStatus::Authorization => "Authorization",
        }
    }
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportStatus::Creating => write!(f, "creating"),
            ReportStatus::QcReview => write!(f, "qc_review"),
            ReportStatus::Revise => write!(f, "revise"),
            ReportStatus::Authorization => write!(f, "authorization"),
        }
    }
}

impl std::str::FromStr for ReportStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "creating" => Ok(ReportStatus::Creating),
            "qc_review" => Ok(ReportStatus::QcReview),
            "revise" => Ok(ReportStatus::Revise),
            "authorization" => Ok(ReportStatus::Authorization),
            _ => Err(format!("Unknown status: {}", s)),
        }
    }
}

/// Derived outcome of a report
///
/// `as_built` is representable but never assigned by the automatic
/// computation or any workflow action; it is reserved for a separate
/// archival transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReportResult {
    #[default]
    Pending,
    Pass,
    Fail,
    AsBuilt,
}

impl ReportResult {
    pub fn label(&self) -> &'static str {
        match self {
            ReportResult::Pending => "Pending",
            ReportResult::Pass => "Pass",
            ReportResult::Fail => "Fail",
            ReportResult::AsBuilt => "As-Built",
        }
    }
}

impl std::fmt::Display for ReportResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportResult::Pending => write!(f, "pending"),
            ReportResult::Pass => write!(f, "pass"),
            ReportResult::Fail => write!(f, "fail"),
            ReportResult::AsBuilt => write!(f, "as_built"),
        }
    }
}

impl std::str::FromStr for ReportResult {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(ReportResult::Pending),
            "pass" => Ok(ReportResult::Pass),
            "fail" => Ok(ReportResult::Fail),
            "as_built" => Ok(ReportResult::AsBuilt),
            _ => Err(format!("Unknown result: {}", s)),
        }
    }
}

/// Escalating deficiency severity recorded on a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DeficiencyStatus {
    #[default]
    None,
    /// A non-critical (minor) deficiency was logged
    Minor,
    /// Contractor deficiency report
    Cdr,
    /// Non-conformance report
    Ncr,
}

impl DeficiencyStatus {
    pub fn label(&self) -> &'static str {
        match self {
            DeficiencyStatus::None => "None",
            DeficiencyStatus::Minor => "Minor Deficiency",
            DeficiencyStatus::Cdr => "CDR",
            DeficiencyStatus::Ncr => "NCR",
        }
    }
}

impl std::str::FromStr for DeficiencyStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(DeficiencyStatus::None),
            "minor" => Ok(DeficiencyStatus::Minor),
            "cdr" => Ok(DeficiencyStatus::Cdr),
            "ncr" => Ok(DeficiencyStatus::Ncr),
            _ => Err(format!("Unknown deficiency status: {}", s)),
        }
    }
}

/// Tri-state compliance reading used by the safety/compliance fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Compliance {
    #[default]
    #[serde(rename = "na")]
    NotApplicable,
    Yes,
    No,
}

impl Compliance {
    /// Stable wire tag, also the input to export humanization
    pub fn tag(&self) -> &'static str {
        match self {
            Compliance::NotApplicable => "na",
            Compliance::Yes => "yes",
            Compliance::No => "no",
        }
    }
}

impl std::str::FromStr for Compliance {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "na" | "n/a" => Ok(Compliance::NotApplicable),
            "yes" => Ok(Compliance::Yes),
            "no" => Ok(Compliance::No),
            _ => Err(format!("Unknown compliance value: {}", s)),
        }
    }
}

/// One of the three weather reading slots on a report
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeatherReading {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precipitation: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

/// A daily inspection report: the aggregate root owning its nested
/// entries. Created in `creating`/`pending`; the result field is derived
/// on every content save and only the approve/revise workflow actions
/// set it directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub id: EntityId,

    /// DIR number, the human-facing report identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir_number: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<EntityId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<EntityId>,

    /// Inspector (roster username) who filed the report
    pub inspector: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shift_start: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shift_end: Option<String>,

    /// Up to three weather readings taken over the shift
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub weather: Vec<WeatherReading>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surface_conditions: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub station_start: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub station_end: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contractor: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_sheet: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relevant_docs: Option<String>,

    #[serde(default)]
    pub deficiency_status: DeficiencyStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deficiency_desc: Option<String>,

    #[serde(default)]
    pub traffic_control: Compliance,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traffic_control_note: Option<String>,

    #[serde(default)]
    pub environmental: Compliance,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environmental_note: Option<String>,

    #[serde(default)]
    pub security: Compliance,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_note: Option<String>,

    #[serde(default)]
    pub safety_incident: Compliance,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safety_desc: Option<String>,

    #[serde(default)]
    pub air_ops_coordination: Compliance,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub air_ops_note: Option<String>,

    #[serde(default)]
    pub swppp_controls: Compliance,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swppp_note: Option<String>,

    #[serde(default)]
    pub phasing_compliance: Compliance,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phasing_note: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commentary: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_activities: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_info: Option<String>,

    #[serde(default)]
    pub status: ReportStatus,

    #[serde(default)]
    pub result: ReportResult,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub placed_quantities: Vec<PlacedQuantity>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub equipment_entries: Vec<EquipmentEntry>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub crew_entries: Vec<CrewEntry>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub qa_entries: Vec<QaEntry>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub checklist_entries: Vec<ChecklistEntry>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<ReportAttachment>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub activity_log: Vec<ActivityLog>,

    pub created: DateTime<Utc>,

    pub author: String,
}

impl Report {
    pub fn new(inspector: String) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Dir),
            dir_number: None,
            project: None,
            phase: None,
            inspector: inspector.clone(),
            start_date: None,
            end_date: None,
            shift_start: None,
            shift_end: None,
            weather: Vec::new(),
            surface_conditions: None,
            station_start: None,
            station_end: None,
            contractor: None,
            plan_sheet: None,
            relevant_docs: None,
            deficiency_status: DeficiencyStatus::None,
            deficiency_desc: None,
            traffic_control: Compliance::NotApplicable,
            traffic_control_note: None,
            environmental: Compliance::NotApplicable,
            environmental_note: None,
            security: Compliance::NotApplicable,
            security_note: None,
            safety_incident: Compliance::NotApplicable,
            safety_desc: None,
            air_ops_coordination: Compliance::NotApplicable,
            air_ops_note: None,
            swppp_controls: Compliance::NotApplicable,
            swppp_note: None,
            phasing_compliance: Compliance::NotApplicable,
            phasing_note: None,
            commentary: None,
            additional_activities: None,
            additional_info: None,
            status: ReportStatus::Creating,
            result: ReportResult::Pending,
            placed_quantities: Vec::new(),
            equipment_entries: Vec::new(),
            crew_entries: Vec::new(),
            qa_entries: Vec::new(),
            checklist_entries: Vec::new(),
            attachments: Vec::new(),
            activity_log: Vec::new(),
            created: Utc::now(),
            author: inspector,
        }
    }

    /// Worst-to-best automatic result computation, pure over the
    /// in-memory report and its embedded QA entries:
    ///
    /// 1. fail on a CDR/NCR deficiency or any failed QA test
    /// 2. pending on a minor deficiency or any pending QA test
    /// 3. pass otherwise
    pub fn derived_result(&self) -> ReportResult {
        if matches!(
            self.deficiency_status,
            DeficiencyStatus::Cdr | DeficiencyStatus::Ncr
        ) || self.qa_entries.iter().any(|t| t.result == QaResult::Fail)
        {
            return ReportResult::Fail;
        }

        if self.deficiency_status == DeficiencyStatus::Minor
            || self
                .qa_entries
                .iter()
                .any(|t| t.result == QaResult::Pending)
        {
            return ReportResult::Pending;
        }

        ReportResult::Pass
    }

    /// Recompute the result field; runs on every content save
    pub fn recalculate_result(&mut self) {
        self.result = self.derived_result();
    }

    /// Drop nested rows that carry no meaningful data, per each child
    /// type's own predicate
    pub fn prune_blank_rows(&mut self) {
        self.placed_quantities.retain(PlacedQuantity::is_meaningful);
        self.equipment_entries.retain(EquipmentEntry::is_meaningful);
        self.crew_entries.retain(CrewEntry::is_meaningful);
    }

    /// Required-association and answer-map validation
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = Vec::new();
        if self.project.is_none() {
            errors.push(FieldError::new("project", "is required"));
        }
        if self.phase.is_none() {
            errors.push(FieldError::new("phase", "is required"));
        }
        if self.start_date.is_none() {
            errors.push(FieldError::new("start_date", "is required"));
        }
        for quantity in &self.placed_quantities {
            errors.extend(validate_answers("checklist_answers", &quantity.answers()));
        }
        for entry in &self.checklist_entries {
            errors.extend(validate_answers("checklist_answers", &entry.answers()));
        }
        ValidationError::new(errors).into_result()
    }

    /// Find or create the embedded checklist entry for a spec item
    pub fn checklist_entry_mut(&mut self, spec_item: &EntityId) -> &mut ChecklistEntry {
        if let Some(idx) = self
            .checklist_entries
            .iter()
            .position(|e| &e.spec_item == spec_item)
        {
            return &mut self.checklist_entries[idx];
        }
        self.checklist_entries
            .push(ChecklistEntry::new(spec_item.clone()));
        let last = self.checklist_entries.len() - 1;
        &mut self.checklist_entries[last]
    }

    /// "HH:MM-HH:MM" shift label
    pub fn shift(&self) -> String {
        format!(
            "{}-{}",
            self.shift_start.as_deref().unwrap_or(""),
            self.shift_end.as_deref().unwrap_or("")
        )
    }

    pub fn temps_joined(&self) -> String {
        join_slots(self.weather.iter().map(|w| w.temperature.map(|t| t.to_string())))
    }

    pub fn winds_joined(&self) -> String {
        join_slots(self.weather.iter().map(|w| w.wind.clone()))
    }

    pub fn precips_joined(&self) -> String {
        join_slots(self.weather.iter().map(|w| w.precipitation.clone()))
    }

    pub fn visibilities_joined(&self) -> String {
        join_slots(self.weather.iter().map(|w| w.visibility.clone()))
    }

    pub fn summaries_joined(&self) -> String {
        join_slots(self.weather.iter().map(|w| w.summary.clone()))
    }
}

/// Join multi-slot readings with " / ", skipping blank slots
fn join_slots(values: impl Iterator<Item = Option<String>>) -> String {
    values
        .flatten()
        .filter(|v| !v.trim().is_empty())
        .collect::<Vec<_>>()
        .join(" / ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::entries::QaType;

    fn report() -> Report {
        Report::new("jdoe".to_string())
    }

    fn qa(result: QaResult) -> QaEntry {
        QaEntry {
            qa_type: QaType::Compaction,
            result,
            location: None,
            remarks: None,
        }
    }

    #[test]
    fn test_new_report_defaults() {
        let r = report();
        assert_eq!(r.status, ReportStatus::Creating);
        assert_eq!(r.result, ReportResult::Pending);
        assert!(r.id.to_string().starts_with("DIR-"));
    }

    #[test]
    fn test_derivation_passes_when_clean() {
        let mut r = report();
        r.qa_entries.push(qa(QaResult::Pass));
        r.qa_entries.push(qa(QaResult::NotApplicable));
        assert_eq!(r.derived_result(), ReportResult::Pass);
    }

    #[test]
    fn test_derivation_fails_on_cdr_or_ncr() {
        for status in [DeficiencyStatus::Cdr, DeficiencyStatus::Ncr] {
            let mut r = report();
            r.deficiency_status = status;
            // A pending QA entry must not soften a fail
            r.qa_entries.push(qa(QaResult::Pending));
            assert_eq!(r.derived_result(), ReportResult::Fail);
        }
    }

    #[test]
    fn test_derivation_fails_on_failed_qa() {
        let mut r = report();
        r.qa_entries.push(qa(QaResult::Pass));
        r.qa_entries.push(qa(QaResult::Fail));
        assert_eq!(r.derived_result(), ReportResult::Fail);
    }

    #[test]
    fn test_derivation_pending_on_minor_deficiency() {
        let mut r = report();
        r.deficiency_status = DeficiencyStatus::Minor;
        assert_eq!(r.derived_result(), ReportResult::Pending);
    }

    #[test]
    fn test_derivation_pending_on_pending_qa() {
        let mut r = report();
        r.qa_entries.push(qa(QaResult::Pending));
        assert_eq!(r.derived_result(), ReportResult::Pending);
    }

    #[test]
    fn test_derivation_never_produces_as_built() {
        let mut r = report();
        r.result = ReportResult::AsBuilt;
        r.recalculate_result();
        assert_ne!(r.result, ReportResult::AsBuilt);
    }

    #[test]
    fn test_validate_requires_project_phase_start_date() {
        let r = report();
        let err = r.validate().unwrap_err();
        let fields: Vec<&str> = err.errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["project", "phase", "start_date"]);
    }

    #[test]
    fn test_validate_rejects_malformed_answers() {
        let mut r = report();
        r.project = Some(EntityId::new(EntityPrefix::Prj));
        r.phase = Some(EntityId::new(EntityPrefix::Phs));
        r.start_date = Some(NaiveDate::from_ymd_opt(2026, 8, 1).unwrap());

        let mut entry = ChecklistEntry::new(EntityId::new(EntityPrefix::Spec));
        entry.checklist_answers = serde_json::json!({"Q1": "Maybe"});
        r.checklist_entries.push(entry);

        let err = r.validate().unwrap_err();
        assert_eq!(err.errors.len(), 1);
    }

    #[test]
    fn test_prune_blank_rows() {
        let mut r = report();
        r.placed_quantities.push(PlacedQuantity::default());
        r.placed_quantities
            .push(PlacedQuantity::new(EntityId::new(EntityPrefix::Item), 5.0));
        r.equipment_entries.push(EquipmentEntry::default());
        r.crew_entries.push(CrewEntry::default());

        r.prune_blank_rows();
        assert_eq!(r.placed_quantities.len(), 1);
        assert!(r.equipment_entries.is_empty());
        assert!(r.crew_entries.is_empty());
    }

    #[test]
    fn test_weather_joins_skip_blanks() {
        let mut r = report();
        r.weather.push(WeatherReading {
            temperature: Some(72),
            wind: Some("5 mph".to_string()),
            precipitation: None,
            visibility: None,
            summary: Some("Clear".to_string()),
        });
        r.weather.push(WeatherReading::default());
        r.weather.push(WeatherReading {
            temperature: Some(85),
            wind: Some("".to_string()),
            precipitation: Some("0".to_string()),
            visibility: None,
            summary: Some("Hazy".to_string()),
        });

        assert_eq!(r.temps_joined(), "72 / 85");
        assert_eq!(r.winds_joined(), "5 mph");
        assert_eq!(r.summaries_joined(), "Clear / Hazy");
    }

    #[test]
    fn test_checklist_entry_upsert() {
        let mut r = report();
        let spec = EntityId::new(EntityPrefix::Spec);
        let id = r.checklist_entry_mut(&spec).id.clone();
        // Second lookup returns the same embedded entry
        assert_eq!(r.checklist_entry_mut(&spec).id, id);
        assert_eq!(r.checklist_entries.len(), 1);
    }

    #[test]
    fn test_status_and_result_tags_roundtrip() {
        let mut r = report();
        r.status = ReportStatus::QcReview;
        r.result = ReportResult::Fail;
        let yaml = serde_yml::to_string(&r).unwrap();
        assert!(yaml.contains("status: qc_review"));
        assert!(yaml.contains("result: fail"));

        let parsed: Report = serde_yml::from_str(&yaml).unwrap();
        assert_eq!(parsed.status, ReportStatus::QcReview);
        assert_eq!(parsed.result, ReportResult::Fail);
    }

    #[test]
    fn test_legacy_row_without_result_parses_as_pending() {
        let r = report();
        let yaml = serde_yml::to_string(&r).unwrap();
        let stripped: String = yaml
            .lines()
            .filter(|l| !l.starts_with("result:"))
            .collect::<Vec<_>>()
            .join("\n");
        let parsed: Report = serde_yml::from_str(&stripped).unwrap();
        assert_eq!(parsed.result, ReportResult::Pending);
    }
}
