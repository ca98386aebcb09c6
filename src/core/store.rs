//! The persistence boundary: a repository over workspace entity files
//!
//! Every read and write of an entity goes through [`Store`]. Deletes are
//! reference-checked (a referenced phase, bid item, spec item, or project
//! cannot be removed), code uniqueness is enforced on save, and report
//! saves run the full content pipeline: prune blank rows, validate, and
//! recompute the derived result.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use thiserror::Error;

use crate::core::entity::Entity;
use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::Workspace;
use crate::entities::{BidItem, Phase, Project, Report, SpecItem, ValidationError};

/// Errors surfaced at the persistence boundary
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} not found: {1}")]
    NotFound(&'static str, String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("spec code '{0}' already exists")]
    DuplicateSpecCode(String),

    #[error("bid item code '{0}' already exists in this project")]
    DuplicateItemCode(String),

    #[error("cannot delete {entity} {id}: {count} {dependents} still reference it")]
    InUse {
        entity: &'static str,
        id: String,
        count: usize,
        dependents: &'static str,
    },

    #[error("failed to read {path}: {message}")]
    Io { path: PathBuf, message: String },

    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Repository over one workspace
pub struct Store<'a> {
    ws: &'a Workspace,
}

impl<'a> Store<'a> {
    pub fn new(ws: &'a Workspace) -> Self {
        Self { ws }
    }

    pub fn workspace(&self) -> &Workspace {
        self.ws
    }

    // --- Generic plumbing ---

    /// Load every entity of a type. Files that fail to parse are
    /// silently skipped so one bad file never takes down a listing.
    pub fn load_all<T: Entity + 'static>(&self) -> Vec<T> {
        let mut entities = Vec::new();
        for path in self.ws.iter_entity_files(T::PREFIX) {
            if let Ok(content) = fs::read_to_string(&path) {
                if let Ok(entity) = serde_yml::from_str::<T>(&content) {
                    entities.push(entity);
                }
            }
        }
        entities
    }

    /// Load a single entity by ID
    pub fn load<T: Entity + 'static>(&self, id: &EntityId) -> Result<T, StoreError> {
        let path = self.ws.entity_path(id);
        if !path.exists() {
            return Err(StoreError::NotFound(
                T::PREFIX.entity_name(),
                id.to_string(),
            ));
        }
        let content = fs::read_to_string(&path).map_err(|e| StoreError::Io {
            path: path.clone(),
            message: e.to_string(),
        })?;
        serde_yml::from_str(&content).map_err(|e| StoreError::Parse {
            path,
            message: e.to_string(),
        })
    }

    fn write<T: Entity>(&self, entity: &T) -> Result<(), StoreError> {
        let path = self.ws.entity_path(entity.id());
        let content = serde_yml::to_string(entity).map_err(|e| StoreError::Parse {
            path: path.clone(),
            message: e.to_string(),
        })?;
        fs::write(&path, content).map_err(|e| StoreError::Io {
            path,
            message: e.to_string(),
        })
    }

    fn remove(&self, prefix: EntityPrefix, id: &EntityId) -> Result<(), StoreError> {
        let path = self.ws.entity_path(id);
        if !path.exists() {
            return Err(StoreError::NotFound(prefix.entity_name(), id.to_string()));
        }
        fs::remove_file(&path).map_err(|e| StoreError::Io {
            path,
            message: e.to_string(),
        })
    }

    // --- Projects ---

    pub fn save_project(&self, project: &Project) -> Result<(), StoreError> {
        project.validate()?;
        self.write(project)
    }

    pub fn delete_project(&self, id: &EntityId) -> Result<(), StoreError> {
        let items = self
            .load_all::<BidItem>()
            .into_iter()
            .filter(|i| &i.project == id)
            .count();
        if items > 0 {
            return Err(StoreError::InUse {
                entity: "project",
                id: id.to_string(),
                count: items,
                dependents: "bid items",
            });
        }
        let reports = self
            .load_all::<Report>()
            .into_iter()
            .filter(|r| r.project.as_ref() == Some(id))
            .count();
        if reports > 0 {
            return Err(StoreError::InUse {
                entity: "project",
                id: id.to_string(),
                count: reports,
                dependents: "reports",
            });
        }
        self.remove(EntityPrefix::Prj, id)
    }

    // --- Phases ---

    pub fn save_phase(&self, phase: &Phase) -> Result<(), StoreError> {
        phase.validate()?;
        self.write(phase)
    }

    pub fn delete_phase(&self, id: &EntityId) -> Result<(), StoreError> {
        let reports = self
            .load_all::<Report>()
            .into_iter()
            .filter(|r| r.phase.as_ref() == Some(id))
            .count();
        if reports > 0 {
            return Err(StoreError::InUse {
                entity: "phase",
                id: id.to_string(),
                count: reports,
                dependents: "reports",
            });
        }
        self.remove(EntityPrefix::Phs, id)
    }

    // --- Spec items ---

    pub fn save_spec_item(&self, spec: &SpecItem) -> Result<(), StoreError> {
        spec.validate()?;
        let duplicate = self
            .load_all::<SpecItem>()
            .into_iter()
            .any(|other| other.code == spec.code && other.id != spec.id);
        if duplicate {
            return Err(StoreError::DuplicateSpecCode(spec.code.clone()));
        }
        self.write(spec)
    }

    pub fn delete_spec_item(&self, id: &EntityId) -> Result<(), StoreError> {
        let items = self
            .load_all::<BidItem>()
            .into_iter()
            .filter(|i| &i.spec_item == id)
            .count();
        if items > 0 {
            return Err(StoreError::InUse {
                entity: "spec item",
                id: id.to_string(),
                count: items,
                dependents: "bid items",
            });
        }
        self.remove(EntityPrefix::Spec, id)
    }

    // --- Bid items ---

    pub fn save_bid_item(&self, item: &BidItem) -> Result<(), StoreError> {
        item.validate()?;
        // Code is unique within the owning project only
        let duplicate = self
            .load_all::<BidItem>()
            .into_iter()
            .any(|other| {
                other.project == item.project && other.code == item.code && other.id != item.id
            });
        if duplicate {
            return Err(StoreError::DuplicateItemCode(item.code.clone()));
        }
        self.write(item)
    }

    pub fn delete_bid_item(&self, id: &EntityId) -> Result<(), StoreError> {
        let placed = self
            .load_all::<Report>()
            .iter()
            .flat_map(|r| &r.placed_quantities)
            .filter(|q| q.bid_item.as_ref() == Some(id))
            .count();
        if placed > 0 {
            return Err(StoreError::InUse {
                entity: "bid item",
                id: id.to_string(),
                count: placed,
                dependents: "placed quantities",
            });
        }
        self.remove(EntityPrefix::Item, id)
    }

    // --- Reports ---

    /// Content save: prune blank nested rows, validate, recompute the
    /// derived result, then write. This is the only path for edits.
    pub fn save_report(&self, report: &mut Report) -> Result<(), StoreError> {
        report.prune_blank_rows();
        report.validate()?;
        report.recalculate_result();
        self.write(report)
    }

    /// Workflow save: write the report exactly as the workflow action
    /// left it, without re-deriving the result. Approve's forced pass
    /// and revise's forced fail survive this write.
    pub fn write_report(&self, report: &Report) -> Result<(), StoreError> {
        self.write(report)
    }

    pub fn delete_report(&self, id: &EntityId) -> Result<(), StoreError> {
        self.remove(EntityPrefix::Dir, id)
    }

    /// Load a report with its referenced entities resolved
    pub fn load_report_aggregate(&self, id: &EntityId) -> Result<ReportAggregate, StoreError> {
        let report: Report = self.load(id)?;

        let project = match &report.project {
            Some(pid) => Some(self.load::<Project>(pid)?),
            None => None,
        };
        let phase = match &report.phase {
            Some(pid) => Some(self.load::<Phase>(pid)?),
            None => None,
        };

        let items: BTreeMap<String, BidItem> = self
            .load_all::<BidItem>()
            .into_iter()
            .map(|i| (i.id.to_string(), i))
            .collect();
        let specs: BTreeMap<String, SpecItem> = self
            .load_all::<SpecItem>()
            .into_iter()
            .map(|s| (s.id.to_string(), s))
            .collect();

        Ok(ReportAggregate {
            report,
            project,
            phase,
            items,
            specs,
        })
    }
}

/// A report with its referenced catalog entities resolved, as consumed
/// by the CSV and Word exporters
#[derive(Debug)]
pub struct ReportAggregate {
    pub report: Report,
    pub project: Option<Project>,
    pub phase: Option<Phase>,
    /// Bid items keyed by ID string
    pub items: BTreeMap<String, BidItem>,
    /// Spec items keyed by ID string
    pub specs: BTreeMap<String, SpecItem>,
}

impl ReportAggregate {
    pub fn item(&self, id: &EntityId) -> Option<&BidItem> {
        self.items.get(&id.to_string())
    }

    pub fn item_code(&self, id: &EntityId) -> Option<&str> {
        self.item(id).map(|i| i.code.as_str())
    }

    pub fn item_description(&self, id: &EntityId) -> Option<&str> {
        self.item(id).map(|i| i.description.as_str())
    }

    pub fn item_unit(&self, id: &EntityId) -> Option<&str> {
        self.item(id).and_then(|i| i.unit.as_deref())
    }

    pub fn spec(&self, id: &EntityId) -> Option<&SpecItem> {
        self.specs.get(&id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::entries::PlacedQuantity;
    use crate::entities::report::ReportResult;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn workspace() -> (tempfile::TempDir, Workspace) {
        let tmp = tempdir().unwrap();
        let ws = Workspace::init(tmp.path()).unwrap();
        (tmp, ws)
    }

    fn seeded_report(store: &Store<'_>) -> Report {
        let project = Project::new("Runway".to_string(), "C-1".to_string(), "jdoe".to_string());
        store.save_project(&project).unwrap();
        let phase = Phase::new("Phase 1".to_string(), "jdoe".to_string());
        store.save_phase(&phase).unwrap();

        let mut report = Report::new("jdoe".to_string());
        report.project = Some(project.id.clone());
        report.phase = Some(phase.id.clone());
        report.start_date = NaiveDate::from_ymd_opt(2026, 8, 1);
        report
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let (_tmp, ws) = workspace();
        let store = Store::new(&ws);

        let project = Project::new("Runway".to_string(), "C-1".to_string(), "jdoe".to_string());
        store.save_project(&project).unwrap();

        let loaded: Project = store.load(&project.id).unwrap();
        assert_eq!(loaded.name, "Runway");
        assert_eq!(store.load_all::<Project>().len(), 1);
    }

    #[test]
    fn test_load_missing_entity_is_not_found() {
        let (_tmp, ws) = workspace();
        let store = Store::new(&ws);
        let err = store
            .load::<Project>(&EntityId::new(EntityPrefix::Prj))
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_, _)));
    }

    #[test]
    fn test_spec_code_unique_globally() {
        let (_tmp, ws) = workspace();
        let store = Store::new(&ws);

        let spec = SpecItem::new("P-401".to_string(), "Asphalt".to_string(), "jdoe".to_string());
        store.save_spec_item(&spec).unwrap();

        let dup = SpecItem::new("P-401".to_string(), "Other".to_string(), "jdoe".to_string());
        let err = store.save_spec_item(&dup).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateSpecCode(_)));

        // Re-saving the same entity is not a duplicate
        store.save_spec_item(&spec).unwrap();
    }

    #[test]
    fn test_item_code_unique_per_project_only() {
        let (_tmp, ws) = workspace();
        let store = Store::new(&ws);

        let project_a = Project::new("A".to_string(), "C-A".to_string(), "jdoe".to_string());
        let project_b = Project::new("B".to_string(), "C-B".to_string(), "jdoe".to_string());
        store.save_project(&project_a).unwrap();
        store.save_project(&project_b).unwrap();
        let spec = SpecItem::new("P-401".to_string(), "Asphalt".to_string(), "jdoe".to_string());
        store.save_spec_item(&spec).unwrap();

        let item = BidItem::new(
            project_a.id.clone(),
            spec.id.clone(),
            "P-401".to_string(),
            "Asphalt".to_string(),
            "jdoe".to_string(),
        );
        store.save_bid_item(&item).unwrap();

        // Same code in the same project is rejected
        let dup = BidItem::new(
            project_a.id.clone(),
            spec.id.clone(),
            "P-401".to_string(),
            "Asphalt".to_string(),
            "jdoe".to_string(),
        );
        assert!(matches!(
            store.save_bid_item(&dup).unwrap_err(),
            StoreError::DuplicateItemCode(_)
        ));

        // Same code in a different project succeeds
        let other = BidItem::new(
            project_b.id.clone(),
            spec.id.clone(),
            "P-401".to_string(),
            "Asphalt".to_string(),
            "jdoe".to_string(),
        );
        store.save_bid_item(&other).unwrap();
    }

    #[test]
    fn test_save_report_recomputes_result() {
        let (_tmp, ws) = workspace();
        let store = Store::new(&ws);
        let mut report = seeded_report(&store);

        store.save_report(&mut report).unwrap();
        assert_eq!(report.result, ReportResult::Pass);

        report.deficiency_status = crate::entities::report::DeficiencyStatus::Ncr;
        store.save_report(&mut report).unwrap();
        assert_eq!(report.result, ReportResult::Fail);

        let loaded: Report = store.load(&report.id).unwrap();
        assert_eq!(loaded.result, ReportResult::Fail);
    }

    #[test]
    fn test_save_report_rejects_missing_associations() {
        let (_tmp, ws) = workspace();
        let store = Store::new(&ws);
        let mut report = Report::new("jdoe".to_string());
        let err = store.save_report(&mut report).unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }

    #[test]
    fn test_delete_bid_item_with_placed_quantities_rejected() {
        let (_tmp, ws) = workspace();
        let store = Store::new(&ws);

        let mut report = seeded_report(&store);
        let spec = SpecItem::new("P-401".to_string(), "Asphalt".to_string(), "jdoe".to_string());
        store.save_spec_item(&spec).unwrap();
        let item = BidItem::new(
            report.project.clone().unwrap(),
            spec.id.clone(),
            "P-401".to_string(),
            "Asphalt".to_string(),
            "jdoe".to_string(),
        );
        store.save_bid_item(&item).unwrap();

        report
            .placed_quantities
            .push(PlacedQuantity::new(item.id.clone(), 250.0));
        store.save_report(&mut report).unwrap();

        let err = store.delete_bid_item(&item.id).unwrap_err();
        assert!(matches!(err, StoreError::InUse { .. }));

        // Both records are intact
        assert!(store.load::<BidItem>(&item.id).is_ok());
        let loaded: Report = store.load(&report.id).unwrap();
        assert_eq!(loaded.placed_quantities.len(), 1);
    }

    #[test]
    fn test_delete_phase_in_use_rejected() {
        let (_tmp, ws) = workspace();
        let store = Store::new(&ws);
        let mut report = seeded_report(&store);
        store.save_report(&mut report).unwrap();

        let phase_id = report.phase.clone().unwrap();
        assert!(matches!(
            store.delete_phase(&phase_id).unwrap_err(),
            StoreError::InUse { .. }
        ));

        store.delete_report(&report.id).unwrap();
        store.delete_phase(&phase_id).unwrap();
    }

    #[test]
    fn test_aggregate_resolves_references() {
        let (_tmp, ws) = workspace();
        let store = Store::new(&ws);
        let mut report = seeded_report(&store);
        let spec = SpecItem::new("P-401".to_string(), "Asphalt".to_string(), "jdoe".to_string());
        store.save_spec_item(&spec).unwrap();
        let item = BidItem::new(
            report.project.clone().unwrap(),
            spec.id.clone(),
            "P-401".to_string(),
            "Asphalt Mix".to_string(),
            "jdoe".to_string(),
        );
        store.save_bid_item(&item).unwrap();
        report
            .placed_quantities
            .push(PlacedQuantity::new(item.id.clone(), 100.0));
        store.save_report(&mut report).unwrap();

        let agg = store.load_report_aggregate(&report.id).unwrap();
        assert_eq!(agg.project.as_ref().map(|p| p.name.as_str()), Some("Runway"));
        assert_eq!(agg.item_code(&item.id), Some("P-401"));
        assert_eq!(agg.item_description(&item.id), Some("Asphalt Mix"));
    }
}
