//! Master-log CSV export
//!
//! One flat row per (report, placed quantity); a report with no placed
//! quantities still contributes one placeholder row so it shows up in
//! the log.

use thiserror::Error;

use crate::core::store::ReportAggregate;

/// Fixed column set of the master log
pub const HEADER: [&str; 17] = [
    "DIR #",
    "Start Date",
    "End Date",
    "Inspector",
    "Project",
    "Phase",
    "Status",
    "Shift",
    "Temp (F)",
    "Wind",
    "Contractor",
    "Item Code",
    "Item Description",
    "Quantity",
    "Unit",
    "Location",
    "Notes",
];

#[derive(Debug, Error)]
pub enum CsvError {
    #[error("failed to write CSV: {0}")]
    Write(String),
}

/// Render the master log for the given (already filtered) reports
pub fn master_log(aggregates: &[ReportAggregate]) -> Result<String, CsvError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(HEADER)
        .map_err(|e| CsvError::Write(e.to_string()))?;

    for agg in aggregates {
        let report = &agg.report;
        let base = [
            report.dir_number.clone().unwrap_or_default(),
            report
                .start_date
                .map(|d| d.to_string())
                .unwrap_or_default(),
            report.end_date.map(|d| d.to_string()).unwrap_or_default(),
            report.inspector.clone(),
            agg.project
                .as_ref()
                .map(|p| p.name.clone())
                .unwrap_or_default(),
            agg.phase
                .as_ref()
                .map(|p| p.name.clone())
                .unwrap_or_default(),
            report.status.label().to_string(),
            report.shift(),
            report.temps_joined(),
            report.winds_joined(),
            report.contractor.clone().unwrap_or_default(),
        ];

        if report.placed_quantities.is_empty() {
            let mut row: Vec<String> = base.to_vec();
            row.extend([
                "---".to_string(),
                "No Activity".to_string(),
                "0".to_string(),
                "---".to_string(),
                "---".to_string(),
                report.commentary.clone().unwrap_or_default(),
            ]);
            writer
                .write_record(&row)
                .map_err(|e| CsvError::Write(e.to_string()))?;
        } else {
            for quantity in &report.placed_quantities {
                let mut row: Vec<String> = base.to_vec();
                let code = quantity
                    .bid_item
                    .as_ref()
                    .and_then(|id| agg.item_code(id))
                    .unwrap_or_default();
                let description = quantity
                    .bid_item
                    .as_ref()
                    .and_then(|id| agg.item_description(id))
                    .unwrap_or_default();
                let unit = quantity
                    .bid_item
                    .as_ref()
                    .and_then(|id| agg.item_unit(id))
                    .unwrap_or_default();
                row.extend([
                    code.to_string(),
                    description.to_string(),
                    quantity.quantity.to_string(),
                    unit.to_string(),
                    quantity.location.clone().unwrap_or_default(),
                    quantity.notes.clone().unwrap_or_default(),
                ]);
                writer
                    .write_record(&row)
                    .map_err(|e| CsvError::Write(e.to_string()))?;
            }
        }
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| CsvError::Write(e.to_string()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::entries::PlacedQuantity;
    use crate::entities::report::Report;
    use crate::entities::{BidItem, Phase, Project, SpecItem};
    use chrono::NaiveDate;
    use std::collections::BTreeMap;

    fn aggregate(with_quantities: usize) -> ReportAggregate {
        let project = Project::new("Runway".to_string(), "C-1".to_string(), "jdoe".to_string());
        let phase = Phase::new("Phase 1".to_string(), "jdoe".to_string());
        let spec = SpecItem::new("P-401".to_string(), "Asphalt".to_string(), "jdoe".to_string());
        let mut item = BidItem::new(
            project.id.clone(),
            spec.id.clone(),
            "P-401".to_string(),
            "Asphalt Mix".to_string(),
            "jdoe".to_string(),
        );
        item.unit = Some("TON".to_string());

        let mut report = Report::new("jdoe".to_string());
        report.dir_number = Some("007".to_string());
        report.start_date = NaiveDate::from_ymd_opt(2026, 8, 1);
        report.commentary = Some("Mobilization only".to_string());
        for n in 0..with_quantities {
            let mut quantity = PlacedQuantity::new(item.id.clone(), 50.0 + n as f64);
            quantity.location = Some(format!("Sta {}+00", n));
            report.placed_quantities.push(quantity);
        }

        let mut items = BTreeMap::new();
        items.insert(item.id.to_string(), item);

        ReportAggregate {
            report,
            project: Some(project),
            phase: Some(phase),
            items,
            specs: BTreeMap::new(),
        }
    }

    #[test]
    fn test_header_row() {
        let output = master_log(&[]).unwrap();
        let first = output.lines().next().unwrap();
        assert!(first.starts_with("DIR #,Start Date,End Date,Inspector"));
        assert_eq!(first.split(',').count(), HEADER.len());
    }

    #[test]
    fn test_one_row_per_placed_quantity() {
        let output = master_log(&[aggregate(2)]).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 3); // header + 2 rows
        assert!(lines[1].contains("P-401"));
        assert!(lines[1].contains("TON"));
        assert!(lines[1].contains("50"));
        assert!(lines[2].contains("51"));
    }

    #[test]
    fn test_placeholder_row_for_empty_report() {
        let output = master_log(&[aggregate(0)]).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].contains("No Activity"));
        assert!(lines[1].contains("Mobilization only"));
    }
}
