//! Field formatting for the Word export: the placeholder map and the
//! per-record marker values for the four repeating tables

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::core::store::ReportAggregate;
use crate::entities::report::Compliance;

/// Markers that identify each repeating table's template row
pub const QA_MARKERS: &[&str] = &["[CODE]", "[TEST]", "[LOCATION]", "[RESULT]", "[REMARKS]"];
pub const QUANTITY_MARKERS: &[&str] = &["[CODE]", "[DESC]", "[QTY]", "[NOTES]"];
pub const CREW_MARKERS: &[&str] = &[
    "[CONTRACTOR]",
    "[SURVEY]",
    "[SUPER]",
    "[FOREMAN]",
    "[OPERATOR]",
    "[LABORER]",
    "[ELECTRICIAN]",
];
pub const EQUIPMENT_MARKERS: &[&str] = &["[EQUIPMENT]", "[QTY]", "[HOURS]"];

/// MM/DD/YYYY, or empty for an unset date
pub fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%m/%d/%Y").to_string())
        .unwrap_or_default()
}

/// Humanize an enum wire tag for the document: tags with a
/// not-applicable suffix render "N/A", otherwise the segment after the
/// last underscore is capitalized ("safety_yes" -> "Yes")
pub fn humanize_tag(tag: &str) -> String {
    if tag == "na" || tag.ends_with("_na") {
        return "N/A".to_string();
    }
    let segment = tag.rsplit('_').next().unwrap_or(tag);
    capitalize(segment)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

fn compliance(value: Compliance) -> String {
    humanize_tag(value.tag())
}

fn opt(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn opt_or_none(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| "None".to_string())
}

/// Pass-1 replacements: every `{{TOKEN}}` the template may carry.
/// Null and blank fields substitute as empty strings, never a literal
/// nil token.
pub fn placeholder_map(agg: &ReportAggregate) -> BTreeMap<String, String> {
    let report = &agg.report;
    let mut map = BTreeMap::new();

    map.insert("{{DIR_NUM}}".to_string(), opt(&report.dir_number));
    map.insert(
        "{{PROJECT}}".to_string(),
        agg.project.as_ref().map(|p| p.name.clone()).unwrap_or_default(),
    );
    map.insert(
        "{{CONTRACT_NO}}".to_string(),
        agg.project
            .as_ref()
            .map(|p| p.contract_number.clone())
            .unwrap_or_default(),
    );
    map.insert(
        "{{PHASE}}".to_string(),
        agg.phase.as_ref().map(|p| p.name.clone()).unwrap_or_default(),
    );
    map.insert("{{INSPECTOR}}".to_string(), report.inspector.clone());
    map.insert("{{CONTRACTOR}}".to_string(), opt(&report.contractor));

    map.insert("{{START_DATE}}".to_string(), format_date(report.start_date));
    map.insert("{{END_DATE}}".to_string(), format_date(report.end_date));
    map.insert("{{START_SHIFT}}".to_string(), opt(&report.shift_start));
    map.insert("{{END_SHIFT}}".to_string(), opt(&report.shift_end));

    let station = match (&report.station_start, &report.station_end) {
        (Some(start), Some(end)) => format!("{} to {}", start, end),
        (Some(start), None) => start.clone(),
        (None, Some(end)) => end.clone(),
        (None, None) => String::new(),
    };
    map.insert("{{STATION}}".to_string(), station);
    map.insert("{{PLAN_SHEET}}".to_string(), opt(&report.plan_sheet));
    map.insert("{{RELEVANT_DOCS}}".to_string(), opt(&report.relevant_docs));

    map.insert("{{TEMP}}".to_string(), report.temps_joined());
    map.insert("{{WIND}}".to_string(), report.winds_joined());
    map.insert("{{PRECIP}}".to_string(), report.precips_joined());
    map.insert("{{VIS}}".to_string(), report.visibilities_joined());
    map.insert("{{WEATHER}}".to_string(), report.summaries_joined());
    map.insert("{{SURFACE}}".to_string(), opt(&report.surface_conditions));

    map.insert(
        "{{TC_STATUS}}".to_string(),
        compliance(report.traffic_control),
    );
    map.insert("{{TC_NOTE}}".to_string(), opt(&report.traffic_control_note));
    map.insert(
        "{{ENV_STATUS}}".to_string(),
        compliance(report.environmental),
    );
    map.insert("{{ENV_NOTE}}".to_string(), opt(&report.environmental_note));
    map.insert("{{SEC_STATUS}}".to_string(), compliance(report.security));
    map.insert("{{SEC_NOTE}}".to_string(), opt(&report.security_note));
    map.insert(
        "{{SAF_STATUS}}".to_string(),
        compliance(report.safety_incident),
    );
    map.insert(
        "{{SAF_DESCRIPTION}}".to_string(),
        opt_or_none(&report.safety_desc),
    );
    map.insert(
        "{{AIR_OPS}}".to_string(),
        compliance(report.air_ops_coordination),
    );
    map.insert("{{AIR_OPS_NOTE}}".to_string(), opt(&report.air_ops_note));
    map.insert("{{SWPPP}}".to_string(), compliance(report.swppp_controls));
    map.insert("{{SWPPP_NOTE}}".to_string(), opt(&report.swppp_note));
    map.insert(
        "{{PHASING}}".to_string(),
        compliance(report.phasing_compliance),
    );
    map.insert("{{PHASING_NOTE}}".to_string(), opt(&report.phasing_note));

    map.insert(
        "{{DEF_STATUS}}".to_string(),
        report.deficiency_status.label().to_string(),
    );
    map.insert(
        "{{DEF_DESC}}".to_string(),
        opt_or_none(&report.deficiency_desc),
    );

    map.insert("{{COMMENTARY}}".to_string(), opt(&report.commentary));
    map.insert(
        "{{ADD_ACTIVITY}}".to_string(),
        opt(&report.additional_activities),
    );
    map.insert("{{ADD_INFO}}".to_string(), opt(&report.additional_info));

    map
}

/// Pass-2 records for the QA results table
pub fn qa_rows(agg: &ReportAggregate) -> Vec<BTreeMap<String, String>> {
    agg.report
        .qa_entries
        .iter()
        .map(|entry| {
            let mut record = BTreeMap::new();
            record.insert("[CODE]".to_string(), entry.qa_type.label().to_string());
            record.insert("[TEST]".to_string(), entry.qa_type.label().to_string());
            record.insert("[LOCATION]".to_string(), opt(&entry.location));
            record.insert("[RESULT]".to_string(), entry.result.label().to_string());
            record.insert("[REMARKS]".to_string(), opt(&entry.remarks));
            record
        })
        .collect()
}

/// Pass-2 records for the bid items table; item code and description
/// resolve through the placed quantity's bid-item link
pub fn quantity_rows(agg: &ReportAggregate) -> Vec<BTreeMap<String, String>> {
    agg.report
        .placed_quantities
        .iter()
        .map(|quantity| {
            let mut record = BTreeMap::new();
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
            record.insert("[CODE]".to_string(), code.to_string());
            record.insert("[DESC]".to_string(), description.to_string());
            record.insert("[QTY]".to_string(), quantity.quantity.to_string());
            record.insert("[NOTES]".to_string(), opt(&quantity.notes));
            record
        })
        .collect()
}

/// Pass-2 records for the workforce table
pub fn crew_rows(agg: &ReportAggregate) -> Vec<BTreeMap<String, String>> {
    agg.report
        .crew_entries
        .iter()
        .map(|crew| {
            let mut record = BTreeMap::new();
            record.insert("[CONTRACTOR]".to_string(), opt(&crew.contractor));
            record.insert("[SURVEY]".to_string(), crew.survey_count.to_string());
            record.insert("[SUPER]".to_string(), crew.superintendent_count.to_string());
            record.insert("[FOREMAN]".to_string(), crew.foreman_count.to_string());
            record.insert("[OPERATOR]".to_string(), crew.operator_count.to_string());
            record.insert("[LABORER]".to_string(), crew.laborer_count.to_string());
            record.insert(
                "[ELECTRICIAN]".to_string(),
                crew.electrician_count.to_string(),
            );
            record
        })
        .collect()
}

/// Pass-2 records for the equipment table
pub fn equipment_rows(agg: &ReportAggregate) -> Vec<BTreeMap<String, String>> {
    agg.report
        .equipment_entries
        .iter()
        .map(|equipment| {
            let mut record = BTreeMap::new();
            record.insert("[EQUIPMENT]".to_string(), opt(&equipment.make_model));
            record.insert("[QTY]".to_string(), equipment.quantity.to_string());
            record.insert(
                "[HOURS]".to_string(),
                equipment.hours.map(|h| h.to_string()).unwrap_or_default(),
            );
            record
        })
        .collect()
}
