//! Report listing filters
//!
//! Each list/export invocation builds one immutable [`ReportFilter`] with
//! every default resolved up front, then applies it to loaded reports.

use chrono::NaiveDate;

use crate::core::identity::EntityId;
use crate::entities::report::{Report, ReportResult, ReportStatus};

/// The resolved filter for one listing request
#[derive(Debug, Default, Clone)]
pub struct ReportFilter {
    pub status: Option<ReportStatus>,
    pub result: Option<ReportResult>,
    /// Substring match against the inspector username
    pub inspector: Option<String>,
    pub project: Option<EntityId>,
    /// Matches reports containing a placed quantity for this bid item
    pub bid_item: Option<EntityId>,
    /// Inclusive range on start_date
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    /// Numeric range over the report's precipitation readings
    pub precip_min: Option<f64>,
    pub precip_max: Option<f64>,
}

impl ReportFilter {
    pub fn matches(&self, report: &Report) -> bool {
        if let Some(status) = self.status {
            if report.status != status {
                return false;
            }
        }

        if let Some(result) = self.result {
            // Legacy rows with no stored result deserialize as pending,
            // so a pending filter picks them up too.
            if report.result != result {
                return false;
            }
        }

        if let Some(ref needle) = self.inspector {
            if !report
                .inspector
                .to_lowercase()
                .contains(&needle.to_lowercase())
            {
                return false;
            }
        }

        if let Some(ref project) = self.project {
            if report.project.as_ref() != Some(project) {
                return false;
            }
        }

        if let Some(ref bid_item) = self.bid_item {
            let placed_against = report
                .placed_quantities
                .iter()
                .any(|q| q.bid_item.as_ref() == Some(bid_item));
            if !placed_against {
                return false;
            }
        }

        if self.date_from.is_some() || self.date_to.is_some() {
            let Some(start) = report.start_date else {
                return false;
            };
            if let Some(from) = self.date_from {
                if start < from {
                    return false;
                }
            }
            if let Some(to) = self.date_to {
                if start > to {
                    return false;
                }
            }
        }

        if self.precip_min.is_some() || self.precip_max.is_some() {
            let min = self.precip_min.unwrap_or(f64::MIN);
            let max = self.precip_max.unwrap_or(f64::MAX);
            let in_range = report
                .weather
                .iter()
                .filter_map(|w| w.precipitation.as_deref())
                .map(parse_precip)
                .any(|p| p >= min && p <= max);
            if !in_range {
                return false;
            }
        }

        true
    }
}

/// Parse a precipitation reading, tolerating legacy free-text values.
///
/// Takes the leading numeric prefix ("0.25 in" -> 0.25); anything
/// non-numeric ("trace", "") counts as zero.
pub fn parse_precip(raw: &str) -> f64 {
    let trimmed = raw.trim();
    let numeric_len = trimmed
        .char_indices()
        .take_while(|(i, c)| c.is_ascii_digit() || *c == '.' || (*i == 0 && *c == '-'))
        .count();
    let prefix: String = trimmed.chars().take(numeric_len).collect();
    prefix.parse().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identity::EntityPrefix;
    use crate::entities::entries::PlacedQuantity;
    use crate::entities::report::WeatherReading;

    fn report() -> Report {
        Report::new("jdoe".to_string())
    }

    #[test]
    fn test_parse_precip_tolerates_legacy_text() {
        assert_eq!(parse_precip("0.25"), 0.25);
        assert_eq!(parse_precip(" 0.5 in "), 0.5);
        assert_eq!(parse_precip("trace"), 0.0);
        assert_eq!(parse_precip(""), 0.0);
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        assert!(ReportFilter::default().matches(&report()));
    }

    #[test]
    fn test_status_and_inspector_filters() {
        let r = report();
        let filter = ReportFilter {
            status: Some(ReportStatus::QcReview),
            ..Default::default()
        };
        assert!(!filter.matches(&r));

        let filter = ReportFilter {
            inspector: Some("JDO".to_string()),
            ..Default::default()
        };
        assert!(filter.matches(&r));
    }

    #[test]
    fn test_bid_item_filter_scans_placed_quantities() {
        let item = EntityId::new(EntityPrefix::Item);
        let mut r = report();
        r.placed_quantities
            .push(PlacedQuantity::new(item.clone(), 10.0));

        let filter = ReportFilter {
            bid_item: Some(item),
            ..Default::default()
        };
        assert!(filter.matches(&r));

        let filter = ReportFilter {
            bid_item: Some(EntityId::new(EntityPrefix::Item)),
            ..Default::default()
        };
        assert!(!filter.matches(&r));
    }

    #[test]
    fn test_date_range_is_inclusive() {
        let mut r = report();
        r.start_date = NaiveDate::from_ymd_opt(2026, 8, 1);

        let filter = ReportFilter {
            date_from: NaiveDate::from_ymd_opt(2026, 8, 1),
            date_to: NaiveDate::from_ymd_opt(2026, 8, 31),
            ..Default::default()
        };
        assert!(filter.matches(&r));

        let filter = ReportFilter {
            date_from: NaiveDate::from_ymd_opt(2026, 8, 2),
            ..Default::default()
        };
        assert!(!filter.matches(&r));
    }

    #[test]
    fn test_precip_range_counts_legacy_text_as_zero() {
        let mut r = report();
        r.weather.push(WeatherReading {
            precipitation: Some("trace".to_string()),
            ..Default::default()
        });

        let filter = ReportFilter {
            precip_min: Some(0.0),
            precip_max: Some(0.1),
            ..Default::default()
        };
        assert!(filter.matches(&r));

        let filter = ReportFilter {
            precip_min: Some(0.5),
            precip_max: Some(2.0),
            ..Default::default()
        };
        assert!(!filter.matches(&r));
    }
}
