use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use strum_macros::Display;
use utoipa::ToSchema;

use crate::model::daily_aggregate::DailyAggregate;

/// Clocked in at least once but never clocked out.
pub fn audit_flag(aggregate: &DailyAggregate) -> bool {
    aggregate.in_count >= 1 && aggregate.out_count == 0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, ToSchema)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AuditReason {
    MissingOut,
    MissingIn,
}

/// Which incomplete days end up in the audit report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuditRule {
    /// Also report days with OUT scans but no IN scan. Off unless HR asks for it.
    pub flag_missing_in: bool,
}

impl AuditRule {
    pub fn evaluate(&self, aggregate: &DailyAggregate) -> Option<AuditReason> {
        if audit_flag(aggregate) {
            Some(AuditReason::MissingOut)
        } else if self.flag_missing_in && aggregate.out_count >= 1 && aggregate.in_count == 0 {
            Some(AuditReason::MissingIn)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, ToSchema)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AuditView {
    #[default]
    Flat,
    Grouped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AuditEntry {
    #[schema(example = "1042")]
    pub employee_id: String,
    #[schema(example = "2026-01-05", value_type = String, format = "date")]
    pub date: NaiveDate,
    pub punch_count: u32,
    pub in_count: u32,
    pub out_count: u32,
    #[schema(value_type = Option<String>, format = "time")]
    pub first_in: Option<NaiveTime>,
    #[schema(value_type = Option<String>, format = "time")]
    pub last_out: Option<NaiveTime>,
    #[schema(example = "IN > IN")]
    pub punch_pattern: String,
    pub reason: AuditReason,
}

impl AuditEntry {
    fn from_aggregate(aggregate: &DailyAggregate, reason: AuditReason) -> Self {
        AuditEntry {
            employee_id: aggregate.employee_id.clone(),
            date: aggregate.date,
            punch_count: aggregate.punch_count,
            in_count: aggregate.in_count,
            out_count: aggregate.out_count,
            first_in: aggregate.first_in,
            last_out: aggregate.last_out,
            punch_pattern: aggregate.punch_pattern(),
            reason,
        }
    }
}

/// Flagged days sharing the exact same raw scan-type sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PatternGroup {
    /// Display label; two groups may share it when their raw types differ.
    #[schema(example = "IN > IN")]
    pub pattern: String,
    /// Grouping key: scan types as reported, in punch order.
    #[schema(example = json!(["IN", "IN"]))]
    pub scan_types: Vec<String>,
    pub entries: Vec<AuditEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AuditReport {
    pub view: AuditView,
    pub total_flagged: usize,
    /// Filled for the flat view.
    pub entries: Vec<AuditEntry>,
    /// Filled for the grouped view; largest groups first.
    pub groups: Vec<PatternGroup>,
}

pub fn build_audit_report(
    aggregates: &[DailyAggregate],
    rule: AuditRule,
    view: AuditView,
) -> AuditReport {
    let flagged: Vec<(&DailyAggregate, AuditEntry)> = aggregates
        .iter()
        .filter_map(|a| rule.evaluate(a).map(|r| (a, AuditEntry::from_aggregate(a, r))))
        .collect();
    let total_flagged = flagged.len();

    match view {
        AuditView::Flat => AuditReport {
            view,
            total_flagged,
            entries: flagged.into_iter().map(|(_, entry)| entry).collect(),
            groups: Vec::new(),
        },
        AuditView::Grouped => {
            let mut by_types: BTreeMap<Vec<&str>, Vec<AuditEntry>> = BTreeMap::new();
            for (aggregate, entry) in flagged {
                by_types
                    .entry(aggregate.scan_types())
                    .or_default()
                    .push(entry);
            }

            let mut groups: Vec<PatternGroup> = by_types
                .into_iter()
                .map(|(types, entries)| PatternGroup {
                    pattern: entries[0].punch_pattern.clone(),
                    scan_types: types.into_iter().map(str::to_string).collect(),
                    entries,
                })
                .collect();
            // stable: equal sizes stay in scan-type order
            groups.sort_by(|a, b| b.entries.len().cmp(&a.entries.len()));

            AuditReport {
                view,
                total_flagged,
                entries: Vec::new(),
                groups,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::daily_aggregate::Punch;

    fn day(employee: &str, pattern: &[&str]) -> DailyAggregate {
        let in_count = pattern
            .iter()
            .filter(|p| matches!(**p, "IN" | "I" | "ON"))
            .count() as u32;
        let out_count = pattern
            .iter()
            .filter(|p| matches!(**p, "OUT" | "O" | "OFF"))
            .count() as u32;

        DailyAggregate {
            employee_id: employee.into(),
            date: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
            punch_count: pattern.len() as u32,
            in_count,
            out_count,
            first_in: None,
            last_out: None,
            punch_sequence: pattern
                .iter()
                .map(|p| Punch {
                    time: None,
                    scan_type: p.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn flags_in_without_out() {
        assert!(audit_flag(&day("E", &["IN"])));
        assert!(audit_flag(&day("E", &["IN", "IN"])));
        assert!(!audit_flag(&day("E", &["IN", "OUT"])));
        assert!(!audit_flag(&day("E", &["OUT"])));
        assert!(!audit_flag(&day("E", &["BREAK"])));
    }

    #[test]
    fn missing_in_only_when_enabled() {
        let out_only = day("E", &["OUT"]);
        assert_eq!(AuditRule::default().evaluate(&out_only), None);

        let rule = AuditRule {
            flag_missing_in: true,
        };
        assert_eq!(rule.evaluate(&out_only), Some(AuditReason::MissingIn));
        assert_eq!(
            rule.evaluate(&day("E", &["IN"])),
            Some(AuditReason::MissingOut)
        );
        assert_eq!(rule.evaluate(&day("E", &["IN", "OUT"])), None);
    }

    #[test]
    fn flat_report_lists_flagged_days() {
        let days = vec![
            day("A", &["IN", "OUT"]),
            day("B", &["IN"]),
            day("C", &["IN", "IN"]),
        ];

        let report = build_audit_report(&days, AuditRule::default(), AuditView::Flat);
        assert_eq!(report.total_flagged, 2);
        assert!(report.groups.is_empty());

        let ids: Vec<_> = report.entries.iter().map(|e| e.employee_id.as_str()).collect();
        assert_eq!(ids, vec!["B", "C"]);
        assert_eq!(report.entries[1].punch_pattern, "IN > IN");
        assert_eq!(report.entries[1].reason, AuditReason::MissingOut);
    }

    #[test]
    fn grouped_report_buckets_by_pattern() {
        let days = vec![
            day("A", &["IN"]),
            day("B", &["IN", "IN"]),
            day("C", &["IN"]),
            day("D", &["IN", "OUT"]),
            day("E", &["I", ""]),
        ];

        let report = build_audit_report(&days, AuditRule::default(), AuditView::Grouped);
        assert_eq!(report.total_flagged, 4);
        assert!(report.entries.is_empty());

        let summary: Vec<_> = report
            .groups
            .iter()
            .map(|g| (g.pattern.as_str(), g.entries.len()))
            .collect();
        assert_eq!(summary, vec![("IN", 2), ("I > ?", 1), ("IN > IN", 1)]);
    }

    #[test]
    fn grouping_uses_raw_scan_types() {
        let mut days = vec![
            day("A", &["IN", ""]),
            day("B", &["IN", "?"]),
            day("C", &[" IN"]),
            day("D", &["IN"]),
        ];
        // the helper only counts exact IN types
        days[2].in_count = 1;

        let report = build_audit_report(&days, AuditRule::default(), AuditView::Grouped);
        assert_eq!(report.total_flagged, 4);

        let keys: Vec<_> = report
            .groups
            .iter()
            .map(|g| (g.scan_types.clone(), g.pattern.as_str(), g.entries.len()))
            .collect();
        assert_eq!(
            keys,
            vec![
                (vec![" IN".to_string()], "IN", 1),
                (vec!["IN".to_string()], "IN", 1),
                (vec!["IN".to_string(), "".to_string()], "IN > ?", 1),
                (vec!["IN".to_string(), "?".to_string()], "IN > ?", 1),
            ]
        );
    }

    #[test]
    fn nothing_flagged_is_an_empty_report() {
        let report = build_audit_report(&[], AuditRule::default(), AuditView::Grouped);
        assert_eq!(report.total_flagged, 0);
        assert!(report.groups.is_empty());
    }
}
