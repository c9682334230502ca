//! Punch classification and attendance aggregation.
//!
//! Everything in here is pure and synchronous. Handlers and the dashboard
//! refresh job fetch scans from MySQL and hand them to [`AttendanceRules`],
//! so the daily report, the audit report and the dashboard share one
//! definition of IN, OUT and "incomplete day".

pub mod aggregator;
pub mod audit;
pub mod classifier;
pub mod exclusion;
pub mod summary;
pub mod trend;

use crate::config::Config;
use crate::model::daily_aggregate::DailyAggregate;
use crate::model::scan_event::ScanEvent;

use audit::{AuditReport, AuditRule, AuditView};
use exclusion::ExclusionFilter;

#[derive(Debug, Clone, Default)]
pub struct AttendanceRules {
    pub exclusions: ExclusionFilter,
    pub audit: AuditRule,
}

impl AttendanceRules {
    pub fn from_config(config: &Config) -> Self {
        Self {
            exclusions: ExclusionFilter::new(&config.excluded_device_markers),
            audit: AuditRule {
                flag_missing_in: config.audit_flag_missing_in,
            },
        }
    }

    pub fn aggregate(&self, events: &[ScanEvent]) -> Vec<DailyAggregate> {
        aggregator::aggregate(events, &self.exclusions)
    }

    pub fn audit_report(&self, aggregates: &[DailyAggregate], view: AuditView) -> AuditReport {
        audit::build_audit_report(aggregates, self.audit, view)
    }
}
