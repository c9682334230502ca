use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::attendance::classifier::{ScanClass, classify_event};
use crate::attendance::exclusion::ExclusionFilter;
use crate::model::daily_aggregate::{DailyAggregate, Punch};
use crate::model::scan_event::ScanEvent;

/// Groups scans by (employee, date) and derives one `DailyAggregate` per group.
///
/// Excluded events are dropped before grouping. Output is ordered by date,
/// then employee id. Inside a group, punches are ordered by time with ties
/// (and events without a readable time, which go last) kept in input order.
pub fn aggregate(events: &[ScanEvent], exclusions: &ExclusionFilter) -> Vec<DailyAggregate> {
    let mut groups: BTreeMap<(NaiveDate, &str), Vec<&ScanEvent>> = BTreeMap::new();

    for event in events.iter().filter(|e| !exclusions.is_excluded(e)) {
        groups
            .entry((event.date, event.employee_id.as_str()))
            .or_default()
            .push(event);
    }

    groups
        .into_iter()
        .map(|((date, employee_id), group)| aggregate_day(employee_id, date, group))
        .collect()
}

fn aggregate_day(employee_id: &str, date: NaiveDate, mut group: Vec<&ScanEvent>) -> DailyAggregate {
    // stable: equal times keep scan order
    group.sort_by_key(|e| (e.time.is_none(), e.time));

    let mut day = DailyAggregate {
        employee_id: employee_id.to_string(),
        date,
        punch_count: 0,
        in_count: 0,
        out_count: 0,
        first_in: None,
        last_out: None,
        punch_sequence: Vec::with_capacity(group.len()),
    };

    for event in group {
        day.punch_count += 1;

        match classify_event(event) {
            ScanClass::In => {
                day.in_count += 1;
                if let Some(t) = event.time {
                    day.first_in = Some(day.first_in.map_or(t, |cur| cur.min(t)));
                }
            }
            ScanClass::Out => {
                day.out_count += 1;
                if let Some(t) = event.time {
                    day.last_out = Some(day.last_out.map_or(t, |cur| cur.max(t)));
                }
            }
            ScanClass::Unknown => {}
        }

        day.punch_sequence.push(Punch {
            time: event.time,
            scan_type: event.scan_type.clone().unwrap_or_default(),
        });
    }

    day
}
