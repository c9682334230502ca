use std::collections::{HashMap, HashSet};

use chrono::{Days, NaiveDate};

use crate::model::daily_aggregate::DailyAggregate;
use crate::model::dashboard_snapshot::TrendPoint;

/// Present headcount per day for the `window_days` days ending at `end`.
///
/// Always returns exactly `window_days` points, oldest first, with zero for
/// days without scans. `members` restricts counting to a roster; `None`
/// counts every employee present in `aggregates`.
pub fn build_trend(
    aggregates: &[DailyAggregate],
    end: NaiveDate,
    window_days: u32,
    members: Option<&HashSet<String>>,
) -> Vec<TrendPoint> {
    if window_days == 0 {
        return Vec::new();
    }

    let start = end
        .checked_sub_days(Days::new(u64::from(window_days - 1)))
        .unwrap_or(NaiveDate::MIN);

    let mut present: HashMap<NaiveDate, HashSet<&str>> = HashMap::new();
    for a in aggregates {
        if a.punch_count == 0 || a.date < start || a.date > end {
            continue;
        }
        if members.is_some_and(|m| !m.contains(&a.employee_id)) {
            continue;
        }
        present
            .entry(a.date)
            .or_default()
            .insert(a.employee_id.as_str());
    }

    start
        .iter_days()
        .take(window_days as usize)
        .map(|date| TrendPoint {
            date,
            present_count: present.get(&date).map_or(0, |ids| ids.len() as u32),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, day).unwrap()
    }

    fn present(employee: &str, date: NaiveDate) -> DailyAggregate {
        DailyAggregate {
            employee_id: employee.into(),
            date,
            punch_count: 1,
            in_count: 1,
            out_count: 0,
            first_in: None,
            last_out: None,
            punch_sequence: Vec::new(),
        }
    }

    #[test]
    fn window_is_fixed_length_and_zero_filled() {
        let aggs = vec![present("A", d(3))];
        let trend = build_trend(&aggs, d(7), 7, None);

        assert_eq!(trend.len(), 7);
        assert_eq!(trend.first().unwrap().date, d(1));
        assert_eq!(trend.last().unwrap().date, d(7));
        assert!(trend.windows(2).all(|w| w[0].date < w[1].date));

        let counts: Vec<_> = trend.iter().map(|p| p.present_count).collect();
        assert_eq!(counts, vec![0, 0, 1, 0, 0, 0, 0]);
    }

    #[test]
    fn no_data_still_yields_full_window() {
        let trend = build_trend(&[], d(20), 7, None);
        assert_eq!(trend.len(), 7);
        assert!(trend.iter().all(|p| p.present_count == 0));
    }

    #[test]
    fn counts_distinct_employees_in_window() {
        let aggs = vec![
            present("A", d(6)),
            present("B", d(6)),
            present("A", d(6)),
            present("A", d(7)),
            present("C", d(30)),
        ];

        let trend = build_trend(&aggs, d(7), 2, None);
        assert_eq!(
            trend,
            vec![
                TrendPoint {
                    date: d(6),
                    present_count: 2
                },
                TrendPoint {
                    date: d(7),
                    present_count: 1
                },
            ]
        );
    }

    #[test]
    fn members_restrict_the_count() {
        let aggs = vec![present("A", d(7)), present("B", d(7))];
        let members: HashSet<String> = ["B".to_string()].into_iter().collect();

        let trend = build_trend(&aggs, d(7), 1, Some(&members));
        assert_eq!(trend[0].present_count, 1);
    }

    #[test]
    fn window_crosses_month_boundary() {
        let trend = build_trend(&[], d(2), 5, None);
        assert_eq!(
            trend.first().unwrap().date,
            NaiveDate::from_ymd_opt(2025, 12, 29).unwrap()
        );
        assert_eq!(trend.len(), 5);
    }

    #[test]
    fn zero_window_is_empty() {
        assert!(build_trend(&[present("A", d(7))], d(7), 0, None).is_empty());
    }
}
