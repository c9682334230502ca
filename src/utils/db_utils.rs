use chrono::NaiveDate;
use sqlx::MySql;
use sqlx::mysql::MySqlArguments;
use sqlx::query::QueryAs;

use crate::model::org_unit::Scope;

/// ===============================
/// SQL bindable value enum
/// ===============================
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    String(String),
    U64(u64),
    Date(NaiveDate),
}

/// ===============================
/// SQL text + ordered bind values
/// ===============================
#[derive(Debug)]
pub struct SqlQuery {
    pub sql: String,
    pub values: Vec<SqlValue>,
}

/// Selection of scans for one report or dashboard rebuild.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScanFilter {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub scope: Scope,
    pub employee_id: Option<String>,
}

/// `AND`-able conditions on the `employees` alias `e` for a scope.
fn scope_conditions(scope: &Scope, conditions: &mut Vec<&'static str>, values: &mut Vec<SqlValue>) {
    if let Some(id) = scope.division_id {
        conditions.push("e.division_id = ?");
        values.push(SqlValue::U64(id));
    }
    if let Some(id) = scope.section_id {
        conditions.push("e.section_id = ?");
        values.push(SqlValue::U64(id));
    }
    if let Some(id) = scope.subsection_id {
        conditions.push("e.subsection_id = ?");
        values.push(SqlValue::U64(id));
    }
}

/// ===============================
/// Build scan SELECT for a filter
/// ===============================
pub fn build_scan_query(filter: &ScanFilter) -> SqlQuery {
    let mut conditions = vec!["s.scan_date BETWEEN ? AND ?"];
    let mut values = vec![SqlValue::Date(filter.from), SqlValue::Date(filter.to)];

    scope_conditions(&filter.scope, &mut conditions, &mut values);

    if let Some(employee_id) = &filter.employee_id {
        conditions.push("s.employee_id = ?");
        values.push(SqlValue::String(employee_id.clone()));
    }

    // join only when the scope needs the hierarchy columns
    let join = if filter.scope.is_org_wide() {
        ""
    } else {
        "JOIN employees e ON e.id = s.employee_id "
    };

    // s.id keeps capture order for scans sharing a time
    let sql = format!(
        "SELECT CAST(s.employee_id AS CHAR) AS employee_id, s.scan_date, \
         CAST(s.scan_time AS CHAR) AS scan_time, s.scan_type, s.device_id \
         FROM attendance_scans s {}WHERE {} \
         ORDER BY s.scan_date, s.employee_id, s.id",
        join,
        conditions.join(" AND ")
    );

    SqlQuery { sql, values }
}

/// ===============================
/// Build active roster SELECT
/// ===============================
pub fn build_roster_query(scope: &Scope) -> SqlQuery {
    let mut conditions = vec!["e.is_active = 1"];
    let mut values = Vec::new();

    scope_conditions(scope, &mut conditions, &mut values);

    let sql = format!(
        "SELECT CAST(e.id AS CHAR) AS employee_id, e.full_name AS name \
         FROM employees e WHERE {} ORDER BY e.full_name, e.id",
        conditions.join(" AND ")
    );

    SqlQuery { sql, values }
}

/// ===============================
/// Bind values in order
/// ===============================
pub fn bind_values<'q, O>(
    mut query: QueryAs<'q, MySql, O, MySqlArguments>,
    values: Vec<SqlValue>,
) -> QueryAs<'q, MySql, O, MySqlArguments> {
    for value in values {
        query = match value {
            SqlValue::String(v) => query.bind(v),
            SqlValue::U64(v) => query.bind(v),
            SqlValue::Date(v) => query.bind(v),
        };
    }
    query
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(scope: Scope, employee_id: Option<&str>) -> ScanFilter {
        ScanFilter {
            from: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            to: NaiveDate::from_ymd_opt(2026, 1, 7).unwrap(),
            scope,
            employee_id: employee_id.map(str::to_string),
        }
    }

    #[test]
    fn org_wide_scan_query_skips_join() {
        let q = build_scan_query(&filter(Scope::default(), None));

        assert!(!q.sql.contains("JOIN employees"));
        assert!(q.sql.contains("WHERE s.scan_date BETWEEN ? AND ? ORDER BY"));
        assert!(q.sql.ends_with("ORDER BY s.scan_date, s.employee_id, s.id"));
        assert_eq!(q.values.len(), 2);
    }

    #[test]
    fn scoped_scan_query_binds_in_order() {
        let scope = Scope {
            division_id: Some(3),
            section_id: None,
            subsection_id: Some(9),
        };
        let q = build_scan_query(&filter(scope, Some("1042")));

        assert!(q.sql.contains("JOIN employees e ON e.id = s.employee_id"));
        assert!(q.sql.contains(
            "s.scan_date BETWEEN ? AND ? AND e.division_id = ? AND e.subsection_id = ? AND s.employee_id = ?"
        ));
        assert_eq!(
            q.values[2..],
            [
                SqlValue::U64(3),
                SqlValue::U64(9),
                SqlValue::String("1042".into())
            ]
        );
        assert_eq!(q.sql.matches('?').count(), q.values.len());
    }

    #[test]
    fn roster_query_filters_active_members() {
        let q = build_roster_query(&Scope {
            section_id: Some(5),
            ..Scope::default()
        });

        assert!(q.sql.contains("WHERE e.is_active = 1 AND e.section_id = ?"));
        assert_eq!(q.values, vec![SqlValue::U64(5)]);
    }
}
