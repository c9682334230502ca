use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Organizational filter. All `None` means the whole organization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct Scope {
    #[schema(example = 3, nullable = true)]
    pub division_id: Option<u64>,
    #[schema(nullable = true)]
    pub section_id: Option<u64>,
    #[schema(nullable = true)]
    pub subsection_id: Option<u64>,
}

impl Scope {
    pub fn is_org_wide(&self) -> bool {
        self.division_id.is_none() && self.section_id.is_none() && self.subsection_id.is_none()
    }
}

/// Hierarchy and headcount totals shown on the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct OrgTotals {
    #[schema(example = 12)]
    pub divisions: i64,
    #[schema(example = 48)]
    pub sections: i64,
    #[schema(example = 130)]
    pub subsections: i64,
    #[schema(example = 2400)]
    pub employees: i64,
}

/// Roster entry of an employee belonging to a scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct RosterMember {
    #[schema(example = "1042")]
    pub employee_id: String,
    #[schema(example = "Jane Doe")]
    pub name: String,
}
