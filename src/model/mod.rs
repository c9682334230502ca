pub mod daily_aggregate;
pub mod dashboard_snapshot;
pub mod org_unit;
pub mod role;
pub mod scan_event;
