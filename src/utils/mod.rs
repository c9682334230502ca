pub mod db_utils;
pub mod report_cache;
pub mod snapshot_store;
