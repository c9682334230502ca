use std::env;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow, ensure};
use dotenvy::dotenv;

use crate::attendance::exclusion::DEFAULT_EXCLUDED_DEVICE_MARKERS;
use crate::model::org_unit::Scope;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,
    pub api_prefix: String,
    pub log_dir: String,

    // Rate limiting
    pub rate_protected_per_min: u32,

    // Attendance rules
    pub excluded_device_markers: Vec<String>,
    pub audit_flag_missing_in: bool,
    pub max_report_days: u32,

    // Dashboard
    pub trend_window_days: u32,
    pub dashboard_scope: Scope,
    pub snapshot_refresh_secs: u64,

    // Report cache
    pub report_cache_ttl_secs: u64,
    pub report_cache_capacity: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup, e.g. a map in tests.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| lookup(key).ok_or_else(|| anyhow!("{key} must be set"));

        let excluded_device_markers = match lookup("EXCLUDED_DEVICE_MARKERS") {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(str::to_string)
                .collect(),
            None => DEFAULT_EXCLUDED_DEVICE_MARKERS
                .iter()
                .map(|m| m.to_string())
                .collect(),
        };

        let max_report_days = parse_or(&lookup, "MAX_REPORT_DAYS", 93)?;
        let trend_window_days = parse_or(&lookup, "TREND_WINDOW_DAYS", 7)?;
        ensure!(
            (1..=max_report_days).contains(&trend_window_days),
            "TREND_WINDOW_DAYS must be between 1 and MAX_REPORT_DAYS ({max_report_days}), got {trend_window_days}"
        );

        Ok(Self {
            server_addr: required("SERVER_ADDR")?,
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            api_prefix: lookup("API_PREFIX").unwrap_or_else(|| "/api".to_string()),
            log_dir: lookup("LOG_DIR").unwrap_or_else(|| "logs".to_string()),

            rate_protected_per_min: parse_or(&lookup, "RATE_PROTECTED_PER_MIN", 1000)?,

            excluded_device_markers,
            audit_flag_missing_in: parse_or(&lookup, "AUDIT_FLAG_MISSING_IN", false)?,
            max_report_days,

            trend_window_days,
            dashboard_scope: Scope {
                division_id: parse_opt(&lookup, "DASHBOARD_DIVISION_ID")?,
                section_id: parse_opt(&lookup, "DASHBOARD_SECTION_ID")?,
                subsection_id: parse_opt(&lookup, "DASHBOARD_SUBSECTION_ID")?,
            },
            snapshot_refresh_secs: parse_or(&lookup, "SNAPSHOT_REFRESH_SECS", 300)?, // 5 min

            report_cache_ttl_secs: parse_or(&lookup, "REPORT_CACHE_TTL_SECS", 60)?,
            report_cache_capacity: parse_or(&lookup, "REPORT_CACHE_CAPACITY", 256)?,
        })
    }
}

fn parse_opt<F, T>(lookup: &F, key: &str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("{key} has an invalid value: {raw:?}")),
        _ => Ok(None),
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    Ok(parse_opt(lookup, key)?.unwrap_or(default))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;

    pub(crate) fn test_config() -> Config {
        config_with(&[])
    }

    fn config_with(extra: &[(&str, &str)]) -> Config {
        try_config_with(extra).unwrap()
    }

    fn try_config_with(extra: &[(&str, &str)]) -> Result<Config> {
        let mut vars: HashMap<String, String> = [
            ("SERVER_ADDR", "127.0.0.1:8080"),
            ("DATABASE_URL", "mysql://hr:hr@localhost/attendance"),
            ("JWT_SECRET", "test-secret"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        for (k, v) in extra {
            vars.insert(k.to_string(), v.to_string());
        }

        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply() {
        let config = test_config();
        assert_eq!(config.api_prefix, "/api");
        assert_eq!(config.trend_window_days, 7);
        assert_eq!(config.max_report_days, 93);
        assert!(!config.audit_flag_missing_in);
        assert!(config.dashboard_scope.is_org_wide());
        assert_eq!(
            config.excluded_device_markers,
            vec!["Emergency Exit", "Emergancy Exit"]
        );
    }

    #[test]
    fn overrides_are_parsed() {
        let config = config_with(&[
            ("TREND_WINDOW_DAYS", "14"),
            ("DASHBOARD_DIVISION_ID", "12"),
            ("DASHBOARD_SECTION_ID", ""),
            ("AUDIT_FLAG_MISSING_IN", "true"),
            ("EXCLUDED_DEVICE_MARKERS", " Fire Door , ,Emergency Exit"),
        ]);

        assert_eq!(config.trend_window_days, 14);
        assert_eq!(config.dashboard_scope.division_id, Some(12));
        assert_eq!(config.dashboard_scope.section_id, None);
        assert!(config.audit_flag_missing_in);
        assert_eq!(
            config.excluded_device_markers,
            vec!["Fire Door", "Emergency Exit"]
        );
    }

    #[test]
    fn zero_trend_window_is_rejected() {
        let err = try_config_with(&[("TREND_WINDOW_DAYS", "0")]).unwrap_err();
        assert!(err.to_string().contains("TREND_WINDOW_DAYS"));
    }

    #[test]
    fn trend_window_cannot_exceed_report_limit() {
        let err = try_config_with(&[("TREND_WINDOW_DAYS", "100")]).unwrap_err();
        assert!(err.to_string().contains("MAX_REPORT_DAYS (93)"));

        let config = try_config_with(&[("TREND_WINDOW_DAYS", "100"), ("MAX_REPORT_DAYS", "120")])
            .unwrap();
        assert_eq!(config.trend_window_days, 100);
    }

    #[test]
    fn missing_required_key_is_an_error() {
        let err = Config::from_lookup(|_| None).unwrap_err();
        assert!(err.to_string().contains("SERVER_ADDR"));
    }

    #[test]
    fn bad_number_is_an_error() {
        let vars: HashMap<&str, &str> = [
            ("SERVER_ADDR", "x"),
            ("DATABASE_URL", "x"),
            ("JWT_SECRET", "x"),
            ("TREND_WINDOW_DAYS", "seven"),
        ]
        .into_iter()
        .collect();

        let err = Config::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap_err();
        assert!(err.to_string().contains("TREND_WINDOW_DAYS"));
    }
}
