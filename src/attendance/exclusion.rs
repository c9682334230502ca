use crate::model::scan_event::ScanEvent;

/// Device tags of emergency-exit terminals. The misspelled variant is what
/// the installed terminals actually report.
pub const DEFAULT_EXCLUDED_DEVICE_MARKERS: [&str; 2] = ["Emergency Exit", "Emergancy Exit"];

/// Drops scans captured by terminals that do not produce attendance signals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusionFilter {
    // stored lower-cased
    markers: Vec<String>,
}

impl ExclusionFilter {
    pub fn new<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let markers = markers
            .into_iter()
            .map(|m| m.as_ref().trim().to_lowercase())
            .filter(|m| !m.is_empty())
            .collect();

        Self { markers }
    }

    pub fn markers(&self) -> &[String] {
        &self.markers
    }

    pub fn is_excluded(&self, event: &ScanEvent) -> bool {
        let Some(device) = event.device_id.as_deref() else {
            return false;
        };
        if self.markers.is_empty() {
            return false;
        }

        let device = device.to_lowercase();
        self.markers.iter().any(|m| device.contains(m.as_str()))
    }
}

impl Default for ExclusionFilter {
    fn default() -> Self {
        Self::new(DEFAULT_EXCLUDED_DEVICE_MARKERS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn on_device(device: Option<&str>) -> ScanEvent {
        ScanEvent {
            employee_id: "1".into(),
            date: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
            time: None,
            scan_type: Some("OUT".into()),
            device_id: device.map(str::to_string),
        }
    }

    #[test]
    fn matches_marker_substring() {
        let filter = ExclusionFilter::default();
        assert!(filter.is_excluded(&on_device(Some("X Emergancy Exit Y"))));
        assert!(filter.is_excluded(&on_device(Some("B2-Emergency Exit"))));
        assert!(!filter.is_excluded(&on_device(Some("Main Gate"))));
        assert!(!filter.is_excluded(&on_device(None)));
    }

    #[test]
    fn match_ignores_case() {
        let filter = ExclusionFilter::default();
        assert!(filter.is_excluded(&on_device(Some("north EMERGENCY EXIT"))));
        assert!(filter.is_excluded(&on_device(Some("emergancy exit 3"))));
    }

    #[test]
    fn blank_markers_are_ignored() {
        let filter = ExclusionFilter::new(["", "  ", "Fire Door"]);
        assert_eq!(filter.markers(), &["fire door".to_string()]);
        assert!(!filter.is_excluded(&on_device(Some("Main Gate"))));
        assert!(filter.is_excluded(&on_device(Some("FIRE DOOR 2"))));
    }

    #[test]
    fn empty_filter_keeps_everything() {
        let filter = ExclusionFilter::new(Vec::<String>::new());
        assert!(!filter.is_excluded(&on_device(Some("X Emergancy Exit Y"))));
    }
}
