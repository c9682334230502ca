use serde::{Deserialize, Serialize};
use strum_macros::Display;
use utoipa::ToSchema;

use crate::model::scan_event::ScanEvent;

/// Semantic direction of a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, ToSchema)]
#[strum(serialize_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum ScanClass {
    In,
    Out,
    Unknown,
}

/// Maps a device scan-type code onto IN / OUT / UNKNOWN.
///
/// Devices disagree on casing and abbreviations, so the input is trimmed and
/// upper-cased first. Anything outside the known vocabulary, including the
/// empty string, is `Unknown`.
pub fn classify(raw: &str) -> ScanClass {
    match raw.trim().to_uppercase().as_str() {
        "IN" | "I" | "ON" => ScanClass::In,
        "OUT" | "O" | "OFF" => ScanClass::Out,
        _ => ScanClass::Unknown,
    }
}

pub fn classify_event(event: &ScanEvent) -> ScanClass {
    event
        .scan_type
        .as_deref()
        .map_or(ScanClass::Unknown, classify)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes() {
        for code in ["IN", "I", "ON"] {
            assert_eq!(classify(code), ScanClass::In, "{code}");
        }
        for code in ["OUT", "O", "OFF"] {
            assert_eq!(classify(code), ScanClass::Out, "{code}");
        }
    }

    #[test]
    fn trims_and_ignores_case() {
        assert_eq!(classify("  in "), ScanClass::In);
        assert_eq!(classify("Off"), ScanClass::Out);
        assert_eq!(classify("\to\n"), ScanClass::Out);
    }

    #[test]
    fn everything_else_is_unknown() {
        for code in ["", "   ", "INN", "CHECKIN", "Emergency Exit", "0", "1", "BREAK"] {
            assert_eq!(classify(code), ScanClass::Unknown, "{code:?}");
        }
    }

    #[test]
    fn classification_is_case_insensitive() {
        let samples = [
            "in", "In", "iN", "i", "on", "oN", "out", "oUt", "o", "off", "oFf", "x", "", "ı", "ß",
            "Emergancy Exit",
        ];
        for s in samples {
            assert_eq!(classify(s), classify(&s.to_uppercase()), "{s:?}");
        }
    }

    #[test]
    fn missing_scan_type_is_unknown() {
        let event = ScanEvent {
            employee_id: "1".into(),
            date: chrono::NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
            time: None,
            scan_type: None,
            device_id: None,
        };
        assert_eq!(classify_event(&event), ScanClass::Unknown);
    }

    #[test]
    fn displays_upper_case() {
        assert_eq!(ScanClass::In.to_string(), "IN");
        assert_eq!(ScanClass::Unknown.to_string(), "UNKNOWN");
    }
}
