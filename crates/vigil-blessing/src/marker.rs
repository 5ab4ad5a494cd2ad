// crates/vigil-blessing/src/marker.rs
//
// Outcome markers consumed by downstream pipeline stages.
//
// A blessing run leaves exactly one of two empty marker files next to its
// output, and records the same outcome as an integer `blessed` property
// (1 or 0) so orchestrators can branch without parsing the full decision.

use std::fmt;

use serde::{Deserialize, Serialize};

use vigil_core::BlessingDecision;

/// Name of the integer property carrying the outcome.
pub const BLESSED_PROPERTY: &str = "blessed";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BlessingMarker {
    Blessed,
    NotBlessed,
}

impl BlessingMarker {
    pub fn from_decision(decision: &BlessingDecision) -> Self {
        if decision.blessed {
            BlessingMarker::Blessed
        } else {
            BlessingMarker::NotBlessed
        }
    }

    /// Marker file name written into the output directory.
    pub fn file_name(&self) -> &'static str {
        match self {
            BlessingMarker::Blessed => "BLESSED",
            BlessingMarker::NotBlessed => "NOT_BLESSED",
        }
    }

    /// Value of the `blessed` property.
    pub fn blessed_property(&self) -> i64 {
        match self {
            BlessingMarker::Blessed => 1,
            BlessingMarker::NotBlessed => 0,
        }
    }

    /// Read a marker back from its file name.
    pub fn from_file_name(name: &str) -> Option<Self> {
        match name {
            "BLESSED" => Some(BlessingMarker::Blessed),
            "NOT_BLESSED" => Some(BlessingMarker::NotBlessed),
            _ => None,
        }
    }

    pub fn is_blessed(&self) -> bool {
        matches!(self, BlessingMarker::Blessed)
    }
}

impl fmt::Display for BlessingMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decision(blessed: bool) -> BlessingDecision {
        BlessingDecision {
            model_id: "c".to_string(),
            baseline_model_id: "b".to_string(),
            blessed,
            evaluated_rules: Vec::new(),
            slice_gaps: Vec::new(),
        }
    }

    #[test]
    fn test_marker_follows_decision() {
        let marker = BlessingMarker::from_decision(&decision(true));
        assert_eq!(marker, BlessingMarker::Blessed);
        assert_eq!(marker.file_name(), "BLESSED");
        assert_eq!(marker.blessed_property(), 1);

        let marker = BlessingMarker::from_decision(&decision(false));
        assert_eq!(marker.file_name(), "NOT_BLESSED");
        assert_eq!(marker.blessed_property(), 0);
        assert!(!marker.is_blessed());
    }

    #[test]
    fn test_file_name_parses_back() {
        for marker in [BlessingMarker::Blessed, BlessingMarker::NotBlessed] {
            assert_eq!(BlessingMarker::from_file_name(marker.file_name()), Some(marker));
        }
        assert_eq!(BlessingMarker::from_file_name("blessed"), None);
    }

    #[test]
    fn test_serializes_as_file_name() {
        let json = serde_json::to_string(&BlessingMarker::NotBlessed).unwrap();
        assert_eq!(json, "\"NOT_BLESSED\"");
    }
}
