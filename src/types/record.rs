use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Critical,
    Warning,
    Info,
}

impl Level {
    /// Critical and warning records feed the anomalous layer, the tooltip
    /// markers and the alert list.
    pub fn is_alert(self) -> bool {
        matches!(self, Level::Critical | Level::Warning)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Level::Critical => "critical",
            Level::Warning => "warning",
            Level::Info => "info",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordKind {
    Anomaly,
    Normal,
}

impl RecordKind {
    pub fn label(self) -> &'static str {
        match self {
            RecordKind::Anomaly => "Anomaly",
            RecordKind::Normal => "Normal",
        }
    }

    /// Heatmap weight for points of this class.
    pub fn weight(self) -> f64 {
        match self {
            RecordKind::Anomaly => 10.0,
            RecordKind::Normal => 2.0,
        }
    }

    pub fn level(self) -> Level {
        match self {
            RecordKind::Anomaly => Level::Critical,
            RecordKind::Normal => Level::Info,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnomalyRecord {
    pub lat: f64,
    pub lng: f64,
    pub value: f64,
    #[serde(rename = "type")]
    pub kind: RecordKind,
    pub level: Level,
    pub timestamp: NaiveDateTime,
    pub message: String,
}
