use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::types::api::DateCode;
use crate::types::layer::LayerUpdate;
use crate::types::record::{Level, RecordKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertEntry {
    #[serde(rename = "type")]
    pub kind: RecordKind,
    pub level: Level,
    pub css_class: String,
    pub timestamp: NaiveDateTime,
    pub when_label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DemandTrend {
    Up,
    Down,
    Flat,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorPanel {
    pub trips: String,
    pub anomalies: String,
    pub hot_location: String,
    pub rush_hour: String,
    pub demand_pct: String,
    pub demand_trend: DemandTrend,
    pub date_label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub date: Option<String>,
    pub date_label: String,
    pub total_normal: u64,
    pub total_anomalies: u64,
}

/// Everything the map and side panel need after a load or an hour change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub date: Option<DateCode>,
    pub selected_hour: u32,
    pub total_records: usize,
    pub filtered_records: usize,
    pub time_axis: Vec<NaiveDateTime>,
    pub layers: Option<LayerUpdate>,
    pub alerts: Vec<AlertEntry>,
}

/// Outcome of a date change. Panels whose request failed or was superseded are `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRefresh {
    pub date: DateCode,
    pub superseded: bool,
    pub view: Option<DashboardView>,
    pub indicators: Option<IndicatorPanel>,
    pub history: Option<Vec<HistoryEntry>>,
}
