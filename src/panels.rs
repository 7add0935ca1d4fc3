use serde_json::Value;

use crate::format::{fixed2_grouped, long_date_label, plain_number};
use crate::types::api::{HistoryEvent, IndicatorsResult};
use crate::types::view::{DemandTrend, HistoryEntry, IndicatorPanel};

fn value_text(v: Option<&Value>) -> Option<String> {
    match v? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.as_f64().map(plain_number).unwrap_or_else(|| n.to_string())),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

pub fn indicator_panel(r: &IndicatorsResult) -> IndicatorPanel {
    let pct = r.increased_demand_pct.unwrap_or(0.0);
    let demand_trend = if pct > 0.0 {
        DemandTrend::Up
    } else if pct < 0.0 {
        DemandTrend::Down
    } else {
        DemandTrend::Flat
    };

    IndicatorPanel {
        trips: plain_number(r.total_trips.unwrap_or(0.0)),
        anomalies: plain_number(r.total_anomalies.unwrap_or(0.0)),
        hot_location: value_text(r.hot_location.as_ref()).unwrap_or_default(),
        rush_hour: format!(
            "{}:00",
            value_text(r.rush_hour.as_ref()).unwrap_or_else(|| "-".to_string())
        ),
        demand_pct: format!("{}%", fixed2_grouped(pct)),
        demand_trend,
        date_label: r.date.as_deref().and_then(long_date_label),
    }
}

pub fn history_entries(events: &[HistoryEvent]) -> Vec<HistoryEntry> {
    events
        .iter()
        .map(|e| HistoryEntry {
            date: e.date.clone(),
            date_label: e
                .date
                .as_deref()
                .and_then(long_date_label)
                .unwrap_or_else(|| "Desconocida".to_string()),
            total_normal: e.total_normal.unwrap_or(0),
            total_anomalies: e.total_anomalies.unwrap_or(0),
        })
        .collect()
}
