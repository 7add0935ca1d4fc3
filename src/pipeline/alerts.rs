use crate::format::long_datetime_es;
use crate::types::record::{AnomalyRecord, Level};
use crate::types::view::AlertEntry;

/// The `limit` most recent critical/warning records, newest first.
/// Equal timestamps keep their relative input order.
pub fn recent_alerts(records: &[AnomalyRecord], limit: usize) -> Vec<AnomalyRecord> {
    let mut alerts: Vec<AnomalyRecord> = records
        .iter()
        .filter(|r| r.level.is_alert())
        .cloned()
        .collect();
    alerts.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    alerts.truncate(limit);
    alerts
}

pub fn alert_entry(r: &AnomalyRecord) -> AlertEntry {
    let css_class = match r.level {
        Level::Critical => "alert-danger",
        _ => "alert-warning",
    };
    AlertEntry {
        kind: r.kind,
        level: r.level,
        css_class: css_class.to_string(),
        timestamp: r.timestamp,
        when_label: long_datetime_es(r.timestamp),
    }
}
