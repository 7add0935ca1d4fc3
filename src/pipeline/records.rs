use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;
use tracing::warn;

use crate::pipeline::extract::extract_points;
use crate::types::api::{PointSeries, ValuesResult};
use crate::types::record::{AnomalyRecord, RecordKind};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    /// Sorted ascending by timestamp.
    pub records: Vec<AnomalyRecord>,
    /// Distinct timestamps of `records`, ascending.
    pub time_axis: Vec<NaiveDateTime>,
}

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Reads a `time_index` entry as local wall-clock time.
///
/// Offset-qualified strings and numeric epoch milliseconds are converted to
/// the local zone. A bare date is UTC midnight, as browsers read it.
pub fn parse_timestamp(v: &Value) -> Option<NaiveDateTime> {
    match v {
        Value::String(s) => {
            let s = s.trim();
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.with_timezone(&Local).naive_local());
            }
            if let Some(dt) = NAIVE_FORMATS
                .iter()
                .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
            {
                return Some(dt);
            }
            let day = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?;
            Some(day.and_hms_opt(0, 0, 0)?.and_utc().with_timezone(&Local).naive_local())
        }
        Value::Number(n) => {
            let ms = n.as_i64().or_else(|| n.as_f64().map(|f| f as i64))?;
            Some(DateTime::<Utc>::from_timestamp_millis(ms)?.with_timezone(&Local).naive_local())
        }
        _ => None,
    }
}

fn raw_label(v: Option<&Value>) -> String {
    match v {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => "desconocido".to_string(),
    }
}

fn message(kind: RecordKind, when: &str) -> String {
    match kind {
        RecordKind::Anomaly => format!("Anomalía detectada el {}", when),
        RecordKind::Normal => format!("Dato normal detectado el {}", when),
    }
}

fn build_series(series: &PointSeries, kind: RecordKind, now: NaiveDateTime) -> Vec<AnomalyRecord> {
    let times = &series.time_index;
    extract_points(&series.data)
        .into_iter()
        .enumerate()
        .map(|(i, p)| {
            let raw = (!times.is_empty()).then(|| &times[i % times.len()]);
            let timestamp = match raw {
                Some(v) => parse_timestamp(v).unwrap_or_else(|| {
                    warn!(value = %v, kind = kind.label(), "Unparseable time_index entry, using now");
                    now
                }),
                None => now,
            };
            AnomalyRecord {
                lat: p.lat,
                lng: p.lng,
                value: kind.weight(),
                kind,
                level: kind.level(),
                timestamp,
                message: message(kind, &raw_label(raw)),
            }
        })
        .collect()
}

/// Merges the anomalous and normal series of a `/values` payload into one
/// time-ordered record list. `now` stamps points whose time index is empty.
pub fn build_dataset(values: &ValuesResult, now: NaiveDateTime) -> Dataset {
    let mut records = build_series(&values.anomalous, RecordKind::Anomaly, now);
    records.extend(build_series(&values.non_anomalous, RecordKind::Normal, now));
    // Stable: equal timestamps keep anomalous-before-normal input order.
    records.sort_by_key(|r| r.timestamp);

    let mut time_axis: Vec<NaiveDateTime> = records.iter().map(|r| r.timestamp).collect();
    time_axis.dedup();

    Dataset { records, time_axis }
}
