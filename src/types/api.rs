use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DashboardError;

/// A calendar day in `YYYY-MM-DD` form, as the backend expects in `date_code`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateCode(NaiveDate);

impl DateCode {
    pub fn parse(s: &str) -> Result<Self, DashboardError> {
        NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(DateCode)
            .map_err(|_| DashboardError::InvalidDate(s.to_string()))
    }
}

impl fmt::Display for DateCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl Serialize for DateCode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DateCode {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        DateCode::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DateRequest {
    pub date_code: DateCode,
}

/// One class of points from `/values`: raw point data with its parallel time index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointSeries {
    pub data: Value,
    pub time_index: Vec<Value>,
}

impl PointSeries {
    fn from_value(v: Option<&Value>) -> Self {
        let data = v
            .and_then(|s| s.get("data"))
            .cloned()
            .unwrap_or_else(|| Value::Array(Vec::new()));
        let time_index = v
            .and_then(|s| s.get("time_index"))
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        PointSeries { data, time_index }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValuesResult {
    pub anomalous: PointSeries,
    pub non_anomalous: PointSeries,
}

impl ValuesResult {
    /// Reads a `/values` response body. Every level of the envelope is optional
    /// and missing parts read as empty.
    pub fn from_body(body: &Value) -> Self {
        let result = body.get("result");
        ValuesResult {
            anomalous: PointSeries::from_value(result.and_then(|r| r.get("anomalous"))),
            non_anomalous: PointSeries::from_value(result.and_then(|r| r.get("non_anomalous"))),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorsResult {
    #[serde(default)]
    pub total_trips: Option<f64>,
    #[serde(default)]
    pub total_anomalies: Option<f64>,
    #[serde(default)]
    pub hot_location: Option<Value>,
    #[serde(default)]
    pub rush_hour: Option<Value>,
    #[serde(default)]
    pub increased_demand_pct: Option<f64>,
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEvent {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub total_normal: Option<u64>,
    #[serde(default)]
    pub total_anomalies: Option<u64>,
}
