use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use crate::error::{DashboardError, Result};
use crate::types::api::{DateCode, DateRequest, HistoryEvent, IndicatorsResult, ValuesResult};

pub const VALUES_PATH: &str = "/api/uber-trips/values";
pub const INDICATORS_PATH: &str = "/api/uber-trips/indicators";
pub const HISTORY_PATH: &str = "/api/uber-trips/history_events";

/// Client for the anomaly-results backend. Every endpoint is a `POST` of
/// `{"date_code": "YYYY-MM-DD"}`.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration, token: Option<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DashboardError::Http {
                endpoint: "client",
                source: e,
            })?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.is_empty()),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post(&self, endpoint: &'static str, path: &str, date: DateCode) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        debug!(endpoint, %date, %url, "POST");

        let mut req = self.http.post(&url).json(&DateRequest { date_code: date });
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }

        let response = req
            .send()
            .await
            .map_err(|e| DashboardError::Http { endpoint, source: e })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DashboardError::Status {
                endpoint,
                status: status.as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| DashboardError::Http { endpoint, source: e })?;
        serde_json::from_slice(&bytes).map_err(|e| DashboardError::Decode {
            what: endpoint,
            source: e,
        })
    }

    pub async fn values(&self, date: DateCode) -> Result<ValuesResult> {
        let body = self.post("values", VALUES_PATH, date).await?;
        Ok(ValuesResult::from_body(&body))
    }

    pub async fn indicators(&self, date: DateCode) -> Result<IndicatorsResult> {
        let body = self.post("indicators", INDICATORS_PATH, date).await?;
        parse_indicators(body)
    }

    pub async fn history_events(&self, date: DateCode) -> Result<Vec<HistoryEvent>> {
        let body = self.post("history_events", HISTORY_PATH, date).await?;
        parse_history(body)
    }
}

pub fn parse_indicators(mut body: Value) -> Result<IndicatorsResult> {
    match body.get_mut("result").map(Value::take) {
        None | Some(Value::Null) => Err(DashboardError::MissingResult {
            endpoint: "indicators",
        }),
        Some(result) => serde_json::from_value(result).map_err(|e| DashboardError::Decode {
            what: "indicators",
            source: e,
        }),
    }
}

/// A missing or non-array `result` is an empty history.
pub fn parse_history(mut body: Value) -> Result<Vec<HistoryEvent>> {
    match body.get_mut("result").map(Value::take) {
        Some(result @ Value::Array(_)) => {
            serde_json::from_value(result).map_err(|e| DashboardError::Decode {
                what: "history_events",
                source: e,
            })
        }
        _ => Ok(Vec::new()),
    }
}
