use chrono::Local;
use tracing::{debug, error, info};

use crate::api::ApiClient;
use crate::error::Result;
use crate::panels::{history_entries, indicator_panel};
use crate::pipeline::records::build_dataset;
use crate::state::{DashboardState, LoadTicket, ViewSettings};
use crate::types::api::DateCode;
use crate::types::layer::LayerUpdate;
use crate::types::view::{DashboardView, DateRefresh, HistoryEntry, IndicatorPanel};

/// Fetches and installs one day of results. `Ok(None)` when a newer load
/// started while this one was in flight.
pub async fn load_values(
    client: &ApiClient,
    state: &DashboardState,
    ticket: &LoadTicket,
    settings: ViewSettings,
) -> Result<Option<DashboardView>> {
    let values = client.values(ticket.date).await?;
    let dataset = build_dataset(&values, Local::now().naive_local());
    let records = dataset.records.len();

    let view = state.commit_dataset(ticket, dataset, settings, &mut rand::thread_rng());
    if view.is_some() {
        info!(date = %ticket.date, seq = ticket.seq, records, "Loaded anomaly results");
    }
    Ok(view)
}

pub async fn load_indicators(
    client: &ApiClient,
    state: &DashboardState,
    ticket: &LoadTicket,
) -> Result<Option<IndicatorPanel>> {
    let result = client.indicators(ticket.date).await?;
    if !state.is_current(ticket) {
        debug!(seq = ticket.seq, "Discarding superseded indicators");
        return Ok(None);
    }
    Ok(Some(indicator_panel(&result)))
}

pub async fn load_history(
    client: &ApiClient,
    state: &DashboardState,
    ticket: &LoadTicket,
) -> Result<Option<Vec<HistoryEntry>>> {
    let events = client.history_events(ticket.date).await?;
    if !state.is_current(ticket) {
        debug!(seq = ticket.seq, "Discarding superseded history events");
        return Ok(None);
    }
    Ok(Some(history_entries(&events)))
}

/// Date-change handler: values, indicators, then history, one after another.
/// A failing request is logged and leaves its panel unchanged; the others
/// still run.
pub async fn refresh_date(
    client: &ApiClient,
    state: &DashboardState,
    date: DateCode,
    settings: ViewSettings,
) -> DateRefresh {
    let ticket = state.begin_load(date);

    let view = load_values(client, state, &ticket, settings)
        .await
        .unwrap_or_else(|e| {
            error!(error = %e, %date, "Failed to load anomaly results");
            None
        });
    let indicators = load_indicators(client, state, &ticket)
        .await
        .unwrap_or_else(|e| {
            error!(error = %e, %date, "Failed to load indicators");
            None
        });
    let history = load_history(client, state, &ticket)
        .await
        .unwrap_or_else(|e| {
            error!(error = %e, %date, "Failed to load history events");
            None
        });

    // A newer load owns the screen now; nothing from this one is returned.
    if !state.is_current(&ticket) {
        debug!(seq = ticket.seq, %date, "Date refresh superseded");
        return DateRefresh {
            date,
            superseded: true,
            view: None,
            indicators: None,
            history: None,
        };
    }

    DateRefresh {
        date,
        superseded: false,
        view,
        indicators,
        history,
    }
}

/// Hour-slider handler. Synchronous; no request is made.
pub fn change_hour(state: &DashboardState, hour: u32, settings: ViewSettings) -> Result<LayerUpdate> {
    state.select_hour(hour, settings, &mut rand::thread_rng())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;
    use tokio::sync::oneshot;

    /// Holds the response for `path` until `release` fires, after signalling
    /// `reached`.
    struct Gate {
        path: &'static str,
        reached: oneshot::Sender<()>,
        release: mpsc::Receiver<()>,
    }

    /// Answers each request by path; one connection per request.
    fn serve(routes: Vec<(&'static str, &'static str, &'static str)>) -> String {
        serve_gated(routes, None)
    }

    fn serve_gated(
        routes: Vec<(&'static str, &'static str, &'static str)>,
        mut gate: Option<Gate>,
    ) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            for stream in listener.incoming().take(routes.len()) {
                let stream = stream.unwrap();
                let mut reader = BufReader::new(stream);
                let mut request_line = String::new();
                reader.read_line(&mut request_line).unwrap();
                let mut content_length = 0usize;
                loop {
                    let mut line = String::new();
                    reader.read_line(&mut line).unwrap();
                    if let Some(v) = line.to_ascii_lowercase().strip_prefix("content-length:") {
                        content_length = v.trim().parse().unwrap();
                    }
                    if line == "\r\n" || line.is_empty() {
                        break;
                    }
                }
                let mut body = vec![0u8; content_length];
                reader.read_exact(&mut body).unwrap();

                let path = request_line.split_whitespace().nth(1).unwrap_or("").to_string();
                if gate.as_ref().is_some_and(|g| g.path == path) {
                    if let Some(g) = gate.take() {
                        let _ = g.reached.send(());
                        let _ = g.release.recv();
                    }
                }
                let (status, payload) = routes
                    .iter()
                    .find(|(p, _, _)| *p == path)
                    .map(|(_, s, b)| (*s, *b))
                    .unwrap_or(("404 Not Found", "{}"));
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    payload.len(),
                    payload
                );
                let mut stream = reader.into_inner();
                stream.write_all(response.as_bytes()).unwrap();
                stream.flush().unwrap();
            }
        });
        format!("http://{}", addr)
    }

    const VALUES: &str = r#"{"result":{"anomalous":{"data":[[40.71,-74.0]],"time_index":["2014-04-15T08:00:00"]},"non_anomalous":{"data":[[40.72,-74.01]],"time_index":["2014-04-15T08:00:00"]}}}"#;
    const SINGLE_VALUE: &str = r#"{"result":{"anomalous":{"data":[[40.75,-73.98]],"time_index":["2014-04-16T08:00:00"]}}}"#;
    const INDICATORS: &str = r#"{"result":{"total_trips":500,"total_anomalies":2,"hot_location":"JFK","rush_hour":8,"increased_demand_pct":-3.2,"date":"2014-04-15"}}"#;
    const HISTORY: &str = r#"{"result":[{"date":"2014-04-14","total_normal":40,"total_anomalies":5}]}"#;

    const SETTINGS: ViewSettings = ViewSettings {
        alert_limit: 10,
        jitter_degrees: 0.00015,
    };

    fn client(base: &str) -> ApiClient {
        ApiClient::new(base, Duration::from_secs(5), None).unwrap()
    }

    #[tokio::test]
    async fn refresh_date_fills_every_panel() {
        let base = serve(vec![
            ("/api/uber-trips/values", "200 OK", VALUES),
            ("/api/uber-trips/indicators", "200 OK", INDICATORS),
            ("/api/uber-trips/history_events", "200 OK", HISTORY),
        ]);
        let state = DashboardState::new(8).unwrap();
        let date = DateCode::parse("2014-04-15").unwrap();
        let refresh = refresh_date(&client(&base), &state, date, SETTINGS).await;

        assert!(!refresh.superseded);
        let view = refresh.view.unwrap();
        assert_eq!(view.total_records, 2);
        assert_eq!(view.filtered_records, 2);
        assert_eq!(view.alerts.len(), 1);
        let layers = view.layers.unwrap().layers;
        assert_eq!(layers.anomalous.len(), 1);
        assert_eq!(layers.normal.len(), 1);

        let indicators = refresh.indicators.unwrap();
        assert_eq!(indicators.hot_location, "JFK");
        assert_eq!(indicators.rush_hour, "8:00");

        let history = refresh.history.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].date_label, "Lunes, 14 de abril del 2014");
    }

    #[tokio::test]
    async fn failed_values_keep_previous_day() {
        let state = DashboardState::new(8).unwrap();

        let base = serve(vec![
            ("/api/uber-trips/values", "200 OK", VALUES),
            ("/api/uber-trips/indicators", "200 OK", INDICATORS),
            ("/api/uber-trips/history_events", "200 OK", HISTORY),
        ]);
        let first = DateCode::parse("2014-04-15").unwrap();
        refresh_date(&client(&base), &state, first, SETTINGS).await;

        let base = serve(vec![
            ("/api/uber-trips/values", "500 Internal Server Error", "{}"),
            ("/api/uber-trips/indicators", "200 OK", INDICATORS),
            ("/api/uber-trips/history_events", "200 OK", r#"{"result":[]}"#),
        ]);
        let second = DateCode::parse("2014-04-16").unwrap();
        let refresh = refresh_date(&client(&base), &state, second, SETTINGS).await;

        assert!(refresh.view.is_none());
        assert!(refresh.indicators.is_some());
        assert_eq!(refresh.history, Some(Vec::new()));
        let view = state.view();
        assert_eq!(view.date, Some(first));
        assert_eq!(view.total_records, 2);
    }

    #[tokio::test]
    async fn superseded_refresh_returns_nothing() {
        let state = DashboardState::new(8).unwrap();
        let (reached_tx, reached_rx) = oneshot::channel();
        let (release_tx, release_rx) = mpsc::channel();

        // Day A stalls on indicators, after its values are committed.
        let base_a = serve_gated(
            vec![
                ("/api/uber-trips/values", "200 OK", VALUES),
                ("/api/uber-trips/indicators", "200 OK", INDICATORS),
                ("/api/uber-trips/history_events", "200 OK", HISTORY),
            ],
            Some(Gate {
                path: "/api/uber-trips/indicators",
                reached: reached_tx,
                release: release_rx,
            }),
        );
        let base_b = serve(vec![
            ("/api/uber-trips/values", "200 OK", SINGLE_VALUE),
            ("/api/uber-trips/indicators", "200 OK", INDICATORS),
            ("/api/uber-trips/history_events", "200 OK", HISTORY),
        ]);
        let day_a = DateCode::parse("2014-04-15").unwrap();
        let day_b = DateCode::parse("2014-04-16").unwrap();
        let (client_a, client_b) = (client(&base_a), client(&base_b));

        let (a, b) = tokio::join!(
            refresh_date(&client_a, &state, day_a, SETTINGS),
            async {
                reached_rx.await.unwrap();
                let b = refresh_date(&client_b, &state, day_b, SETTINGS).await;
                release_tx.send(()).unwrap();
                b
            }
        );

        assert!(!b.superseded);
        assert_eq!(b.view.as_ref().map(|v| v.total_records), Some(1));
        assert!(a.superseded);
        assert!(a.view.is_none());
        assert!(a.indicators.is_none());
        assert!(a.history.is_none());

        let view = state.view();
        assert_eq!(view.date, Some(day_b));
        assert_eq!(view.total_records, 1);
    }

    #[test]
    fn change_hour_validates() {
        let state = DashboardState::new(0).unwrap();
        assert!(change_hour(&state, 24, SETTINGS).is_err());
        let update = change_hour(&state, 5, SETTINGS).unwrap();
        assert_eq!(update.layers.anomalous.len(), 0);
    }
}
