use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::NaiveDateTime;
use rand::Rng;
use tracing::debug;

use crate::error::Result;
use crate::pipeline::alerts::{alert_entry, recent_alerts};
use crate::pipeline::filter::{filter_by_hour, validate_hour};
use crate::pipeline::layers::project_layers;
use crate::pipeline::Dataset;
use crate::types::api::DateCode;
use crate::types::config::DashboardConfig;
use crate::types::layer::{LayerUpdate, MapLayers};
use crate::types::record::AnomalyRecord;
use crate::types::view::DashboardView;

/// The knobs the projection steps read from configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewSettings {
    pub alert_limit: usize,
    pub jitter_degrees: f64,
}

impl From<&DashboardConfig> for ViewSettings {
    fn from(c: &DashboardConfig) -> Self {
        Self {
            alert_limit: c.alert_limit,
            jitter_degrees: c.jitter_degrees,
        }
    }
}

/// Issued when a date load starts. Only the newest ticket may commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    pub seq: u64,
    pub date: DateCode,
}

#[derive(Debug, Default)]
struct LiveLayers {
    generation: u64,
    layers: MapLayers,
}

#[derive(Debug, Default)]
struct DataState {
    date: Option<DateCode>,
    selected_hour: u32,
    all_data: Vec<AnomalyRecord>,
    time_axis: Vec<NaiveDateTime>,
    filtered: Vec<AnomalyRecord>,
    alerts: Vec<AnomalyRecord>,
    live: Option<LiveLayers>,
    next_generation: u64,
}

impl DataState {
    /// Refilters for the selected hour and swaps in new layers. The previous
    /// set is taken out before the new one is installed.
    fn refresh_layers<R: Rng>(&mut self, jitter: f64, rng: &mut R) -> LayerUpdate {
        self.filtered = filter_by_hour(&self.all_data, self.selected_hour);
        let layers = project_layers(&self.filtered, jitter, rng);

        let detached = self.live.take().map(|l| l.generation);
        self.next_generation += 1;
        self.live = Some(LiveLayers {
            generation: self.next_generation,
            layers: layers.clone(),
        });

        LayerUpdate {
            generation: self.next_generation,
            detached,
            layers,
        }
    }

    fn view(&self) -> DashboardView {
        DashboardView {
            date: self.date,
            selected_hour: self.selected_hour,
            total_records: self.all_data.len(),
            filtered_records: self.filtered.len(),
            time_axis: self.time_axis.clone(),
            layers: self.live.as_ref().map(|l| LayerUpdate {
                generation: l.generation,
                detached: None,
                layers: l.layers.clone(),
            }),
            alerts: self.alerts.iter().map(alert_entry).collect(),
        }
    }
}

/// Application state shared by the date and hour handlers.
#[derive(Debug)]
pub struct DashboardState {
    seq: AtomicU64,
    data: Mutex<DataState>,
}

impl DashboardState {
    pub fn new(initial_hour: u32) -> Result<Self> {
        let selected_hour = validate_hour(initial_hour)?;
        Ok(Self {
            seq: AtomicU64::new(0),
            data: Mutex::new(DataState {
                selected_hour,
                ..DataState::default()
            }),
        })
    }

    fn lock(&self) -> MutexGuard<'_, DataState> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn begin_load(&self, date: DateCode) -> LoadTicket {
        let seq = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(seq, %date, "Load started");
        LoadTicket { seq, date }
    }

    pub fn is_current(&self, ticket: &LoadTicket) -> bool {
        self.seq.load(Ordering::SeqCst) == ticket.seq
    }

    /// Replaces the loaded day with `dataset`, unless a newer load has begun
    /// since `ticket` was issued, in which case nothing changes.
    pub fn commit_dataset<R: Rng>(
        &self,
        ticket: &LoadTicket,
        dataset: Dataset,
        settings: ViewSettings,
        rng: &mut R,
    ) -> Option<DashboardView> {
        let mut data = self.lock();
        // Checked under the lock so two completions cannot interleave.
        if !self.is_current(ticket) {
            debug!(seq = ticket.seq, date = %ticket.date, "Discarding superseded load");
            return None;
        }

        data.date = Some(ticket.date);
        data.all_data = dataset.records;
        data.time_axis = dataset.time_axis;
        data.alerts = recent_alerts(&data.all_data, settings.alert_limit);
        let update = data.refresh_layers(settings.jitter_degrees, rng);

        let mut view = data.view();
        view.layers = Some(update);
        Some(view)
    }

    pub fn select_hour<R: Rng>(&self, hour: u32, settings: ViewSettings, rng: &mut R) -> Result<LayerUpdate> {
        let hour = validate_hour(hour)?;
        let mut data = self.lock();
        data.selected_hour = hour;
        Ok(data.refresh_layers(settings.jitter_degrees, rng))
    }

    pub fn view(&self) -> DashboardView {
        self.lock().view()
    }

    pub fn all_data(&self) -> Vec<AnomalyRecord> {
        self.lock().all_data.clone()
    }

    pub fn filtered_data(&self) -> Vec<AnomalyRecord> {
        self.lock().filtered.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::records::build_dataset;
    use crate::types::api::ValuesResult;
    use chrono::{NaiveDate, Timelike};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;

    const SETTINGS: ViewSettings = ViewSettings {
        alert_limit: 10,
        jitter_degrees: 0.00015,
    };

    fn dataset() -> Dataset {
        let body = json!({
            "result": {
                "anomalous": {
                    "data": [[40.71, -74.00], [40.75, -73.98]],
                    "time_index": ["2014-04-15T08:00:00", "2014-04-15T09:30:00"]
                },
                "non_anomalous": {
                    "data": [[40.72, -74.01]],
                    "time_index": ["2014-04-15T08:00:00"]
                }
            }
        });
        let now = NaiveDate::from_ymd_opt(2014, 4, 15).unwrap().and_hms_opt(0, 0, 0).unwrap();
        build_dataset(&ValuesResult::from_body(&body), now)
    }

    fn day(s: &str) -> DateCode {
        DateCode::parse(s).unwrap()
    }

    #[test]
    fn rejects_out_of_range_initial_hour() {
        assert!(DashboardState::new(24).is_err());
    }

    #[test]
    fn commit_filters_by_current_hour() {
        let state = DashboardState::new(8).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let ticket = state.begin_load(day("2014-04-15"));
        let view = state.commit_dataset(&ticket, dataset(), SETTINGS, &mut rng).unwrap();

        assert_eq!(view.date, Some(day("2014-04-15")));
        assert_eq!(view.total_records, 3);
        assert_eq!(view.filtered_records, 2);
        let layers = view.layers.unwrap();
        assert_eq!(layers.generation, 1);
        assert_eq!(layers.detached, None);
        assert_eq!(layers.layers.anomalous.len(), 1);
        assert_eq!(layers.layers.normal.len(), 1);
        // Alerts cover the whole day, not just the selected hour.
        assert_eq!(view.alerts.len(), 2);
        assert!(view.alerts[0].timestamp > view.alerts[1].timestamp);
        assert_eq!(view.time_axis.len(), 2);
    }

    #[test]
    fn stale_load_is_discarded() {
        let state = DashboardState::new(8).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let first = state.begin_load(day("2014-04-14"));
        let second = state.begin_load(day("2014-04-15"));
        assert!(!state.is_current(&first));

        let v2 = state.commit_dataset(&second, dataset(), SETTINGS, &mut rng);
        assert!(v2.is_some());
        // The older request finishes last and must not overwrite.
        let v1 = state.commit_dataset(&first, Dataset::default(), SETTINGS, &mut rng);
        assert!(v1.is_none());
        assert_eq!(state.view().date, Some(day("2014-04-15")));
        assert_eq!(state.all_data().len(), 3);
    }

    #[test]
    fn hour_change_replaces_layers_and_keeps_all_data() {
        let state = DashboardState::new(8).unwrap();
        let mut rng = StdRng::seed_from_u64(9);
        let ticket = state.begin_load(day("2014-04-15"));
        state.commit_dataset(&ticket, dataset(), SETTINGS, &mut rng).unwrap();
        let before = state.all_data();

        let update = state.select_hour(9, SETTINGS, &mut rng).unwrap();
        assert_eq!(update.generation, 2);
        assert_eq!(update.detached, Some(1));
        assert_eq!(update.layers.anomalous.len(), 1);
        assert!(update.layers.normal.is_empty());
        assert!(state.filtered_data().iter().all(|r| r.timestamp.hour() == 9));
        assert_eq!(state.all_data(), before);

        let update = state.select_hour(3, SETTINGS, &mut rng).unwrap();
        assert_eq!(update.detached, Some(2));
        assert_eq!(update.layers, MapLayers::default());
        assert_eq!(state.view().selected_hour, 3);
    }

    #[test]
    fn invalid_hour_leaves_state_untouched() {
        let state = DashboardState::new(8).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        assert!(state.select_hour(30, SETTINGS, &mut rng).is_err());
        assert_eq!(state.view().selected_hour, 8);
        assert!(state.view().layers.is_none());
    }

    #[test]
    fn view_before_any_load_is_empty() {
        let view = DashboardState::new(0).unwrap().view();
        assert!(view.date.is_none());
        assert_eq!(view.total_records, 0);
        assert!(view.alerts.is_empty());
        assert!(view.layers.is_none());
    }
}
