use chrono::Timelike;

use crate::error::DashboardError;
use crate::types::record::AnomalyRecord;

pub fn validate_hour(hour: u32) -> Result<u32, DashboardError> {
    if hour <= 23 {
        Ok(hour)
    } else {
        Err(DashboardError::InvalidHour(hour))
    }
}

/// Records whose local hour-of-day equals `hour`. The date is not checked:
/// `records` only ever holds the selected day.
pub fn filter_by_hour(records: &[AnomalyRecord], hour: u32) -> Vec<AnomalyRecord> {
    records
        .iter()
        .filter(|r| r.timestamp.hour() == hour)
        .cloned()
        .collect()
}
