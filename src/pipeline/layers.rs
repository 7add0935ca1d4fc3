use rand::Rng;

use crate::types::layer::{MapLayers, TooltipPoint, WeightedPoint};
use crate::types::record::{AnomalyRecord, Level};

fn jitter<R: Rng>(value: f64, spread: f64, rng: &mut R) -> f64 {
    if spread > 0.0 {
        value + rng.gen_range(-spread..=spread)
    } else {
        value
    }
}

pub fn tooltip_label(r: &AnomalyRecord) -> String {
    format!(
        "<strong>{}</strong><br><strong>Lat:</strong> {}<br><strong>Lng:</strong> {}<br><strong>Nivel:</strong> {}",
        r.message,
        r.lat,
        r.lng,
        r.level.as_str()
    )
}

/// Splits the hour's records into the two heatmap layers and the tooltip
/// markers. Markers are offset by up to `spread` degrees on each axis;
/// labels keep the true coordinates.
pub fn project_layers<R: Rng>(filtered: &[AnomalyRecord], spread: f64, rng: &mut R) -> MapLayers {
    let mut layers = MapLayers::default();
    for r in filtered {
        let point = WeightedPoint(r.lat, r.lng, r.value);
        match r.level {
            Level::Critical | Level::Warning => {
                layers.anomalous.push(point);
                layers.tooltips.push(TooltipPoint {
                    lat: jitter(r.lat, spread, rng),
                    lng: jitter(r.lng, spread, rng),
                    label: tooltip_label(r),
                });
            }
            Level::Info => layers.normal.push(point),
        }
    }
    layers
}
