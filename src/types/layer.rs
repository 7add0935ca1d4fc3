use serde::{Deserialize, Serialize};

/// `[lat, lng, weight]`, the triple the heatmap plugin consumes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightedPoint(pub f64, pub f64, pub f64);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TooltipPoint {
    pub lat: f64,
    pub lng: f64,
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapLayers {
    pub anomalous: Vec<WeightedPoint>,
    pub normal: Vec<WeightedPoint>,
    pub tooltips: Vec<TooltipPoint>,
}

/// A freshly installed layer set. The frontend removes the layers tagged
/// `detached` before attaching these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerUpdate {
    pub generation: u64,
    pub detached: Option<u64>,
    pub layers: MapLayers,
}
