use serde::{Deserialize, Serialize};

use crate::error::DashboardError;
use crate::types::api::DateCode;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    pub ratio: f64,
    pub color: String,
}

impl GradientStop {
    fn new(ratio: f64, color: &str) -> Self {
        Self {
            ratio,
            color: color.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapOptions {
    pub radius: u32,
    pub blur: u32,
    pub max_zoom: u32,
    pub max_intensity: f64,
    pub gradient_stops: Vec<GradientStop>,
    pub opacity: f64,
}

impl HeatmapOptions {
    pub fn normal() -> Self {
        Self {
            gradient_stops: vec![
                GradientStop::new(0.2, "blue"),
                GradientStop::new(0.8, "lime"),
                GradientStop::new(1.0, "yellow"),
            ],
            ..Self::base()
        }
    }

    pub fn anomalous() -> Self {
        Self {
            gradient_stops: vec![
                GradientStop::new(0.1, "red"),
                GradientStop::new(0.4, "red"),
                GradientStop::new(0.6, "red"),
            ],
            ..Self::base()
        }
    }

    fn base() -> Self {
        Self {
            radius: 25,
            blur: 8,
            max_zoom: 10,
            max_intensity: 8.0,
            gradient_stops: Vec::new(),
            opacity: 0.6,
        }
    }

    fn validate(&self, name: &str) -> Result<(), DashboardError> {
        check_unit(&format!("{}.opacity", name), self.opacity)?;
        for stop in &self.gradient_stops {
            check_unit(&format!("{}.gradientStops ratio", name), stop.ratio)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MapView {
    pub center: [f64; 2],
    pub zoom: u32,
    pub tile_url: String,
    pub attribution: String,
}

impl Default for MapView {
    fn default() -> Self {
        Self {
            center: [40.7128, -74.0060],
            zoom: 11,
            tile_url: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
            attribution: "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a>"
                .to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MarkerStyle {
    pub radius: u32,
    pub color: String,
    pub fill_color: String,
    pub fill_opacity: f64,
    pub weight: u32,
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self {
            radius: 4,
            color: "blue".to_string(),
            fill_color: "blue".to_string(),
            fill_opacity: 0.5,
            weight: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TooltipStyle {
    pub permanent: bool,
    pub direction: String,
    pub offset: [i32; 2],
    pub opacity: f64,
}

impl Default for TooltipStyle {
    fn default() -> Self {
        Self {
            permanent: false,
            direction: "top".to_string(),
            offset: [0, -5],
            opacity: 0.9,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardConfig {
    pub api_url: String,
    pub request_timeout_secs: u64,
    pub default_date: String,
    pub default_hour: u32,
    pub alert_limit: usize,
    pub jitter_degrees: f64,
    pub map: MapView,
    pub normal_heatmap: HeatmapOptions,
    pub anomalous_heatmap: HeatmapOptions,
    pub marker: MarkerStyle,
    pub tooltip: TooltipStyle,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8000".to_string(),
            request_timeout_secs: 30,
            default_date: "2014-04-15".to_string(),
            default_hour: 0,
            alert_limit: 10,
            jitter_degrees: 0.00015,
            map: MapView::default(),
            normal_heatmap: HeatmapOptions::normal(),
            anomalous_heatmap: HeatmapOptions::anomalous(),
            marker: MarkerStyle::default(),
            tooltip: TooltipStyle::default(),
        }
    }
}

impl DashboardConfig {
    pub fn validate(&self) -> Result<(), DashboardError> {
        if self.api_url.trim().is_empty() {
            return Err(DashboardError::Config("apiUrl must not be empty".to_string()));
        }
        reqwest::Url::parse(&self.api_url)
            .map_err(|e| DashboardError::Config(format!("apiUrl '{}': {}", self.api_url, e)))?;
        DateCode::parse(&self.default_date)
            .map_err(|e| DashboardError::Config(format!("defaultDate: {}", e)))?;
        if self.default_hour > 23 {
            return Err(DashboardError::Config(format!(
                "defaultHour {} out of range 0-23",
                self.default_hour
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(DashboardError::Config(
                "requestTimeoutSecs must be at least 1".to_string(),
            ));
        }
        if self.alert_limit == 0 {
            return Err(DashboardError::Config("alertLimit must be at least 1".to_string()));
        }
        if !(self.jitter_degrees.is_finite() && self.jitter_degrees >= 0.0) {
            return Err(DashboardError::Config(format!(
                "jitterDegrees {} must be a non-negative number",
                self.jitter_degrees
            )));
        }
        check_unit("marker.fillOpacity", self.marker.fill_opacity)?;
        check_unit("tooltip.opacity", self.tooltip.opacity)?;
        self.normal_heatmap.validate("normalHeatmap")?;
        self.anomalous_heatmap.validate("anomalousHeatmap")?;
        Ok(())
    }
}

fn check_unit(name: &str, v: f64) -> Result<(), DashboardError> {
    if (0.0..=1.0).contains(&v) {
        Ok(())
    } else {
        Err(DashboardError::Config(format!("{} {} must be within 0..1", name, v)))
    }
}
