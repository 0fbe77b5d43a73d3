// ─────────────────────────────────────────────────────────────────────
// Plumbline: Verification Policy Configuration
// ─────────────────────────────────────────────────────────────────────

use serde::{Deserialize, Serialize};

use crate::error::{PlumblineError, PlumblineResult};

/// Policy constants for the geometric layout validator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Minimum width/depth for rooms with program `wc` (m).
    /// Default: 0.9.
    pub min_wc_dimension: f64,

    /// Minimum width/depth for every other room (m).
    /// Default: 1.5.
    pub min_room_dimension: f64,

    /// Envelope overflow that is auto-clipped instead of rejected (m).
    /// Default: 0.2.
    pub clip_tolerance: f64,

    /// Negative coordinates above `-negative_tolerance` are float noise (m).
    /// Default: 0.05.
    pub negative_tolerance: f64,

    /// Each room interval is shrunk by this much per side before the
    /// pairwise overlap test, so rooms may share walls (m).
    /// Default: 0.05.
    pub overlap_margin: f64,

    /// Relative area deviation above which a program space warns.
    /// Default: 0.3.
    pub area_deviation_ratio: f64,

    /// Per room-type minimum area and width, checked as warnings.
    /// The first entry whose keywords match a room's program or name
    /// applies. Default: [`RoomMinimum::uk_residential`].
    pub room_minimums: Vec<RoomMinimum>,
}

/// Minimum size for one class of room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomMinimum {
    pub room_type: String,
    /// Substrings matched case-insensitively against program and name.
    pub keywords: Vec<String>,
    #[serde(default)]
    pub min_area_m2: Option<f64>,
    /// Minimum of width and depth (m).
    #[serde(default)]
    pub min_width: Option<f64>,
}

impl RoomMinimum {
    pub fn new(room_type: &str, keywords: &[&str], min_area_m2: Option<f64>, min_width: Option<f64>) -> Self {
        Self {
            room_type: room_type.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            min_area_m2,
            min_width,
        }
    }

    /// UK residential space standards.
    pub fn uk_residential() -> Vec<RoomMinimum> {
        vec![
            RoomMinimum::new("wc", &["wc", "toilet", "cloakroom"], Some(1.5), None),
            RoomMinimum::new("bathroom", &["bathroom", "ensuite", "en-suite", "shower"], Some(2.5), Some(1.7)),
            RoomMinimum::new("double bedroom", &["master", "double"], Some(11.0), Some(2.1)),
            RoomMinimum::new("bedroom", &["bedroom", "bed"], Some(6.5), Some(2.1)),
            RoomMinimum::new("living room", &["living", "lounge", "sitting"], Some(13.0), Some(2.4)),
            RoomMinimum::new("kitchen", &["kitchen"], Some(5.5), None),
            RoomMinimum::new("corridor", &["corridor", "hall", "landing"], None, Some(0.9)),
        ]
    }

    pub fn matches(&self, program: &str, name: &str) -> bool {
        let program = program.to_lowercase();
        let name = name.to_lowercase();
        self.keywords
            .iter()
            .map(|k| k.to_lowercase())
            .any(|k| program.contains(&k) || name.contains(&k))
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            min_wc_dimension: 0.9,
            min_room_dimension: 1.5,
            clip_tolerance: 0.2,
            negative_tolerance: 0.05,
            overlap_margin: 0.05,
            area_deviation_ratio: 0.3,
            room_minimums: RoomMinimum::uk_residential(),
        }
    }
}

/// Relative weight of each design-DNA category in the aggregate score.
///
/// Equal weights reproduce a plain arithmetic mean.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryWeights {
    pub dimensions: f64,
    pub materials: f64,
    pub windows: f64,
    pub roof: f64,
    pub floor_count: f64,
    pub doors: f64,
}

impl Default for CategoryWeights {
    fn default() -> Self {
        Self {
            dimensions: 1.0,
            materials: 1.0,
            windows: 1.0,
            roof: 1.0,
            floor_count: 1.0,
            doors: 1.0,
        }
    }
}

impl CategoryWeights {
    pub fn as_array(&self) -> [f64; 6] {
        [
            self.dimensions,
            self.materials,
            self.windows,
            self.roof,
            self.floor_count,
            self.doors,
        ]
    }
}

/// Policy constants for the design-DNA consistency validator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsistencyConfig {
    /// Length/width/height/floor-height tolerance (m). Default: 0.1.
    pub dimension_tolerance: f64,

    /// Roof pitch tolerance (degrees). Default: 1.0.
    pub pitch_tolerance_deg: f64,

    /// Door width tolerance (m). Default: 0.1.
    pub door_width_tolerance: f64,

    /// Score deducted per window error. Default: 0.2.
    pub window_error_penalty: f64,

    /// Minimum aggregate score accepted in non-strict mode. Default: 0.95.
    pub min_consistency_score: f64,

    pub category_weights: CategoryWeights,
}

impl Default for ConsistencyConfig {
    fn default() -> Self {
        Self {
            dimension_tolerance: 0.1,
            pitch_tolerance_deg: 1.0,
            door_width_tolerance: 0.1,
            window_error_penalty: 0.2,
            min_consistency_score: 0.95,
            category_weights: CategoryWeights::default(),
        }
    }
}

/// Policy constants for the visual consistency validator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualConfig {
    /// Edge-mask IoU required to pass. Default: 0.75.
    pub min_edge_iou: f64,

    /// Palette similarity required to pass. Default: 0.85.
    pub min_palette_match: f64,

    /// Optional tolerant-F1 edge alignment threshold. Default: None (report only).
    pub min_edge_f1: Option<f64>,

    /// Check window counts on elevation views. Default: true.
    pub require_window_match: bool,

    /// Sobel gradient magnitude above which a pixel is an edge. Default: 50.
    pub edge_threshold: f64,

    /// Pixel stride for palette sampling. Default: 10.
    pub palette_sample_stride: usize,

    /// RGB distance at which palette similarity reaches zero. Default: 50.
    pub palette_distance_scale: f64,

    /// Lit edge pixels per detected window. Resolution dependent and only
    /// approximate. Default: 100.
    pub pixels_per_window: f64,

    /// Allowed difference between expected and detected windows. Default: 1.
    pub window_count_tolerance: u32,

    /// Dilation radius used for tolerant edge precision/recall (px). Default: 3.
    pub edge_tolerance_px: u32,

    /// Edge IoU substituted when edge analysis fails. Default: 0.5.
    pub neutral_edge_iou: f64,

    /// Palette similarity substituted when palette analysis fails. Default: 0.8.
    pub neutral_palette_match: f64,
}

impl Default for VisualConfig {
    fn default() -> Self {
        Self {
            min_edge_iou: 0.75,
            min_palette_match: 0.85,
            min_edge_f1: None,
            require_window_match: true,
            edge_threshold: 50.0,
            palette_sample_stride: 10,
            palette_distance_scale: 50.0,
            pixels_per_window: 100.0,
            window_count_tolerance: 1,
            edge_tolerance_px: 3,
            neutral_edge_iou: 0.5,
            neutral_palette_match: 0.8,
        }
    }
}

/// Per-call overrides of the visual pass thresholds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThresholdOverrides {
    #[serde(rename = "minEdgeIoU", default, skip_serializing_if = "Option::is_none")]
    pub min_edge_iou: Option<f64>,
    #[serde(rename = "minPaletteMatch", default, skip_serializing_if = "Option::is_none")]
    pub min_palette_match: Option<f64>,
    #[serde(rename = "requireWindowMatch", default, skip_serializing_if = "Option::is_none")]
    pub require_window_match: Option<bool>,
    #[serde(rename = "minEdgeF1", default, skip_serializing_if = "Option::is_none")]
    pub min_edge_f1: Option<f64>,
}

impl ThresholdOverrides {
    /// Overlay these overrides on a base configuration.
    pub fn resolve(&self, base: &VisualConfig) -> VisualConfig {
        let mut resolved = base.clone();
        if let Some(v) = self.min_edge_iou {
            resolved.min_edge_iou = v;
        }
        if let Some(v) = self.min_palette_match {
            resolved.min_palette_match = v;
        }
        if let Some(v) = self.require_window_match {
            resolved.require_window_match = v;
        }
        if self.min_edge_f1.is_some() {
            resolved.min_edge_f1 = self.min_edge_f1;
        }
        resolved
    }
}

/// Runtime configuration for all three validators.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlumblineConfig {
    pub layout: LayoutConfig,
    pub consistency: ConsistencyConfig,
    pub visual: VisualConfig,
}

fn unit_interval(name: &str, value: f64) -> PlumblineResult<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(PlumblineError::Config(format!(
            "{name} must be in [0, 1], got {value}"
        )));
    }
    Ok(())
}

fn non_negative(name: &str, value: f64) -> PlumblineResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(PlumblineError::Config(format!(
            "{name} must be finite and >= 0, got {value}"
        )));
    }
    Ok(())
}

impl LayoutConfig {
    pub fn validate(&self) -> PlumblineResult<()> {
        non_negative("layout.min_wc_dimension", self.min_wc_dimension)?;
        non_negative("layout.min_room_dimension", self.min_room_dimension)?;
        non_negative("layout.clip_tolerance", self.clip_tolerance)?;
        non_negative("layout.negative_tolerance", self.negative_tolerance)?;
        non_negative("layout.overlap_margin", self.overlap_margin)?;
        non_negative("layout.area_deviation_ratio", self.area_deviation_ratio)?;
        for minimum in &self.room_minimums {
            if minimum.keywords.is_empty() {
                return Err(PlumblineError::Config(format!(
                    "layout.room_minimums '{}' needs at least one keyword",
                    minimum.room_type
                )));
            }
            if let Some(area) = minimum.min_area_m2 {
                non_negative("layout.room_minimums.min_area_m2", area)?;
            }
            if let Some(width) = minimum.min_width {
                non_negative("layout.room_minimums.min_width", width)?;
            }
        }
        Ok(())
    }
}

impl ConsistencyConfig {
    pub fn validate(&self) -> PlumblineResult<()> {
        non_negative("consistency.dimension_tolerance", self.dimension_tolerance)?;
        non_negative("consistency.pitch_tolerance_deg", self.pitch_tolerance_deg)?;
        non_negative("consistency.door_width_tolerance", self.door_width_tolerance)?;
        unit_interval("consistency.window_error_penalty", self.window_error_penalty)?;
        unit_interval("consistency.min_consistency_score", self.min_consistency_score)?;

        let weights = self.category_weights.as_array();
        for w in weights {
            non_negative("consistency.category_weights", w)?;
        }
        if weights.iter().sum::<f64>() <= 0.0 {
            return Err(PlumblineError::Config(
                "consistency.category_weights must not all be zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl VisualConfig {
    pub fn validate(&self) -> PlumblineResult<()> {
        unit_interval("visual.min_edge_iou", self.min_edge_iou)?;
        unit_interval("visual.min_palette_match", self.min_palette_match)?;
        if let Some(f1) = self.min_edge_f1 {
            unit_interval("visual.min_edge_f1", f1)?;
        }
        unit_interval("visual.neutral_edge_iou", self.neutral_edge_iou)?;
        unit_interval("visual.neutral_palette_match", self.neutral_palette_match)?;
        non_negative("visual.edge_threshold", self.edge_threshold)?;
        if self.palette_sample_stride == 0 {
            return Err(PlumblineError::Config(
                "visual.palette_sample_stride must be >= 1".to_string(),
            ));
        }
        if self.palette_distance_scale.is_nan() || self.palette_distance_scale <= 0.0 {
            return Err(PlumblineError::Config(format!(
                "visual.palette_distance_scale must be > 0, got {}",
                self.palette_distance_scale
            )));
        }
        if self.pixels_per_window.is_nan() || self.pixels_per_window <= 0.0 {
            return Err(PlumblineError::Config(format!(
                "visual.pixels_per_window must be > 0, got {}",
                self.pixels_per_window
            )));
        }
        Ok(())
    }
}

impl PlumblineConfig {
    /// Validate configuration parameters.
    pub fn validate(&self) -> PlumblineResult<()> {
        self.layout.validate()?;
        self.consistency.validate()?;
        self.visual.validate()
    }

    /// Load from JSON string. Missing sections and fields take defaults.
    pub fn from_json(json: &str) -> PlumblineResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| PlumblineError::Config(format!("JSON parse error: {e}")))
    }
}
