// ─────────────────────────────────────────────────────────────────────
// Plumbline: Design DNA and Consistency Locks
// ─────────────────────────────────────────────────────────────────────
//! The structured description of a generated design ("design DNA") and
//! the project's locked canonical values it must agree with.
//!
//! Scalar fields deserialize leniently: `"pitch": "35"` reads as 35 and
//! a count of `2.0` as 2, while an unusable value reads as absent and is
//! reported by the validator as not specified.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::PlumblineResult;

/// One of the four building facades.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facade {
    North,
    South,
    East,
    West,
}

impl Facade {
    pub const ALL: [Facade; 4] = [Facade::North, Facade::South, Facade::East, Facade::West];

    pub fn as_str(self) -> &'static str {
        match self {
            Facade::North => "north",
            Facade::South => "south",
            Facade::East => "east",
            Facade::West => "west",
        }
    }
}

impl fmt::Display for Facade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dimensions {
    #[serde(default, deserialize_with = "crate::lenient::number", skip_serializing_if = "Option::is_none")]
    pub length: Option<f64>,
    #[serde(default, deserialize_with = "crate::lenient::number", skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, deserialize_with = "crate::lenient::number", skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, deserialize_with = "crate::lenient::count", alias = "floors", skip_serializing_if = "Option::is_none")]
    pub floor_count: Option<u32>,
    #[serde(default, deserialize_with = "crate::lenient::number", skip_serializing_if = "Option::is_none")]
    pub ground_floor_height: Option<f64>,
    #[serde(default, deserialize_with = "crate::lenient::number", skip_serializing_if = "Option::is_none")]
    pub upper_floor_height: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColorPalette {
    #[serde(default, deserialize_with = "crate::lenient::text", skip_serializing_if = "Option::is_none")]
    pub facade: Option<String>,
    #[serde(default, deserialize_with = "crate::lenient::text", skip_serializing_if = "Option::is_none")]
    pub trim: Option<String>,
    #[serde(default, deserialize_with = "crate::lenient::text", skip_serializing_if = "Option::is_none")]
    pub roof: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Roof {
    #[serde(rename = "type", default, deserialize_with = "crate::lenient::text", skip_serializing_if = "Option::is_none")]
    pub roof_type: Option<String>,
    /// Degrees.
    #[serde(default, deserialize_with = "crate::lenient::number", skip_serializing_if = "Option::is_none")]
    pub pitch: Option<f64>,
    #[serde(default, deserialize_with = "crate::lenient::text", skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,
    #[serde(default, deserialize_with = "crate::lenient::text", skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WindowSpec {
    #[serde(rename = "type", default, deserialize_with = "crate::lenient::text", skip_serializing_if = "Option::is_none")]
    pub window_type: Option<String>,
}

/// Free-text features describing one facade, e.g. `"4 windows"`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Elevation {
    #[serde(default)]
    pub features: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Elevations {
    #[serde(default)]
    pub north: Elevation,
    #[serde(default)]
    pub south: Elevation,
    #[serde(default)]
    pub east: Elevation,
    #[serde(default)]
    pub west: Elevation,
}

impl Elevations {
    pub fn get(&self, facade: Facade) -> &Elevation {
        match facade {
            Facade::North => &self.north,
            Facade::South => &self.south,
            Facade::East => &self.east,
            Facade::West => &self.west,
        }
    }

    /// All feature lines across every facade.
    pub fn all_features(&self) -> impl Iterator<Item = &str> {
        Facade::ALL
            .into_iter()
            .flat_map(move |f| self.get(f).features.iter().map(String::as_str))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entrance {
    /// Facade the main door sits on.
    #[serde(default, deserialize_with = "crate::lenient::text", alias = "direction", skip_serializing_if = "Option::is_none")]
    pub facade: Option<String>,
    #[serde(default, deserialize_with = "crate::lenient::text", skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, deserialize_with = "crate::lenient::number", skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, deserialize_with = "crate::lenient::text", skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Structured canonical description of a generated design.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasterDesignDna {
    #[serde(default)]
    pub dimensions: Dimensions,
    #[serde(default, alias = "materials")]
    pub color_palette: ColorPalette,
    #[serde(default)]
    pub roof: Roof,
    #[serde(default)]
    pub windows: WindowSpec,
    #[serde(default)]
    pub elevations: Elevations,
    /// Floor plans keyed by ordinal floor name (`ground`, `first`, ...).
    /// Contents are opaque here.
    #[serde(default)]
    pub floor_plans: BTreeMap<String, Value>,
    #[serde(default)]
    pub entrance: Entrance,
}

impl MasterDesignDna {
    pub fn from_json(json: &str) -> PlumblineResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Locked canonical values for a project. Absent locks are not checked.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConsistencyLocks {
    #[serde(rename = "EXACT_LENGTH", default, deserialize_with = "crate::lenient::number", skip_serializing_if = "Option::is_none")]
    pub length: Option<f64>,
    #[serde(rename = "EXACT_WIDTH", default, deserialize_with = "crate::lenient::number", skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(rename = "EXACT_HEIGHT", default, deserialize_with = "crate::lenient::number", skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(rename = "EXACT_FLOOR_COUNT", default, deserialize_with = "crate::lenient::count", skip_serializing_if = "Option::is_none")]
    pub floor_count: Option<u32>,
    #[serde(rename = "EXACT_GROUND_HEIGHT", default, deserialize_with = "crate::lenient::number", skip_serializing_if = "Option::is_none")]
    pub ground_height: Option<f64>,
    #[serde(rename = "EXACT_UPPER_HEIGHT", default, deserialize_with = "crate::lenient::number", skip_serializing_if = "Option::is_none")]
    pub upper_height: Option<f64>,

    #[serde(rename = "EXACT_FACADE_COLOR", default, deserialize_with = "crate::lenient::text", skip_serializing_if = "Option::is_none")]
    pub facade_color: Option<String>,
    #[serde(rename = "EXACT_TRIM_COLOR", default, deserialize_with = "crate::lenient::text", skip_serializing_if = "Option::is_none")]
    pub trim_color: Option<String>,
    #[serde(rename = "EXACT_ROOF_COLOR_LOCK", default, deserialize_with = "crate::lenient::text", skip_serializing_if = "Option::is_none")]
    pub roof_color: Option<String>,

    #[serde(rename = "EXACT_ROOF_TYPE", default, deserialize_with = "crate::lenient::text", skip_serializing_if = "Option::is_none")]
    pub roof_type: Option<String>,
    #[serde(rename = "EXACT_ROOF_PITCH", default, deserialize_with = "crate::lenient::number", skip_serializing_if = "Option::is_none")]
    pub roof_pitch: Option<f64>,
    #[serde(rename = "EXACT_ROOF_MATERIAL", default, deserialize_with = "crate::lenient::text", skip_serializing_if = "Option::is_none")]
    pub roof_material: Option<String>,

    #[serde(rename = "EXACT_WINDOW_COUNT_NORTH", default, deserialize_with = "crate::lenient::count", skip_serializing_if = "Option::is_none")]
    pub window_count_north: Option<u32>,
    #[serde(rename = "EXACT_WINDOW_COUNT_SOUTH", default, deserialize_with = "crate::lenient::count", skip_serializing_if = "Option::is_none")]
    pub window_count_south: Option<u32>,
    #[serde(rename = "EXACT_WINDOW_COUNT_EAST", default, deserialize_with = "crate::lenient::count", skip_serializing_if = "Option::is_none")]
    pub window_count_east: Option<u32>,
    #[serde(rename = "EXACT_WINDOW_COUNT_WEST", default, deserialize_with = "crate::lenient::count", skip_serializing_if = "Option::is_none")]
    pub window_count_west: Option<u32>,
    #[serde(rename = "EXACT_WINDOW_TOTAL", default, deserialize_with = "crate::lenient::count", skip_serializing_if = "Option::is_none")]
    pub window_total: Option<u32>,
    #[serde(rename = "EXACT_WINDOW_TYPE", default, deserialize_with = "crate::lenient::text", skip_serializing_if = "Option::is_none")]
    pub window_type: Option<String>,

    #[serde(rename = "EXACT_DOOR_LOCATION", default, deserialize_with = "crate::lenient::text", skip_serializing_if = "Option::is_none")]
    pub door_location: Option<String>,
    #[serde(rename = "EXACT_DOOR_POSITION", default, deserialize_with = "crate::lenient::text", skip_serializing_if = "Option::is_none")]
    pub door_position: Option<String>,
    #[serde(rename = "EXACT_DOOR_WIDTH", default, deserialize_with = "crate::lenient::number", skip_serializing_if = "Option::is_none")]
    pub door_width: Option<f64>,
    #[serde(rename = "EXACT_DOOR_COLOR", default, deserialize_with = "crate::lenient::text", skip_serializing_if = "Option::is_none")]
    pub door_color: Option<String>,
}

impl ConsistencyLocks {
    pub fn window_count(&self, facade: Facade) -> Option<u32> {
        match facade {
            Facade::North => self.window_count_north,
            Facade::South => self.window_count_south,
            Facade::East => self.window_count_east,
            Facade::West => self.window_count_west,
        }
    }

    pub fn from_json(json: &str) -> PlumblineResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
