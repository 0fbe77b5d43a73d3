// ─────────────────────────────────────────────────────────────────────
// Plumbline: Layout Data Model
// ─────────────────────────────────────────────────────────────────────
//! Room layouts as produced by the external layout generator, and the
//! envelope/program constraints they are checked against.
//!
//! Generator output is not trusted to be well formed. Numeric fields and
//! the `levels` / `rooms` lists deserialize leniently: a missing value or
//! one that is not a number (or numeric string) becomes `None`, so the
//! validator can report it as a structural problem instead of the whole
//! document failing to parse.

use serde::{Deserialize, Serialize};

use crate::error::PlumblineResult;

/// A room proposed by the layout generator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposedRoom {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub program: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone_type: Option<String>,
    #[serde(default, deserialize_with = "crate::lenient::number")]
    pub x: Option<f64>,
    #[serde(default, deserialize_with = "crate::lenient::number")]
    pub y: Option<f64>,
    #[serde(default, deserialize_with = "crate::lenient::number")]
    pub width: Option<f64>,
    #[serde(default, deserialize_with = "crate::lenient::number")]
    pub depth: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_external_wall: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub adjacent_to: Vec<String>,
}

impl ProposedRoom {
    /// Fully specified rectangle, if all four numeric fields are present.
    pub fn rect(&self) -> Option<RoomRect> {
        Some(RoomRect {
            x: self.x?,
            y: self.y?,
            width: self.width?,
            depth: self.depth?,
        })
    }

    /// Name for messages; unnamed rooms are labelled by position.
    pub fn label(&self, position: usize) -> String {
        if self.name.trim().is_empty() {
            format!("room #{}", position + 1)
        } else {
            self.name.clone()
        }
    }

    pub fn is_stair(&self) -> bool {
        self.program.eq_ignore_ascii_case("staircase")
            || self.name.to_lowercase().contains("stair")
    }
}

/// Axis-aligned room rectangle in metres, origin at the envelope corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoomRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub depth: f64,
}

impl RoomRect {
    pub fn area(&self) -> f64 {
        self.width * self.depth
    }
}

/// One storey of a layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Level {
    #[serde(default, deserialize_with = "crate::lenient::index", skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "crate::lenient::list")]
    pub rooms: Option<Vec<ProposedRoom>>,
}

impl Level {
    /// Declared index, falling back to the position in the level list.
    pub fn index_or(&self, position: usize) -> usize {
        self.index.unwrap_or(position)
    }

    pub fn label(&self, position: usize) -> String {
        match &self.name {
            Some(name) if !name.trim().is_empty() => name.clone(),
            _ => format!("level {}", self.index_or(position)),
        }
    }
}

/// Shared stair core reused on every level.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Staircase {
    #[serde(default, deserialize_with = "crate::lenient::number")]
    pub x: Option<f64>,
    #[serde(default, deserialize_with = "crate::lenient::number")]
    pub y: Option<f64>,
    #[serde(default, deserialize_with = "crate::lenient::number")]
    pub width: Option<f64>,
    #[serde(default, deserialize_with = "crate::lenient::number")]
    pub depth: Option<f64>,
}

/// Proposed multi-level room layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layout {
    #[serde(default, deserialize_with = "crate::lenient::list")]
    pub levels: Option<Vec<Level>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub staircase: Option<Staircase>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub design_rationale: Option<String>,
}

impl Layout {
    pub fn from_json(json: &str) -> PlumblineResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// A space required by the brief.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramSpace {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program: Option<String>,
    #[serde(default, alias = "area", deserialize_with = "crate::lenient::number")]
    pub target_area_m2: Option<f64>,
    #[serde(default)]
    pub level_index: usize,
}

/// Interior envelope and program a layout must satisfy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Constraints {
    pub interior_width: f64,
    pub interior_depth: f64,
    #[serde(default = "default_level_count")]
    pub level_count: u32,
    #[serde(default)]
    pub program_spaces: Vec<ProgramSpace>,
}

fn default_level_count() -> u32 {
    1
}

impl Constraints {
    pub fn new(interior_width: f64, interior_depth: f64, level_count: u32) -> Self {
        Self {
            interior_width,
            interior_depth,
            level_count,
            program_spaces: Vec::new(),
        }
    }

    pub fn from_json(json: &str) -> PlumblineResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_numeric_fields_become_none() {
        let room: ProposedRoom =
            serde_json::from_str(r#"{"name": "Hall", "x": "3", "y": 1.0, "depth": null}"#).unwrap();
        assert_eq!(room.x, None);
        assert_eq!(room.y, Some(1.0));
        assert_eq!(room.width, None);
        assert_eq!(room.depth, None);
        assert!(room.rect().is_none());
    }

    #[test]
    fn test_levels_not_a_list() {
        let layout = Layout::from_json(r#"{"levels": {"rooms": []}}"#).unwrap();
        assert!(layout.levels.is_none());
    }

    #[test]
    fn test_rooms_not_a_list() {
        let layout = Layout::from_json(r#"{"levels": [{"index": 0, "rooms": 7}]}"#).unwrap();
        let levels = layout.levels.unwrap();
        assert!(levels[0].rooms.is_none());
    }

    #[test]
    fn test_malformed_room_entry_becomes_empty_room() {
        let layout = Layout::from_json(r#"{"levels": [{"rooms": ["oops"]}]}"#).unwrap();
        let rooms = layout.levels.unwrap()[0].rooms.clone().unwrap();
        assert_eq!(rooms.len(), 1);
        assert!(rooms[0].rect().is_none());
        assert_eq!(rooms[0].label(0), "room #1");
    }

    #[test]
    fn test_program_space_area_alias() {
        let space: ProgramSpace = serde_json::from_str(r#"{"name": "Kitchen", "area": 12}"#).unwrap();
        assert_eq!(space.target_area_m2, Some(12.0));
        assert_eq!(space.level_index, 0);
    }

    #[test]
    fn test_constraints_camel_case() {
        let c = Constraints::from_json(
            r#"{"interiorWidth": 10, "interiorDepth": 8, "levelCount": 2, "programSpaces": []}"#,
        )
        .unwrap();
        assert_eq!(c.interior_width, 10.0);
        assert_eq!(c.level_count, 2);
    }

    #[test]
    fn test_stair_detection() {
        let by_name = ProposedRoom {
            name: "Main Stair".into(),
            ..Default::default()
        };
        let by_program = ProposedRoom {
            name: "Core".into(),
            program: "Staircase".into(),
            ..Default::default()
        };
        assert!(by_name.is_stair());
        assert!(by_program.is_stair());
    }
}
