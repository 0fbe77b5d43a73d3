// ─────────────────────────────────────────────────────────────────────
// Plumbline: Render Plan
// ─────────────────────────────────────────────────────────────────────

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::PlumblineResult;

/// Hex colours the render is expected to contain.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialPalette {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exterior_wall: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roof: Option<String>,
    #[serde(default, alias = "groundFloor", skip_serializing_if = "Option::is_none")]
    pub ground_floor_finish: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanRoom {
    #[serde(default)]
    pub name: String,
    /// Window descriptors; only their number matters here.
    #[serde(default)]
    pub windows: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanLevel {
    #[serde(default)]
    pub rooms: Vec<PlanRoom>,
}

/// Structured plan a render was generated from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualPlan {
    #[serde(default)]
    pub levels: Vec<PlanLevel>,
    #[serde(default, alias = "materials")]
    pub material_palette: MaterialPalette,
}

impl VisualPlan {
    /// Windows across every room of every level, regardless of facade.
    pub fn total_windows(&self) -> u32 {
        self.levels
            .iter()
            .flat_map(|level| level.rooms.iter())
            .map(|room| room.windows.len() as u32)
            .sum()
    }

    pub fn from_json(json: &str) -> PlumblineResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
