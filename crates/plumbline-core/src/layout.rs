// ─────────────────────────────────────────────────────────────────────
// Plumbline: Geometric Layout Validator
// ─────────────────────────────────────────────────────────────────────
//! Pre-render checks of a proposed room layout against the interior
//! envelope and the program brief.
//!
//! Checks run per room, then per level, then across the whole layout:
//! - **Fields**: x, y, width, depth must be numeric (critical).
//! - **Minimum dimension**: 0.9 m for WCs, 1.5 m otherwise (warning).
//! - **Room type**: minimum area and width per room class, matched by
//!   program or name against `room_minimums` (warning).
//! - **Envelope**: overflow up to `clip_tolerance` is auto-clipped on a
//!   copy; anything larger is an error.
//! - **Overlap**: pairwise, after shrinking each room by `overlap_margin`.
//! - **Program**: area deviation against target spaces (warning).
//! - **Stairs**: multi-level layouts need a stair core at a fixed position.
//!
//! The input layout is never mutated. Corrections land on a deep copy
//! returned as `fixed_layout`.

use std::collections::{HashSet, VecDeque};
use std::fmt;

use plumbline_types::layout::{Constraints, Layout, ProposedRoom, RoomRect};
use plumbline_types::{LayoutConfig, LayoutValidation, PlumblineResult};

/// Slack for float noise when comparing an overflow against the clip tolerance.
const EPS: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    X,
    Y,
}

impl Axis {
    fn extent_name(self) -> &'static str {
        match self {
            Axis::X => "width",
            Axis::Y => "depth",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => f.write_str("X"),
            Axis::Y => f.write_str("Y"),
        }
    }
}

/// How far a room sticks out of the envelope along one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Overflow {
    Within,
    /// Small enough to shrink the extent by exactly this amount.
    Clip(f64),
    /// Too large to correct automatically.
    Exceeds(f64),
}

/// Classify `position + extent - envelope` against the clip tolerance.
pub fn classify_overflow(position: f64, extent: f64, envelope: f64, clip_tolerance: f64) -> Overflow {
    let overflow = position + extent - envelope;
    if overflow <= 0.0 {
        Overflow::Within
    } else if overflow <= clip_tolerance + EPS {
        Overflow::Clip(overflow)
    } else {
        Overflow::Exceeds(overflow)
    }
}

fn intervals_intersect(a0: f64, a1: f64, b0: f64, b1: f64) -> bool {
    a0 < b1 && b0 < a1
}

/// True when both rooms still intersect after shrinking each by `margin`
/// on every side. Symmetric in its arguments.
pub fn rooms_overlap(a: &RoomRect, b: &RoomRect, margin: f64) -> bool {
    intervals_intersect(
        a.x + margin,
        a.x + a.width - margin,
        b.x + margin,
        b.x + b.width - margin,
    ) && intervals_intersect(
        a.y + margin,
        a.y + a.depth - margin,
        b.y + margin,
        b.y + b.depth - margin,
    )
}

#[derive(Default)]
struct Findings {
    errors: Vec<String>,
    warnings: Vec<String>,
    critical: bool,
}

impl Findings {
    fn critical(&mut self, message: String) {
        self.critical = true;
        self.errors.push(message);
    }
}

/// Geometric layout validator.
///
/// Holds only immutable policy, so one instance may validate many
/// layouts concurrently.
#[derive(Debug, Clone)]
pub struct LayoutValidator {
    config: LayoutConfig,
}

impl Default for LayoutValidator {
    fn default() -> Self {
        Self {
            config: LayoutConfig::default(),
        }
    }
}

impl LayoutValidator {
    pub fn new(config: LayoutConfig) -> PlumblineResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Validate a layout against its envelope and program.
    pub fn validate(&self, layout: &Layout, constraints: &Constraints) -> LayoutValidation {
        let mut findings = Findings::default();

        if layout.levels.is_none() {
            findings.critical("Layout has no 'levels' list".to_string());
            return LayoutValidation {
                valid: false,
                critical: true,
                errors: findings.errors,
                warnings: findings.warnings,
                fixed_layout: None,
            };
        }

        let mut working = layout.clone();
        let mut modified = false;

        if let Some(levels) = working.levels.as_mut() {
            if levels.len() != constraints.level_count as usize {
                findings.warnings.push(format!(
                    "Layout has {} level(s) but {} were expected",
                    levels.len(),
                    constraints.level_count
                ));
            }

            for (position, level) in levels.iter_mut().enumerate() {
                let level_label = level.label(position);
                let Some(rooms) = level.rooms.as_mut() else {
                    findings.critical(format!("Level '{level_label}' has no 'rooms' list"));
                    continue;
                };

                for (index, room) in rooms.iter_mut().enumerate() {
                    modified |= self.check_room(room, index, &level_label, constraints, &mut findings);
                }
                self.check_overlaps(rooms, &level_label, &mut findings);
                check_adjacency(rooms, &level_label, &mut findings);
            }
        }

        self.check_program_areas(&working, constraints, &mut findings);
        self.check_staircase(&working, constraints, &mut findings);

        let valid = findings.errors.is_empty();
        log::debug!(
            "layout validated: valid={valid} errors={} warnings={} clipped={modified}",
            findings.errors.len(),
            findings.warnings.len()
        );

        LayoutValidation {
            valid,
            critical: findings.critical,
            errors: findings.errors,
            warnings: findings.warnings,
            fixed_layout: modified.then_some(working),
        }
    }

    /// Field, dimension, envelope and position checks for one room.
    /// Returns true when the room was clipped.
    fn check_room(
        &self,
        room: &mut ProposedRoom,
        index: usize,
        level_label: &str,
        constraints: &Constraints,
        findings: &mut Findings,
    ) -> bool {
        let name = room.label(index);
        let Some(rect) = room.rect() else {
            let missing: Vec<&str> = [
                ("x", room.x),
                ("y", room.y),
                ("width", room.width),
                ("depth", room.depth),
            ]
            .into_iter()
            .filter(|(_, value)| value.is_none())
            .map(|(field, _)| field)
            .collect();
            findings.critical(format!(
                "Room '{name}' on {level_label} is missing numeric field(s): {}",
                missing.join(", ")
            ));
            return false;
        };

        let min_dim = if room.program.eq_ignore_ascii_case("wc") {
            self.config.min_wc_dimension
        } else {
            self.config.min_room_dimension
        };
        if rect.width < min_dim || rect.depth < min_dim {
            findings.warnings.push(format!(
                "Room '{name}' is {:.2}m x {:.2}m, below the {min_dim:.2}m minimum dimension",
                rect.width, rect.depth
            ));
        }
        self.check_room_type(room, &name, &rect, findings);

        let mut clipped = false;
        for (axis, position, extent, envelope) in [
            (Axis::X, rect.x, rect.width, constraints.interior_width),
            (Axis::Y, rect.y, rect.depth, constraints.interior_depth),
        ] {
            match classify_overflow(position, extent, envelope, self.config.clip_tolerance) {
                Overflow::Within => {}
                Overflow::Clip(overflow) => {
                    let new_extent = extent - overflow;
                    match axis {
                        Axis::X => room.width = Some(new_extent),
                        Axis::Y => room.depth = Some(new_extent),
                    }
                    clipped = true;
                    log::debug!("auto-clipped '{name}' {} by {overflow:.3}m", axis.extent_name());
                    findings.warnings.push(format!(
                        "Room '{name}' overflowed envelope by {overflow:.2}m in {axis}; auto-clipped {} to {new_extent:.2}m",
                        axis.extent_name()
                    ));
                }
                Overflow::Exceeds(overflow) => {
                    findings.errors.push(format!(
                        "Room '{name}' exceeds envelope by {overflow:.2}m in {axis}"
                    ));
                }
            }
        }

        let floor = -self.config.negative_tolerance;
        if rect.x < floor || rect.y < floor {
            findings.errors.push(format!(
                "Room '{name}' has negative position ({:.2}, {:.2})",
                rect.x, rect.y
            ));
        }

        clipped
    }

    fn check_room_type(&self, room: &ProposedRoom, name: &str, rect: &RoomRect, findings: &mut Findings) {
        let Some(minimum) = self
            .config
            .room_minimums
            .iter()
            .find(|m| m.matches(&room.program, &room.name))
        else {
            return;
        };
        let room_type = &minimum.room_type;

        if let Some(min_area) = minimum.min_area_m2 {
            let area = rect.area();
            if area + EPS < min_area {
                findings.warnings.push(format!(
                    "Room '{name}' ({room_type}) area {area:.1}m² is below the {min_area:.1}m² minimum"
                ));
            }
        }
        if let Some(min_width) = minimum.min_width {
            let narrowest = rect.width.min(rect.depth);
            if narrowest + EPS < min_width {
                findings.warnings.push(format!(
                    "Room '{name}' ({room_type}) width {narrowest:.2}m is below the {min_width:.2}m minimum"
                ));
            }
        }
    }

    fn check_overlaps(&self, rooms: &[ProposedRoom], level_label: &str, findings: &mut Findings) {
        let placed: Vec<(String, RoomRect)> = rooms
            .iter()
            .enumerate()
            .filter_map(|(i, room)| room.rect().map(|rect| (room.label(i), rect)))
            .collect();

        for (i, (name_a, a)) in placed.iter().enumerate() {
            for (name_b, b) in &placed[i + 1..] {
                if rooms_overlap(a, b, self.config.overlap_margin) {
                    findings.errors.push(format!(
                        "Rooms '{name_a}' and '{name_b}' overlap on {level_label}"
                    ));
                }
            }
        }
    }

    fn check_program_areas(&self, layout: &Layout, constraints: &Constraints, findings: &mut Findings) {
        let levels = layout.levels.as_deref().unwrap_or_default();

        for space in &constraints.program_spaces {
            let program = space.program.as_deref().unwrap_or(&space.name);
            let candidate = levels
                .iter()
                .enumerate()
                .filter(|(position, level)| level.index_or(*position) == space.level_index)
                .filter_map(|(_, level)| level.rooms.as_deref())
                .flatten()
                .find(|room| {
                    room.name.eq_ignore_ascii_case(&space.name)
                        || room.program.eq_ignore_ascii_case(program)
                });

            let Some(room) = candidate else {
                findings.warnings.push(format!(
                    "Program space '{}' not found on level {}",
                    space.name, space.level_index
                ));
                continue;
            };

            let (Some(rect), Some(target)) = (room.rect(), space.target_area_m2) else {
                continue;
            };
            if target <= 0.0 {
                continue;
            }
            let actual = rect.area();
            let deviation = (actual - target).abs() / target;
            if deviation > self.config.area_deviation_ratio {
                findings.warnings.push(format!(
                    "Room '{}' area {actual:.1}m² deviates {:.0}% from target {target:.1}m² for '{}'",
                    room.name,
                    deviation * 100.0,
                    space.name
                ));
            }
        }
    }

    fn check_staircase(&self, layout: &Layout, constraints: &Constraints, findings: &mut Findings) {
        if constraints.level_count <= 1 {
            return;
        }
        let levels = layout.levels.as_deref().unwrap_or_default();

        let stairs: Vec<(String, RoomRect)> = levels
            .iter()
            .enumerate()
            .filter_map(|(position, level)| {
                let rooms = level.rooms.as_deref()?;
                let rect = rooms.iter().filter(|r| r.is_stair()).find_map(ProposedRoom::rect)?;
                Some((level.label(position), rect))
            })
            .collect();

        let has_stair_room = levels
            .iter()
            .filter_map(|level| level.rooms.as_deref())
            .flatten()
            .any(ProposedRoom::is_stair);

        if layout.staircase.is_none() && !has_stair_room {
            findings
                .warnings
                .push("Multi-level layout has no staircase".to_string());
            return;
        }

        let explicit = layout
            .staircase
            .as_ref()
            .and_then(|s| Some(("staircase definition".to_string(), s.x?, s.y?)));
        let reference = explicit.or_else(|| stairs.first().map(|(label, r)| (label.clone(), r.x, r.y)));
        let Some((reference_label, rx, ry)) = reference else {
            return;
        };

        let margin = self.config.overlap_margin;
        for (label, rect) in &stairs {
            if (rect.x - rx).abs() > margin || (rect.y - ry).abs() > margin {
                findings.warnings.push(format!(
                    "Staircase on {label} at ({:.2}, {:.2}) is not aligned with {reference_label} at ({rx:.2}, {ry:.2})",
                    rect.x, rect.y
                ));
            }
        }
    }
}

/// Adjacency references must name rooms on the same level, and when a
/// level declares adjacencies every room should be reachable through them.
fn check_adjacency(rooms: &[ProposedRoom], level_label: &str, findings: &mut Findings) {
    if rooms.iter().all(|r| r.adjacent_to.is_empty()) {
        return;
    }

    let names: Vec<String> = rooms.iter().map(|r| r.name.to_lowercase()).collect();
    let mut graph: Vec<HashSet<usize>> = vec![HashSet::new(); rooms.len()];

    for (i, room) in rooms.iter().enumerate() {
        for neighbour in &room.adjacent_to {
            match names.iter().position(|n| n == &neighbour.to_lowercase()) {
                Some(j) if j != i => {
                    graph[i].insert(j);
                    graph[j].insert(i);
                }
                Some(_) => {}
                None => findings.warnings.push(format!(
                    "Room '{}' lists unknown adjacent room '{neighbour}' on {level_label}",
                    room.label(i)
                )),
            }
        }
    }

    let start = ["entrance", "hall", "landing", "stair"]
        .iter()
        .find_map(|key| names.iter().position(|n| n.contains(key)))
        .unwrap_or(0);

    let mut visited = vec![false; rooms.len()];
    let mut queue = VecDeque::from([start]);
    visited[start] = true;
    while let Some(current) = queue.pop_front() {
        for &next in &graph[current] {
            if !visited[next] {
                visited[next] = true;
                queue.push_back(next);
            }
        }
    }

    let unreachable: Vec<String> = rooms
        .iter()
        .enumerate()
        .filter(|(i, _)| !visited[*i])
        .map(|(i, room)| room.label(i))
        .collect();
    if !unreachable.is_empty() {
        findings.warnings.push(format!(
            "Rooms not reachable through adjacencies on {level_label}: {}",
            unreachable.join(", ")
        ));
    }
}
