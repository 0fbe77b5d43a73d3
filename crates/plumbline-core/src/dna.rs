// ─────────────────────────────────────────────────────────────────────
// Plumbline: Design-DNA Consistency Validator
// ─────────────────────────────────────────────────────────────────────
//! Weighted six-category comparison of a design's structured attributes
//! against the project's consistency locks.
//!
//! Each category yields `{errors, warnings, score}`; the aggregate is the
//! weighted mean of the six scores (equal weights by default):
//!
//! | category    | error on                         | score when failing |
//! |-------------|----------------------------------|--------------------|
//! | dimensions  | length/width/height, floor count | 0.0                |
//! | materials   | facade/trim/roof colour          | 0.5                |
//! | windows     | per-facade and total counts      | 1 − 0.2 × errors   |
//! | roof        | type, pitch                      | 0.5                |
//! | floor count | floor count                      | 0.0                |
//! | doors       | entrance facade                  | 0.8                |
//!
//! A lock absent from the lock set is not checked. A lock present with
//! no matching design attribute is a warning.

use std::fmt::Display;

use chrono::Utc;
use regex::Regex;

use plumbline_types::dna::{ConsistencyLocks, Facade, MasterDesignDna};
use plumbline_types::weighted_mean;
use plumbline_types::{
    Category, CategoryResult, ConsistencyConfig, ConsistencyResult, PlumblineError,
    PlumblineResult,
};

const WINDOW_PATTERN: &str = r"(?i)\b(\d+)[\s-]*windows?\b";
/// The storey noun must not continue into a compound such as
/// "floor-to-ceiling".
const STOREY_PATTERN: &str =
    r"(?i)\b(\d+|one|two|three|four|five|six)[\s-]*(?:storeys?|stor(?:y|ies)|floors?|levels?)(?:[^\w-]|$)";

/// Slack for float noise on tolerance and threshold comparisons.
const EPS: f64 = 1e-9;

const ORDINAL_FLOORS: [&str; 8] = [
    "ground", "first", "second", "third", "fourth", "fifth", "sixth", "seventh",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Severity {
    Error,
    Warning,
}

/// Error/warning collector for a single category.
#[derive(Default)]
struct Checks {
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl Checks {
    fn push(&mut self, severity: Severity, message: String) {
        match severity {
            Severity::Error => self.errors.push(message),
            Severity::Warning => self.warnings.push(message),
        }
    }

    /// Returns the design value when a comparison should proceed.
    fn present<T: Display, L: Display>(&mut self, label: &str, actual: Option<T>, locked: Option<&L>) -> Option<T> {
        let locked = locked?;
        if actual.is_none() {
            self.warnings
                .push(format!("{label} not specified (locked: {locked})"));
        }
        actual
    }

    fn measure(
        &mut self,
        severity: Severity,
        label: &str,
        actual: Option<f64>,
        locked: Option<f64>,
        tolerance: f64,
        unit: &str,
    ) {
        let Some(actual) = self.present(label, actual, locked.as_ref()) else {
            return;
        };
        let Some(locked) = locked else { return };
        let delta = (actual - locked).abs();
        if delta > tolerance + EPS {
            self.push(
                severity,
                format!(
                    "{label} {actual:.2}{unit} differs from locked {locked:.2}{unit} by {delta:.2}{unit} (tolerance {tolerance:.2}{unit})"
                ),
            );
        }
    }

    fn count(&mut self, severity: Severity, label: &str, actual: Option<u32>, locked: Option<u32>) {
        let Some(actual) = self.present(label, actual, locked.as_ref()) else {
            return;
        };
        let Some(locked) = locked else { return };
        if actual != locked {
            self.push(severity, format!("{label} is {actual}, locked value is {locked}"));
        }
    }

    fn text(
        &mut self,
        severity: Severity,
        label: &str,
        actual: Option<&str>,
        locked: Option<&str>,
        case_insensitive: bool,
    ) {
        let Some(actual) = self.present(label, actual, locked.as_ref()) else {
            return;
        };
        let Some(locked) = locked else { return };
        let (a, l) = (actual.trim(), locked.trim());
        let equal = if case_insensitive {
            a.eq_ignore_ascii_case(l)
        } else {
            a == l
        };
        if !equal {
            self.push(severity, format!("{label} is '{a}', locked value is '{l}'"));
        }
    }

    fn finish(self, category: Category, score: impl FnOnce(usize) -> f64) -> CategoryResult {
        let s = score(self.errors.len());
        CategoryResult::new(category, self.errors, self.warnings, s)
    }
}

fn pass_or(errors: usize, failing: f64) -> f64 {
    if errors == 0 {
        1.0
    } else {
        failing
    }
}

fn word_number(token: &str) -> Option<u32> {
    match token.to_ascii_lowercase().as_str() {
        "one" => Some(1),
        "two" => Some(2),
        "three" => Some(3),
        "four" => Some(4),
        "five" => Some(5),
        "six" => Some(6),
        other => other.parse().ok(),
    }
}

/// Design-DNA consistency validator.
pub struct DnaValidator {
    config: ConsistencyConfig,
    window_pattern: Regex,
    storey_pattern: Regex,
}

impl DnaValidator {
    pub fn new(config: ConsistencyConfig) -> PlumblineResult<Self> {
        config.validate()?;
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| PlumblineError::Pattern(e.to_string()))
        };
        Ok(Self {
            window_pattern: compile(WINDOW_PATTERN)?,
            storey_pattern: compile(STOREY_PATTERN)?,
            config,
        })
    }

    pub fn config(&self) -> &ConsistencyConfig {
        &self.config
    }

    /// Window count stated in a facade's feature list: the first integer
    /// immediately preceding "window"/"windows", or 0 when none is stated.
    pub fn extract_window_count<S: AsRef<str>>(&self, features: &[S]) -> u32 {
        features
            .iter()
            .find_map(|feature| {
                self.window_pattern
                    .captures(feature.as_ref())
                    .and_then(|caps| caps[1].parse().ok())
            })
            .unwrap_or(0)
    }

    /// Storey counts mentioned anywhere in elevation feature text.
    fn mentioned_floor_counts<'a>(&self, features: impl Iterator<Item = &'a str>) -> Vec<u32> {
        let mut counts: Vec<u32> = features
            .flat_map(|feature| {
                self.storey_pattern
                    .captures_iter(feature)
                    .filter_map(|caps| word_number(&caps[1]))
                    .collect::<Vec<_>>()
            })
            .collect();
        counts.sort_unstable();
        counts.dedup();
        counts
    }

    /// Compare a design against its locks.
    ///
    /// `strict` requires zero errors; otherwise the aggregate score must
    /// reach `min_consistency_score`.
    pub fn validate_consistency(
        &self,
        dna: &MasterDesignDna,
        locks: &ConsistencyLocks,
        strict: bool,
    ) -> ConsistencyResult {
        let validations = vec![
            self.check_dimensions(dna, locks),
            self.check_materials(dna, locks),
            self.check_windows(dna, locks),
            self.check_roof(dna, locks),
            self.check_floor_count(dna, locks),
            self.check_doors(dna, locks),
        ];

        let scores: Vec<f64> = validations.iter().map(|v| v.score).collect();
        let consistency_score =
            weighted_mean(&scores, &self.config.category_weights.as_array());

        let errors: Vec<String> = validations
            .iter()
            .flat_map(|v| v.errors.iter().cloned())
            .collect();
        let warnings: Vec<String> = validations
            .iter()
            .flat_map(|v| v.warnings.iter().cloned())
            .collect();

        let valid = self.is_consistent(consistency_score, errors.len(), strict);
        if !valid {
            log::debug!(
                "design inconsistent: score={consistency_score:.4} errors={}",
                errors.len()
            );
        }

        ConsistencyResult {
            valid,
            consistency_score,
            errors,
            warnings,
            validations,
            timestamp: Utc::now(),
        }
    }

    /// Acceptance rule shared by strict and non-strict modes.
    pub fn is_consistent(&self, score: f64, error_count: usize, strict: bool) -> bool {
        if strict {
            error_count == 0
        } else {
            score + EPS >= self.config.min_consistency_score
        }
    }

    fn check_dimensions(&self, dna: &MasterDesignDna, locks: &ConsistencyLocks) -> CategoryResult {
        let tol = self.config.dimension_tolerance;
        let d = &dna.dimensions;
        let mut checks = Checks::default();

        checks.measure(Severity::Error, "Length", d.length, locks.length, tol, "m");
        checks.measure(Severity::Error, "Width", d.width, locks.width, tol, "m");
        checks.measure(Severity::Error, "Height", d.height, locks.height, tol, "m");
        checks.measure(
            Severity::Warning,
            "Ground floor height",
            d.ground_floor_height,
            locks.ground_height,
            tol,
            "m",
        );
        checks.measure(
            Severity::Warning,
            "Upper floor height",
            d.upper_floor_height,
            locks.upper_height,
            tol,
            "m",
        );
        checks.count(Severity::Error, "Floor count", d.floor_count, locks.floor_count);

        checks.finish(Category::Dimensions, |errors| pass_or(errors, 0.0))
    }

    fn check_materials(&self, dna: &MasterDesignDna, locks: &ConsistencyLocks) -> CategoryResult {
        let palette = &dna.color_palette;
        let roof_color = palette.roof.as_deref().or(dna.roof.color.as_deref());
        let mut checks = Checks::default();

        checks.text(
            Severity::Error,
            "Facade color",
            palette.facade.as_deref(),
            locks.facade_color.as_deref(),
            true,
        );
        checks.text(
            Severity::Error,
            "Trim color",
            palette.trim.as_deref(),
            locks.trim_color.as_deref(),
            true,
        );
        checks.text(
            Severity::Error,
            "Roof color",
            roof_color,
            locks.roof_color.as_deref(),
            true,
        );

        if let (Some(facade), Some(trim)) = (&palette.facade, &palette.trim) {
            if facade.trim().eq_ignore_ascii_case(trim.trim()) {
                checks
                    .warnings
                    .push(format!("Trim color '{trim}' is identical to the facade color"));
            }
        }

        checks.finish(Category::Materials, |errors| pass_or(errors, 0.5))
    }

    fn check_windows(&self, dna: &MasterDesignDna, locks: &ConsistencyLocks) -> CategoryResult {
        let mut checks = Checks::default();
        let mut total: u32 = 0;

        for facade in Facade::ALL {
            let count = self.extract_window_count(dna.elevations.get(facade).features.as_slice());
            total = total.saturating_add(count);
            if let Some(locked) = locks.window_count(facade) {
                if count != locked {
                    checks.errors.push(format!(
                        "{facade} facade shows {count} window(s), locked value is {locked}"
                    ));
                }
            }
        }
        if let Some(locked) = locks.window_total {
            if total != locked {
                checks
                    .errors
                    .push(format!("Total window count is {total}, locked value is {locked}"));
            }
        }
        checks.text(
            Severity::Warning,
            "Window type",
            dna.windows.window_type.as_deref(),
            locks.window_type.as_deref(),
            true,
        );

        let penalty = self.config.window_error_penalty;
        checks.finish(Category::Windows, |errors| {
            (1.0 - penalty * errors as f64).max(0.0)
        })
    }

    fn check_roof(&self, dna: &MasterDesignDna, locks: &ConsistencyLocks) -> CategoryResult {
        let roof = &dna.roof;
        let mut checks = Checks::default();

        checks.text(
            Severity::Error,
            "Roof type",
            roof.roof_type.as_deref(),
            locks.roof_type.as_deref(),
            true,
        );
        checks.measure(
            Severity::Error,
            "Roof pitch",
            roof.pitch,
            locks.roof_pitch,
            self.config.pitch_tolerance_deg,
            "°",
        );
        checks.text(
            Severity::Warning,
            "Roof material",
            roof.material.as_deref(),
            locks.roof_material.as_deref(),
            false,
        );

        checks.finish(Category::Roof, |errors| pass_or(errors, 0.5))
    }

    fn check_floor_count(&self, dna: &MasterDesignDna, locks: &ConsistencyLocks) -> CategoryResult {
        let mut checks = Checks::default();
        checks.count(
            Severity::Error,
            "Floor count",
            dna.dimensions.floor_count,
            locks.floor_count,
        );

        let declared = dna.dimensions.floor_count.or(locks.floor_count).unwrap_or(0) as usize;
        for ordinal in ORDINAL_FLOORS.iter().take(declared) {
            let present = dna
                .floor_plans
                .keys()
                .any(|key| key.to_ascii_lowercase().starts_with(ordinal));
            if !present {
                checks
                    .warnings
                    .push(format!("Floor plan for the {ordinal} floor is missing"));
            }
        }

        if let Some(locked) = locks.floor_count {
            for mentioned in self.mentioned_floor_counts(dna.elevations.all_features()) {
                if mentioned != locked {
                    checks.warnings.push(format!(
                        "Elevation text mentions {mentioned} floor(s), locked value is {locked}"
                    ));
                }
            }
        }

        checks.finish(Category::FloorCount, |errors| pass_or(errors, 0.0))
    }

    fn check_doors(&self, dna: &MasterDesignDna, locks: &ConsistencyLocks) -> CategoryResult {
        let entrance = &dna.entrance;
        let mut checks = Checks::default();

        checks.text(
            Severity::Error,
            "Entrance facade",
            entrance.facade.as_deref(),
            locks.door_location.as_deref(),
            false,
        );
        checks.text(
            Severity::Warning,
            "Entrance position",
            entrance.position.as_deref(),
            locks.door_position.as_deref(),
            false,
        );
        checks.measure(
            Severity::Warning,
            "Door width",
            entrance.width,
            locks.door_width,
            self.config.door_width_tolerance,
            "m",
        );
        checks.text(
            Severity::Warning,
            "Door color",
            entrance.color.as_deref(),
            locks.door_color.as_deref(),
            true,
        );

        checks.finish(Category::Doors, |errors| pass_or(errors, 0.8))
    }
}

/// Copy of `dna` with dimensions, roof, colour palette and entrance
/// overwritten from the locks. Elevation text, floor plans and window
/// descriptions are left as they are.
pub fn auto_fix_consistency_issues(dna: &MasterDesignDna, locks: &ConsistencyLocks) -> MasterDesignDna {
    fn overwrite<T: Clone>(field: &mut Option<T>, locked: &Option<T>) {
        if locked.is_some() {
            field.clone_from(locked);
        }
    }

    let mut fixed = dna.clone();

    let d = &mut fixed.dimensions;
    overwrite(&mut d.length, &locks.length);
    overwrite(&mut d.width, &locks.width);
    overwrite(&mut d.height, &locks.height);
    overwrite(&mut d.floor_count, &locks.floor_count);
    overwrite(&mut d.ground_floor_height, &locks.ground_height);
    overwrite(&mut d.upper_floor_height, &locks.upper_height);

    let roof = &mut fixed.roof;
    overwrite(&mut roof.roof_type, &locks.roof_type);
    overwrite(&mut roof.pitch, &locks.roof_pitch);
    overwrite(&mut roof.material, &locks.roof_material);
    overwrite(&mut roof.color, &locks.roof_color);

    let palette = &mut fixed.color_palette;
    overwrite(&mut palette.facade, &locks.facade_color);
    overwrite(&mut palette.trim, &locks.trim_color);
    overwrite(&mut palette.roof, &locks.roof_color);

    let entrance = &mut fixed.entrance;
    overwrite(&mut entrance.facade, &locks.door_location);
    overwrite(&mut entrance.position, &locks.door_position);
    overwrite(&mut entrance.width, &locks.door_width);
    overwrite(&mut entrance.color, &locks.door_color);

    log::debug!("auto-fixed design attributes from consistency locks");
    fixed
}

#[cfg(test)]
mod tests {
    use super::*;
    use plumbline_types::dna::Elevation;
    use serde_json::json;

    fn validator() -> DnaValidator {
        DnaValidator::new(ConsistencyConfig::default()).unwrap()
    }

    fn locks() -> ConsistencyLocks {
        ConsistencyLocks {
            length: Some(12.0),
            width: Some(8.0),
            height: Some(7.5),
            floor_count: Some(2),
            ground_height: Some(3.0),
            upper_height: Some(2.7),
            facade_color: Some("#F5F5DC".into()),
            trim_color: Some("#FFFFFF".into()),
            roof_color: Some("#4A4A4A".into()),
            roof_type: Some("gable".into()),
            roof_pitch: Some(35.0),
            roof_material: Some("slate".into()),
            window_count_north: Some(4),
            window_count_south: Some(3),
            window_count_east: Some(2),
            window_count_west: Some(2),
            window_total: Some(11),
            window_type: Some("casement".into()),
            door_location: Some("south".into()),
            door_position: Some("center".into()),
            door_width: Some(1.0),
            door_color: Some("#8B0000".into()),
        }
    }

    fn elevation(features: &[&str]) -> Elevation {
        Elevation {
            features: features.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn consistent_dna() -> MasterDesignDna {
        let mut dna = MasterDesignDna::from_json(
            &json!({
                "dimensions": {
                    "length": 12.0, "width": 8.0, "height": 7.5, "floorCount": 2,
                    "groundFloorHeight": 3.0, "upperFloorHeight": 2.7
                },
                "colorPalette": {"facade": "#f5f5dc", "trim": "#FFFFFF", "roof": "#4A4A4A"},
                "roof": {"type": "Gable", "pitch": 35.0, "material": "slate"},
                "windows": {"type": "casement"},
                "floorPlans": {"ground": {}, "first": {}},
                "entrance": {"facade": "south", "position": "center", "width": 1.0, "color": "#8b0000"}
            })
            .to_string(),
        )
        .unwrap();
        dna.elevations.north = elevation(&["4 windows", "2-storey gable"]);
        dna.elevations.south = elevation(&["front door", "3 windows"]);
        dna.elevations.east = elevation(&["2 windows"]);
        dna.elevations.west = elevation(&["large bay window", "2 windows"]);
        dna
    }

    fn category(result: &ConsistencyResult, category: Category) -> &CategoryResult {
        result
            .validations
            .iter()
            .find(|v| v.category == category)
            .unwrap()
    }

    #[test]
    fn test_consistent_design_passes() {
        let result = validator().validate_consistency(&consistent_dna(), &locks(), true);
        assert!(result.valid, "errors: {:?}", result.errors);
        assert!(result.warnings.is_empty(), "warnings: {:?}", result.warnings);
        assert_eq!(result.validations.len(), 6);
        assert!((result.consistency_score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_extract_window_count() {
        let v = validator();
        assert_eq!(v.extract_window_count(&["large bay window", "2 windows"]), 2);
        assert_eq!(v.extract_window_count(&["large bay window"]), 0);
        assert_eq!(v.extract_window_count(&["1 window above door"]), 1);
        assert_eq!(v.extract_window_count::<&str>(&[]), 0);
        assert_eq!(v.extract_window_count(&["3 windowsills"]), 0);
    }

    #[test]
    fn test_length_within_tolerance() {
        let mut dna = consistent_dna();
        dna.dimensions.length = Some(12.05);
        let result = validator().validate_consistency(&dna, &locks(), true);
        let dims = category(&result, Category::Dimensions);
        assert!(dims.errors.is_empty());
        assert_eq!(dims.score, 1.0);
    }

    #[test]
    fn test_length_outside_tolerance() {
        let mut dna = consistent_dna();
        dna.dimensions.length = Some(12.3);
        let result = validator().validate_consistency(&dna, &locks(), true);
        assert!(!result.valid);
        assert_eq!(category(&result, Category::Dimensions).score, 0.0);
    }

    #[test]
    fn test_floor_height_deviation_is_warning() {
        let mut dna = consistent_dna();
        dna.dimensions.upper_floor_height = Some(3.2);
        let result = validator().validate_consistency(&dna, &locks(), true);
        assert!(result.valid);
        assert_eq!(category(&result, Category::Dimensions).warnings.len(), 1);
    }

    #[test]
    fn test_color_mismatch_and_trim_warning() {
        let mut dna = consistent_dna();
        dna.color_palette.facade = Some("#ffffff".into());
        let result = validator().validate_consistency(&dna, &locks(), true);
        let materials = category(&result, Category::Materials);
        assert_eq!(materials.errors.len(), 1);
        assert_eq!(materials.score, 0.5);
        assert!(materials.warnings.iter().any(|w| w.contains("identical")));
    }

    #[test]
    fn test_window_errors_scale_score() {
        let mut dna = consistent_dna();
        dna.elevations.north = elevation(&["5 windows"]);
        let result = validator().validate_consistency(&dna, &locks(), true);
        let windows = category(&result, Category::Windows);
        // North count and total both differ.
        assert_eq!(windows.errors.len(), 2);
        assert!((windows.score - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_window_score_floors_at_zero() {
        let mut dna = consistent_dna();
        for facade in [
            &mut dna.elevations.north,
            &mut dna.elevations.south,
            &mut dna.elevations.east,
            &mut dna.elevations.west,
        ] {
            facade.features = vec!["9 windows".into()];
        }
        let result = validator().validate_consistency(&dna, &locks(), true);
        assert_eq!(category(&result, Category::Windows).score, 0.0);
    }

    #[test]
    fn test_window_type_mismatch_is_warning() {
        let mut dna = consistent_dna();
        dna.windows.window_type = Some("sash".into());
        let result = validator().validate_consistency(&dna, &locks(), true);
        let windows = category(&result, Category::Windows);
        assert!(windows.valid);
        assert_eq!(windows.warnings.len(), 1);
    }

    #[test]
    fn test_roof_pitch_tolerance() {
        let mut dna = consistent_dna();
        dna.roof.pitch = Some(35.8);
        let result = validator().validate_consistency(&dna, &locks(), true);
        assert!(category(&result, Category::Roof).valid);

        dna.roof.pitch = Some(37.0);
        let result = validator().validate_consistency(&dna, &locks(), true);
        let roof = category(&result, Category::Roof);
        assert!(!roof.valid);
        assert_eq!(roof.score, 0.5);
    }

    #[test]
    fn test_roof_material_is_warning() {
        let mut dna = consistent_dna();
        dna.roof.material = Some("clay tile".into());
        let result = validator().validate_consistency(&dna, &locks(), true);
        let roof = category(&result, Category::Roof);
        assert!(roof.valid);
        assert_eq!(roof.warnings.len(), 1);
    }

    #[test]
    fn test_floor_count_checks() {
        let mut dna = consistent_dna();
        dna.floor_plans.remove("first");
        dna.elevations.east.features.push("three-storey tower".into());
        let result = validator().validate_consistency(&dna, &locks(), true);
        let floors = category(&result, Category::FloorCount);
        assert!(floors.valid);
        assert!(floors.warnings.iter().any(|w| w.contains("first floor is missing")));
        assert!(floors.warnings.iter().any(|w| w.contains("mentions 3 floor(s)")));
    }

    #[test]
    fn test_compound_floor_word_is_not_a_storey_count() {
        let mut dna = consistent_dna();
        dna.elevations.east.features.push("10 floor-to-ceiling windows".into());
        dna.elevations.south.features.push("two floors above a basement level".into());
        let result = validator().validate_consistency(&dna, &locks(), true);
        let floors = category(&result, Category::FloorCount);
        assert!(floors.warnings.is_empty(), "warnings: {:?}", floors.warnings);
    }

    #[test]
    fn test_huge_window_counts_saturate() {
        let mut dna = consistent_dna();
        dna.elevations.north = elevation(&["4000000000 windows"]);
        dna.elevations.south = elevation(&["4000000000 windows"]);
        let result = validator().validate_consistency(&dna, &locks(), true);
        let windows = category(&result, Category::Windows);
        assert_eq!(windows.errors.len(), 3);
        assert!(windows
            .errors
            .iter()
            .any(|e| e.contains(&format!("Total window count is {}", u32::MAX))));
        assert!(!result.valid);
    }

    #[test]
    fn test_floor_count_mismatch_fails_two_categories() {
        let mut dna = consistent_dna();
        dna.dimensions.floor_count = Some(3);
        let result = validator().validate_consistency(&dna, &locks(), true);
        assert_eq!(category(&result, Category::Dimensions).score, 0.0);
        assert_eq!(category(&result, Category::FloorCount).score, 0.0);
        assert!((result.consistency_score - 4.0 / 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_door_checks() {
        let mut dna = consistent_dna();
        dna.entrance.color = Some("#000000".into());
        dna.entrance.width = Some(0.95);
        let result = validator().validate_consistency(&dna, &locks(), true);
        let doors = category(&result, Category::Doors);
        assert!(doors.valid);
        assert_eq!(doors.warnings.len(), 1);
        assert_eq!(doors.score, 1.0);

        dna.entrance.facade = Some("north".into());
        let result = validator().validate_consistency(&dna, &locks(), true);
        assert_eq!(category(&result, Category::Doors).score, 0.8);
    }

    #[test]
    fn test_score_is_mean_of_six() {
        let mut dna = consistent_dna();
        dna.color_palette.roof = Some("#000000".into()); // materials 0.5
        dna.entrance.facade = Some("east".into()); // doors 0.8
        let result = validator().validate_consistency(&dna, &locks(), false);
        let mean: f64 = result.validations.iter().map(|v| v.score).sum::<f64>() / 6.0;
        assert!((result.consistency_score - mean).abs() < 1e-9);
        assert!((0.0..=1.0).contains(&result.consistency_score));
        // (1 + 0.5 + 1 + 1 + 1 + 0.8) / 6 = 0.8833 < 0.95
        assert!(!result.valid);
    }

    #[test]
    fn test_non_strict_accepts_minor_failures() {
        let mut config = ConsistencyConfig::default();
        config.min_consistency_score = 0.9;
        let validator = DnaValidator::new(config).unwrap();
        let mut dna = consistent_dna();
        dna.entrance.facade = Some("east".into());
        let strict = validator.validate_consistency(&dna, &locks(), true);
        let lenient = validator.validate_consistency(&dna, &locks(), false);
        assert!(!strict.valid);
        assert!(lenient.valid);
    }

    #[test]
    fn test_non_strict_boundary_is_inclusive() {
        let v = validator();
        assert!(v.is_consistent(0.95, 3, false));
        assert!(!v.is_consistent(0.9499, 0, false));
        assert!(!v.is_consistent(1.0, 1, true));
    }

    #[test]
    fn test_missing_attribute_is_warning() {
        let mut dna = consistent_dna();
        dna.dimensions.height = None;
        let result = validator().validate_consistency(&dna, &locks(), true);
        assert!(result.valid);
        assert!(result.warnings.iter().any(|w| w.contains("Height not specified")));
    }

    #[test]
    fn test_unparsable_values_are_reported_not_rejected() {
        let dna = MasterDesignDna::from_json(
            &json!({
                "dimensions": {"length": "12", "width": 8, "height": 7.5, "floorCount": "2"},
                "roof": {"type": "gable", "pitch": "steep", "material": "slate"}
            })
            .to_string(),
        )
        .unwrap();
        let locks = ConsistencyLocks::from_json(
            r#"{"EXACT_LENGTH": 12, "EXACT_FLOOR_COUNT": 2.0, "EXACT_ROOF_PITCH": "35"}"#,
        )
        .unwrap();
        let result = validator().validate_consistency(&dna, &locks, true);
        assert!(result.valid, "errors: {:?}", result.errors);
        assert!(result
            .warnings
            .iter()
            .any(|w| w.contains("Roof pitch not specified (locked: 35)")));
    }

    #[test]
    fn test_absent_locks_skip_checks() {
        let result =
            validator().validate_consistency(&consistent_dna(), &ConsistencyLocks::default(), true);
        assert!(result.valid);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_custom_weights() {
        let mut config = ConsistencyConfig::default();
        config.category_weights.doors = 0.0;
        let validator = DnaValidator::new(config).unwrap();
        let mut dna = consistent_dna();
        dna.entrance.facade = Some("east".into());
        let result = validator.validate_consistency(&dna, &locks(), false);
        assert!((result.consistency_score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_auto_fix_overwrites_locked_fields() {
        let mut dna = consistent_dna();
        dna.dimensions.length = Some(14.0);
        dna.roof.roof_type = Some("flat".into());
        dna.color_palette.facade = Some("#123456".into());
        dna.entrance.facade = Some("west".into());
        dna.elevations.north = elevation(&["6 windows"]);

        let fixed = auto_fix_consistency_issues(&dna, &locks());
        assert_eq!(fixed.dimensions.length, Some(12.0));
        assert_eq!(fixed.roof.roof_type.as_deref(), Some("gable"));
        assert_eq!(fixed.color_palette.facade.as_deref(), Some("#F5F5DC"));
        assert_eq!(fixed.entrance.facade.as_deref(), Some("south"));
        // Elevation text is not rewritten.
        assert_eq!(fixed.elevations.north.features, vec!["6 windows".to_string()]);
        // Input untouched.
        assert_eq!(dna.dimensions.length, Some(14.0));

        let result = validator().validate_consistency(&fixed, &locks(), true);
        assert!(category(&result, Category::Dimensions).valid);
        assert!(category(&result, Category::Roof).valid);
        assert!(category(&result, Category::Materials).valid);
        assert!(category(&result, Category::Doors).valid);
        assert!(!category(&result, Category::Windows).valid);
    }

    #[test]
    fn test_auto_fix_keeps_unlocked_fields() {
        let dna = consistent_dna();
        let fixed = auto_fix_consistency_issues(&dna, &ConsistencyLocks::default());
        assert_eq!(fixed, dna);
    }
}
