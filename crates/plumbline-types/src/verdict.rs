// ─────────────────────────────────────────────────────────────────────
// Plumbline: Verdict Types
// ─────────────────────────────────────────────────────────────────────

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::layout::Layout;

/// Clamp a value to [lo, hi], mapping NaN to lo and Inf to nearest bound.
#[inline]
pub fn clamp_score(value: f64, lo: f64, hi: f64) -> f64 {
    if value.is_nan() {
        log::warn!("clamp_score: NaN detected, clamping to {lo:.4}");
        return lo;
    }
    if value.is_infinite() {
        let boundary = if value > 0.0 { hi } else { lo };
        log::warn!("clamp_score: Inf detected, clamping to {boundary:.4}");
        return boundary;
    }
    value.clamp(lo, hi)
}

/// Weighted mean of `scores`, clamped to [0, 1]. Returns 0 when the
/// weights sum to zero or the slices differ in length.
pub fn weighted_mean(scores: &[f64], weights: &[f64]) -> f64 {
    if scores.len() != weights.len() {
        log::warn!(
            "weighted_mean: {} scores but {} weights",
            scores.len(),
            weights.len()
        );
        return 0.0;
    }
    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        return 0.0;
    }
    let sum: f64 = scores.iter().zip(weights).map(|(s, w)| s * w).sum();
    clamp_score(sum / total, 0.0, 1.0)
}

/// Outcome of a geometric layout validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutValidation {
    /// True when no errors were reported.
    pub valid: bool,
    /// True only when a structural or field error occurred.
    pub critical: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    /// Auto-clipped copy of the layout; `None` when nothing was clipped.
    pub fixed_layout: Option<Layout>,
}

/// The six design-DNA check categories, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Dimensions,
    Materials,
    Windows,
    Roof,
    FloorCount,
    Doors,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Dimensions,
        Category::Materials,
        Category::Windows,
        Category::Roof,
        Category::FloorCount,
        Category::Doors,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::Dimensions => "Dimensions",
            Category::Materials => "Materials",
            Category::Windows => "Windows",
            Category::Roof => "Roof",
            Category::FloorCount => "Floor Count",
            Category::Doors => "Doors",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of one design-DNA category check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryResult {
    pub category: Category,
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    /// Category score in [0, 1].
    pub score: f64,
}

impl CategoryResult {
    pub fn new(category: Category, errors: Vec<String>, warnings: Vec<String>, score: f64) -> Self {
        Self {
            category,
            valid: errors.is_empty(),
            errors,
            warnings,
            score: clamp_score(score, 0.0, 1.0),
        }
    }
}

/// Outcome of a design-DNA consistency validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsistencyResult {
    pub valid: bool,
    /// Weighted mean of the six category scores, in [0, 1].
    pub consistency_score: f64,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    /// Exactly one entry per [`Category`], in `Category::ALL` order.
    pub validations: Vec<CategoryResult>,
    pub timestamp: DateTime<Utc>,
}

/// Edge alignment with pixel tolerance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EdgeAlignment {
    /// Share of generated edges near a reference edge.
    pub precision: f64,
    /// Share of reference edges near a generated edge.
    pub recall: f64,
    pub f1: f64,
}

/// Expected versus detected window count for an elevation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowCountCheck {
    pub expected: u32,
    pub detected: u32,
    /// Connected edge regions found by the detector.
    pub regions: u32,
    pub matched: bool,
}

/// Outcome of a visual consistency validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualReport {
    pub view_type: String,
    pub valid: bool,
    #[serde(rename = "edgeIoU")]
    pub edge_iou: f64,
    pub edge_alignment: Option<EdgeAlignment>,
    pub palette_match: f64,
    /// `None` when the window check did not run for this view.
    pub window_check: Option<WindowCountCheck>,
    /// Window counts agree, or were not checked.
    pub window_count_match: bool,
    pub issues: Vec<String>,
    pub recommendations: Vec<String>,
}

/// Reports for a set of independently validated views.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    /// True when every view passed.
    pub passed: bool,
    pub reports: Vec<VisualReport>,
}

impl BatchReport {
    pub fn from_reports(reports: Vec<VisualReport>) -> Self {
        Self {
            passed: reports.iter().all(|r| r.valid),
            reports,
        }
    }

    pub fn failed_views(&self) -> Vec<&str> {
        self.reports
            .iter()
            .filter(|r| !r.valid)
            .map(|r| r.view_type.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_nan() {
        assert_eq!(clamp_score(f64::NAN, 0.0, 1.0), 0.0);
    }

    #[test]
    fn test_clamp_pos_inf() {
        assert_eq!(clamp_score(f64::INFINITY, 0.0, 1.0), 1.0);
    }

    #[test]
    fn test_clamp_below_lo() {
        assert_eq!(clamp_score(-0.3, 0.0, 1.0), 0.0);
    }

    #[test]
    fn test_weighted_mean_equal_weights() {
        let m = weighted_mean(&[1.0, 0.5, 0.0], &[1.0, 1.0, 1.0]);
        assert!((m - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_weighted_mean_skewed_weights() {
        let m = weighted_mean(&[1.0, 0.0], &[3.0, 1.0]);
        assert!((m - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_weighted_mean_degenerate() {
        assert_eq!(weighted_mean(&[1.0], &[0.0]), 0.0);
        assert_eq!(weighted_mean(&[1.0, 1.0], &[1.0]), 0.0);
    }

    #[test]
    fn test_category_result_validity_follows_errors() {
        let ok = CategoryResult::new(Category::Roof, vec![], vec!["w".into()], 1.0);
        assert!(ok.valid);
        let bad = CategoryResult::new(Category::Roof, vec!["e".into()], vec![], 0.5);
        assert!(!bad.valid);
    }

    #[test]
    fn test_category_result_clamps_score() {
        let r = CategoryResult::new(Category::Windows, vec![], vec![], 1.4);
        assert_eq!(r.score, 1.0);
    }

    #[test]
    fn test_batch_report_failed_views() {
        let make = |view: &str, valid: bool| VisualReport {
            view_type: view.into(),
            valid,
            edge_iou: 0.0,
            edge_alignment: None,
            palette_match: 0.0,
            window_check: None,
            window_count_match: true,
            issues: vec![],
            recommendations: vec![],
        };
        let batch = BatchReport::from_reports(vec![make("north", true), make("south", false)]);
        assert!(!batch.passed);
        assert_eq!(batch.failed_views(), vec!["south"]);
    }

    #[test]
    fn test_visual_report_json_keys() {
        let report = VisualReport {
            view_type: "elevation_north".into(),
            valid: true,
            edge_iou: 0.8,
            edge_alignment: None,
            palette_match: 0.9,
            window_check: None,
            window_count_match: true,
            issues: vec![],
            recommendations: vec![],
        };
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("edgeIoU").is_some());
        assert!(json.get("paletteMatch").is_some());
        assert_eq!(json["windowCountMatch"], serde_json::json!(true));
        assert!(json["windowCheck"].is_null());
    }
}
