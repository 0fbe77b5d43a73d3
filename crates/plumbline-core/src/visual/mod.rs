// ─────────────────────────────────────────────────────────────────────
// Plumbline: Visual Consistency Validator
// ─────────────────────────────────────────────────────────────────────
//! Compares a generated render against a reference render and the plan
//! it was generated from.
//!
//! Three sub-checks run per view: edge IoU (plus tolerant edge
//! alignment), palette similarity, and a window count on elevation
//! views. A sub-check that cannot be computed because an image failed
//! to load falls back to a neutral score instead of aborting.

pub mod edges;
pub mod palette;
pub mod source;
pub mod windows;

use std::sync::Arc;

use image::imageops::FilterType;
use rayon::prelude::*;

use plumbline_types::{
    BatchReport, EdgeAlignment, PlumblineResult, ThresholdOverrides, VisualConfig, VisualPlan,
    VisualReport, WindowCountCheck,
};

use edges::{edge_alignment, edge_iou, EdgeMask};
use source::ImageSource;
use windows::{FloodFillDetector, WindowDetector};

/// One view to validate as part of a batch.
pub struct VisualJob {
    pub reference: Arc<dyn ImageSource>,
    pub generated: Arc<dyn ImageSource>,
    pub plan: VisualPlan,
    pub view_type: String,
    pub overrides: ThresholdOverrides,
}

/// Visual consistency validator.
pub struct VisualValidator {
    config: VisualConfig,
    detector: Arc<dyn WindowDetector>,
}

impl VisualValidator {
    /// Validator using the flood-fill window heuristic.
    pub fn new(config: VisualConfig) -> PlumblineResult<Self> {
        let detector = Arc::new(FloodFillDetector::new(config.pixels_per_window));
        Self::with_detector(config, detector)
    }

    pub fn with_detector(
        config: VisualConfig,
        detector: Arc<dyn WindowDetector>,
    ) -> PlumblineResult<Self> {
        config.validate()?;
        Ok(Self { config, detector })
    }

    pub fn config(&self) -> &VisualConfig {
        &self.config
    }

    pub fn validate(
        &self,
        reference: &dyn ImageSource,
        generated: &dyn ImageSource,
        plan: &VisualPlan,
        view_type: &str,
        overrides: &ThresholdOverrides,
    ) -> VisualReport {
        let config = overrides.resolve(&self.config);

        let reference = reference
            .load()
            .map_err(|e| log::warn!("{view_type}: reference image unavailable: {e}"))
            .ok();
        let generated = generated
            .load()
            .map_err(|e| log::warn!("{view_type}: generated image unavailable: {e}"))
            .ok();

        let generated_edges = generated
            .as_ref()
            .map(|img| EdgeMask::from_image(img, config.edge_threshold));
        let reference_edges = reference
            .as_ref()
            .map(|img| EdgeMask::from_image(img, config.edge_threshold));

        // ── Edges ───────────────────────────────────────────────────
        // IoU needs equal-sized masks; the tolerant metric compares the
        // render at the reference resolution.
        let (edge_iou, alignment) = match (&reference_edges, &generated, &generated_edges) {
            (Some(r), Some(img), Some(g)) => {
                let alignment = if r.same_size(g) {
                    edge_alignment(r, g, config.edge_tolerance_px)
                } else {
                    let resized = img.resize_exact(r.width(), r.height(), FilterType::Triangle);
                    let resized_edges = EdgeMask::from_image(&resized, config.edge_threshold);
                    edge_alignment(r, &resized_edges, config.edge_tolerance_px)
                };
                (edge_iou(r, g), Some(alignment))
            }
            _ => (config.neutral_edge_iou, None),
        };

        // ── Palette ─────────────────────────────────────────────────
        let expected_colors = palette::expected_colors(&plan.material_palette);
        let palette_match = generated
            .as_ref()
            .and_then(|img| {
                let samples = palette::sample_pixels(img, config.palette_sample_stride);
                palette::palette_similarity(
                    &samples,
                    &expected_colors,
                    config.palette_distance_scale,
                )
            })
            .unwrap_or(config.neutral_palette_match);

        // ── Windows ─────────────────────────────────────────────────
        let window_check = (config.require_window_match && is_elevation(view_type)).then(|| {
            let expected = plan.total_windows();
            let detection = match (&generated, &generated_edges) {
                (Some(img), Some(mask)) => self.detector.detect(img, mask),
                _ => Default::default(),
            };
            WindowCountCheck {
                expected,
                detected: detection.detected,
                regions: detection.regions,
                matched: detection.detected.abs_diff(expected) <= config.window_count_tolerance,
            }
        });

        let mut findings = Findings::default();
        if edge_iou < config.min_edge_iou {
            findings.add(
                format!(
                    "Edge similarity {edge_iou:.2} is below the {:.2} threshold",
                    config.min_edge_iou
                ),
                "Regenerate with stronger structural conditioning so the outline follows the reference geometry".to_string(),
            );
        }
        if let Some(min_f1) = config.min_edge_f1 {
            let f1 = alignment.map_or(0.0, |a| a.f1);
            if f1 < min_f1 {
                let EdgeAlignment {
                    precision, recall, ..
                } = alignment.unwrap_or_default();
                findings.add(
                    format!("Edge alignment F1 {f1:.2} is below the {min_f1:.2} threshold"),
                    format!(
                        "Check for geometric drift (precision {precision:.2}, recall {recall:.2})"
                    ),
                );
            }
        }
        if palette_match < config.min_palette_match {
            let hexes: Vec<String> = expected_colors
                .iter()
                .map(|[r, g, b]| format!("#{r:02X}{g:02X}{b:02X}"))
                .collect();
            findings.add(
                format!(
                    "Palette match {palette_match:.2} is below the {:.2} threshold",
                    config.min_palette_match
                ),
                format!("Reinforce the material colours {} in the prompt", hexes.join(", ")),
            );
        }
        if let Some(check) = window_check.filter(|c| !c.matched) {
            findings.add(
                format!(
                    "Window count mismatch: expected {}, detected {}",
                    check.expected, check.detected
                ),
                format!(
                    "State the exact window count ({}) for this elevation in the prompt",
                    check.expected
                ),
            );
        }

        log::debug!(
            "{view_type}: edge_iou={edge_iou:.3} palette={palette_match:.3} issues={}",
            findings.issues.len()
        );

        VisualReport {
            view_type: view_type.to_string(),
            valid: findings.issues.is_empty(),
            edge_iou,
            edge_alignment: alignment,
            palette_match,
            window_check,
            window_count_match: window_check.map_or(true, |c| c.matched),
            issues: findings.issues,
            recommendations: findings.recommendations,
        }
    }

    /// Validate independent views in parallel. Reports keep job order.
    pub fn validate_batch(&self, jobs: &[VisualJob]) -> BatchReport {
        let reports: Vec<VisualReport> = jobs
            .par_iter()
            .map(|job| {
                self.validate(
                    job.reference.as_ref(),
                    job.generated.as_ref(),
                    &job.plan,
                    &job.view_type,
                    &job.overrides,
                )
            })
            .collect();
        BatchReport::from_reports(reports)
    }
}

fn is_elevation(view_type: &str) -> bool {
    view_type.to_ascii_lowercase().contains("elevation")
}

#[derive(Default)]
struct Findings {
    issues: Vec<String>,
    recommendations: Vec<String>,
}

impl Findings {
    fn add(&mut self, issue: String, recommendation: String) {
        self.issues.push(issue);
        self.recommendations.push(recommendation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgb, RgbImage};
    use serde_json::json;
    use source::EncodedImage;
    use windows::ExternalWindowDetector;

    /// White elevation with `n` black 12 px window squares.
    fn elevation(n: u32) -> DynamicImage {
        let mut img = RgbImage::from_pixel(100, 60, Rgb([255, 255, 255]));
        for i in 0..n {
            let x0 = 10 + 20 * i;
            for y in 20..32 {
                for x in x0..x0 + 12 {
                    img.put_pixel(x, y, Rgb([0, 0, 0]));
                }
            }
        }
        DynamicImage::ImageRgb8(img)
    }

    fn plan(windows: usize) -> VisualPlan {
        let per_room: Vec<_> = (0..windows).map(|_| json!({})).collect();
        serde_json::from_value(json!({
            "levels": [{"rooms": [{"name": "Living", "windows": per_room}]}],
            "materialPalette": {
                "exteriorWall": "#FFFFFF",
                "roof": "#000000",
                "groundFloorFinish": "#ffffff"
            }
        }))
        .unwrap()
    }

    fn validator() -> VisualValidator {
        VisualValidator::new(VisualConfig::default()).unwrap()
    }

    #[test]
    fn test_identical_elevation_passes() {
        let img = elevation(4);
        let report = validator().validate(
            &img,
            &img.clone(),
            &plan(4),
            "elevation_north",
            &ThresholdOverrides::default(),
        );
        assert!(report.valid, "issues: {:?}", report.issues);
        assert!((report.edge_iou - 1.0).abs() < 1e-9);
        assert!((report.palette_match - 1.0).abs() < 1e-9);
        let check = report.window_check.unwrap();
        assert_eq!(check.regions, 4);
        assert_eq!(check.detected, 4);
        assert!(check.matched);
        assert!(report.recommendations.is_empty());
    }

    #[test]
    fn test_blank_render_fails_edges_and_palette() {
        let blank = DynamicImage::ImageRgb8(RgbImage::from_pixel(100, 60, Rgb([255, 255, 255])));
        let report = validator().validate(
            &elevation(4),
            &blank,
            &plan(4),
            "elevation_south",
            &ThresholdOverrides::default(),
        );
        assert!(!report.valid);
        assert_eq!(report.edge_iou, 0.0);
        assert_eq!(report.palette_match, 0.0);
        assert!(!report.window_count_match);
        assert_eq!(report.issues.len(), 3);
        assert_eq!(report.recommendations.len(), 3);
    }

    #[test]
    fn test_undecodable_render_uses_neutral_scores() {
        let report = validator().validate(
            &elevation(4),
            &EncodedImage::new(vec![0u8, 1, 2, 3]),
            &plan(4),
            "elevation_east",
            &ThresholdOverrides::default(),
        );
        assert!(!report.valid);
        assert!((report.edge_iou - 0.5).abs() < 1e-9);
        assert!((report.palette_match - 0.8).abs() < 1e-9);
        assert!(report.edge_alignment.is_none());
        assert_eq!(report.window_check.unwrap().detected, 0);
    }

    #[test]
    fn test_window_mismatch_only_on_elevations() {
        let img = elevation(4);
        let v = validator();
        let elev = v.validate(&img, &img, &plan(8), "Elevation_West", &ThresholdOverrides::default());
        assert!(!elev.valid);
        assert_eq!(elev.issues.len(), 1);
        assert!(elev.issues[0].contains("expected 8, detected 4"));

        let section = v.validate(&img, &img, &plan(8), "section_a", &ThresholdOverrides::default());
        assert!(section.valid);
        assert!(section.window_check.is_none());
    }

    #[test]
    fn test_window_tolerance_of_one() {
        let img = elevation(4);
        let report = validator().validate(&img, &img, &plan(5), "elevation_north", &ThresholdOverrides::default());
        assert!(report.window_count_match);
        assert!(report.valid);
    }

    #[test]
    fn test_overrides_relax_thresholds() {
        let blank = DynamicImage::ImageRgb8(RgbImage::from_pixel(100, 60, Rgb([255, 255, 255])));
        let overrides = ThresholdOverrides {
            min_edge_iou: Some(0.0),
            min_palette_match: Some(0.0),
            require_window_match: Some(false),
            min_edge_f1: None,
        };
        let report = validator().validate(&elevation(4), &blank, &plan(4), "elevation_north", &overrides);
        assert!(report.valid);
        assert!(report.window_check.is_none());
    }

    #[test]
    fn test_edge_f1_threshold() {
        let overrides = ThresholdOverrides {
            min_edge_f1: Some(0.9),
            ..Default::default()
        };
        let img = elevation(4);
        let ok = validator().validate(&img, &img, &plan(4), "section_b", &overrides);
        assert!(ok.valid);
        assert!((ok.edge_alignment.unwrap().f1 - 1.0).abs() < 1e-9);

        let fewer = validator().validate(&img, &elevation(2), &plan(4), "section_b", &overrides);
        assert!(fewer.issues.iter().any(|i| i.contains("F1")));
    }

    #[test]
    fn test_rescaled_render_keeps_edge_alignment() {
        let reference = elevation(4);
        let generated = reference.resize_exact(200, 120, FilterType::Nearest);
        let overrides = ThresholdOverrides {
            min_edge_iou: Some(0.0),
            min_edge_f1: Some(0.5),
            ..Default::default()
        };
        let report = validator().validate(&reference, &generated, &plan(4), "section_a", &overrides);
        assert_eq!(report.edge_iou, 0.0);
        let alignment = report.edge_alignment.unwrap();
        assert!(alignment.f1 > 0.5, "f1 = {}", alignment.f1);
        assert!(report.valid, "issues: {:?}", report.issues);
    }

    #[test]
    fn test_report_json_carries_window_match() {
        let img = elevation(4);
        let v = validator();
        let mismatch = v.validate(&img, &img, &plan(8), "elevation_north", &ThresholdOverrides::default());
        let json = serde_json::to_value(&mismatch).unwrap();
        assert_eq!(json["windowCountMatch"], json!(false));
        assert_eq!(json["windowCheck"]["expected"], json!(8));

        let section = v.validate(&img, &img, &plan(8), "section_a", &ThresholdOverrides::default());
        let json = serde_json::to_value(&section).unwrap();
        assert_eq!(json["windowCountMatch"], json!(true));
    }

    #[test]
    fn test_external_detector_is_used() {
        let detector = Arc::new(ExternalWindowDetector::new(|_| 7));
        let v = VisualValidator::with_detector(VisualConfig::default(), detector).unwrap();
        let img = elevation(4);
        let report = v.validate(&img, &img, &plan(7), "elevation_north", &ThresholdOverrides::default());
        assert_eq!(report.window_check.unwrap().detected, 7);
        assert!(report.valid);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = VisualConfig::default();
        config.min_edge_iou = 1.5;
        assert!(VisualValidator::new(config).is_err());
    }

    #[test]
    fn test_batch_preserves_order() {
        let good: Arc<dyn ImageSource> = Arc::new(elevation(4));
        let blank: Arc<dyn ImageSource> = Arc::new(DynamicImage::ImageRgb8(RgbImage::from_pixel(
            100,
            60,
            Rgb([255, 255, 255]),
        )));
        let jobs: Vec<VisualJob> = ["elevation_north", "elevation_south", "section_a"]
            .iter()
            .map(|view| VisualJob {
                reference: good.clone(),
                generated: if *view == "elevation_south" {
                    blank.clone()
                } else {
                    good.clone()
                },
                plan: plan(4),
                view_type: view.to_string(),
                overrides: ThresholdOverrides::default(),
            })
            .collect();

        let batch = validator().validate_batch(&jobs);
        let views: Vec<&str> = batch.reports.iter().map(|r| r.view_type.as_str()).collect();
        assert_eq!(views, vec!["elevation_north", "elevation_south", "section_a"]);
        assert!(!batch.passed);
        assert_eq!(batch.failed_views(), vec!["elevation_south"]);
    }
}
