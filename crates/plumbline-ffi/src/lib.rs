// ─────────────────────────────────────────────────────────────────────
// Plumbline: Verification Kernel PyO3 FFI Bindings
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
// Note: #[deny(unsafe_code)] not applied; PyO3 proc macros generate
// unsafe blocks internally. All hand-written code in this crate is safe.
//! Python-callable wrappers around the Plumbline validators.
//!
//! Exposes `PlumblineConfig`, `RustLayoutValidator`,
//! `RustConsistencyValidator` and `RustVisualValidator` to Python via
//! PyO3. Structured inputs and verdicts cross the boundary as JSON
//! strings; images cross as encoded bytes or file paths.
//!
//! # FFI Safety
//!
//! - GIL acquired via `Python::with_gil` before every Python callback.
//! - Python exceptions in a window-count callback → 0 windows detected.
//! - Batch validation releases the GIL while the rayon pool runs.
//! - All config validated before storage (`PlumblineConfig::validate()`).
//!
//! Install: `pip install -e crates/plumbline-ffi` (requires maturin).
//!
//! Usage from Python:
//! ```python
//! from plumbline_kernel import RustLayoutValidator
//!
//! validator = RustLayoutValidator()
//! verdict = json.loads(validator.validate(layout_json, constraints_json))
//! ```

use std::io::Cursor;
use std::sync::Arc;

use image::ImageFormat;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::PyBytes;
use serde::de::DeserializeOwned;
use serde::Serialize;

use plumbline_core::{
    auto_fix_consistency_issues, generate_consistency_report, DnaValidator, EncodedImage,
    ExternalWindowDetector, ImageFile, ImageSource, LayoutValidator, VisualJob, VisualValidator,
    WindowDetector,
};
use plumbline_types::{
    ConsistencyLocks, ConsistencyResult, Constraints, Layout, MasterDesignDna, PlumblineConfig,
    PlumblineError, ThresholdOverrides, VisualPlan,
};

fn parse<T: DeserializeOwned>(what: &str, json: &str) -> PyResult<T> {
    serde_json::from_str(json)
        .map_err(PlumblineError::from)
        .map_err(|e| PyValueError::new_err(format!("invalid {what}: {e}")))
}

fn parse_overrides(json: Option<&str>) -> PyResult<ThresholdOverrides> {
    json.map_or_else(|| Ok(ThresholdOverrides::default()), |j| parse("thresholds", j))
}

fn to_json<T: Serialize>(value: &T) -> PyResult<String> {
    serde_json::to_string(value).map_err(|e| PyValueError::new_err(e.to_string()))
}

// ─── PyPlumblineConfig ──────────────────────────────────────────────

/// Python-visible configuration for all three validators.
#[pyclass(name = "PlumblineConfig")]
#[derive(Clone)]
struct PyPlumblineConfig {
    inner: PlumblineConfig,
}

#[pymethods]
impl PyPlumblineConfig {
    /// Defaults, optionally overlaid with a partial JSON document.
    #[new]
    #[pyo3(signature = (json = None))]
    fn new(json: Option<&str>) -> PyResult<Self> {
        match json {
            Some(j) => Self::from_json(j),
            None => Ok(Self {
                inner: PlumblineConfig::default(),
            }),
        }
    }

    /// Construct from JSON string.
    #[staticmethod]
    fn from_json(json: &str) -> PyResult<Self> {
        let config =
            PlumblineConfig::from_json(json).map_err(|e| PyValueError::new_err(e.to_string()))?;
        config
            .validate()
            .map_err(|e| PyValueError::new_err(e.to_string()))?;
        Ok(Self { inner: config })
    }

    fn to_json(&self) -> PyResult<String> {
        to_json(&self.inner)
    }

    fn __repr__(&self) -> String {
        format!(
            "PlumblineConfig(clip_tolerance={}, min_consistency_score={}, min_edge_iou={}, min_palette_match={})",
            self.inner.layout.clip_tolerance,
            self.inner.consistency.min_consistency_score,
            self.inner.visual.min_edge_iou,
            self.inner.visual.min_palette_match
        )
    }
}

// ─── PyLayoutValidator ──────────────────────────────────────────────

/// Geometric layout validator exposed to Python.
#[pyclass(name = "RustLayoutValidator")]
struct PyLayoutValidator {
    inner: LayoutValidator,
}

#[pymethods]
impl PyLayoutValidator {
    #[new]
    #[pyo3(signature = (config = None))]
    fn new(config: Option<PyPlumblineConfig>) -> PyResult<Self> {
        let cfg = config.map(|c| c.inner).unwrap_or_default();
        let inner =
            LayoutValidator::new(cfg.layout).map_err(|e| PyValueError::new_err(e.to_string()))?;
        Ok(Self { inner })
    }

    /// Validate a layout against its envelope.
    ///
    /// Returns: JSON `{valid, critical, errors, warnings, fixedLayout}`.
    fn validate(&self, layout_json: &str, constraints_json: &str) -> PyResult<String> {
        let layout: Layout = parse("layout", layout_json)?;
        let constraints: Constraints = parse("constraints", constraints_json)?;
        to_json(&self.inner.validate(&layout, &constraints))
    }
}

// ─── PyConsistencyValidator ─────────────────────────────────────────

/// Design-DNA consistency validator exposed to Python.
#[pyclass(name = "RustConsistencyValidator")]
struct PyConsistencyValidator {
    inner: DnaValidator,
}

#[pymethods]
impl PyConsistencyValidator {
    #[new]
    #[pyo3(signature = (config = None))]
    fn new(config: Option<PyPlumblineConfig>) -> PyResult<Self> {
        let cfg = config.map(|c| c.inner).unwrap_or_default();
        let inner =
            DnaValidator::new(cfg.consistency).map_err(|e| PyValueError::new_err(e.to_string()))?;
        Ok(Self { inner })
    }

    /// Returns: JSON `{valid, consistencyScore, errors, warnings, validations, timestamp}`.
    #[pyo3(signature = (dna_json, locks_json, strict = true))]
    fn validate_consistency(&self, dna_json: &str, locks_json: &str, strict: bool) -> PyResult<String> {
        let dna: MasterDesignDna = parse("design DNA", dna_json)?;
        let locks: ConsistencyLocks = parse("locks", locks_json)?;
        to_json(&self.inner.validate_consistency(&dna, &locks, strict))
    }

    /// Returns: JSON of the design with locked attributes restored.
    fn auto_fix_consistency_issues(&self, dna_json: &str, locks_json: &str) -> PyResult<String> {
        let dna: MasterDesignDna = parse("design DNA", dna_json)?;
        let locks: ConsistencyLocks = parse("locks", locks_json)?;
        to_json(&auto_fix_consistency_issues(&dna, &locks))
    }

    /// Render a `validate_consistency` result as plain text.
    #[staticmethod]
    fn generate_consistency_report(result_json: &str) -> PyResult<String> {
        let result: ConsistencyResult = parse("consistency result", result_json)?;
        Ok(generate_consistency_report(&result))
    }

    fn extract_window_count(&self, features: Vec<String>) -> u32 {
        self.inner.extract_window_count(features.as_slice())
    }
}

// ─── PyVisualValidator ──────────────────────────────────────────────

/// Visual consistency validator exposed to Python.
///
/// An optional `window_callback: Callable[[bytes], int]` replaces the
/// flood-fill window heuristic; it receives the generated render as PNG
/// bytes and crosses the FFI boundary once per elevation.
#[pyclass(name = "RustVisualValidator")]
struct PyVisualValidator {
    inner: VisualValidator,
}

#[pymethods]
impl PyVisualValidator {
    #[new]
    #[pyo3(signature = (config = None, window_callback = None))]
    fn new(config: Option<PyPlumblineConfig>, window_callback: Option<PyObject>) -> PyResult<Self> {
        let cfg = config.map(|c| c.inner).unwrap_or_default();

        let inner = match window_callback {
            Some(cb) => {
                let detector: Arc<dyn WindowDetector> =
                    Arc::new(ExternalWindowDetector::new(move |img| {
                        let mut png = Vec::new();
                        if let Err(e) = img.write_to(&mut Cursor::new(&mut png), ImageFormat::Png) {
                            log::warn!("window callback: PNG encode failed: {e}");
                            return 0;
                        }
                        Python::with_gil(|py| match cb.call1(py, (PyBytes::new(py, &png),)) {
                            Ok(result) => result.extract::<u32>(py).unwrap_or(0),
                            Err(_) => 0,
                        })
                    }));
                VisualValidator::with_detector(cfg.visual, detector)
            }
            None => VisualValidator::new(cfg.visual),
        }
        .map_err(|e| PyValueError::new_err(e.to_string()))?;

        Ok(Self { inner })
    }

    /// Compare an encoded render against an encoded reference.
    ///
    /// Returns: JSON `{viewType, valid, edgeIoU, edgeAlignment, paletteMatch,
    /// windowCheck, windowCountMatch, issues, recommendations}`.
    #[pyo3(signature = (reference, generated, plan_json, view_type, thresholds_json = None))]
    fn validate(
        &self,
        reference: &[u8],
        generated: &[u8],
        plan_json: &str,
        view_type: &str,
        thresholds_json: Option<&str>,
    ) -> PyResult<String> {
        let plan: VisualPlan = parse("plan", plan_json)?;
        let overrides = parse_overrides(thresholds_json)?;
        let report = self.inner.validate(
            &EncodedImage::new(reference),
            &EncodedImage::new(generated),
            &plan,
            view_type,
            &overrides,
        );
        to_json(&report)
    }

    /// Same as `validate`, reading both images from disk.
    #[pyo3(signature = (reference_path, generated_path, plan_json, view_type, thresholds_json = None))]
    fn validate_files(
        &self,
        reference_path: &str,
        generated_path: &str,
        plan_json: &str,
        view_type: &str,
        thresholds_json: Option<&str>,
    ) -> PyResult<String> {
        let plan: VisualPlan = parse("plan", plan_json)?;
        let overrides = parse_overrides(thresholds_json)?;
        let report = self.inner.validate(
            &ImageFile::new(reference_path),
            &ImageFile::new(generated_path),
            &plan,
            view_type,
            &overrides,
        );
        to_json(&report)
    }

    /// Validate several views in parallel.
    ///
    /// Args:
    ///     jobs: list of `(reference, generated, plan_json, view_type,
    ///           thresholds_json | None)` tuples.
    ///
    /// Returns: JSON `{passed, reports}` with reports in job order.
    #[allow(clippy::type_complexity)]
    fn validate_batch(
        &self,
        py: Python<'_>,
        jobs: Vec<(Vec<u8>, Vec<u8>, String, String, Option<String>)>,
    ) -> PyResult<String> {
        let jobs = jobs
            .into_iter()
            .map(|(reference, generated, plan_json, view_type, thresholds)| -> PyResult<VisualJob> {
                let reference: Arc<dyn ImageSource> = Arc::new(EncodedImage::new(reference));
                let generated: Arc<dyn ImageSource> = Arc::new(EncodedImage::new(generated));
                Ok(VisualJob {
                    reference,
                    generated,
                    plan: parse("plan", &plan_json)?,
                    view_type,
                    overrides: parse_overrides(thresholds.as_deref())?,
                })
            })
            .collect::<PyResult<Vec<_>>>()?;

        let batch = py.allow_threads(|| self.inner.validate_batch(&jobs));
        to_json(&batch)
    }
}

// ─── Module Registration ────────────────────────────────────────────

/// Plumbline: verification kernel for generated architectural deliverables.
///
/// - `PlumblineConfig`: configuration
/// - `RustLayoutValidator`: floor-plan geometry against the envelope
/// - `RustConsistencyValidator`: design attributes against locked values
/// - `RustVisualValidator`: renders against reference renders
#[pymodule]
fn plumbline_kernel(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyPlumblineConfig>()?;
    m.add_class::<PyLayoutValidator>()?;
    m.add_class::<PyConsistencyValidator>()?;
    m.add_class::<PyVisualValidator>()?;
    Ok(())
}
