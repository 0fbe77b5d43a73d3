// ─────────────────────────────────────────────────────────────────────
// Plumbline: Verification Kernel Validators
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Validators for generated architectural deliverables.
//!
//! - [`LayoutValidator`]: bounding-box geometry of proposed floor plans
//!   against the building envelope, with auto-clipping of small overflows.
//! - [`DnaValidator`]: six-category consistency scoring of a design's
//!   structured attributes against the project's locked values.
//! - [`VisualValidator`]: edge, palette and window-count comparison of a
//!   generated render against a reference render.
//!
//! # Invariants
//!
//! 1. **Inputs are never mutated**: corrections are returned on deep
//!    copies (`fixed_layout`, `auto_fix_consistency_issues`).
//!
//! 2. **Data-quality problems never surface as `Err`**: they are
//!    reported as errors or warnings inside the returned verdict. `Err`
//!    is reserved for invalid configuration.
//!
//! 3. **Validators are immutable after construction** and therefore
//!    `Send + Sync`; independent calls may run concurrently.

pub mod dna;
pub mod layout;
pub mod report;
pub mod visual;

pub use dna::{auto_fix_consistency_issues, DnaValidator};
pub use layout::LayoutValidator;
pub use report::generate_consistency_report;
pub use visual::source::{EncodedImage, ImageFile, ImageSource};
pub use visual::windows::{ExternalWindowDetector, FloodFillDetector, WindowDetector};
pub use visual::{VisualJob, VisualValidator};
