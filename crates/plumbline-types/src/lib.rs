// ─────────────────────────────────────────────────────────────────────
// Plumbline: Verification Kernel Types
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Configuration, error hierarchy, input data model and verdict records
//! for the Plumbline verification kernel.

pub mod config;
pub mod dna;
pub mod error;
pub mod layout;
mod lenient;
pub mod plan;
pub mod verdict;

pub use config::{
    CategoryWeights, ConsistencyConfig, LayoutConfig, PlumblineConfig, RoomMinimum,
    ThresholdOverrides, VisualConfig,
};
pub use dna::{ConsistencyLocks, Facade, MasterDesignDna};
pub use error::{PlumblineError, PlumblineResult};
pub use layout::{Constraints, Layout, Level, ProgramSpace, ProposedRoom, RoomRect, Staircase};
pub use plan::{MaterialPalette, VisualPlan};
pub use verdict::{
    clamp_score, weighted_mean,
    BatchReport, Category, CategoryResult, ConsistencyResult, EdgeAlignment, LayoutValidation,
    VisualReport, WindowCountCheck,
};
