//! `benchcmp-recon` — Reconciliation engine for optimizer benchmark results.
//!
//! Pure engine crate: receives pre-loaded source text, returns reconciled
//! rows, summaries and rendered artifacts. No CLI or filesystem dependencies.

pub mod chart;
pub mod config;
pub mod engine;
pub mod error;
pub mod evidence;
pub mod model;
pub mod report;
pub mod structured;
pub mod text;

pub use config::CompareConfig;
pub use engine::{reconcile, AnalysisRun};
pub use error::CompareError;
pub use model::{ComparisonRow, Reconciliation, ResultRecord, Variant, VariantKey};
