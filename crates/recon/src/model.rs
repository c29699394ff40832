use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::CompareError;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Named configuration of the comparison implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    Standard,
    Optimized,
}

impl Variant {
    pub const ALL: [Variant; 2] = [Variant::Standard, Variant::Optimized];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "Standard",
            Self::Optimized => "Optimized",
        }
    }
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One measured outcome for one case from one source.
///
/// `time_ms` and `function_evaluations` are always present. The remaining
/// measurements are `None` when the source did not supply them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRecord {
    pub case_id: String,
    /// `None` for the reference source.
    pub variant: Option<Variant>,
    /// Algorithm name (reference) or raw implementation label (comparison).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub time_ms: f64,
    pub function_evaluations: u64,
    pub iterations: Option<u64>,
    pub final_value: Option<f64>,
    pub parameter_error: Option<f64>,
    pub converged: bool,
}

/// Comparison-source lookup key. Never built by concatenating strings, so a
/// case named `foo_Standard` cannot collide with `(foo, Standard)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct VariantKey {
    pub case_id: String,
    pub variant: Variant,
}

impl VariantKey {
    pub fn new(case_id: impl Into<String>, variant: Variant) -> Self {
        Self { case_id: case_id.into(), variant }
    }
}

/// Reference-source records keyed by case identifier.
pub type ReferenceSet = BTreeMap<String, ResultRecord>;

/// Comparison-source records keyed by (case identifier, variant).
pub type ComparisonSet = BTreeMap<VariantKey, ResultRecord>;

// ---------------------------------------------------------------------------
// Reconciliation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Winner {
    ReferenceFaster,
    ComparisonFaster,
}

/// One reference case joined to whatever comparison variants exist for it.
///
/// Derived ratios are `None` when an operand is missing or the divisor is
/// not strictly positive. They are never stored as 0 or infinity.
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonRow {
    pub case_id: String,
    pub reference: ResultRecord,
    pub standard: Option<ResultRecord>,
    pub optimized: Option<ResultRecord>,
    pub speed_ratio_standard: Option<f64>,
    pub speed_ratio_optimized: Option<f64>,
    pub accuracy_ratio: Option<f64>,
    pub winner: Option<Winner>,
}

impl ComparisonRow {
    pub fn variant(&self, variant: Variant) -> Option<&ResultRecord> {
        match variant {
            Variant::Standard => self.standard.as_ref(),
            Variant::Optimized => self.optimized.as_ref(),
        }
    }

    /// No comparison-source entry exists for this case.
    pub fn is_unavailable(&self) -> bool {
        self.standard.is_none() && self.optimized.is_none()
    }
}

/// Totals over all rows of one run.
#[derive(Debug, Clone, Serialize)]
pub struct AggregateSummary {
    pub case_count: usize,
    pub reference_total_ms: f64,
    pub standard_total_ms: f64,
    pub optimized_total_ms: f64,
    pub reference_evaluations: u64,
    pub standard_evaluations: u64,
    pub optimized_evaluations: u64,
    pub overall_standard_ratio: Option<f64>,
    pub overall_optimized_ratio: Option<f64>,
    /// Global reference evaluations / Standard-variant evaluations.
    pub evaluation_ratio: Option<f64>,
    pub reference_faster: Vec<String>,
    pub comparison_faster: Vec<String>,
    pub unavailable: Vec<String>,
}

/// Qualitative tier for the overall Optimized speed ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Competitive,
    Reasonable,
    PerformanceGap,
}

impl Verdict {
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio > 0.8 {
            Self::Competitive
        } else if ratio > 0.5 {
            Self::Reasonable
        } else {
            Self::PerformanceGap
        }
    }
}

/// Which sides produced no records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IncompleteData {
    pub reference_missing: bool,
    pub comparison_missing: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Comparison {
    pub rows: Vec<ComparisonRow>,
    pub summary: AggregateSummary,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Reconciliation {
    Incomplete(IncompleteData),
    Complete(Comparison),
}

impl Reconciliation {
    pub fn comparison(&self) -> Option<&Comparison> {
        match self {
            Self::Complete(c) => Some(c),
            Self::Incomplete(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct RunMeta {
    pub engine_version: String,
    pub run_at: String,
    pub reference_path: String,
    pub comparison_path: String,
}

/// Machine-readable dump of one run.
#[derive(Debug, Clone, Serialize)]
pub struct RunOutput<'a> {
    pub meta: RunMeta,
    pub result: &'a Reconciliation,
}

impl RunOutput<'_> {
    pub fn to_json_pretty(&self) -> Result<String, CompareError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| CompareError::Io(format!("JSON serialization error: {e}")))
    }
}
