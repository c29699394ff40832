use crate::error::CompareError;
use crate::evidence::compute_summary;
use crate::model::{
    Comparison, ComparisonRow, ComparisonSet, IncompleteData, Reconciliation, ReferenceSet,
    ResultRecord, Variant, VariantKey, Winner,
};
use crate::structured::parse_structured;
use crate::text::TextGrammar;

/// State of one analysis run: both parsed sources, read-only once built.
#[derive(Debug, Clone, Default)]
pub struct AnalysisRun {
    pub reference: ReferenceSet,
    pub comparison: ComparisonSet,
}

impl AnalysisRun {
    pub fn new(reference: ReferenceSet, comparison: ComparisonSet) -> Self {
        Self { reference, comparison }
    }

    /// Parse both sources. `None` means the source file does not exist and
    /// is recorded as an empty set.
    pub fn from_sources(
        reference_csv: Option<&str>,
        comparison_log: Option<&str>,
        grammar: &TextGrammar,
    ) -> Result<Self, CompareError> {
        let reference = match reference_csv {
            Some(data) => parse_structured(data)?,
            None => ReferenceSet::new(),
        };
        let comparison = comparison_log
            .map(|log| grammar.parse(log))
            .unwrap_or_default();
        Ok(Self::new(reference, comparison))
    }

    pub fn reconcile(&self) -> Reconciliation {
        reconcile(self)
    }
}

/// Join both sources by case identifier.
///
/// Rows exist only for reference cases and come out in lexicographic case
/// order. If either side produced no records, no rows are built and the
/// result says which side is missing.
pub fn reconcile(run: &AnalysisRun) -> Reconciliation {
    let incomplete = IncompleteData {
        reference_missing: run.reference.is_empty(),
        comparison_missing: run.comparison.is_empty(),
    };
    if incomplete.reference_missing || incomplete.comparison_missing {
        log::warn!(
            "incomplete data (reference missing: {}, comparison missing: {})",
            incomplete.reference_missing,
            incomplete.comparison_missing
        );
        return Reconciliation::Incomplete(incomplete);
    }

    // ReferenceSet is a BTreeMap, so iteration is already ordered.
    let rows: Vec<ComparisonRow> = run
        .reference
        .values()
        .map(|reference| build_row(reference, &run.comparison))
        .collect();

    let summary = compute_summary(&rows, &run.comparison);
    log::debug!(
        "reconciled {} case(s), {} without comparison data",
        rows.len(),
        summary.unavailable.len()
    );

    Reconciliation::Complete(Comparison { rows, summary })
}

fn build_row(reference: &ResultRecord, comparison: &ComparisonSet) -> ComparisonRow {
    let lookup = |variant: Variant| {
        comparison
            .get(&VariantKey::new(reference.case_id.clone(), variant))
            .cloned()
    };
    let standard = lookup(Variant::Standard);
    let optimized = lookup(Variant::Optimized);

    let speed_ratio_standard = ratio(
        Some(reference.time_ms),
        standard.as_ref().map(|r| r.time_ms),
    );
    let speed_ratio_optimized = ratio(
        Some(reference.time_ms),
        optimized.as_ref().map(|r| r.time_ms),
    );
    let accuracy_ratio = ratio(
        reference.parameter_error,
        standard.as_ref().and_then(|r| r.parameter_error),
    );

    let winner = optimized.as_ref().and_then(|opt| {
        if reference.time_ms < opt.time_ms {
            Some(Winner::ReferenceFaster)
        } else if opt.time_ms < reference.time_ms {
            Some(Winner::ComparisonFaster)
        } else {
            None
        }
    });

    ComparisonRow {
        case_id: reference.case_id.clone(),
        reference: reference.clone(),
        standard,
        optimized,
        speed_ratio_standard,
        speed_ratio_optimized,
        accuracy_ratio,
        winner,
    }
}

/// `numerator / divisor` when both are present, the numerator is finite and
/// the divisor is strictly positive.
pub fn ratio(numerator: Option<f64>, divisor: Option<f64>) -> Option<f64> {
    match (numerator, divisor) {
        (Some(n), Some(d)) if n.is_finite() && d.is_finite() && d > 0.0 => Some(n / d),
        _ => None,
    }
}
