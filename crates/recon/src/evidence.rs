use crate::engine::ratio;
use crate::model::{AggregateSummary, ComparisonRow, ComparisonSet, Variant, Winner};

/// Compute totals from reconciled rows.
///
/// Reference evaluations are summed over every row (every reference record
/// has one). Variant evaluations are summed over the whole comparison set,
/// matched or not, so the efficiency ratio is a global figure.
pub fn compute_summary(rows: &[ComparisonRow], comparison: &ComparisonSet) -> AggregateSummary {
    let mut reference_total_ms = 0.0;
    let mut standard_total_ms = 0.0;
    let mut optimized_total_ms = 0.0;
    let mut reference_evaluations = 0u64;
    let mut reference_faster = Vec::new();
    let mut comparison_faster = Vec::new();
    let mut unavailable = Vec::new();

    for row in rows {
        reference_total_ms += row.reference.time_ms;
        reference_evaluations =
            reference_evaluations.saturating_add(row.reference.function_evaluations);

        if let Some(ref standard) = row.standard {
            standard_total_ms += standard.time_ms;
        }
        if let Some(ref opt) = row.optimized {
            optimized_total_ms += opt.time_ms;
        }

        match row.winner {
            Some(Winner::ReferenceFaster) => reference_faster.push(row.case_id.clone()),
            Some(Winner::ComparisonFaster) => comparison_faster.push(row.case_id.clone()),
            None => {}
        }

        if row.is_unavailable() {
            unavailable.push(row.case_id.clone());
        }
    }

    let variant_evaluations = |variant: Variant| -> u64 {
        comparison
            .iter()
            .filter(|(key, _)| key.variant == variant)
            .fold(0u64, |total, (_, r)| total.saturating_add(r.function_evaluations))
    };
    let standard_evaluations = variant_evaluations(Variant::Standard);
    let optimized_evaluations = variant_evaluations(Variant::Optimized);

    AggregateSummary {
        case_count: rows.len(),
        reference_total_ms,
        standard_total_ms,
        optimized_total_ms,
        reference_evaluations,
        standard_evaluations,
        optimized_evaluations,
        overall_standard_ratio: paired_ratio(rows, Variant::Standard),
        overall_optimized_ratio: paired_ratio(rows, Variant::Optimized),
        evaluation_ratio: ratio(
            Some(reference_evaluations as f64),
            Some(standard_evaluations as f64),
        ),
        reference_faster,
        comparison_faster,
        unavailable,
    }
}

/// Σ reference time / Σ variant time, over the rows that have the variant.
fn paired_ratio(rows: &[ComparisonRow], variant: Variant) -> Option<f64> {
    let (reference, other) = rows
        .iter()
        .filter_map(|row| row.variant(variant).map(|v| (row.reference.time_ms, v.time_ms)))
        .fold((0.0, 0.0), |(ra, va), (r, v)| (ra + r, va + v));
    ratio(Some(reference), Some(other))
}

/// Console headline: mean of the per-case Optimized speed ratios.
#[derive(Debug, Clone, PartialEq)]
pub struct QuickSummary {
    /// Cases that have Optimized data.
    pub cases: usize,
    /// `None` when no case has a defined ratio.
    pub mean_ratio: Option<f64>,
}

pub fn quick_summary(rows: &[ComparisonRow]) -> QuickSummary {
    let cases = rows.iter().filter(|r| r.optimized.is_some()).count();
    let ratios: Vec<f64> = rows.iter().filter_map(|r| r.speed_ratio_optimized).collect();
    let mean_ratio = if ratios.is_empty() {
        None
    } else {
        Some(ratios.iter().sum::<f64>() / ratios.len() as f64)
    };
    QuickSummary { cases, mean_ratio }
}
