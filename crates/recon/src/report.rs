//! Markdown report renderer.
//!
//! Output is a pure function of the reconciliation and config: no
//! timestamps, no hash-map iteration order.

use crate::config::{CompareConfig, SourceConfig};
use crate::model::{AggregateSummary, Comparison, ComparisonRow, IncompleteData, Reconciliation, Verdict};

/// Marker line emitted instead of the comparison table when a source is empty.
pub const INCOMPLETE_MARKER: &str = "⚠️  **Incomplete Data**";

const UNDEFINED: &str = "n/a";
const UNAVAILABLE: &str = "unavailable";

pub fn render_report(result: &Reconciliation, config: &CompareConfig) -> String {
    let mut out = vec![format!("# {}", config.title()), String::new()];

    match result {
        Reconciliation::Incomplete(info) => render_incomplete(&mut out, info, config),
        Reconciliation::Complete(comparison) => render_complete(&mut out, comparison, config),
    }

    let mut text = out.join("\n");
    text.push('\n');
    text
}

/// One bullet per missing source, naming the command that regenerates it.
pub fn remediation_lines(info: &IncompleteData, config: &CompareConfig) -> Vec<String> {
    let mut lines = Vec::new();
    if info.reference_missing {
        lines.push(missing_line(&config.reference));
    }
    if info.comparison_missing {
        lines.push(missing_line(&config.comparison));
    }
    lines
}

fn missing_line(source: &SourceConfig) -> String {
    format!("{} results missing. Run: `{}`", source.label, source.regenerate)
}

fn render_incomplete(out: &mut Vec<String>, info: &IncompleteData, config: &CompareConfig) {
    out.push(INCOMPLETE_MARKER.into());
    out.push(String::new());
    for line in remediation_lines(info, config) {
        out.push(format!("- {line}"));
    }
}

fn render_complete(out: &mut Vec<String>, comparison: &Comparison, config: &CompareConfig) {
    let reference = config.reference.label.as_str();
    let other = config.comparison.label.as_str();
    let summary = &comparison.summary;

    out.push("## Performance Comparison Results".into());
    out.push(String::new());
    render_table(out, &comparison.rows, reference, other);
    if !summary.unavailable.is_empty() {
        out.push(String::new());
        out.push(format!(
            "_Data unavailable ({other} has no entry): {}_",
            summary.unavailable.join(", ")
        ));
    }

    out.push(String::new());
    out.push("## Summary Statistics".into());
    out.push(String::new());
    out.push(format!("**Overall Performance Ratios** ({reference} time / {other} time):"));
    out.push(overall_line(&format!("{other} Standard"), summary.overall_standard_ratio, reference, other));
    out.push(overall_line(&format!("{other} Optimized"), summary.overall_optimized_ratio, reference, other));

    out.push(String::new());
    out.push("## Function Evaluation Efficiency".into());
    out.push(String::new());
    render_evaluations(out, summary, reference, other);

    out.push(String::new());
    out.push("## Detailed Analysis".into());
    out.push(String::new());
    if summary.reference_faster.is_empty() && summary.comparison_faster.is_empty() {
        out.push("No case has Optimized timings that differ between both sides.".into());
    }
    if !summary.reference_faster.is_empty() {
        out.push(format!("**{reference} Faster On**: {}", summary.reference_faster.join(", ")));
    }
    if !summary.comparison_faster.is_empty() {
        out.push(format!("**{other} Faster On**: {}", summary.comparison_faster.join(", ")));
    }

    out.push(String::new());
    out.push("## Key Findings".into());
    out.push(String::new());
    out.push(match summary.overall_optimized_ratio.map(Verdict::from_ratio) {
        Some(Verdict::Competitive) => format!(
            "✅ **Competitive Performance**: {other} optimized version achieves >80% of {reference} performance"
        ),
        Some(Verdict::Reasonable) => format!(
            "⚠️  **Reasonable Performance**: {other} achieves 50-80% of {reference} performance"
        ),
        Some(Verdict::PerformanceGap) => {
            format!("❌ **Performance Gap**: {other} significantly slower than {reference}")
        }
        None => format!("No verdict: {other} Optimized data unavailable"),
    });

    if !config.report.environment.is_empty() {
        out.push(String::new());
        out.push("## Test Environment".into());
        out.push(String::new());
        for line in &config.report.environment {
            out.push(format!("- {line}"));
        }
    }
}

fn render_table(out: &mut Vec<String>, rows: &[ComparisonRow], reference: &str, other: &str) {
    let headers = [
        "Test Function".to_string(),
        format!("{reference} Time(ms)"),
        format!("{other} Std Time(ms)"),
        format!("{other} Opt Time(ms)"),
        "Speedup Ratio".to_string(),
        "Accuracy Comparison".to_string(),
    ];

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        widths[0] = widths[0].max(row.case_id.chars().count());
    }

    let header_cells: Vec<String> = headers
        .iter()
        .zip(&widths)
        .map(|(h, &w)| format!("{h:<w$}"))
        .collect();
    out.push(format!("| {} |", header_cells.join(" | ")));
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push(format!("|-{}-|", rule.join("-|-")));

    for row in rows {
        let missing = if row.is_unavailable() { UNAVAILABLE } else { UNDEFINED };
        let cells = [
            format!("{:<w$}", row.case_id, w = widths[0]),
            format!("{:>w$}", format_time(Some(row.reference.time_ms), missing), w = widths[1]),
            format!(
                "{:>w$}",
                format_time(row.standard.as_ref().map(|r| r.time_ms), missing),
                w = widths[2]
            ),
            format!(
                "{:>w$}",
                format_time(row.optimized.as_ref().map(|r| r.time_ms), missing),
                w = widths[3]
            ),
            format!("{:>w$}", format_ratio(row.speed_ratio_optimized), w = widths[4]),
            format!("{:>w$}", format_ratio(row.accuracy_ratio), w = widths[5]),
        ];
        out.push(format!("| {} |", cells.join(" | ")));
    }
}

fn render_evaluations(out: &mut Vec<String>, summary: &AggregateSummary, reference: &str, other: &str) {
    let Some(ratio) = summary.evaluation_ratio else {
        out.push(format!("- Data unavailable: no {other} Standard evaluations recorded"));
        return;
    };

    out.push(format!(
        "- {reference} total function evaluations: {}",
        group_thousands(summary.reference_evaluations)
    ));
    out.push(format!(
        "- {other} total function evaluations: {}",
        group_thousands(summary.standard_evaluations)
    ));
    out.push(format!("- Evaluation efficiency ratio: {ratio:.2}x"));
    out.push(format!("  * {}", evaluation_statement(ratio, reference, other)));
}

/// `ratio` is reference evaluations / comparison evaluations.
pub fn evaluation_statement(ratio: f64, reference: &str, other: &str) -> String {
    if ratio < 1.0 {
        format!(
            "{reference} needs {:.1}% fewer evaluations than {other}",
            (1.0 - ratio) * 100.0
        )
    } else {
        format!(
            "{reference} needs {:.1}% more evaluations than {other}",
            (ratio - 1.0) * 100.0
        )
    }
}

/// `ratio` is reference time / comparison time.
pub fn speed_statement(ratio: f64, reference: &str, other: &str) -> String {
    if ratio < 1.0 {
        format!("{reference} is {:.1}x faster", 1.0 / ratio)
    } else {
        format!("{other} is {ratio:.1}x faster")
    }
}

fn overall_line(name: &str, ratio: Option<f64>, reference: &str, other: &str) -> String {
    match ratio {
        Some(r) if r > 0.0 => format!("- {name}: {r:.2}x ({})", speed_statement(r, reference, other)),
        Some(r) => format!("- {name}: {r:.2}x"),
        None => format!("- {name}: Data unavailable"),
    }
}

pub fn format_time(value: Option<f64>, missing: &str) -> String {
    value.map_or_else(|| missing.to_string(), |v| format!("{v:.1}"))
}

pub fn format_ratio(value: Option<f64>) -> String {
    value.map_or_else(|| UNDEFINED.to_string(), |v| format!("{v:.2}x"))
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::AnalysisRun;
    use crate::model::IncompleteData;
    use crate::text::TextGrammar;

    const CSV: &str = "\
TestName,ExecutionTime_ms,FunctionEvaluations,FinalValue,ParameterError,Converged,Algorithm
rosenbrock,12.5,340,0.0001,0.00002,true,NelderMead
sphere,2.0,100,0,0.0001,true,NelderMead
zakharov,9.0,500,0,0.0001,true,NelderMead
";

    const LOG: &str = "\
rosenbrock Ours (Standard) 15.0 50 360 0.00003 CONVERGED
sphere Ours (Standard) 4.0 20 150 0.0002 CONVERGED
sphere Ours (Optimized) 2.5 20 140 0.0002 CONVERGED
";

    fn render(csv: Option<&str>, log: Option<&str>) -> String {
        let run = AnalysisRun::from_sources(csv, log, &TextGrammar::default()).unwrap();
        render_report(&run.reconcile(), &CompareConfig::default())
    }

    #[test]
    fn group_thousands_inserts_commas() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(1234567), "1,234,567");
    }

    #[test]
    fn formatting_of_undefined_values() {
        assert_eq!(format_time(Some(12.46), UNDEFINED), "12.5");
        assert_eq!(format_time(None, UNAVAILABLE), "unavailable");
        assert_eq!(format_ratio(Some(0.6666)), "0.67x");
        assert_eq!(format_ratio(None), "n/a");
    }

    #[test]
    fn evaluation_statement_is_exhaustive() {
        assert!(evaluation_statement(0.6, "NLopt", "C#").contains("40.0% fewer evaluations"));
        assert!(evaluation_statement(1.0, "NLopt", "C#").contains("0.0% more evaluations"));
        assert!(evaluation_statement(1.25, "NLopt", "C#").contains("25.0% more evaluations"));
    }

    #[test]
    fn speed_statement_framing() {
        assert_eq!(speed_statement(0.5, "NLopt", "C#"), "NLopt is 2.0x faster");
        assert_eq!(speed_statement(2.0, "NLopt", "C#"), "C# is 2.0x faster");
    }

    #[test]
    fn complete_report_sections_in_order() {
        let report = render(Some(CSV), Some(LOG));
        let order = [
            "# Real NLopt vs C# Performance Comparison",
            "## Performance Comparison Results",
            "## Summary Statistics",
            "## Function Evaluation Efficiency",
            "## Detailed Analysis",
            "## Key Findings",
            "## Test Environment",
        ];
        let mut last = 0;
        for heading in order {
            let pos = report.find(heading).unwrap_or_else(|| panic!("missing {heading}"));
            assert!(pos >= last, "{heading} out of order");
            last = pos;
        }
        assert!(!report.contains(INCOMPLETE_MARKER));
    }

    #[test]
    fn table_rows_and_unavailable_marking() {
        let report = render(Some(CSV), Some(LOG));
        let row = |case: &str| {
            report
                .lines()
                .find(|l| l.starts_with(&format!("| {case}")))
                .unwrap_or_else(|| panic!("no row for {case}"))
                .to_string()
        };

        let rosenbrock = row("rosenbrock");
        assert!(rosenbrock.contains("12.5"));
        assert!(rosenbrock.contains("15.0"));
        assert!(rosenbrock.contains("0.67x"));
        assert!(rosenbrock.contains("n/a"));

        let sphere = row("sphere");
        assert!(sphere.contains("0.80x"));

        let zakharov = row("zakharov");
        assert!(zakharov.contains("unavailable"));
        assert!(!zakharov.contains("0.00x"));
        assert!(!zakharov.contains("inf"));
        assert!(report.contains("_Data unavailable (C# has no entry): zakharov_"));
    }

    #[test]
    fn table_columns_share_width() {
        let report = render(Some(CSV), Some(LOG));
        let table: Vec<&str> = report.lines().filter(|l| l.starts_with('|')).collect();
        assert_eq!(table.len(), 5);
        let width = table[0].chars().count();
        assert!(table.iter().all(|l| l.chars().count() == width));
    }

    #[test]
    fn summary_and_verdict() {
        let report = render(Some(CSV), Some(LOG));
        // Optimized pairs: sphere only, 2.0 / 2.5 = 0.8 -> reasonable tier.
        assert!(report.contains("- C# Optimized: 0.80x (NLopt is 1."));
        assert!(report.contains("Reasonable Performance"));
        assert!(report.contains("**NLopt Faster On**: sphere"));
        assert!(!report.contains("**C# Faster On**"));
        // 940 / 510 reference vs Standard evaluations.
        assert!(report.contains("- NLopt total function evaluations: 940"));
        assert!(report.contains("- Evaluation efficiency ratio: 1.84x"));
        assert!(report.contains("more evaluations"));
        assert!(!report.contains("fewer evaluations"));
    }

    #[test]
    fn missing_optimized_data_has_no_verdict() {
        let log = "rosenbrock Ours (Standard) 15.0 50 360 0.00003 CONVERGED\n";
        let report = render(Some(CSV), Some(log));
        assert!(report.contains("- C# Optimized: Data unavailable"));
        assert!(report.contains("No verdict"));
    }

    #[test]
    fn both_sources_missing_renders_incomplete_block() {
        let report = render(None, None);
        assert!(report.contains(INCOMPLETE_MARKER));
        assert!(report.contains("- NLopt results missing. Run: `make install_nlopt"));
        assert!(report.contains("- C# results missing. Run: `dotnet run perf"));
        assert!(!report.lines().any(|l| l.starts_with('|')));
    }

    #[test]
    fn reference_missing_omits_table() {
        let log = "sphere Ours (Optimized) 2.5 20 140 0.0002 CONVERGED\n";
        let report = render(None, Some(log));
        assert!(report.contains("NLopt results missing"));
        assert!(!report.contains("C# results missing"));
        assert!(!report.contains("## Performance Comparison Results"));
    }

    #[test]
    fn remediation_uses_configured_labels() {
        let config = CompareConfig::from_toml(
            "[comparison]\nlabel = \"Rust\"\nregenerate = \"cargo bench > rust.txt\"\n",
        )
        .unwrap();
        let info = IncompleteData { reference_missing: false, comparison_missing: true };
        assert_eq!(
            remediation_lines(&info, &config),
            vec!["Rust results missing. Run: `cargo bench > rust.txt`"]
        );
    }
}
