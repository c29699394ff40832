use std::path::PathBuf;

use benchcmp_recon::chart::{renderer_for, ChartSeries};
use benchcmp_recon::evidence::quick_summary;
use benchcmp_recon::model::{Reconciliation, RunMeta, RunOutput, Winner};
use benchcmp_recon::report::{render_report, INCOMPLETE_MARKER};
use benchcmp_recon::text::TextGrammar;
use benchcmp_recon::{AnalysisRun, CompareConfig, CompareError};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn fixture(name: &str) -> String {
    let path = fixtures_dir().join(name);
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()))
}

fn load_and_run() -> Reconciliation {
    let csv = fixture("nlopt_benchmark_results.csv");
    let log = fixture("csharp_results.txt");
    AnalysisRun::from_sources(Some(&csv), Some(&log), &TextGrammar::default())
        .unwrap()
        .reconcile()
}

// -------------------------------------------------------------------------
// Reconciliation
// -------------------------------------------------------------------------

#[test]
fn rows_follow_reference_cases_in_order() {
    let result = load_and_run();
    let comparison = result.comparison().expect("both sources present");

    let cases: Vec<&str> = comparison.rows.iter().map(|r| r.case_id.as_str()).collect();
    assert_eq!(cases, vec!["Beale", "Booth", "Himmelblau", "Powell", "Rosenbrock", "Sphere"]);

    // Ackley exists only in the comparison log.
    assert!(!cases.contains(&"Ackley"));
}

#[test]
fn fixture_summary() {
    let result = load_and_run();
    let s = &result.comparison().unwrap().summary;

    assert_eq!(s.case_count, 6);
    assert_eq!(s.reference_faster, vec!["Beale", "Sphere"]);
    assert_eq!(s.comparison_faster, vec!["Rosenbrock"]);
    assert_eq!(s.unavailable, vec!["Himmelblau", "Powell"]);
    assert_eq!(s.reference_evaluations, 3015);
    assert_eq!(s.standard_evaluations, 1081);
    assert!((s.evaluation_ratio.unwrap() - 3015.0 / 1081.0).abs() < 1e-9);
    assert!((s.overall_optimized_ratio.unwrap() - 19.0 / 18.0).abs() < 1e-9);
    assert!((s.overall_standard_ratio.unwrap() - 20.8 / 27.2).abs() < 1e-9);
}

#[test]
fn fixture_rows() {
    let result = load_and_run();
    let rows = &result.comparison().unwrap().rows;

    let rosenbrock = rows.iter().find(|r| r.case_id == "Rosenbrock").unwrap();
    assert_eq!(rosenbrock.winner, Some(Winner::ComparisonFaster));
    assert!((rosenbrock.accuracy_ratio.unwrap() - 2.0 / 3.0).abs() < 1e-9);
    assert_eq!(rosenbrock.reference.label.as_deref(), Some("LN_NELDERMEAD"));

    let beale = rows.iter().find(|r| r.case_id == "Beale").unwrap();
    assert!(!beale.optimized.as_ref().unwrap().converged);
    assert!(beale.standard.as_ref().unwrap().converged);

    let booth = rows.iter().find(|r| r.case_id == "Booth").unwrap();
    assert!(booth.optimized.is_none());
    assert_eq!(booth.speed_ratio_optimized, None);
    assert_eq!(booth.winner, None);

    let powell = rows.iter().find(|r| r.case_id == "Powell").unwrap();
    assert!(powell.is_unavailable());
    assert!(!powell.reference.converged);
}

#[test]
fn quick_summary_over_fixture() {
    let result = load_and_run();
    let quick = quick_summary(&result.comparison().unwrap().rows);
    assert_eq!(quick.cases, 3);
    let expected = (4.4 / 5.0 + 12.5 / 10.2 + 2.1 / 2.8) / 3.0;
    assert!((quick.mean_ratio.unwrap() - expected).abs() < 1e-9);
}

#[test]
fn malformed_reference_aborts() {
    let csv = fixture("malformed.csv");
    let log = fixture("csharp_results.txt");
    let err = AnalysisRun::from_sources(Some(&csv), Some(&log), &TextGrammar::default()).unwrap_err();
    match err {
        CompareError::MalformedRecord { row, field, value } => {
            assert_eq!(row, 2);
            assert_eq!(field, "FunctionEvaluations");
            assert_eq!(value, "ninety");
        }
        other => panic!("expected MalformedRecord, got {other}"),
    }
}

// -------------------------------------------------------------------------
// Report
// -------------------------------------------------------------------------

#[test]
fn full_report_from_fixtures() {
    let report = render_report(&load_and_run(), &CompareConfig::default());

    assert!(report.starts_with("# Real NLopt vs C# Performance Comparison\n"));
    assert!(report.contains("- C# Optimized: 1.06x (C# is 1.1x faster)"));
    assert!(report.contains("- C# Standard: 0.76x (NLopt is 1.3x faster)"));
    assert!(report.contains("- NLopt total function evaluations: 3,015"));
    assert!(report.contains("- C# total function evaluations: 1,081"));
    assert!(report.contains("more evaluations"));
    assert!(report.contains("**NLopt Faster On**: Beale, Sphere"));
    assert!(report.contains("**C# Faster On**: Rosenbrock"));
    assert!(report.contains("Competitive Performance"));
    assert!(report.contains("_Data unavailable (C# has no entry): Himmelblau, Powell_"));
    assert!(!report.contains("Accord"));
    assert!(!report.contains("NaN"));
}

#[test]
fn report_is_deterministic() {
    let a = render_report(&load_and_run(), &CompareConfig::default());
    let b = render_report(&load_and_run(), &CompareConfig::default());
    assert_eq!(a, b);
}

#[test]
fn custom_config_relabels_report() {
    let config = CompareConfig::from_toml(&fixture("custom.benchcmp.toml")).unwrap();
    let report = render_report(&load_and_run(), &config);

    assert!(report.starts_with("# Nelder-Mead Shootout\n"));
    assert!(report.contains("| Rust Std Time(ms)"));
    assert!(report.contains("**Rust Faster On**: Rosenbrock"));
    assert!(report.contains("- Single CI runner"));
    assert!(!report.contains(".NET"));
    assert_eq!(config.output.chart_path(), Some("chart.svg"));
}

#[test]
fn missing_reference_file_scenario() {
    let log = fixture("csharp_results.txt");
    let result = AnalysisRun::from_sources(None, Some(&log), &TextGrammar::default())
        .unwrap()
        .reconcile();
    assert!(matches!(result, Reconciliation::Incomplete(_)));

    let report = render_report(&result, &CompareConfig::default());
    assert!(report.contains(INCOMPLETE_MARKER));
    assert!(report.contains("NLopt results missing"));
    assert!(report.contains("make nlopt_benchmark"));
    assert!(!report.contains("## Performance Comparison Results"));
}

#[test]
fn unrecognized_log_behaves_like_missing_log() {
    let csv = fixture("nlopt_benchmark_results.csv");
    let result = AnalysisRun::from_sources(Some(&csv), Some("nothing to see\n"), &TextGrammar::default())
        .unwrap()
        .reconcile();
    let report = render_report(&result, &CompareConfig::default());
    assert!(report.contains("C# results missing. Run: `dotnet run perf > Benchmarks/csharp_results.txt`"));
    assert!(!report.contains("NLopt results missing"));
}

// -------------------------------------------------------------------------
// Chart + JSON
// -------------------------------------------------------------------------

#[test]
fn chart_from_fixtures() {
    let config = CompareConfig::default();
    let result = load_and_run();
    let series = ChartSeries::from_rows(&result.comparison().unwrap().rows, &config);
    assert_eq!(series.cases, vec!["Beale", "Booth", "Rosenbrock", "Sphere"]);
    assert_eq!(series.optimized[1], 2.6);

    let renderer = renderer_for(config.output.chart_path().unwrap()).unwrap();
    let svg = String::from_utf8(renderer.render(&series).unwrap()).unwrap();
    assert!(svg.contains(">Booth</text>"));
    // Powell has no Standard data and is not charted.
    assert!(!svg.contains(">48.7</text>"));
}

#[test]
fn png_output_is_rendering_unavailable() {
    let err = renderer_for("performance_comparison.png").err().unwrap();
    assert!(err.is_recoverable());
}

#[test]
fn json_dump_shape() {
    let result = load_and_run();
    let output = RunOutput {
        meta: RunMeta {
            engine_version: "test".into(),
            run_at: "2026-01-01T00:00:00Z".into(),
            reference_path: "nlopt_benchmark_results.csv".into(),
            comparison_path: "csharp_results.txt".into(),
        },
        result: &result,
    };
    let value: serde_json::Value = serde_json::to_value(&output).unwrap();

    assert_eq!(value["result"]["status"], "complete");
    let rows = value["result"]["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 6);
    assert_eq!(rows[0]["case_id"], "Beale");
    assert_eq!(rows[0]["winner"], "reference_faster");
    assert!(rows[1]["speed_ratio_optimized"].is_null());
    assert_eq!(rows[4]["standard"]["variant"], "standard");
}

#[test]
fn json_dump_of_incomplete_run() {
    let result = AnalysisRun::default().reconcile();
    let value = serde_json::to_value(&result).unwrap();
    assert_eq!(value["status"], "incomplete");
    assert_eq!(value["reference_missing"], true);
    assert_eq!(value["comparison_missing"], true);
}
