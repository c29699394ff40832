//! The comparison run: load config, parse both sources, reconcile, emit.

use std::path::Path;

use benchcmp_recon::chart::{renderer_for, ChartSeries};
use benchcmp_recon::config::{SourceConfig, CONFIG_FILE};
use benchcmp_recon::evidence::quick_summary;
use benchcmp_recon::model::{Comparison, Reconciliation, RunMeta, RunOutput};
use benchcmp_recon::report::{remediation_lines, render_report, speed_statement};
use benchcmp_recon::text::TextGrammar;
use benchcmp_recon::{AnalysisRun, CompareConfig, CompareError};

use crate::CliError;

pub fn cmd_compare(base_dir: &Path) -> Result<(), CliError> {
    let config = load_config(base_dir)?;

    println!("🔍 Analyzing benchmark results...");

    let reference_text = read_source(base_dir, &config.reference)?;
    let comparison_text = read_source(base_dir, &config.comparison)?;

    let run = AnalysisRun::from_sources(
        reference_text.as_deref(),
        comparison_text.as_deref(),
        &TextGrammar::default(),
    )
    .map_err(|e| source_err(e, &config.reference))?;

    let result = run.reconcile();

    let report_path = base_dir.join(&config.output.report);
    write_file(&report_path, render_report(&result, &config).as_bytes())?;
    println!("📝 Analysis complete!");
    println!("📄 Report saved as: {}", config.output.report);

    if let Some(chart) = config.output.chart_path() {
        emit_chart(base_dir, chart, &result, &config);
    }

    if let Some(ref json) = config.output.json {
        let output = RunOutput {
            meta: RunMeta {
                engine_version: crate::VERSION.to_string(),
                run_at: chrono::Utc::now().to_rfc3339(),
                reference_path: config.reference.path.clone(),
                comparison_path: config.comparison.path.clone(),
            },
            result: &result,
        };
        let body = output.to_json_pretty().map_err(|e| CliError::new(e.to_string()))?;
        write_file(&base_dir.join(json), body.as_bytes())?;
        println!("🧾 JSON written to: {json}");
    }

    print_quick_summary(&result, &config);
    Ok(())
}

fn load_config(base_dir: &Path) -> Result<CompareConfig, CliError> {
    let path = base_dir.join(CONFIG_FILE);
    if !path.exists() {
        log::debug!("no {CONFIG_FILE}, using defaults");
        return Ok(CompareConfig::default());
    }

    let text = std::fs::read_to_string(&path)
        .map_err(|e| CliError::new(format!("cannot read {}: {e}", path.display())))?;
    CompareConfig::from_toml(&text).map_err(|e| {
        CliError::new(e.to_string()).with_hint(format!("fix or remove {CONFIG_FILE}"))
    })
}

/// `Ok(None)` when the file does not exist: the run continues without it.
fn read_source(base_dir: &Path, source: &SourceConfig) -> Result<Option<String>, CliError> {
    let path = base_dir.join(&source.path);
    if !path.exists() {
        let missing = CompareError::MissingInput {
            source: source.label.clone(),
            path: source.path.clone(),
        };
        log::warn!("{missing}");
        println!(
            "Warning: {} not found. Run {} benchmarks first: {}",
            source.path, source.label, source.regenerate
        );
        return Ok(None);
    }

    let bytes = std::fs::read(&path)
        .map_err(|e| CliError::new(format!("cannot read {}: {e}", path.display())))?;
    Ok(Some(decode_text(&bytes, &source.path)))
}

/// Sources are text but not always UTF-8: `dotnet run > file` on Windows
/// writes UTF-16LE with a BOM. Undecodable bytes become U+FFFD, so those
/// lines simply fail to parse.
fn decode_text(bytes: &[u8], name: &str) -> String {
    if let Some(body) = bytes.strip_prefix(&[0xFF, 0xFE]) {
        log::info!("{name}: decoding as UTF-16LE");
        let units: Vec<u16> = body
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }

    let bytes = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(e) => {
            log::warn!("{name}: not valid UTF-8 ({e}); undecodable bytes are replaced");
            String::from_utf8_lossy(bytes).into_owned()
        }
    }
}


fn source_err(err: CompareError, reference: &SourceConfig) -> CliError {
    let hint = match &err {
        CompareError::MalformedRecord { .. } | CompareError::MissingColumn { .. } => Some(format!(
            "{} is corrupt; regenerate it with: {}",
            reference.path, reference.regenerate
        )),
        _ => None,
    };
    let cli_err = CliError::new(format!("{}: {err}", reference.path));
    match hint {
        Some(hint) => cli_err.with_hint(hint),
        None => cli_err,
    }
}

fn emit_chart(base_dir: &Path, chart: &str, result: &Reconciliation, config: &CompareConfig) {
    let series = match result.comparison() {
        Some(c) => ChartSeries::from_rows(&c.rows, config),
        None => {
            println!("No common tests found for charting");
            return;
        }
    };
    if series.is_empty() {
        println!("No common tests found for charting");
        return;
    }

    let rendered = renderer_for(chart).and_then(|renderer| renderer.render(&series));
    let bytes = match rendered {
        Ok(bytes) => bytes,
        Err(e) => {
            log::warn!("{e}");
            println!("Chart skipped: {e}");
            return;
        }
    };

    match write_file(&base_dir.join(chart), &bytes) {
        Ok(()) => println!("📊 Performance chart saved as {chart}"),
        Err(e) => println!("Chart skipped: {}", e.message),
    }
}

fn write_file(path: &Path, contents: &[u8]) -> Result<(), CliError> {
    std::fs::write(path, contents)
        .map_err(|e| CliError::new(format!("cannot write {}: {e}", path.display())))
}

fn print_quick_summary(result: &Reconciliation, config: &CompareConfig) {
    println!();
    println!("{}", "=".repeat(60));
    println!("QUICK SUMMARY");
    println!("{}", "=".repeat(60));

    match result {
        Reconciliation::Incomplete(info) => {
            println!("❌ Incomplete benchmark data");
            for line in remediation_lines(info, config) {
                println!("   {line}");
            }
        }
        Reconciliation::Complete(comparison) => print_ratios(comparison, config),
    }
}

fn print_ratios(comparison: &Comparison, config: &CompareConfig) {
    let reference = &config.reference.label;
    let other = &config.comparison.label;
    let quick = quick_summary(&comparison.rows);

    if quick.cases == 0 {
        println!("❌ No matching test cases found");
        return;
    }

    match quick.mean_ratio {
        Some(mean) if mean > 0.0 => {
            println!("✅ Tested {} functions on same hardware", quick.cases);
            println!(
                "📊 {other} Optimized achieves {:.1}% of {reference} performance",
                mean * 100.0
            );
            println!("⚡ {} on average", speed_statement(mean, reference, other));
        }
        _ => println!("❌ Unable to calculate performance ratios"),
    }
}
