//! Grouped bar chart of per-case execution times.
//!
//! The chart is a best-effort artifact. Renderers are chosen by output file
//! extension; an extension with no renderer is `RenderingUnavailable`, which
//! callers downgrade to a notice.

use std::path::Path;

use crate::config::CompareConfig;
use crate::error::CompareError;
use crate::model::ComparisonRow;

/// Finite per-case time triplets plus axis labels.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub title: String,
    pub cases: Vec<String>,
    /// Legend entries for reference, Standard and Optimized bars.
    pub legend: [String; 3],
    pub reference: Vec<f64>,
    pub standard: Vec<f64>,
    pub optimized: Vec<f64>,
}

impl ChartSeries {
    /// Chart every row that has Standard data. A missing Optimized time is
    /// drawn with the Standard time; this substitution exists only here.
    pub fn from_rows(rows: &[ComparisonRow], config: &CompareConfig) -> Self {
        let reference_label = &config.reference.label;
        let other = &config.comparison.label;
        let mut series = Self {
            title: format!("Performance Comparison: {reference_label} vs {other} Implementation"),
            cases: Vec::new(),
            legend: [
                reference_label.clone(),
                format!("{other} Standard"),
                format!("{other} Optimized"),
            ],
            reference: Vec::new(),
            standard: Vec::new(),
            optimized: Vec::new(),
        };

        for row in rows {
            let Some(ref standard) = row.standard else {
                continue;
            };
            series.cases.push(row.case_id.clone());
            series.reference.push(row.reference.time_ms);
            series.standard.push(standard.time_ms);
            series
                .optimized
                .push(row.optimized.as_ref().map_or(standard.time_ms, |o| o.time_ms));
        }

        series
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    fn groups(&self) -> impl Iterator<Item = (&str, [f64; 3])> + '_ {
        self.cases.iter().enumerate().map(move |(i, case)| {
            (case.as_str(), [self.reference[i], self.standard[i], self.optimized[i]])
        })
    }
}

pub trait ChartRenderer {
    fn render(&self, series: &ChartSeries) -> Result<Vec<u8>, CompareError>;
}

/// Pick a renderer for the output path's extension.
pub fn renderer_for(path: &str) -> Result<Box<dyn ChartRenderer>, CompareError> {
    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "svg" => Ok(Box::new(SvgRenderer)),
        "" => Err(CompareError::RenderingUnavailable(format!(
            "'{path}' has no file extension (supported: svg)"
        ))),
        other => Err(CompareError::RenderingUnavailable(format!(
            "no renderer for .{other} output (supported: svg); set [output] chart to a .svg path"
        ))),
    }
}

// ---------------------------------------------------------------------------
// SVG
// ---------------------------------------------------------------------------

const HEIGHT: f64 = 520.0;
const MARGIN_LEFT: f64 = 80.0;
const MARGIN_RIGHT: f64 = 30.0;
const MARGIN_TOP: f64 = 60.0;
const MARGIN_BOTTOM: f64 = 120.0;
const GROUP_W: f64 = 96.0;
const BAR_W: f64 = 24.0;
const COLOURS: [&str; 3] = ["#4C78A8", "#F58518", "#54A24B"];

/// Grouped bars on a log10 time axis, each bar labelled with its value.
pub struct SvgRenderer;

impl ChartRenderer for SvgRenderer {
    fn render(&self, series: &ChartSeries) -> Result<Vec<u8>, CompareError> {
        if series.is_empty() {
            return Err(CompareError::RenderingUnavailable("no cases to chart".into()));
        }

        let width = (MARGIN_LEFT + MARGIN_RIGHT + GROUP_W * series.cases.len() as f64).max(640.0);
        let plot_h = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
        let base_y = MARGIN_TOP + plot_h;

        let positive = series
            .reference
            .iter()
            .chain(&series.standard)
            .chain(&series.optimized)
            .copied()
            .filter(|v| v.is_finite() && *v > 0.0);
        let (lo_val, hi_val) = positive.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
        let (lo_val, hi_val) = if lo_val.is_finite() { (lo_val, hi_val) } else { (0.1, 1.0) };

        let (axis_lo, axis_hi) = (lo_val * 0.5, hi_val * 2.0);
        let lo_log = axis_lo.log10();
        let hi_log = axis_hi.log10();
        if !lo_log.is_finite() || !hi_log.is_finite() {
            return Err(CompareError::RenderingUnavailable(format!(
                "time range {lo_val:e}..{hi_val:e} ms cannot be drawn on a log axis"
            )));
        }
        let y_of = |v: f64| -> f64 {
            let clamped = v.clamp(axis_lo, axis_hi);
            base_y - (clamped.log10() - lo_log) / (hi_log - lo_log) * plot_h
        };

        let mut svg = String::new();
        svg.push_str(&format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width:.0}\" height=\"{HEIGHT:.0}\" font-family=\"Arial,sans-serif\">\n"
        ));
        svg.push_str(&format!("<rect width=\"{width:.0}\" height=\"{HEIGHT:.0}\" fill=\"white\"/>\n"));
        svg.push_str(&format!(
            "<text x=\"{:.1}\" y=\"28\" text-anchor=\"middle\" font-size=\"16\" font-weight=\"bold\">{}</text>\n",
            width / 2.0,
            escape(&series.title)
        ));

        // y-axis grid + tick labels
        for t in log_ticks(axis_lo, axis_hi) {
            let ty = y_of(t);
            svg.push_str(&format!(
                "<line x1=\"{MARGIN_LEFT:.1}\" y1=\"{ty:.1}\" x2=\"{:.1}\" y2=\"{ty:.1}\" stroke=\"#EEE\"/>\n",
                width - MARGIN_RIGHT
            ));
            svg.push_str(&format!(
                "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"end\" font-size=\"10\" fill=\"#666\">{}</text>\n",
                MARGIN_LEFT - 6.0,
                ty + 3.5,
                format_tick(t)
            ));
        }

        for (g, (case, values)) in series.groups().enumerate() {
            let center = MARGIN_LEFT + GROUP_W * (g as f64 + 0.5);
            for (b, value) in values.iter().enumerate() {
                let x = center + (b as f64 - 1.5) * BAR_W;
                let top = y_of(*value);
                svg.push_str(&format!(
                    "<rect x=\"{x:.1}\" y=\"{top:.1}\" width=\"{BAR_W:.1}\" height=\"{:.1}\" fill=\"{}\" opacity=\"0.8\"/>\n",
                    (base_y - top).max(0.0),
                    COLOURS[b]
                ));
                svg.push_str(&format!(
                    "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\" font-size=\"8\">{value:.1}</text>\n",
                    x + BAR_W / 2.0,
                    top - 3.0
                ));
            }
            svg.push_str(&format!(
                "<text x=\"{center:.1}\" y=\"{:.1}\" text-anchor=\"end\" font-size=\"11\" transform=\"rotate(-45 {center:.1} {:.1})\">{}</text>\n",
                base_y + 16.0,
                base_y + 16.0,
                escape(case)
            ));
        }

        // axes
        svg.push_str(&format!(
            "<line x1=\"{MARGIN_LEFT:.1}\" y1=\"{MARGIN_TOP:.1}\" x2=\"{MARGIN_LEFT:.1}\" y2=\"{base_y:.1}\" stroke=\"#333\"/>\n"
        ));
        svg.push_str(&format!(
            "<line x1=\"{MARGIN_LEFT:.1}\" y1=\"{base_y:.1}\" x2=\"{:.1}\" y2=\"{base_y:.1}\" stroke=\"#333\"/>\n",
            width - MARGIN_RIGHT
        ));
        svg.push_str(&format!(
            "<text x=\"18\" y=\"{:.1}\" text-anchor=\"middle\" font-size=\"12\" transform=\"rotate(-90 18 {:.1})\">Execution Time (ms, log scale)</text>\n",
            MARGIN_TOP + plot_h / 2.0,
            MARGIN_TOP + plot_h / 2.0
        ));
        svg.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\" font-size=\"12\">Test Functions</text>\n",
            width / 2.0,
            HEIGHT - 12.0
        ));

        // legend
        for (i, name) in series.legend.iter().enumerate() {
            let ly = MARGIN_TOP + 4.0 + i as f64 * 16.0;
            let lx = width - MARGIN_RIGHT - 150.0;
            svg.push_str(&format!(
                "<rect x=\"{lx:.1}\" y=\"{ly:.1}\" width=\"12\" height=\"12\" fill=\"{}\" opacity=\"0.8\"/>\n",
                COLOURS[i]
            ));
            svg.push_str(&format!(
                "<text x=\"{:.1}\" y=\"{:.1}\" font-size=\"11\">{}</text>\n",
                lx + 18.0,
                ly + 10.0,
                escape(name)
            ));
        }

        svg.push_str("</svg>\n");
        Ok(svg.into_bytes())
    }
}

/// 1-2-5 ticks per decade inside [lo, hi]. Both bounds must be finite and
/// positive.
fn log_ticks(lo: f64, hi: f64) -> Vec<f64> {
    let first = lo.log10().floor() as i32;
    let last = hi.log10().ceil() as i32;
    let mut ticks = Vec::new();
    for p in first..=last {
        for m in [1.0, 2.0, 5.0] {
            let v = m * 10f64.powi(p);
            if v >= lo && v <= hi {
                ticks.push(v);
            }
        }
    }
    ticks
}

fn format_tick(v: f64) -> String {
    if v >= 1.0 {
        return format!("{v:.0}");
    }
    // One digit past the tick's own decade, then drop the padding.
    let decimals = (-v.log10()).ceil() as usize + 1;
    let s = format!("{v:.decimals$}");
    s.trim_end_matches('0').to_string()
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
