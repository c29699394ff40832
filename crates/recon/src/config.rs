use serde::{Deserialize, Serialize};

use crate::error::CompareError;

/// File name looked up in the working directory by the CLI.
pub const CONFIG_FILE: &str = "benchcmp.toml";

pub const DEFAULT_REFERENCE_PATH: &str = "nlopt_benchmark_results.csv";
pub const DEFAULT_COMPARISON_PATH: &str = "csharp_results.txt";
pub const DEFAULT_REPORT_PATH: &str = "REAL_PERFORMANCE_COMPARISON.md";
pub const DEFAULT_CHART_PATH: &str = "performance_comparison.svg";

// ---------------------------------------------------------------------------
// Resolved config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct CompareConfig {
    pub reference: SourceConfig,
    pub comparison: SourceConfig,
    pub output: OutputConfig,
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceRole {
    Reference,
    Comparison,
}

impl SourceRole {
    fn default_path(self) -> &'static str {
        match self {
            Self::Reference => DEFAULT_REFERENCE_PATH,
            Self::Comparison => DEFAULT_COMPARISON_PATH,
        }
    }

    fn default_label(self) -> &'static str {
        match self {
            Self::Reference => "NLopt",
            Self::Comparison => "C#",
        }
    }

    fn default_regenerate(self) -> &'static str {
        match self {
            Self::Reference => "make install_nlopt && make nlopt_benchmark && ./nlopt_benchmark",
            Self::Comparison => "dotnet run perf > Benchmarks/csharp_results.txt",
        }
    }
}

impl std::fmt::Display for SourceRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Reference => write!(f, "reference"),
            Self::Comparison => write!(f, "comparison"),
        }
    }
}

/// One input source: where it lives, how it is named in the report, and the
/// external command that regenerates it.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub role: SourceRole,
    pub path: String,
    pub label: String,
    pub regenerate: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub report: String,
    /// Empty string disables charting.
    pub chart: String,
    pub json: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            report: DEFAULT_REPORT_PATH.into(),
            chart: DEFAULT_CHART_PATH.into(),
            json: None,
        }
    }
}

impl OutputConfig {
    pub fn chart_path(&self) -> Option<&str> {
        let trimmed = self.chart.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
    pub title: Option<String>,
    /// Free-text lines for the "Test Environment" section.
    pub environment: Vec<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: None,
            environment: vec![
                "**Hardware**: Same system for both benchmarks".into(),
                "**NLopt**: Native C++ implementation with Nelder-Mead".into(),
                "**C#**: .NET 9.0 JIT-compiled implementation".into(),
                "**Compiler**: g++ -O3 -march=native for NLopt".into(),
                "**Convergence**: Same tolerance settings (1e-8)".into(),
            ],
        }
    }
}

// ---------------------------------------------------------------------------
// On-disk shape
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    reference: RawSource,
    #[serde(default)]
    comparison: RawSource,
    #[serde(default)]
    output: OutputConfig,
    #[serde(default)]
    report: ReportConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSource {
    path: Option<String>,
    label: Option<String>,
    regenerate: Option<String>,
}

impl RawSource {
    fn resolve(self, role: SourceRole) -> SourceConfig {
        SourceConfig {
            role,
            path: self.path.unwrap_or_else(|| role.default_path().into()),
            label: self.label.unwrap_or_else(|| role.default_label().into()),
            regenerate: self.regenerate.unwrap_or_else(|| role.default_regenerate().into()),
        }
    }
}

impl RawConfig {
    fn resolve(self) -> CompareConfig {
        CompareConfig {
            reference: self.reference.resolve(SourceRole::Reference),
            comparison: self.comparison.resolve(SourceRole::Comparison),
            output: self.output,
            report: self.report,
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl Default for CompareConfig {
    fn default() -> Self {
        RawConfig::default().resolve()
    }
}

impl CompareConfig {
    pub fn from_toml(input: &str) -> Result<Self, CompareError> {
        let raw: RawConfig =
            toml::from_str(input).map_err(|e| CompareError::ConfigParse(e.to_string()))?;
        let config = raw.resolve();
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), CompareError> {
        for source in [&self.reference, &self.comparison] {
            if source.path.trim().is_empty() {
                return Err(CompareError::ConfigValidation(format!(
                    "{} path must not be empty",
                    source.role
                )));
            }
            if source.label.trim().is_empty() {
                return Err(CompareError::ConfigValidation(format!(
                    "{} label must not be empty",
                    source.role
                )));
            }
        }

        if self.reference.path == self.comparison.path {
            return Err(CompareError::ConfigValidation(format!(
                "reference and comparison both read '{}'",
                self.reference.path
            )));
        }

        if self.output.report.trim().is_empty() {
            return Err(CompareError::ConfigValidation(
                "output.report must not be empty".into(),
            ));
        }

        Ok(())
    }

    pub fn title(&self) -> String {
        self.report.title.clone().unwrap_or_else(|| {
            format!(
                "Real {} vs {} Performance Comparison",
                self.reference.label, self.comparison.label
            )
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
