//! Comparison-source parser for free-form benchmark logs.
//!
//! A log is scanned line by line against an ordered list of [`LineRule`]s.
//! Each rule recognizes one line shape; the first rule that accepts a line
//! produces its record. Lines no rule accepts are ignored, so a log with no
//! recognizable lines yields an empty set rather than an error.

use regex::Regex;

use crate::model::{ComparisonSet, ResultRecord, Variant, VariantKey};

/// One recognized line shape.
pub trait LineRule: Send + Sync {
    /// Stable identifier, used in diagnostics.
    fn name(&self) -> &str;

    /// Returns a record with `variant` set, or `None` if the line is not
    /// this rule's shape.
    fn parse_line(&self, line: &str) -> Option<ResultRecord>;
}

/// Ordered rule set applied to every line of a log.
pub struct TextGrammar {
    rules: Vec<Box<dyn LineRule>>,
}

impl TextGrammar {
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn with_rule(mut self, rule: impl LineRule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Extract every recognized record. Later lines for the same
    /// (case, variant) replace earlier ones.
    pub fn parse(&self, content: &str) -> ComparisonSet {
        let mut records = ComparisonSet::new();

        for (i, line) in content.lines().enumerate() {
            let Some((rule, record)) = self
                .rules
                .iter()
                .find_map(|rule| rule.parse_line(line).map(|rec| (rule.name(), rec)))
            else {
                continue;
            };

            let Some(variant) = record.variant else {
                log::debug!("comparison: rule '{rule}' produced an untagged record on line {}", i + 1);
                continue;
            };

            let key = VariantKey::new(record.case_id.clone(), variant);
            if records.insert(key, record).is_some() {
                log::warn!("comparison: duplicate {variant} entry on line {}, keeping the later line", i + 1);
            }
        }

        log::debug!("comparison: extracted {} record(s)", records.len());
        records
    }
}

impl Default for TextGrammar {
    fn default() -> Self {
        Self::empty().with_rule(VariantLineRule::new())
    }
}

/// Parse a log with the default grammar.
pub fn parse_text_log(content: &str) -> ComparisonSet {
    TextGrammar::default().parse(content)
}

// ---------------------------------------------------------------------------
// Built-in rule
// ---------------------------------------------------------------------------

/// `<case> Ours (Standard|Optimized) <time> <iterations> <evals> <param_error> <status>`
///
/// Rows for any other implementation label (third-party baselines printed in
/// the same table) do not match.
pub struct VariantLineRule {
    pattern: Regex,
}

impl VariantLineRule {
    pub fn new() -> Self {
        let pattern = Regex::new(
            r"(\w+)\s+(Ours \((Standard|Optimized)\))\s+([\d.]+)\s+(\d+)\s+(\d+)\s+([\d.eE+-]+)\s+(\w+)",
        )
        .unwrap();
        Self { pattern }
    }
}

impl Default for VariantLineRule {
    fn default() -> Self {
        Self::new()
    }
}

impl LineRule for VariantLineRule {
    fn name(&self) -> &str {
        "ours_variant"
    }

    fn parse_line(&self, line: &str) -> Option<ResultRecord> {
        let caps = self.pattern.captures(line)?;

        let variant = match &caps[3] {
            "Standard" => Variant::Standard,
            "Optimized" => Variant::Optimized,
            _ => return None,
        };

        let time_ms = caps[4].parse::<f64>().ok().filter(|t| t.is_finite())?;
        let iterations: u64 = caps[5].parse().ok()?;
        let function_evaluations: u64 = caps[6].parse().ok()?;
        let parameter_error = caps[7].parse::<f64>().ok().filter(|e| e.is_finite());

        Some(ResultRecord {
            case_id: caps[1].to_string(),
            variant: Some(variant),
            label: Some(caps[2].to_string()),
            time_ms,
            function_evaluations,
            iterations: Some(iterations),
            final_value: None,
            parameter_error,
            converged: &caps[8] == "CONVERGED",
        })
    }
}
