//! Reference-source parser for the tabular benchmark export.
//!
//! Columns are located by header name, so column order in the file does not
//! matter. Every numeric field is parsed strictly: a value that cannot be
//! read fails the whole run instead of being coerced to zero.

use crate::error::CompareError;
use crate::model::{ReferenceSet, ResultRecord};

pub const COL_TEST_NAME: &str = "TestName";
pub const COL_TIME: &str = "ExecutionTime_ms";
pub const COL_EVALUATIONS: &str = "FunctionEvaluations";
pub const COL_FINAL_VALUE: &str = "FinalValue";
pub const COL_PARAMETER_ERROR: &str = "ParameterError";
pub const COL_CONVERGED: &str = "Converged";
pub const COL_ALGORITHM: &str = "Algorithm";

/// Parse the structured export into records keyed by case identifier.
///
/// Duplicate case identifiers keep the last row.
pub fn parse_structured(csv_data: &str) -> Result<ReferenceSet, CompareError> {
    if csv_data.trim().is_empty() {
        return Ok(ReferenceSet::new());
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(csv_data.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| CompareError::Io(e.to_string()))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let position = |name: &str| headers.iter().position(|h| h == name);
    let idx = |name: &str| -> Result<usize, CompareError> {
        position(name).ok_or_else(|| CompareError::MissingColumn { column: name.into() })
    };

    let name_idx = idx(COL_TEST_NAME)?;
    let time_idx = idx(COL_TIME)?;
    let evals_idx = idx(COL_EVALUATIONS)?;
    let final_idx = idx(COL_FINAL_VALUE)?;
    let error_idx = idx(COL_PARAMETER_ERROR)?;
    let converged_idx = idx(COL_CONVERGED)?;
    let algorithm_idx = position(COL_ALGORITHM);

    let mut records = ReferenceSet::new();

    for (i, record) in reader.records().enumerate() {
        let row = i + 1;
        let record = record.map_err(|e| CompareError::Io(format!("row {row}: {e}")))?;
        let field = |idx: usize| record.get(idx).unwrap_or("");

        let case_id = field(name_idx);
        if case_id.is_empty() {
            return Err(malformed(row, COL_TEST_NAME, case_id));
        }

        let parsed = ResultRecord {
            case_id: case_id.to_string(),
            variant: None,
            label: algorithm_idx
                .map(field)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            time_ms: parse_time(row, COL_TIME, field(time_idx))?,
            function_evaluations: parse_count(row, COL_EVALUATIONS, field(evals_idx))?,
            iterations: None,
            final_value: parse_optional(row, COL_FINAL_VALUE, field(final_idx))?,
            parameter_error: parse_optional(row, COL_PARAMETER_ERROR, field(error_idx))?,
            converged: field(converged_idx).eq_ignore_ascii_case("true"),
        };

        if records.insert(parsed.case_id.clone(), parsed).is_some() {
            log::warn!("reference: duplicate case '{case_id}' at row {row}, keeping the later row");
        }
    }

    log::debug!("reference: parsed {} case(s)", records.len());
    Ok(records)
}

fn malformed(row: usize, field: &str, value: &str) -> CompareError {
    CompareError::MalformedRecord {
        row,
        field: field.into(),
        value: value.into(),
    }
}

/// Execution time: required, finite, non-negative.
fn parse_time(row: usize, field: &str, value: &str) -> Result<f64, CompareError> {
    match value.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Ok(v),
        _ => Err(malformed(row, field, value)),
    }
}

fn parse_count(row: usize, field: &str, value: &str) -> Result<u64, CompareError> {
    value.parse::<u64>().map_err(|_| malformed(row, field, value))
}

/// Optional measurement: blank or non-finite means "not supplied".
fn parse_optional(row: usize, field: &str, value: &str) -> Result<Option<f64>, CompareError> {
    if value.is_empty() {
        return Ok(None);
    }
    let v: f64 = value.parse().map_err(|_| malformed(row, field, value))?;
    Ok(v.is_finite().then_some(v))
}
