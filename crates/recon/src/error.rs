use std::fmt;

#[derive(Debug)]
pub enum CompareError {
    /// A source file does not exist. Callers treat this as "no data yet".
    MissingInput { source: String, path: String },
    /// A structured-format numeric field could not be parsed.
    MalformedRecord { row: usize, field: String, value: String },
    /// Missing required column in the structured-format header.
    MissingColumn { column: String },
    /// The chart backend cannot produce the requested output.
    RenderingUnavailable(String),
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (empty path, colliding inputs, etc.).
    ConfigValidation(String),
    /// IO error (file read, CSV framing, etc.).
    Io(String),
}

impl CompareError {
    /// True for conditions that degrade the report instead of aborting the run.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::MissingInput { .. } | Self::RenderingUnavailable(_))
    }
}

impl fmt::Display for CompareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingInput { source, path } => {
                write!(f, "{source} input not found: {path}")
            }
            Self::MalformedRecord { row, field, value } => {
                write!(f, "row {row}: cannot parse field '{field}' from '{value}'")
            }
            Self::MissingColumn { column } => write!(f, "missing column '{column}'"),
            Self::RenderingUnavailable(msg) => write!(f, "chart rendering unavailable: {msg}"),
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for CompareError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_record_names_row_and_field() {
        let err = CompareError::MalformedRecord {
            row: 3,
            field: "ExecutionTime_ms".into(),
            value: "12,x".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("row 3"));
        assert!(msg.contains("ExecutionTime_ms"));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn missing_input_is_recoverable() {
        let err = CompareError::MissingInput {
            source: "NLopt".into(),
            path: "nlopt_benchmark_results.csv".into(),
        };
        assert!(err.is_recoverable());
        assert_eq!(err.to_string(), "NLopt input not found: nlopt_benchmark_results.csv");
    }
}
