//! Centralized error handling for the trace converting tool.
//!
//! The pipeline modules (conversion, integrity, extraction) return
//! [`TraceConvError`] so callers can match on the failure category; the
//! lower-level logic modules use `anyhow::Result` and convert at the
//! boundary via the `From<anyhow::Error>` impl.

use std::fmt;

/// Main error type for traceconv operations.
#[derive(Debug)]
pub enum TraceConvError {
    /// I/O errors (file operations, missing directories, etc.)
    Io(std::io::Error),

    /// Data processing errors (Polars, CSV parsing, casting)
    DataProcessing(String),

    /// Trace JSON could not be read or does not match the trace schema
    InvalidTrace(String),

    /// Requested column indexes are out of range, duplicated or empty
    InvalidColumns(String),

    /// A filter expression could not be parsed or evaluated
    InvalidExpression(String),

    /// A numeric format string could not be parsed
    InvalidFormat(String),

    /// File not found, wrong extension or invalid path
    InvalidPath(String),

    /// Configuration errors
    Config(String),

    /// Generic error with context
    Other(String),
}

impl fmt::Display for TraceConvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::DataProcessing(msg) => write!(f, "Data processing error: {msg}"),
            Self::InvalidTrace(msg) => write!(f, "Invalid trace: {msg}"),
            Self::InvalidColumns(msg) => write!(f, "Invalid columns: {msg}"),
            Self::InvalidExpression(msg) => write!(f, "Invalid expression: {msg}"),
            Self::InvalidFormat(msg) => write!(f, "Invalid format string: {msg}"),
            Self::InvalidPath(msg) => write!(f, "Invalid path: {msg}"),
            Self::Config(msg) => write!(f, "Configuration error: {msg}"),
            Self::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for TraceConvError {}

impl From<std::io::Error> for TraceConvError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<anyhow::Error> for TraceConvError {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(format!("{err:#}"))
    }
}

impl From<serde_json::Error> for TraceConvError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidTrace(format!("JSON error: {err}"))
    }
}

impl From<polars::error::PolarsError> for TraceConvError {
    fn from(err: polars::error::PolarsError) -> Self {
        Self::DataProcessing(err.to_string())
    }
}

// The GUI reports errors through its status line
impl From<TraceConvError> for String {
    fn from(err: TraceConvError) -> Self {
        err.to_string()
    }
}

/// Result type alias for traceconv operations.
pub type Result<T> = std::result::Result<T, TraceConvError>;

/// Extension trait to add context to results.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, msg: impl Into<String>) -> Result<T>;

    /// Add context using a closure (lazy evaluation).
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<TraceConvError>,
{
    fn context(self, msg: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let err: TraceConvError = e.into();
            TraceConvError::Other(format!("{}: {}", msg.into(), err))
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let err: TraceConvError = e.into();
            TraceConvError::Other(format!("{}: {}", f(), err))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TraceConvError::InvalidColumns("index 7 out of range".to_owned());
        assert_eq!(err.to_string(), "Invalid columns: index 7 out of range");
    }

    #[test]
    fn test_error_conversion_to_string() {
        let err = TraceConvError::InvalidPath("not a json file".to_owned());
        let s: String = err.into();
        assert_eq!(s, "Invalid path: not a json file");
    }

    #[test]
    fn test_result_context() {
        let result: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "trace.json",
        ));

        let result: Result<()> = result.context("Failed to read trace");
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to read trace")
        );
    }
}
