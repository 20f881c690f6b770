//! Filtering converted traces by boolean expression.
//!
//! Every tracedata column of every selected trace binds the variables
//! `mean`, `median`, `skewness` (alias `skew`), `kurtosis`,
//! `autocorrelation` and `variance` from the stored statistics; columns for
//! which the expression holds become match rows.

pub mod expr;

use crate::error::{Result, TraceConvError};
use crate::trace::{StatValue, TraceDocument};
use expr::Expr;
use std::path::{Path, PathBuf};

/// The six statistics of one tracedata column, parsed to numbers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatisticsRow {
    pub mean: f64,
    pub median: f64,
    pub skewness: f64,
    pub kurtosis: f64,
    pub autocorrelation: f64,
    pub variance: f64,
}

impl StatisticsRow {
    /// Resolves an expression variable name.
    pub fn get(&self, name: &str) -> Option<f64> {
        match name {
            "mean" => Some(self.mean),
            "median" => Some(self.median),
            "skewness" | "skew" => Some(self.skewness),
            "kurtosis" => Some(self.kurtosis),
            "autocorrelation" => Some(self.autocorrelation),
            "variance" => Some(self.variance),
            _ => None,
        }
    }
}

/// One (trace, column) pair matched by the filter expression.
#[derive(Debug, Clone)]
pub struct FilterMatch {
    /// Basename of the trace file
    pub trace_name: String,
    /// Tracedata column index within the trace
    pub column: usize,
    pub statistics: StatisticsRow,
}

fn parse_at(values: &[StatValue], column: usize, name: &str, path: &Path) -> Result<f64> {
    values
        .get(column)
        .ok_or_else(|| {
            TraceConvError::InvalidTrace(format!(
                "{name} has no entry for column {column} in {}",
                path.display()
            ))
        })?
        .as_f64()
}

/// Parses the stored statistics of a trace into per-column rows.
///
/// A trace without statistics yields no rows.
pub fn statistics_rows(trace: &TraceDocument, path: &Path) -> Result<Vec<StatisticsRow>> {
    let statistics = &trace.traceheader.statistics;
    let mut rows = Vec::with_capacity(statistics.mean.len());
    for column in 0..statistics.mean.len() {
        rows.push(StatisticsRow {
            mean: parse_at(&statistics.mean, column, "mean", path)?,
            median: parse_at(&statistics.median, column, "median", path)?,
            skewness: parse_at(&statistics.skewness, column, "skewness", path)?,
            kurtosis: parse_at(&statistics.kurtosis, column, "kurtosis", path)?,
            autocorrelation: parse_at(
                &statistics.autocorrelation,
                column,
                "autocorrelation",
                path,
            )?,
            variance: parse_at(&statistics.variance, column, "variance", path)?,
        });
    }
    Ok(rows)
}

/// Evaluates `expression` against every column of every trace and returns
/// the matching rows.
pub fn filter_traces(expression: &str, traces: &[PathBuf]) -> Result<Vec<FilterMatch>> {
    let expr = Expr::parse(expression)
        .map_err(|e| TraceConvError::InvalidExpression(e.to_string()))?;

    let mut matches = Vec::new();
    for path in traces {
        let trace = TraceDocument::load(path)?;
        let trace_name = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown")
            .to_owned();

        for (column, row) in statistics_rows(&trace, path)?.iter().enumerate() {
            let matched = expr
                .eval_bool(&|name| row.get(name))
                .map_err(|e| TraceConvError::InvalidExpression(e.to_string()))?;
            if matched {
                matches.push(FilterMatch {
                    trace_name: trace_name.clone(),
                    column,
                    statistics: *row,
                });
            }
        }
    }

    tracing::info!(
        "Filter '{expression}' matched {} column(s) across {} trace(s)",
        matches.len(),
        traces.len()
    );
    Ok(matches)
}
