//! Trace validation: statistics tolerance checks, hash checks and
//! traceheader restoration.

use crate::error::{Result, TraceConvError};
use crate::integrity::hasher;
use crate::trace::statistics::{self, MIN_SAMPLES, NumFormat};
use crate::trace::{StatValue, TraceDocument};
use std::path::Path;

/// Result of comparing the stored hash against a recomputed one.
#[derive(Debug, Clone)]
pub struct HashCheckResult {
    pub passed: bool,
    pub message: String,
    pub stored_hash: String,
    pub computed_hash: String,
}

impl HashCheckResult {
    /// Format the result for terminal display.
    pub fn format_cli(&self) -> String {
        if self.passed {
            format!("✓ PASS: Hashes are equal ({})", hasher::HASH_ALGORITHM)
        } else {
            format!(
                "✗ FAIL: {}\n  Stored:   {}\n  Computed: {}",
                self.message, self.stored_hash, self.computed_hash
            )
        }
    }
}

/// Recomputes the file's digest and compares it with the stored one.
pub fn hash_check(path: &Path) -> Result<HashCheckResult> {
    let trace = TraceDocument::load(path)?;
    let stored = trace.traceheader.metainformation.hash_value;
    let computed = hasher::hash_from_trace(path)?;

    if stored.is_empty() {
        return Ok(HashCheckResult {
            passed: false,
            message: "trace carries no stored hash value".to_owned(),
            stored_hash: stored,
            computed_hash: computed,
        });
    }

    let passed = stored == computed;
    Ok(HashCheckResult {
        passed,
        message: if passed {
            "Hashes are equal".to_owned()
        } else {
            "Hash mismatch detected".to_owned()
        },
        stored_hash: stored,
        computed_hash: computed,
    })
}

/// One statistic that failed the tolerance comparison.
#[derive(Debug, Clone)]
pub struct StatisticMismatch {
    pub statistic: &'static str,
    pub column: usize,
    /// Value recomputed from the tracedata
    pub recomputed: f64,
    /// Value stored in the trace header
    pub stored: f64,
}

/// Result of recomputing every statistic and comparing within tolerance.
#[derive(Debug, Clone)]
pub struct StatisticsReport {
    pub valid: bool,
    pub tolerance: f64,
    pub mismatches: Vec<StatisticMismatch>,
}

impl StatisticsReport {
    /// Format the report for terminal display.
    pub fn format_cli(&self) -> String {
        if self.valid {
            format!(
                "✓ PASS: All statistics are close within relative tolerance {}",
                self.tolerance
            )
        } else {
            let mut output = format!(
                "✗ FAIL: {} statistic(s) outside relative tolerance {}\n",
                self.mismatches.len(),
                self.tolerance
            );
            for m in &self.mismatches {
                output.push_str(&format!(
                    "  {} [{}] not equal: should be {} but is {}\n",
                    m.statistic, m.column, m.recomputed, m.stored
                ));
            }
            output
        }
    }
}

/// Relative closeness: `|a - b| <= tolerance * max(|a|, |b|)`.
///
/// NaN never compares close, so traces whose statistics are undefined fail
/// validation rather than silently passing.
fn is_close(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() <= tolerance * a.abs().max(b.abs())
}

fn parse_stored(values: &[StatValue], column: usize) -> Result<f64> {
    values
        .get(column)
        .ok_or_else(|| {
            TraceConvError::InvalidTrace(format!("statistic missing for column {column}"))
        })?
        .as_f64()
}

/// Recomputes all six statistics per tracedata column and compares them to
/// the stored values with the given relative tolerance.
///
/// # Errors
///
/// Fails when the tolerance is outside `[0, 1]`, the trace cannot be read,
/// the trace has no statistics, or any statistic array length does not
/// match the column count.
pub fn verify_statistics(path: &Path, tolerance: f64) -> Result<StatisticsReport> {
    if !(0.0..=1.0).contains(&tolerance) {
        return Err(TraceConvError::Other(
            "tolerance must be a value between 0 and 1".to_owned(),
        ));
    }

    let trace = TraceDocument::load(path)?;
    let statistics = &trace.traceheader.statistics;
    let column_count = trace.column_count();

    if statistics.is_empty() {
        return Err(TraceConvError::InvalidTrace(
            "trace carries no statistics to validate".to_owned(),
        ));
    }
    for (name, values) in statistics.named() {
        if values.len() != column_count {
            return Err(TraceConvError::InvalidTrace(format!(
                "{name} has {} entries but the trace has {column_count} columns",
                values.len()
            )));
        }
    }

    let mut mismatches = Vec::new();
    for (column, values) in trace.tracebody.tracedata.iter().enumerate() {
        let recomputed = statistics::column_statistics(values)?;
        let pairs: [(&'static str, f64, &[StatValue]); 6] = [
            ("mean", recomputed.mean, &statistics.mean),
            ("median", recomputed.median, &statistics.median),
            ("skewness", recomputed.skewness, &statistics.skewness),
            ("kurtosis", recomputed.kurtosis, &statistics.kurtosis),
            (
                "autocorrelation",
                recomputed.autocorrelation,
                &statistics.autocorrelation,
            ),
            ("variance", recomputed.variance, &statistics.variance),
        ];
        for (name, expected, stored_values) in pairs {
            let stored = parse_stored(stored_values, column)?;
            if !is_close(expected, stored, tolerance) {
                mismatches.push(StatisticMismatch {
                    statistic: name,
                    column,
                    recomputed: expected,
                    stored,
                });
            }
        }
    }

    let report = StatisticsReport {
        valid: mismatches.is_empty(),
        tolerance,
        mismatches,
    };
    if report.valid {
        tracing::info!("Statistics of {} are valid", path.display());
    } else {
        tracing::warn!(
            "Statistics of {} invalid: {} mismatch(es)",
            path.display(),
            report.mismatches.len()
        );
    }
    Ok(report)
}

/// Recomputes the statistics and the hash of an existing trace in place.
///
/// Columns shorter than [`MIN_SAMPLES`] values leave the statistic arrays
/// empty, mirroring the conversion step.
pub fn restore_traceheader(path: &Path, format: &NumFormat) -> Result<()> {
    let mut trace = TraceDocument::load(path)?;

    if trace
        .tracebody
        .tracedata
        .iter()
        .all(|column| column.len() >= MIN_SAMPLES)
        && !trace.tracebody.tracedata.is_empty()
    {
        trace.traceheader.statistics = statistics::generate(&trace.tracebody.tracedata, format)?;
    } else {
        tracing::warn!(
            "Tracedata of {} has columns below {MIN_SAMPLES} values, statistics left empty",
            path.display()
        );
        trace.traceheader.statistics.clear();
    }

    trace.save(path)?;
    hasher::add_hash_to_trace(path)?;
    tracing::info!("Traceheader of {} restored", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::{MetaInformation, TraceBody, TraceHeader};
    use tempfile::TempDir;

    fn write_trace(dir: &TempDir, tracedata: Vec<Vec<f64>>) -> std::path::PathBuf {
        let path = dir.path().join("trace.json");
        let trace = TraceDocument {
            traceheader: TraceHeader {
                metainformation: MetaInformation {
                    name: "trace.csv".to_owned(),
                    ..Default::default()
                },
                statistics: Default::default(),
            },
            tracebody: TraceBody {
                tracedata_description: Vec::new(),
                tracedata,
            },
        };
        trace.save(&path).unwrap();
        path
    }

    #[test]
    fn test_is_close() {
        assert!(is_close(100.0, 100.0, 0.0));
        assert!(is_close(100.0, 100.9, 0.01));
        assert!(!is_close(100.0, 102.0, 0.01));
        assert!(!is_close(f64::NAN, f64::NAN, 0.5));
    }

    #[test]
    fn test_restore_then_verify_passes() {
        let dir = TempDir::new().unwrap();
        let path = write_trace(&dir, vec![vec![1.0, 2.0, 3.0, 4.0, 5.0]]);

        restore_traceheader(&path, &NumFormat::Fixed(6)).unwrap();
        let report = verify_statistics(&path, 0.001).unwrap();
        assert!(report.valid, "{}", report.format_cli());
    }

    #[test]
    fn test_verify_detects_tampered_statistic() {
        let dir = TempDir::new().unwrap();
        let path = write_trace(&dir, vec![vec![1.0, 2.0, 3.0, 4.0, 5.0]]);
        restore_traceheader(&path, &NumFormat::Fixed(6)).unwrap();

        let mut trace = TraceDocument::load(&path).unwrap();
        trace.traceheader.statistics.mean[0] = StatValue::Text("99.0".to_owned());
        trace.save(&path).unwrap();

        let report = verify_statistics(&path, 0.001).unwrap();
        assert!(!report.valid);
        assert_eq!(report.mismatches.len(), 1);
        assert_eq!(report.mismatches[0].statistic, "mean");
        assert_eq!(report.mismatches[0].column, 0);
    }

    #[test]
    fn test_verify_rejects_out_of_range_tolerance() {
        let dir = TempDir::new().unwrap();
        let path = write_trace(&dir, vec![vec![1.0, 2.0, 3.0, 4.0, 5.0]]);
        restore_traceheader(&path, &NumFormat::Shortest).unwrap();

        assert!(verify_statistics(&path, -0.5).is_err());
        assert!(verify_statistics(&path, 1.5).is_err());
    }

    #[test]
    fn test_verify_rejects_missing_statistics() {
        let dir = TempDir::new().unwrap();
        let path = write_trace(&dir, vec![vec![1.0, 2.0, 3.0, 4.0, 5.0]]);

        let err = verify_statistics(&path, 0.01).unwrap_err();
        assert!(err.to_string().contains("no statistics"));
    }

    #[test]
    fn test_hash_check_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = write_trace(&dir, vec![vec![1.0, 2.0, 3.0, 4.0, 5.0]]);

        hasher::add_hash_to_trace(&path).unwrap();
        let result = hash_check(&path).unwrap();
        assert!(result.passed, "{}", result.format_cli());

        // Tamper with the tracedata
        let mut trace = TraceDocument::load(&path).unwrap();
        trace.tracebody.tracedata[0][0] = 42.0;
        trace.save(&path).unwrap();

        let result = hash_check(&path).unwrap();
        assert!(!result.passed);
        assert_ne!(result.stored_hash, result.computed_hash);
    }

    #[test]
    fn test_hash_check_without_stored_hash() {
        let dir = TempDir::new().unwrap();
        let path = write_trace(&dir, vec![vec![1.0, 2.0, 3.0, 4.0, 5.0]]);

        let result = hash_check(&path).unwrap();
        assert!(!result.passed);
        assert!(result.message.contains("no stored hash"));
    }

    #[test]
    fn test_restore_clears_statistics_for_short_traces() {
        let dir = TempDir::new().unwrap();
        let path = write_trace(&dir, vec![vec![1.0, 2.0]]);

        restore_traceheader(&path, &NumFormat::Shortest).unwrap();
        let trace = TraceDocument::load(&path).unwrap();
        assert!(trace.traceheader.statistics.is_empty());
        // the hash is still annotated
        assert!(!trace.traceheader.metainformation.hash_value.is_empty());
    }
}
