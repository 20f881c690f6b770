//! Column extraction from raw CSV traces.
//!
//! Reads a comma-delimited table (first line is the header), validates the
//! requested column indexes and returns each kept column as an ordered
//! `Vec<f64>`, in the order the indexes were given.

use anyhow::{Context as _, Result, bail};
use polars::prelude::*;
use std::collections::HashSet;
use std::path::Path;

/// Reads a raw CSV trace into a `DataFrame`.
pub fn read_csv(path: &Path) -> Result<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(10000))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .with_context(|| format!("Failed to open CSV: {}", path.display()))?
        .finish()
        .with_context(|| format!("Failed to read CSV: {}", path.display()))
}

/// Parses a column index entry such as `"0;2;5"` (semicolons or commas).
pub fn parse_column_indexes(entry: &str) -> Result<Vec<usize>> {
    let mut indexes = Vec::new();
    for part in entry.split([';', ',']) {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let idx: usize = part
            .parse()
            .with_context(|| format!("'{part}' is not a non-negative column index"))?;
        indexes.push(idx);
    }
    if indexes.is_empty() {
        bail!("no column indexes given");
    }
    Ok(indexes)
}

/// Validates that every index is in range and no index repeats.
pub fn validate_columns(columns: &[usize], width: usize) -> Result<()> {
    if columns.is_empty() {
        bail!("no column indexes given");
    }
    let mut seen = HashSet::new();
    for &idx in columns {
        if idx >= width {
            bail!("column index {idx} out of range, the file has {width} columns");
        }
        if !seen.insert(idx) {
            bail!("column index {idx} given more than once");
        }
    }
    Ok(())
}

/// Returns the kept columns of `df` as f64 vectors.
///
/// Columns that cannot be cast to f64, or that contain missing or
/// non-finite values, are rejected with the column name in the error.
pub fn select_columns(df: &DataFrame, keep: &[usize]) -> Result<Vec<Vec<f64>>> {
    validate_columns(keep, df.width())?;

    let mut tracedata = Vec::with_capacity(keep.len());
    for &idx in keep {
        let column = &df.get_columns()[idx];
        let series = column.as_materialized_series();
        let name = series.name().to_string();

        // Non-strict cast: unparseable cells surface as nulls below
        let casted = series
            .cast(&DataType::Float64)
            .with_context(|| format!("column '{name}' does not contain numeric data"))?;
        let ca = casted.f64().map_err(|e| anyhow::anyhow!(e))?;

        if ca.null_count() > 0 {
            bail!(
                "column '{name}' contains {} missing or non-numeric values",
                ca.null_count()
            );
        }

        let values: Vec<f64> = ca.into_iter().flatten().collect();
        if values.iter().any(|v| !v.is_finite()) {
            bail!("column '{name}' contains non-finite values");
        }
        tracedata.push(values);
    }
    Ok(tracedata)
}

/// Reads `path` and extracts the columns addressed by `keep`.
pub fn tracedata_from_file(path: &Path, keep: &[usize]) -> Result<Vec<Vec<f64>>> {
    let df = read_csv(path)?;
    let tracedata = select_columns(&df, keep)?;
    tracing::info!(
        "Tracedata from {} successfully retrieved ({} columns)",
        path.display(),
        tracedata.len()
    );
    Ok(tracedata)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    fn write_csv(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_parse_column_indexes() {
        assert_eq!(parse_column_indexes("0;2;5").unwrap(), vec![0, 2, 5]);
        assert_eq!(parse_column_indexes("1, 3").unwrap(), vec![1, 3]);
        assert!(parse_column_indexes("").is_err());
        assert!(parse_column_indexes("a;b").is_err());
        assert!(parse_column_indexes("-1").is_err());
    }

    #[test]
    fn test_validate_columns() {
        assert!(validate_columns(&[0, 1], 2).is_ok());
        assert!(validate_columns(&[], 2).is_err());
        assert!(validate_columns(&[2], 2).is_err());
        assert!(validate_columns(&[0, 0], 2).is_err());
    }

    #[test]
    fn test_tracedata_from_file_keeps_requested_order() {
        let file = write_csv("a,b,c\n1,10,100\n2,20,200\n3,30,300\n");
        let data = tracedata_from_file(file.path(), &[2, 0]).unwrap();
        assert_eq!(data, vec![vec![100.0, 200.0, 300.0], vec![1.0, 2.0, 3.0]]);
    }

    #[test]
    fn test_out_of_range_index_is_rejected() {
        let file = write_csv("a,b\n1,2\n");
        let err = tracedata_from_file(file.path(), &[5]).unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn test_text_column_is_rejected() {
        let file = write_csv("a,b\nfoo,1\nbar,2\n");
        let err = tracedata_from_file(file.path(), &[0]).unwrap_err();
        assert!(err.to_string().contains("missing or non-numeric"));
    }

    #[test]
    fn test_missing_values_are_rejected() {
        let file = write_csv("a,b\n1,2\n,4\n5,6\n");
        let err = tracedata_from_file(file.path(), &[0]).unwrap_err();
        assert!(err.to_string().contains("missing"));
    }
}
